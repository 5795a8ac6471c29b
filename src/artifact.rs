//! Persisted model artifacts
//!
//! Binary layout (all integers little-endian):
//!
//! ```text
//! ┌──────────┬─────────┬──────┬──────────┬──────────────┬───────────────┬─────────┐
//! │ "PCMP"   │ version │ kind │ reserved │ payload len  │ bincode body  │ CRC32   │
//! │ 4 bytes  │ u8      │ u8   │ 2 bytes  │ u64          │ len bytes     │ u32     │
//! └──────────┴─────────┴──────┴──────────┴──────────────┴───────────────┴─────────┘
//! ```
//!
//! The CRC32 (IEEE) covers header and payload. Artifacts are written once by
//! `polycomp train` and only read afterwards; any defect on read is an
//! [`Error::Artifact`] or [`Error::ChecksumMismatch`], both fatal to the
//! predictor.

use crate::composite::Property;
use crate::model::{MultiOutputForest, Preprocessor, FEATURE_NAMES};
use crate::training::{TrainedModel, REPORT_FILE};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File magic
pub const MAGIC: [u8; 4] = *b"PCMP";

/// Current format version
pub const FORMAT_VERSION: u8 = 1;

/// Header length in bytes
pub const HEADER_SIZE: usize = 16;

const CHECKSUM_SIZE: usize = 4;

/// Model artifact file name
pub const MODEL_FILE: &str = "model.pcm";

/// Preprocessor artifact file name
pub const PREPROCESSOR_FILE: &str = "preprocessor.pcm";

/// What an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ArtifactKind {
    /// [`ModelArtifact`]
    Model = 1,
    /// [`Preprocessor`]
    Preprocessor = 2,
}

impl ArtifactKind {
    const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Model),
            2 => Some(Self::Preprocessor),
            _ => None,
        }
    }
}

/// The trained forests plus the names needed to interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// One forest per property
    pub model: MultiOutputForest,
    /// Input names, in feature order
    pub feature_names: Vec<String>,
    /// Output column names, in property order
    pub target_names: Vec<String>,
    /// Run that produced the model
    pub run_id: String,
    /// When the artifact was written
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Wrap a fitted model with the current feature/target names.
    #[must_use]
    pub fn new(model: MultiOutputForest, run_id: impl Into<String>) -> Self {
        Self {
            model,
            feature_names: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            target_names: Property::ALL.iter().map(|p| p.column().to_string()).collect(),
            run_id: run_id.into(),
            trained_at: Utc::now(),
        }
    }

    /// Check the stored names against this build's feature and target layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] if the artifact was produced for a
    /// different layout.
    pub fn check_layout(&self) -> Result<()> {
        let features_match = self.feature_names.iter().eq(FEATURE_NAMES.iter().copied());
        let targets_match = self
            .target_names
            .iter()
            .eq(Property::ALL.iter().map(|p| p.column()));
        if !features_match || !targets_match || self.model.n_features() != FEATURE_NAMES.len() {
            return Err(Error::Artifact(
                "model was trained with a different feature or target layout".to_string(),
            ));
        }
        Ok(())
    }
}

/// CRC32 checksum (IEEE polynomial)
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    const TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            #[allow(clippy::cast_possible_truncation)]
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let idx = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ TABLE[idx];
    }
    !crc
}

/// Encode `value` as an artifact of `kind`.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the payload cannot be encoded.
pub fn to_bytes<T: Serialize>(value: &T, kind: ArtifactKind) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;

    let mut content = Vec::with_capacity(HEADER_SIZE + payload.len() + CHECKSUM_SIZE);
    content.extend_from_slice(&MAGIC);
    content.push(FORMAT_VERSION);
    content.push(kind as u8);
    content.extend_from_slice(&[0, 0]);
    content.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    content.extend_from_slice(&payload);

    let checksum = crc32(&content);
    content.extend_from_slice(&checksum.to_le_bytes());
    Ok(content)
}

/// Decode an artifact of `kind`.
///
/// # Errors
///
/// Returns [`Error::Artifact`] for a short file, bad magic, unsupported
/// version, wrong kind, length mismatch or undecodable payload, and
/// [`Error::ChecksumMismatch`] for corrupted content.
pub fn from_bytes<T: DeserializeOwned>(data: &[u8], kind: ArtifactKind) -> Result<T> {
    if data.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(Error::Artifact(format!(
            "file too small: {} bytes",
            data.len()
        )));
    }

    let (header, rest) = data.split_at(HEADER_SIZE);
    if header[0..4] != MAGIC {
        return Err(Error::Artifact(format!(
            "invalid magic {:02X}{:02X}{:02X}{:02X}, expected PCMP",
            header[0], header[1], header[2], header[3]
        )));
    }
    if header[4] != FORMAT_VERSION {
        return Err(Error::Artifact(format!(
            "unsupported format version {}, expected {FORMAT_VERSION}",
            header[4]
        )));
    }
    match ArtifactKind::from_u8(header[5]) {
        Some(found) if found == kind => {}
        Some(found) => {
            return Err(Error::Artifact(format!(
                "artifact holds {found:?}, expected {kind:?}"
            )))
        }
        None => return Err(Error::Artifact(format!("unknown artifact kind {}", header[5]))),
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[8..16]);
    let payload_len = u64::from_le_bytes(len_bytes);
    let actual_len = (rest.len() - CHECKSUM_SIZE) as u64;
    if payload_len != actual_len {
        return Err(Error::Artifact(format!(
            "payload length {payload_len} does not match file ({actual_len} bytes), file is truncated or padded"
        )));
    }

    let (body, trailer) = data.split_at(data.len() - CHECKSUM_SIZE);
    let mut stored = [0u8; CHECKSUM_SIZE];
    stored.copy_from_slice(trailer);
    let expected = u32::from_le_bytes(stored);
    let actual = crc32(body);
    if expected != actual {
        return Err(Error::ChecksumMismatch { expected, actual });
    }

    bincode::deserialize(&body[HEADER_SIZE..])
        .map_err(|e| Error::Artifact(format!("failed to decode {kind:?} payload: {e}")))
}

/// Write an artifact file.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn save<T: Serialize, P: AsRef<Path>>(value: &T, kind: ArtifactKind, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(value, kind)?;
    std::fs::write(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), ?kind, "artifact written");
    Ok(())
}

/// Read an artifact file.
///
/// # Errors
///
/// Returns [`Error::Artifact`] if the file cannot be read, plus every error
/// of [`from_bytes`].
pub fn load<T: DeserializeOwned, P: AsRef<Path>>(path: P, kind: ArtifactKind) -> Result<T> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| Error::Artifact(format!("cannot read {}: {e}", path.display())))?;
    from_bytes(&data, kind)
}

/// Write `model.pcm`, `preprocessor.pcm` and the training report into `dir`.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be written.
pub fn save_trained<P: AsRef<Path>>(dir: P, trained: &TrainedModel) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let model_path = dir.join(MODEL_FILE);
    let artifact = ModelArtifact::new(trained.model.clone(), trained.report.run.run_id());
    save(&artifact, ArtifactKind::Model, &model_path)?;

    let preprocessor_path = dir.join(PREPROCESSOR_FILE);
    save(&trained.preprocessor, ArtifactKind::Preprocessor, &preprocessor_path)?;

    let report_path = dir.join(REPORT_FILE);
    trained.report.save(&report_path)?;

    info!(dir = %dir.display(), "artifacts saved");
    Ok(vec![model_path, preprocessor_path, report_path])
}

/// Read both artifacts from `dir`.
///
/// # Errors
///
/// Returns [`Error::Artifact`] or [`Error::ChecksumMismatch`] if either file
/// is missing, corrupted or incompatible.
pub fn load_trained<P: AsRef<Path>>(dir: P) -> Result<(ModelArtifact, Preprocessor)> {
    let dir = dir.as_ref();
    let artifact: ModelArtifact = load(dir.join(MODEL_FILE), ArtifactKind::Model)?;
    artifact.check_layout()?;
    let preprocessor: Preprocessor = load(dir.join(PREPROCESSOR_FILE), ArtifactKind::Preprocessor)?;
    if preprocessor.scaler().n_features() != artifact.model.n_features() {
        return Err(Error::Artifact(
            "preprocessor and model disagree on the feature count".to_string(),
        ));
    }
    Ok((artifact, preprocessor))
}
