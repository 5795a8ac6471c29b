//! JSON configuration documents
//!
//! Two read-only documents, loaded once at startup:
//!
//! - `categories.json`: valid polymer/filler labels and their integer codes
//! - `hyperparameters.json`: dataset size, seed, noise level and forest settings
//!
//! A missing file falls back to the built-in defaults (logged at `warn`);
//! a file that exists but does not parse is an error.

use crate::composite::{FillerType, PolymerMatrix};
use crate::model::{ForestParams, MaxFeatures};
use crate::physics::{DEFAULT_NOISE_LEVEL, DEFAULT_SEED};
use crate::{Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the category document inside a config directory
pub const CATEGORIES_FILE: &str = "categories.json";

/// File name of the hyperparameter document inside a config directory
pub const HYPERPARAMETERS_FILE: &str = "hyperparameters.json";

/// Label → code tables for the two categorical features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Polymer matrix label → code
    #[serde(rename = "Polymer_Matrix")]
    pub polymer_matrix: BTreeMap<String, u32>,
    /// Filler type label → code
    #[serde(rename = "Filler_Type")]
    pub filler_type: BTreeMap<String, u32>,
}

impl Default for CategoryConfig {
    /// Every known label, coded by alphabetical rank.
    fn default() -> Self {
        Self {
            polymer_matrix: alphabetical_codes(PolymerMatrix::ALL.map(PolymerMatrix::label)),
            filler_type: alphabetical_codes(FillerType::ALL.map(FillerType::label)),
        }
    }
}

fn alphabetical_codes<const N: usize>(labels: [&str; N]) -> BTreeMap<String, u32> {
    // BTreeMap iterates in sorted key order
    let sorted: BTreeMap<String, ()> = labels.iter().map(|l| ((*l).to_string(), ())).collect();
    sorted.into_keys().zip(0u32..).collect()
}

impl CategoryConfig {
    /// Check that codes in each table are exactly `0..n`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for empty tables, blank labels, or codes that
    /// are duplicated or leave gaps.
    pub fn validate(&self) -> Result<()> {
        validate_table("Polymer_Matrix", &self.polymer_matrix)?;
        validate_table("Filler_Type", &self.filler_type)
    }
}

fn validate_table(name: &str, table: &BTreeMap<String, u32>) -> Result<()> {
    if table.is_empty() {
        return Err(Error::Config(format!("{name}: no categories defined")));
    }
    if table.keys().any(|label| label.trim().is_empty()) {
        return Err(Error::Config(format!("{name}: blank category label")));
    }
    let mut codes: Vec<u32> = table.values().copied().collect();
    codes.sort_unstable();
    let contiguous = codes
        .iter()
        .zip(0u32..)
        .all(|(code, expected)| *code == expected);
    if !contiguous {
        return Err(Error::Config(format!(
            "{name}: codes must be 0..{} with no gaps or duplicates, got {codes:?}",
            table.len()
        )));
    }
    Ok(())
}

/// Training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Number of synthetic samples to generate
    pub n_samples: usize,
    /// Seed for data generation, splitting and bootstrapping
    pub seed: u64,
    /// Relative noise amplitude of the generator
    pub noise_level: f64,
    /// Fraction of samples held out for evaluation
    pub test_fraction: f64,
    /// Trees per forest
    pub n_estimators: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Draw bootstrap samples for each tree
    pub bootstrap: bool,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            n_samples: 500,
            seed: DEFAULT_SEED,
            noise_level: DEFAULT_NOISE_LEVEL,
            test_fraction: 0.2,
            n_estimators: 100,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: MaxFeatures::All,
            bootstrap: true,
        }
    }
}

impl Hyperparameters {
    /// Forest settings derived from these hyperparameters
    #[must_use]
    pub const fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            bootstrap: self.bootstrap,
            seed: self.seed,
        }
    }

    /// Reject settings that cannot train a model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.n_samples < 10 {
            return Err(Error::Config(format!(
                "n_samples must be at least 10, got {}",
                self.n_samples
            )));
        }
        if !(self.test_fraction >= 0.0 && self.test_fraction < 0.9) {
            return Err(Error::Config(format!(
                "test_fraction must be within 0..0.9, got {}",
                self.test_fraction
            )));
        }
        if !(0.0..=crate::physics::MAX_NOISE_LEVEL).contains(&self.noise_level) {
            return Err(Error::Config(format!(
                "noise_level must be within 0..={}, got {}",
                crate::physics::MAX_NOISE_LEVEL,
                self.noise_level
            )));
        }
        self.forest_params().validate().map_err(|e| match e {
            Error::Training(msg) => Error::Config(msg),
            other => other,
        })
    }
}

/// Both configuration documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Category encodings
    pub categories: CategoryConfig,
    /// Training hyperparameters
    pub hyperparameters: Hyperparameters,
}

impl AppConfig {
    /// Load `categories.json` and `hyperparameters.json` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a present file is unreadable, malformed
    /// or fails validation.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let categories: CategoryConfig = load_or_default(&dir.join(CATEGORIES_FILE))?;
        categories.validate()?;
        let hyperparameters: Hyperparameters = load_or_default(&dir.join(HYPERPARAMETERS_FILE))?;
        hyperparameters.validate()?;
        info!(
            dir = %dir.display(),
            matrices = categories.polymer_matrix.len(),
            fillers = categories.filler_type.len(),
            "configuration loaded"
        );
        Ok(Self {
            categories,
            hyperparameters,
        })
    }

    /// Write both documents into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or files cannot be written.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let categories = dir.join(CATEGORIES_FILE);
        std::fs::write(&categories, serde_json::to_string_pretty(&self.categories)?)?;
        let hyperparameters = dir.join(HYPERPARAMETERS_FILE);
        std::fs::write(
            &hyperparameters,
            serde_json::to_string_pretty(&self.hyperparameters)?,
        )?;
        Ok(vec![categories, hyperparameters])
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match std::fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "config file not found, using built-in defaults");
            Ok(T::default())
        }
        Err(e) => Err(Error::Config(format!("{}: {e}", path.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("polycomp_config_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_categories_alphabetical() {
        let config = CategoryConfig::default();
        assert_eq!(config.polymer_matrix["Epoxy"], 0);
        assert_eq!(config.polymer_matrix["Vinyl Ester"], 4);
        assert_eq!(config.filler_type["Bone particles"], 0);
        assert_eq!(config.filler_type["Starch"], 5);
        config.validate().unwrap();
    }

    #[test]
    fn test_gap_in_codes_rejected() {
        let mut config = CategoryConfig::default();
        config.filler_type.insert("Starch".to_string(), 9);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Filler_Type"));
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let dir = scratch_dir("missing");
        let config = AppConfig::load(&dir).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("save");
        let mut config = AppConfig::default();
        config.hyperparameters.n_estimators = 7;
        config.save(&dir).unwrap();
        let loaded = AppConfig::load(&dir).unwrap();
        assert_eq!(loaded.hyperparameters.n_estimators, 7);
        assert_eq!(loaded.categories, config.categories);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join(HYPERPARAMETERS_FILE), "{ not json").unwrap();
        let err = AppConfig::load(&dir).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_partial_hyperparameters_use_defaults() {
        let parsed: Hyperparameters = serde_json::from_str(r#"{"n_estimators": 12}"#).unwrap();
        assert_eq!(parsed.n_estimators, 12);
        assert_eq!(parsed.max_depth, 15);
        assert_eq!(parsed.max_features, MaxFeatures::All);
    }

    #[test]
    fn test_invalid_test_fraction_rejected() {
        let params = Hyperparameters {
            test_fraction: 0.95,
            ..Hyperparameters::default()
        };
        assert!(params.validate().is_err());
    }
}
