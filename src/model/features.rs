//! Feature extraction and the fitted preprocessor

use super::encoder::LabelEncoder;
use super::scaler::StandardScaler;
use crate::composite::CompositeSpec;
use crate::config::CategoryConfig;
use crate::dataset::{Dataset, FEATURE_COLUMNS};
use crate::physics::SyntheticGenerator;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Model input names, in column order
pub const FEATURE_NAMES: [&str; 9] = FEATURE_COLUMNS;

/// Number of model inputs
pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// Category encoders plus a standard scaler fitted on encoded training rows.
///
/// Turns a [`CompositeSpec`] into the scaled feature row the forests expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    matrix: LabelEncoder,
    filler: LabelEncoder,
    scaler: StandardScaler,
}

impl Preprocessor {
    /// Build encoders from `categories` and fit the scaler on `dataset`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] for an invalid category table,
    /// [`crate::Error::UnknownCategory`] if a sample uses a label absent from
    /// it, and [`crate::Error::Training`] for an empty dataset.
    pub fn fit(categories: &CategoryConfig, dataset: &Dataset) -> Result<Self> {
        let (matrix, filler) = encoders(categories)?;
        let raw = dataset
            .iter()
            .map(|s| encode_raw(&matrix, &filler, &s.spec).map(Vec::from))
            .collect::<Result<Vec<_>>>()?;
        let scaler = StandardScaler::fit(&raw)?;
        Ok(Self {
            matrix,
            filler,
            scaler,
        })
    }

    /// Unscaled feature row (category codes and physical values)
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownCategory`] for labels the encoders do
    /// not know.
    pub fn encode(&self, spec: &CompositeSpec) -> Result<[f64; N_FEATURES]> {
        encode_raw(&self.matrix, &self.filler, spec)
    }

    /// Scaled feature row for the model
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn transform(&self, spec: &CompositeSpec) -> Result<Vec<f64>> {
        self.scaler.transform_row(&self.encode(spec)?)
    }

    /// Scaled feature rows for every sample
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn transform_dataset(&self, dataset: &Dataset) -> Result<Vec<Vec<f64>>> {
        dataset.iter().map(|s| self.transform(&s.spec)).collect()
    }

    /// Polymer matrix encoder
    #[must_use]
    pub const fn matrix_encoder(&self) -> &LabelEncoder {
        &self.matrix
    }

    /// Filler type encoder
    #[must_use]
    pub const fn filler_encoder(&self) -> &LabelEncoder {
        &self.filler
    }

    /// Fitted scaler
    #[must_use]
    pub const fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

/// Encoders for the two categorical columns of `categories`.
///
/// # Errors
///
/// Returns [`crate::Error::Config`] if either table is invalid.
pub fn encoders(categories: &CategoryConfig) -> Result<(LabelEncoder, LabelEncoder)> {
    Ok((
        LabelEncoder::from_table(FEATURE_NAMES[0], &categories.polymer_matrix)?,
        LabelEncoder::from_table(FEATURE_NAMES[1], &categories.filler_type)?,
    ))
}

fn encode_raw(
    matrix: &LabelEncoder,
    filler: &LabelEncoder,
    spec: &CompositeSpec,
) -> Result<[f64; N_FEATURES]> {
    let density = SyntheticGenerator::micromechanics(spec).density_g_cm3;
    Ok([
        f64::from(matrix.transform(spec.matrix().label())?),
        f64::from(filler.transform(spec.filler().label())?),
        spec.filler_fraction() * 100.0,
        spec.matrix_fraction() * 100.0,
        spec.cure_temperature_c(),
        spec.cure_time_h(),
        spec.pressure_mpa(),
        spec.particle_size_um(),
        density,
    ])
}
