//! Raw user input and its validation

use crate::composite::{
    CompositeSpec, FillerType, PolymerMatrix, DEFAULT_PARTICLE_SIZE_UM, MAX_FILLER_FRACTION,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Composite description as a user enters it: labels plus filler content
/// in weight percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Matrix label, e.g. `"Epoxy"` or `"vinyl_ester"`
    pub polymer_matrix: String,
    /// Filler label, e.g. `"Hydroxyapatite"`
    pub filler_type: String,
    /// Filler content, wt% (0–50)
    pub filler_percent: f64,
    /// Cure temperature, °C
    pub cure_temperature_c: f64,
    /// Cure time, hours
    pub cure_time_h: f64,
    /// Consolidation pressure, MPa
    pub pressure_mpa: f64,
    /// Filler particle size, µm
    pub particle_size_um: f64,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            polymer_matrix: PolymerMatrix::Epoxy.label().to_string(),
            filler_type: FillerType::Hydroxyapatite.label().to_string(),
            filler_percent: 25.0,
            cure_temperature_c: 120.0,
            cure_time_h: 8.0,
            pressure_mpa: 2.0,
            particle_size_um: DEFAULT_PARTICLE_SIZE_UM,
        }
    }
}

impl PredictionRequest {
    /// Request for `matrix`/`filler` with the default process conditions.
    #[must_use]
    pub fn new(polymer_matrix: impl Into<String>, filler_type: impl Into<String>) -> Self {
        Self {
            polymer_matrix: polymer_matrix.into(),
            filler_type: filler_type.into(),
            ..Self::default()
        }
    }

    /// Set the filler content in wt%.
    #[must_use]
    pub const fn filler_percent(mut self, percent: f64) -> Self {
        self.filler_percent = percent;
        self
    }

    /// Check every field and build the composite.
    ///
    /// Nothing reaches the model unless this succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] with a user-facing message for an
    /// unrecognized label or an out-of-range value.
    pub fn validate(&self) -> Result<CompositeSpec> {
        let matrix: PolymerMatrix = self.polymer_matrix.parse()?;
        let filler: FillerType = self.filler_type.parse()?;

        let max_percent = MAX_FILLER_FRACTION * 100.0;
        if !self.filler_percent.is_finite()
            || self.filler_percent < 0.0
            || self.filler_percent > max_percent
        {
            return Err(Error::InvalidInput(format!(
                "filler content must be between 0% and {max_percent}%, got {}%",
                self.filler_percent
            )));
        }

        CompositeSpec::builder(matrix, filler)
            .filler_fraction(self.filler_percent / 100.0)
            .cure_temperature_c(self.cure_temperature_c)
            .cure_time_h(self.cure_time_h)
            .pressure_mpa(self.pressure_mpa)
            .particle_size_um(self.particle_size_um)
            .build()
    }
}
