//! Synthetic training datasets
//!
//! A [`Dataset`] is an ordered list of [`Sample`]s, each pairing one
//! [`CompositeSpec`] with the [`PropertyVector`] the generator produced for
//! it. Datasets convert to and from Arrow [`RecordBatch`]es (see
//! [`columns`]) so they can be persisted as Parquet by
//! [`crate::storage::DatasetStore`] or exported as CSV.
//!
//! [`RecordBatch`]: arrow::record_batch::RecordBatch

pub mod columns;

pub use columns::{dataset_schema, FEATURE_COLUMNS};

use crate::composite::{CompositeSpec, FillerType, PolymerMatrix, Property, PropertyVector};
use crate::physics::{GeneratorConfig, SyntheticGenerator};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One composite and its measured (synthetic) properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Formulation and processing inputs
    pub spec: CompositeSpec,
    /// Property outputs
    pub properties: PropertyVector,
}

impl Sample {
    /// Composite density (g/cm³) derived from the formulation
    #[must_use]
    pub fn density_g_cm3(&self) -> f64 {
        SyntheticGenerator::micromechanics(&self.spec).density_g_cm3
    }
}

/// Ordered collection of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl Dataset {
    /// Wrap existing samples
    #[must_use]
    pub const fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Draw `n_samples` random composites and their noisy properties.
    ///
    /// The same `(n_samples, config)` always yields the same dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `n_samples` is zero or the noise
    /// level is out of range.
    pub fn generate(n_samples: usize, config: GeneratorConfig) -> Result<Self> {
        if n_samples == 0 {
            return Err(Error::InvalidInput(
                "dataset must contain at least one sample".to_string(),
            ));
        }
        let mut generator = SyntheticGenerator::new(config)?;
        let samples: Vec<Sample> = (0..n_samples)
            .map(|_| {
                let (spec, properties) = generator.sample();
                Sample { spec, properties }
            })
            .collect();
        info!(
            n_samples,
            seed = config.seed,
            noise_level = config.noise_level,
            "generated synthetic dataset"
        );
        Ok(Self { samples })
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in order
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate over samples
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Append another dataset's samples
    pub fn extend(&mut self, other: Self) {
        self.samples.extend(other.samples);
    }

    /// Seeded shuffle, then split off the last `test_fraction` as a test set.
    ///
    /// The test set holds `round(len · test_fraction)` samples, at least one
    /// when `test_fraction > 0`, and the training set is never empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `test_fraction` is outside `[0, 1)`
    /// or the dataset has fewer than two samples while a test set is requested.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> Result<(Self, Self)> {
        if !(0.0..1.0).contains(&test_fraction) {
            return Err(Error::InvalidInput(format!(
                "test fraction {test_fraction} must be within [0, 1)"
            )));
        }
        let n = self.samples.len();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let mut n_test = (n as f64 * test_fraction).round() as usize;
        if test_fraction > 0.0 {
            if n < 2 {
                return Err(Error::InvalidInput(format!(
                    "cannot split {n} sample(s) into train and test sets"
                )));
            }
            n_test = n_test.clamp(1, n - 1);
        }

        let mut shuffled = self.samples.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
        let test = shuffled.split_off(n - n_test);
        debug!(train = shuffled.len(), test = test.len(), "train/test split");
        Ok((Self::new(shuffled), Self::new(test)))
    }

    /// Per-category counts and per-property statistics.
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        let mut matrix_counts: BTreeMap<String, usize> = PolymerMatrix::ALL
            .iter()
            .map(|m| (m.label().to_string(), 0))
            .collect();
        let mut filler_counts: BTreeMap<String, usize> = FillerType::ALL
            .iter()
            .map(|f| (f.label().to_string(), 0))
            .collect();
        for sample in &self.samples {
            *matrix_counts
                .entry(sample.spec.matrix().label().to_string())
                .or_default() += 1;
            *filler_counts
                .entry(sample.spec.filler().label().to_string())
                .or_default() += 1;
        }

        let properties = Property::ALL
            .iter()
            .map(|&property| {
                let values: Vec<f64> = self
                    .samples
                    .iter()
                    .map(|s| s.properties.get(property))
                    .collect();
                (property.column().to_string(), ColumnStats::from_values(&values))
            })
            .collect();

        DatasetSummary {
            n_samples: self.samples.len(),
            matrix_counts,
            filler_counts,
            properties,
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl FromIterator<Sample> for Dataset {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Min / max / mean / population standard deviation of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

impl ColumnStats {
    /// Statistics of `values`; all zeros for an empty slice.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                std: 0.0,
            };
        }
        #[allow(clippy::cast_precision_loss)]
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Descriptive statistics of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Number of samples
    pub n_samples: usize,
    /// Samples per polymer matrix label
    pub matrix_counts: BTreeMap<String, usize>,
    /// Samples per filler label
    pub filler_counts: BTreeMap<String, usize>,
    /// Statistics per property column name
    pub properties: BTreeMap<String, ColumnStats>,
}
