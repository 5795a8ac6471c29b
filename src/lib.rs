//! # polycomp: Natural-Filler Polymer Composite Property Prediction
//!
//! **Version**: 0.1.0
//!
//! polycomp predicts nine mechanical, thermal and electrical properties of
//! polymer composites reinforced with natural (biogenic) fillers. A
//! physics-informed generator produces synthetic training data, a
//! multi-output random forest learns it, and a predictor front-end serves
//! the persisted model.
//!
//! ```text
//! ┌──────────────────────┐   ┌─────────────────────────┐   ┌─────────────────────┐
//! │ SyntheticGenerator   │──>│ Preprocessor +          │──>│ Predictor           │
//! │ (mixing laws, cure,  │   │ MultiOutputForest       │   │ (validate, predict, │
//! │  percolation, noise) │   │ -> model.pcm, report    │   │  render, CSV)       │
//! └──────────────────────┘   └─────────────────────────┘   └─────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use polycomp::predictor::PredictionRequest;
//! use polycomp::Pipeline;
//!
//! let pipeline = Pipeline::builder()
//!     .config_dir("config")
//!     .artifacts_dir("artifacts")
//!     .build()?;
//! pipeline.train()?;
//!
//! let predictor = pipeline.predictor()?;
//! let request = PredictionRequest::new("Epoxy", "Hydroxyapatite").filler_percent(20.0);
//! let prediction = predictor.predict_request(&request)?;
//! println!("{}", polycomp::predictor::render_prediction(&prediction));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod artifact;
pub mod composite;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod model;
pub mod physics;
pub mod predictor;
pub mod storage;
pub mod training;

pub use error::{Error, Result};

use config::AppConfig;
use dataset::Dataset;
use physics::GeneratorConfig;
use predictor::Predictor;
use std::path::{Path, PathBuf};
use training::TrainedModel;

/// Default configuration directory
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Default artifact directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Configured pipeline: where settings come from and where artifacts go.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AppConfig,
    artifacts_dir: PathBuf,
}

impl Pipeline {
    /// Create a new pipeline builder
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Loaded configuration
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Artifact directory
    #[must_use]
    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Generate the synthetic dataset described by the hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the generator settings are invalid.
    pub fn generate_dataset(&self) -> Result<Dataset> {
        let hp = &self.config.hyperparameters;
        Dataset::generate(
            hp.n_samples,
            GeneratorConfig {
                seed: hp.seed,
                noise_level: hp.noise_level,
            },
        )
    }

    /// Train on freshly generated data and write the artifacts.
    ///
    /// # Errors
    ///
    /// Returns an error if training fails or the artifacts cannot be written.
    pub fn train(&self) -> Result<TrainedModel> {
        let trained = training::train(&self.config)?;
        artifact::save_trained(&self.artifacts_dir, &trained)?;
        Ok(trained)
    }

    /// Load the predictor from the artifact directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] or [`Error::ChecksumMismatch`] if the
    /// artifacts are missing or damaged.
    pub fn predictor(&self) -> Result<Predictor> {
        Predictor::load(&self.artifacts_dir)
    }
}

/// Pipeline builder
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config_dir: Option<PathBuf>,
    config: Option<AppConfig>,
    artifacts_dir: Option<PathBuf>,
}

impl PipelineBuilder {
    /// Read `categories.json` and `hyperparameters.json` from `dir`
    #[must_use]
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Use an in-memory configuration (takes precedence over `config_dir`)
    #[must_use]
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set where artifacts are written and read
    #[must_use]
    pub fn artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Build the pipeline
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is malformed or
    /// invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = match (self.config, self.config_dir) {
            (Some(config), _) => {
                config.categories.validate()?;
                config.hyperparameters.validate()?;
                config
            }
            (None, Some(dir)) => AppConfig::load(dir)?,
            (None, None) => AppConfig::default(),
        };
        Ok(Pipeline {
            config,
            artifacts_dir: self
                .artifacts_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR)),
        })
    }
}
