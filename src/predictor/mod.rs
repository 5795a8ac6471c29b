//! Predictor front-end
//!
//! ```text
//! PredictionRequest ──validate()──> CompositeSpec ──Preprocessor──> scaled row
//!                                                                     │
//!              Prediction <──PropertyVector<── MultiOutputForest <────┘
//! ```
//!
//! Artifacts are loaded once by [`Predictor::load`] and shared read-only
//! behind an [`Arc`]; clones of a `Predictor` are cheap and can be used from
//! any thread. A load failure is fatal. A failed prediction is not: the
//! predictor stays usable for the next request.

mod render;
mod request;

pub use render::{
    render_dataset_summary, render_importances, render_key_values, render_prediction,
};
pub use request::PredictionRequest;

use crate::artifact::{self, ModelArtifact};
use crate::composite::{CompositeSpec, Property, PropertyVector};
use crate::export;
use crate::model::Preprocessor;
use crate::training::{TrainingReport, REPORT_FILE};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File name offered for the prediction CSV export
pub const DEFAULT_EXPORT_FILE: &str = "polymer_composite_prediction.csv";

/// One prediction: the validated input and the nine predicted properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Input the prediction was made for
    pub spec: CompositeSpec,
    /// Predicted properties
    pub properties: PropertyVector,
}

#[derive(Debug)]
struct Loaded {
    artifact: ModelArtifact,
    preprocessor: Preprocessor,
    report: Option<TrainingReport>,
}

/// Read-only handle to the trained model and its preprocessor.
#[derive(Debug, Clone)]
pub struct Predictor {
    inner: Arc<Loaded>,
}

impl Predictor {
    /// Load `model.pcm`, `preprocessor.pcm` and (optionally) the training
    /// report from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] or [`Error::ChecksumMismatch`] if either
    /// artifact is missing, corrupted or incompatible. A missing or
    /// unreadable report is only logged.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let (artifact, preprocessor) = artifact::load_trained(dir)?;

        let report_path = dir.join(REPORT_FILE);
        let report = match TrainingReport::load(&report_path) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(path = %report_path.display(), error = %e, "training report unavailable");
                None
            }
        };

        info!(
            dir = %dir.display(),
            run_id = %artifact.run_id,
            trees = artifact.model.n_trees(),
            "predictor ready"
        );
        Ok(Self::from_parts(artifact, preprocessor, report))
    }

    /// Assemble a predictor from in-memory parts.
    #[must_use]
    pub fn from_parts(
        artifact: ModelArtifact,
        preprocessor: Preprocessor,
        report: Option<TrainingReport>,
    ) -> Self {
        Self {
            inner: Arc::new(Loaded {
                artifact,
                preprocessor,
                report,
            }),
        }
    }

    /// Predict all nine properties for `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] if the model was trained without
    /// the composite's matrix or filler, and [`Error::Prediction`] if the model
    /// produces a non-finite value.
    pub fn predict(&self, spec: &CompositeSpec) -> Result<Prediction> {
        let row = self.inner.preprocessor.transform(spec)?;
        let properties = self.inner.artifact.model.predict_row(&row);
        if !properties.is_finite() {
            return Err(Error::Prediction(format!(
                "model produced a non-finite value for {} / {}",
                spec.matrix(),
                spec.filler()
            )));
        }
        debug!(matrix = %spec.matrix(), filler = %spec.filler(), "prediction made");
        Ok(Prediction {
            spec: *spec,
            properties,
        })
    }

    /// Validate raw input and predict.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for invalid input, plus every error
    /// of [`predict`](Self::predict).
    pub fn predict_request(&self, request: &PredictionRequest) -> Result<Prediction> {
        let spec = request.validate()?;
        self.predict(&spec)
    }

    /// Feature importances per target: target column → feature → weight.
    #[must_use]
    pub fn feature_importances(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let artifact = &self.inner.artifact;
        Property::ALL
            .iter()
            .map(|&property| {
                let weights = artifact
                    .feature_names
                    .iter()
                    .cloned()
                    .zip(artifact.model.importances(property).iter().copied())
                    .collect();
                (property.column().to_string(), weights)
            })
            .collect()
    }

    /// Importances for `property`, most important feature first.
    #[must_use]
    pub fn ranked_importances(&self, property: Property) -> Vec<(String, f64)> {
        let artifact = &self.inner.artifact;
        let mut ranked: Vec<(String, f64)> = artifact
            .feature_names
            .iter()
            .cloned()
            .zip(artifact.model.importances(property).iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Parameter/value rows describing the loaded model.
    #[must_use]
    pub fn model_details(&self) -> Vec<(String, String)> {
        let artifact = &self.inner.artifact;
        let params = artifact.model.params();
        let mut rows = vec![
            (
                "Model Type".to_string(),
                "Multi-Output Random Forest Regressor".to_string(),
            ),
            (
                "Number of Estimators".to_string(),
                params.n_estimators.to_string(),
            ),
            ("Max Depth".to_string(), params.max_depth.to_string()),
            (
                "Min Samples Split".to_string(),
                params.min_samples_split.to_string(),
            ),
            (
                "Min Samples Leaf".to_string(),
                params.min_samples_leaf.to_string(),
            ),
            (
                "Number of Features".to_string(),
                artifact.feature_names.len().to_string(),
            ),
            (
                "Number of Target Properties".to_string(),
                artifact.target_names.len().to_string(),
            ),
            ("Run ID".to_string(), artifact.run_id.clone()),
            (
                "Trained At".to_string(),
                artifact.trained_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ),
        ];
        if let Some(report) = &self.inner.report {
            rows.push((
                "Training Dataset Size".to_string(),
                format!("{} samples", report.n_generated),
            ));
            if let Some(r2) = report.mean_r2() {
                rows.push(("Mean Held-out R²".to_string(), format!("{r2:.3}")));
            }
        }
        rows
    }

    /// The loaded model artifact
    #[must_use]
    pub fn artifact(&self) -> &ModelArtifact {
        &self.inner.artifact
    }

    /// The loaded preprocessor
    #[must_use]
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.inner.preprocessor
    }

    /// The training report, if one was found next to the artifacts
    #[must_use]
    pub fn report(&self) -> Option<&TrainingReport> {
        self.inner.report.as_ref()
    }
}

/// A single user's session: the predictor plus the last successful
/// prediction, which is what gets exported.
#[derive(Debug, Clone)]
pub struct PredictorSession {
    predictor: Predictor,
    last: Option<Prediction>,
}

impl PredictorSession {
    /// Start a session with no prediction yet.
    #[must_use]
    pub const fn new(predictor: Predictor) -> Self {
        Self {
            predictor,
            last: None,
        }
    }

    /// Validate and predict; on success the result becomes the last
    /// prediction. On failure the previous one is kept.
    ///
    /// # Errors
    ///
    /// See [`Predictor::predict_request`].
    pub fn submit(&mut self, request: &PredictionRequest) -> Result<&Prediction> {
        let prediction = self.predictor.predict_request(request)?;
        Ok(&*self.last.insert(prediction))
    }

    /// Last successful prediction
    #[must_use]
    pub const fn last(&self) -> Option<&Prediction> {
        self.last.as_ref()
    }

    /// The underlying predictor
    #[must_use]
    pub const fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Last prediction as CSV text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prediction`] if nothing has been predicted yet.
    pub fn last_csv(&self) -> Result<String> {
        export::prediction_csv_string(&self.require_last()?.properties)
    }

    /// Write the last prediction's summary table to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prediction`] if nothing has been predicted yet, or
    /// an I/O or CSV error if writing fails.
    pub fn export_last_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        export::export_prediction(path, &self.require_last()?.properties)
    }

    fn require_last(&self) -> Result<&Prediction> {
        self.last
            .as_ref()
            .ok_or_else(|| Error::Prediction("no prediction to export yet".to_string()))
    }
}
