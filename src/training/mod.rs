//! Training pipeline
//!
//! ```text
//! generate ─> filter to configured categories ─> split ─> fit preprocessor
//!          ─> fit MultiOutputForest ─> score held-out rows ─> TrainingReport
//! ```
//!
//! Every step is seeded from the hyperparameters, so a given configuration
//! always produces the same model.

mod metrics;
mod report;
mod run;

pub use metrics::{mean_absolute_error, r2_score, root_mean_squared_error, TargetMetrics};
pub use report::{TrainingReport, REPORT_FILE};
pub use run::{RunStatus, TrainingRun};

use crate::composite::{Property, PropertyVector};
use crate::config::AppConfig;
use crate::dataset::Dataset;
use crate::model::{features, MultiOutputForest, Preprocessor, FEATURE_NAMES};
use crate::physics::GeneratorConfig;
use crate::{Error, Result};
use tracing::{error, info, warn};

/// Fitted preprocessor and model with the report of the run that produced
/// them.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    /// Category encoders and scaler
    pub preprocessor: Preprocessor,
    /// One forest per property
    pub model: MultiOutputForest,
    /// Run summary and held-out metrics
    pub report: TrainingReport,
}

/// Generate a synthetic dataset from `config` and train on it.
///
/// # Errors
///
/// Returns [`Error::Config`] for invalid settings and [`Error::Training`]
/// if fitting fails.
pub fn train(config: &AppConfig) -> Result<TrainedModel> {
    let hp = &config.hyperparameters;
    hp.validate()?;
    let dataset = Dataset::generate(
        hp.n_samples,
        GeneratorConfig {
            seed: hp.seed,
            noise_level: hp.noise_level,
        },
    )?;
    train_on(&dataset, config)
}

/// Train on an existing dataset.
///
/// Samples whose labels are missing from the category configuration are
/// dropped with a warning.
///
/// # Errors
///
/// Returns [`Error::Training`] if no usable samples remain or fitting fails.
pub fn train_on(dataset: &Dataset, config: &AppConfig) -> Result<TrainedModel> {
    let mut run = TrainingRun::timestamped();
    run.start();
    info!(run_id = run.run_id(), samples = dataset.len(), "training started");

    match fit(dataset, config, &run) {
        Ok((preprocessor, model, mut report)) => {
            run.complete();
            report.run = run;
            info!(
                run_id = report.run.run_id(),
                n_train = report.n_train,
                n_test = report.n_test,
                mean_r2 = report.mean_r2().unwrap_or(f64::NAN),
                "training finished"
            );
            Ok(TrainedModel {
                preprocessor,
                model,
                report,
            })
        }
        Err(e) => {
            run.fail(e.to_string());
            error!(run_id = run.run_id(), error = %e, "training failed");
            Err(e)
        }
    }
}

fn fit(
    dataset: &Dataset,
    config: &AppConfig,
    run: &TrainingRun,
) -> Result<(Preprocessor, MultiOutputForest, TrainingReport)> {
    let hp = &config.hyperparameters;
    let (matrix_encoder, filler_encoder) = features::encoders(&config.categories)?;

    let usable: Dataset = dataset
        .iter()
        .filter(|s| {
            matrix_encoder.contains(s.spec.matrix().label())
                && filler_encoder.contains(s.spec.filler().label())
        })
        .copied()
        .collect();
    let dropped = dataset.len() - usable.len();
    if dropped > 0 {
        warn!(dropped, "samples use categories absent from the configuration");
    }
    if usable.len() < 2 {
        return Err(Error::Training(format!(
            "need at least 2 usable samples, have {}",
            usable.len()
        )));
    }

    let (train_set, test_set) = usable.train_test_split(hp.test_fraction, hp.seed)?;
    let preprocessor = Preprocessor::fit(&config.categories, &train_set)?;
    let x_train = preprocessor.transform_dataset(&train_set)?;
    let y_train: Vec<PropertyVector> = train_set.iter().map(|s| s.properties).collect();

    let params = hp.forest_params();
    info!(
        n_estimators = params.n_estimators,
        max_depth = params.max_depth,
        n_train = train_set.len(),
        "fitting forests"
    );
    let model = MultiOutputForest::fit(&x_train, &y_train, &params)?;

    let metrics = if test_set.is_empty() {
        Vec::new()
    } else {
        evaluate(&preprocessor, &model, &test_set)?
    };

    let feature_importances = FEATURE_NAMES
        .iter()
        .map(|name| (*name).to_string())
        .zip(model.mean_importances())
        .collect();

    let report = TrainingReport {
        run: run.clone(),
        hyperparameters: hp.clone(),
        n_generated: dataset.len(),
        n_train: train_set.len(),
        n_test: test_set.len(),
        feature_names: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
        metrics,
        feature_importances,
    };
    Ok((preprocessor, model, report))
}

/// Score `model` on `test_set`, one [`TargetMetrics`] per property.
///
/// # Errors
///
/// Returns an error if a test sample cannot be encoded.
pub fn evaluate(
    preprocessor: &Preprocessor,
    model: &MultiOutputForest,
    test_set: &Dataset,
) -> Result<Vec<TargetMetrics>> {
    let x_test = preprocessor.transform_dataset(test_set)?;
    let predictions = model.predict(&x_test);
    Ok(Property::ALL
        .iter()
        .map(|&property| {
            let y_true: Vec<f64> = test_set.iter().map(|s| s.properties.get(property)).collect();
            let y_pred: Vec<f64> = predictions.iter().map(|p| p.get(property)).collect();
            let m = TargetMetrics::compute(property, &y_true, &y_pred);
            info!(target = %m.target, r2 = m.r2, mae = m.mae, rmse = m.rmse, "held-out score");
            m
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryConfig, Hyperparameters};

    fn quick_config() -> AppConfig {
        AppConfig {
            categories: CategoryConfig::default(),
            hyperparameters: Hyperparameters {
                n_samples: 150,
                n_estimators: 8,
                ..Hyperparameters::default()
            },
        }
    }

    #[test]
    fn test_train_produces_report() {
        let trained = train(&quick_config()).unwrap();
        let report = &trained.report;
        assert_eq!(report.run.status(), RunStatus::Success);
        assert_eq!(report.n_train + report.n_test, 150);
        assert_eq!(report.n_test, 30);
        assert_eq!(report.metrics.len(), Property::COUNT);
        let total: f64 = report.feature_importances.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(trained.model.n_trees(), 8 * Property::COUNT);
    }

    #[test]
    fn test_forest_learns_strength_trend() {
        let trained = train(&quick_config()).unwrap();
        let tensile = trained.report.metrics_for("Tensile_Strength_MPa").unwrap();
        assert!(tensile.r2 > 0.3, "tensile r2 = {}", tensile.r2);
    }

    #[test]
    fn test_training_is_deterministic() {
        let a = train(&quick_config()).unwrap();
        let b = train(&quick_config()).unwrap();
        assert_eq!(a.model, b.model);
        assert_eq!(a.preprocessor, b.preprocessor);
    }

    #[test]
    fn test_unconfigured_categories_dropped() {
        let mut config = quick_config();
        config.categories.filler_type = [
            ("Lignin".to_string(), 0),
            ("Starch".to_string(), 1),
        ]
        .into();
        let trained = train(&config).unwrap();
        assert!(trained.report.n_train + trained.report.n_test < trained.report.n_generated);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = quick_config();
        config.hyperparameters.n_estimators = 0;
        assert!(matches!(train(&config), Err(Error::Config(_))));
    }
}
