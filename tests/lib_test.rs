//! Tests for the top-level Pipeline API

use polycomp::config::{AppConfig, CategoryConfig, Hyperparameters};
use polycomp::{Error, Pipeline, DEFAULT_ARTIFACTS_DIR};
use std::path::Path;

fn small_config() -> AppConfig {
    AppConfig {
        categories: CategoryConfig::default(),
        hyperparameters: Hyperparameters {
            n_samples: 80,
            n_estimators: 4,
            ..Hyperparameters::default()
        },
    }
}

#[test]
fn test_pipeline_builder_defaults() {
    let pipeline = Pipeline::builder().build().unwrap();
    assert_eq!(pipeline.artifacts_dir(), Path::new(DEFAULT_ARTIFACTS_DIR));
    assert_eq!(pipeline.config(), &AppConfig::default());
}

#[test]
fn test_pipeline_builder_chain() {
    let pipeline = Pipeline::builder()
        .config(small_config())
        .artifacts_dir("/tmp/polycomp-elsewhere")
        .build()
        .unwrap();
    assert_eq!(pipeline.config().hyperparameters.n_samples, 80);
    assert_eq!(pipeline.artifacts_dir(), Path::new("/tmp/polycomp-elsewhere"));
}

#[test]
fn test_pipeline_missing_config_dir_uses_defaults() {
    let pipeline = Pipeline::builder()
        .config_dir("/nonexistent/polycomp-config")
        .build()
        .unwrap();
    assert_eq!(pipeline.config().hyperparameters, Hyperparameters::default());
}

#[test]
fn test_pipeline_rejects_invalid_config() {
    let mut config = small_config();
    config.hyperparameters.test_fraction = 0.95;
    let result = Pipeline::builder().config(config).build();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_pipeline_generates_configured_size() {
    let pipeline = Pipeline::builder().config(small_config()).build().unwrap();
    let dataset = pipeline.generate_dataset().unwrap();
    assert_eq!(dataset.len(), 80);
}

#[test]
fn test_pipeline_train_then_predict() {
    let dir = std::env::temp_dir().join(format!("polycomp_lib_test_{}", std::process::id()));
    let pipeline = Pipeline::builder()
        .config(small_config())
        .artifacts_dir(&dir)
        .build()
        .unwrap();

    assert!(pipeline.predictor().is_err());
    pipeline.train().unwrap();
    assert!(dir.join("model.pcm").exists());
    assert!(dir.join("preprocessor.pcm").exists());
    assert!(dir.join("training_report.json").exists());
    assert!(pipeline.predictor().is_ok());

    let _ = std::fs::remove_dir_all(&dir);
}
