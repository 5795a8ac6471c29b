//! End-to-end tests: generate → train → persist → load → predict → export
//!
//! One model is trained per test binary and shared through a `OnceLock`.

use polycomp::artifact::{self, MODEL_FILE, PREPROCESSOR_FILE};
use polycomp::composite::{CompositeSpec, FillerType, PolymerMatrix, Property};
use polycomp::config::{AppConfig, CategoryConfig, Hyperparameters, CATEGORIES_FILE};
use polycomp::dataset::Dataset;
use polycomp::physics::GeneratorConfig;
use polycomp::predictor::{PredictionRequest, Predictor, PredictorSession};
use polycomp::storage::DatasetStore;
use polycomp::training::{RunStatus, TrainingReport, REPORT_FILE};
use polycomp::{Error, Pipeline};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn shared_artifacts() -> &'static Path {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("polycomp_it_{}", std::process::id()));
        let pipeline = Pipeline::builder()
            .config(AppConfig {
                categories: CategoryConfig::default(),
                hyperparameters: Hyperparameters {
                    n_samples: 400,
                    n_estimators: 25,
                    ..Hyperparameters::default()
                },
            })
            .artifacts_dir(&dir)
            .build()
            .unwrap();
        pipeline.train().unwrap();
        dir
    })
}

fn copy_artifacts(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("polycomp_it_{tag}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    for file in [MODEL_FILE, PREPROCESSOR_FILE, REPORT_FILE] {
        std::fs::copy(shared_artifacts().join(file), dir.join(file)).unwrap();
    }
    dir
}

#[test]
fn test_fifty_one_percent_rejected_before_model() {
    let predictor = Predictor::load(shared_artifacts()).unwrap();
    let request = PredictionRequest::new("Epoxy", "Hydroxyapatite").filler_percent(51.0);
    let err = predictor.predict_request(&request).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(err.is_recoverable());

    // The predictor keeps serving after a rejected request
    let ok = PredictionRequest::new("Epoxy", "Hydroxyapatite").filler_percent(50.0);
    assert!(predictor.predict_request(&ok).is_ok());
}

#[test]
fn test_epoxy_hydroxyapatite_prediction_plausible() {
    let predictor = Predictor::load(shared_artifacts()).unwrap();
    let spec = CompositeSpec::new(
        PolymerMatrix::Epoxy,
        FillerType::Hydroxyapatite,
        0.20,
        120.0,
        2.0,
        1.0,
    )
    .unwrap();
    let prediction = predictor.predict(&spec).unwrap();
    let tensile = prediction.properties.get(Property::TensileStrength);
    assert!((20.0..=100.0).contains(&tensile), "tensile = {tensile}");
    assert!(prediction.properties.get(Property::ElectricalResistivity) > 1.0);
    assert_eq!(prediction.spec, spec);
}

#[test]
fn test_every_category_pair_predicts() {
    let predictor = Predictor::load(shared_artifacts()).unwrap();
    for matrix in PolymerMatrix::ALL {
        for filler in FillerType::ALL {
            let spec = CompositeSpec::builder(matrix, filler).build().unwrap();
            let prediction = predictor.predict(&spec).unwrap();
            assert!(prediction.properties.is_finite(), "{matrix} + {filler}");
        }
    }
}

#[test]
fn test_corrupted_model_is_fatal() {
    let dir = copy_artifacts("corrupt");
    let model_path = dir.join(MODEL_FILE);
    let mut bytes = std::fs::read(&model_path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    std::fs::write(&model_path, &bytes).unwrap();

    let err = Predictor::load(&dir).unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { .. }), "{err}");
    assert!(!err.is_recoverable());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_swapped_artifacts_rejected() {
    let dir = copy_artifacts("swapped");
    std::fs::copy(dir.join(PREPROCESSOR_FILE), dir.join(MODEL_FILE)).unwrap();
    let err = Predictor::load(&dir).unwrap_err();
    assert!(matches!(err, Error::Artifact(_)), "{err}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_truncated_preprocessor_rejected() {
    let dir = copy_artifacts("truncated");
    let path = dir.join(PREPROCESSOR_FILE);
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 3]).unwrap();
    assert!(Predictor::load(&dir).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_report_is_not_fatal() {
    let dir = copy_artifacts("noreport");
    std::fs::remove_file(dir.join(REPORT_FILE)).unwrap();
    let predictor = Predictor::load(&dir).unwrap();
    assert!(predictor.report().is_none());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_training_report_on_disk() {
    let report = TrainingReport::load(shared_artifacts().join(REPORT_FILE)).unwrap();
    assert_eq!(report.run.status(), RunStatus::Success);
    assert_eq!(report.n_generated, 400);
    assert_eq!(report.n_test, 80);
    assert_eq!(report.metrics.len(), Property::COUNT);
    assert!(report.metrics_for("Electrical_Resistivity_Ohm_m").unwrap().log_scale);
    assert!(report.mean_r2().unwrap() > 0.0);
}

#[test]
fn test_session_csv_matches_prediction() {
    let predictor = Predictor::load(shared_artifacts()).unwrap();
    let mut session = PredictorSession::new(predictor);
    let prediction = *session.submit(&PredictionRequest::default()).unwrap();
    let csv = session.last_csv().unwrap();
    let tensile = Property::TensileStrength
        .format_value(prediction.properties.get(Property::TensileStrength));
    assert!(csv.contains(&format!("Tensile Strength,{tensile},MPa")));
}

#[test]
fn test_artifact_reload_matches_in_memory_model() {
    let (artifact, preprocessor) = artifact::load_trained(shared_artifacts()).unwrap();
    let predictor = Predictor::from_parts(artifact.clone(), preprocessor.clone(), None);
    let spec = CompositeSpec::builder(PolymerMatrix::Phenolic, FillerType::Lignin)
        .filler_fraction(0.3)
        .build()
        .unwrap();
    let row = preprocessor.transform(&spec).unwrap();
    assert_eq!(
        predictor.predict(&spec).unwrap().properties,
        artifact.model.predict_row(&row)
    );
}

#[test]
fn test_persisted_encoders_roundtrip_every_label() {
    let (_, preprocessor) = artifact::load_trained(shared_artifacts()).unwrap();
    let matrices = preprocessor.matrix_encoder();
    let fillers = preprocessor.filler_encoder();
    for matrix in PolymerMatrix::ALL {
        for filler in FillerType::ALL {
            let spec = CompositeSpec::builder(matrix, filler).build().unwrap();
            let row = preprocessor.encode(&spec).unwrap();

            let matrix_code = matrices.transform(spec.matrix().label()).unwrap();
            let filler_code = fillers.transform(spec.filler().label()).unwrap();
            assert!((row[0] - f64::from(matrix_code)).abs() < 1e-12);
            assert!((row[1] - f64::from(filler_code)).abs() < 1e-12);

            assert_eq!(matrices.inverse_transform(matrix_code).unwrap(), matrix.label());
            assert_eq!(fillers.inverse_transform(filler_code).unwrap(), filler.label());
        }
    }
}

#[test]
fn test_parquet_dataset_roundtrip() {
    let dataset = Dataset::generate(120, GeneratorConfig::default()).unwrap();
    let path = std::env::temp_dir().join(format!("polycomp_it_{}.parquet", std::process::id()));
    DatasetStore::from_dataset(&dataset)
        .unwrap()
        .save_parquet(&path)
        .unwrap();
    let loaded = DatasetStore::load_parquet(&path).unwrap().to_dataset().unwrap();
    assert_eq!(loaded.len(), dataset.len());
    for (a, b) in dataset.iter().zip(loaded.iter()) {
        assert_eq!(a.spec.matrix(), b.spec.matrix());
        assert_eq!(a.spec.filler(), b.spec.filler());
        assert!((a.spec.filler_fraction() - b.spec.filler_fraction()).abs() < 1e-9);
        assert_eq!(a.properties, b.properties);
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_config_directory_roundtrip_and_malformed() {
    let dir = std::env::temp_dir().join(format!("polycomp_it_config_{}", std::process::id()));
    let config = AppConfig {
        categories: CategoryConfig::default(),
        hyperparameters: Hyperparameters {
            n_estimators: 12,
            ..Hyperparameters::default()
        },
    };
    config.save(&dir).unwrap();
    let pipeline = Pipeline::builder().config_dir(&dir).build().unwrap();
    assert_eq!(pipeline.config(), &config);

    std::fs::write(dir.join(CATEGORIES_FILE), "{ not json").unwrap();
    let err = Pipeline::builder().config_dir(&dir).build().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    let _ = std::fs::remove_dir_all(&dir);
}
