//! JSON training report

use super::metrics::TargetMetrics;
use super::run::TrainingRun;
use crate::config::Hyperparameters;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the report inside an artifact directory
pub const REPORT_FILE: &str = "training_report.json";

/// Summary of one training run, written next to the model artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Run lifecycle
    pub run: TrainingRun,
    /// Settings used
    pub hyperparameters: Hyperparameters,
    /// Samples generated (before category filtering)
    pub n_generated: usize,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows held out for scoring
    pub n_test: usize,
    /// Model input names
    pub feature_names: Vec<String>,
    /// Held-out metrics per target
    pub metrics: Vec<TargetMetrics>,
    /// Importance per feature, averaged over targets
    pub feature_importances: BTreeMap<String, f64>,
}

impl TrainingReport {
    /// Mean held-out R² across targets, ignoring NaN scores
    #[must_use]
    pub fn mean_r2(&self) -> Option<f64> {
        let scores: Vec<f64> = self
            .metrics
            .iter()
            .map(|m| m.r2)
            .filter(|v| v.is_finite())
            .collect();
        if scores.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = scores.len() as f64;
        Some(scores.iter().sum::<f64>() / n)
    }

    /// Metrics of one target by column name
    #[must_use]
    pub fn metrics_for(&self, target: &str) -> Option<&TargetMetrics> {
        self.metrics.iter().find(|m| m.target == target)
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a report written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or not a report.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> TrainingReport {
        let mut run = TrainingRun::new("run-test");
        run.start();
        run.complete();
        TrainingReport {
            run,
            hyperparameters: Hyperparameters::default(),
            n_generated: 100,
            n_train: 80,
            n_test: 20,
            feature_names: vec!["Pressure_MPa".to_string()],
            metrics: vec![
                TargetMetrics {
                    target: "A".to_string(),
                    log_scale: false,
                    r2: 0.8,
                    mae: 1.0,
                    rmse: 1.5,
                },
                TargetMetrics {
                    target: "B".to_string(),
                    log_scale: false,
                    r2: 0.6,
                    mae: 2.0,
                    rmse: 2.5,
                },
            ],
            feature_importances: [("Pressure_MPa".to_string(), 1.0)].into(),
        }
    }

    #[test]
    fn test_mean_r2() {
        assert!((report().mean_r2().unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_lookup() {
        assert!((report().metrics_for("B").unwrap().mae - 2.0).abs() < f64::EPSILON);
        assert!(report().metrics_for("C").is_none());
    }

    #[test]
    fn test_json_contains_fields() {
        let json = report().to_json().unwrap();
        assert!(json.contains("\"n_estimators\": 100"));
        assert!(json.contains("\"status\": \"Success\""));
    }

    #[test]
    fn test_save_load() {
        let path = std::env::temp_dir().join(format!("polycomp_report_{}.json", std::process::id()));
        let original = report();
        original.save(&path).unwrap();
        assert_eq!(TrainingReport::load(&path).unwrap(), original);
        let _ = std::fs::remove_file(&path);
    }
}
