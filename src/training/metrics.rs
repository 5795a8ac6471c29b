//! Regression metrics

use crate::composite::Property;
use serde::{Deserialize, Serialize};

/// Coefficient of determination `1 − SS_res / SS_tot`.
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
/// Returns `NaN` for empty or mismatched inputs.
#[must_use]
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Mean absolute error (`NaN` for empty or mismatched inputs)
#[must_use]
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = y_true.len() as f64;
    y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum::<f64>() / n
}

/// Root mean squared error (`NaN` for empty or mismatched inputs)
#[must_use]
pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = y_true.len() as f64;
    (y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n)
        .sqrt()
}

/// Held-out scores of one target.
///
/// Log-scaled targets are scored on `log10` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMetrics {
    /// Target column name
    pub target: String,
    /// Whether scores are on the log10 scale
    pub log_scale: bool,
    /// R²
    pub r2: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
}

impl TargetMetrics {
    /// Score predictions of `property`.
    #[must_use]
    pub fn compute(property: Property, y_true: &[f64], y_pred: &[f64]) -> Self {
        let log_scale = property.log_scaled();
        let (t, p): (Vec<f64>, Vec<f64>) = if log_scale {
            (
                y_true.iter().map(|v| v.log10()).collect(),
                y_pred.iter().map(|v| v.log10()).collect(),
            )
        } else {
            (y_true.to_vec(), y_pred.to_vec())
        };
        Self {
            target: property.column().to_string(),
            log_scale,
            r2: r2_score(&t, &p),
            mae: mean_absolute_error(&t, &p),
            rmse: root_mean_squared_error(&t, &p),
        }
    }
}
