//! Feature standardization

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Centers each feature on its training mean and divides by its population
/// standard deviation. Zero-variance features keep a scale of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit to row-major training data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] for empty input, ragged rows or
    /// non-finite values.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| Error::Training("cannot fit scaler on zero rows".to_string()))?;
        let n_features = first.len();
        let mut sum = vec![0.0; n_features];
        for row in rows {
            if row.len() != n_features {
                return Err(Error::Training(format!(
                    "ragged feature rows: expected {n_features} columns, got {}",
                    row.len()
                )));
            }
            for (acc, value) in sum.iter_mut().zip(row) {
                if !value.is_finite() {
                    return Err(Error::Training("non-finite feature value".to_string()));
                }
                *acc += value;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let n = rows.len() as f64;
        let mean: Vec<f64> = sum.iter().map(|s| s / n).collect();
        let mut variance = vec![0.0; n_features];
        for row in rows {
            for ((var, value), mu) in variance.iter_mut().zip(row).zip(&mean) {
                *var += (value - mu).powi(2);
            }
        }
        let scale = variance
            .iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();
        Ok(Self { mean, scale })
    }

    /// Number of features the scaler was fitted on
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Per-feature means
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-feature scales
    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Standardize one row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prediction`] if the row length differs from the
    /// fitted feature count.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(Error::Prediction(format!(
                "expected {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mu, sigma))| (x - mu) / sigma)
            .collect())
    }

    /// Standardize every row.
    ///
    /// # Errors
    ///
    /// See [`transform_row`](Self::transform_row).
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardized_columns() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform(&rows).unwrap();
        for column in 0..2 {
            let values: Vec<f64> = scaled.iter().map(|r| r[column]).collect();
            let mean = values.iter().sum::<f64>() / 3.0;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_feature_keeps_unit_scale() {
        let rows = vec![vec![5.0], vec![5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert!((scaler.scale()[0] - 1.0).abs() < f64::EPSILON);
        assert_eq!(scaler.transform_row(&[7.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(StandardScaler::fit(&[]).is_err());
        assert!(StandardScaler::fit(&[vec![1.0], vec![1.0, 2.0]]).is_err());
        assert!(StandardScaler::fit(&[vec![f64::NAN]]).is_err());
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(scaler.transform_row(&[1.0]).is_err());
    }
}
