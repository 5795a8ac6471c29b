//! One forest per property

use super::forest::{mix_seed, ForestParams, RandomForest};
use crate::composite::{Property, PropertyVector};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TargetModel {
    property: Property,
    log_scaled: bool,
    forest: RandomForest,
}

/// Multi-output regressor: an independent [`RandomForest`] for each of the
/// nine properties.
///
/// Log-scaled targets (resistivity) are fitted on `log10` and exponentiated
/// on prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiOutputForest {
    targets: Vec<TargetModel>,
    params: ForestParams,
}

impl MultiOutputForest {
    /// Fit all nine targets on the same (already scaled) features.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] if row counts differ, a log-scaled target
    /// is not positive, or any forest fails to fit.
    pub fn fit(x: &[Vec<f64>], targets: &[PropertyVector], params: &ForestParams) -> Result<Self> {
        if x.len() != targets.len() {
            return Err(Error::Training(format!(
                "{} feature rows but {} target vectors",
                x.len(),
                targets.len()
            )));
        }

        let mut models = Vec::with_capacity(Property::COUNT);
        for property in Property::ALL {
            let log_scaled = property.log_scaled();
            let y = targets
                .iter()
                .map(|t| {
                    let value = t.get(property);
                    if !log_scaled {
                        Ok(value)
                    } else if value > 0.0 {
                        Ok(value.log10())
                    } else {
                        Err(Error::Training(format!(
                            "{} must be positive to fit on log scale, got {value}",
                            property.column()
                        )))
                    }
                })
                .collect::<Result<Vec<f64>>>()?;

            let target_params = ForestParams {
                seed: mix_seed(params.seed, property.index() as u64),
                ..*params
            };
            let forest = RandomForest::fit(x, &y, &target_params)?;
            debug!(target = property.column(), log_scaled, "target fitted");
            models.push(TargetModel {
                property,
                log_scaled,
                forest,
            });
        }

        Ok(Self {
            targets: models,
            params: *params,
        })
    }

    /// Predict all nine properties for one scaled feature row
    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> PropertyVector {
        let mut values = [0.0; Property::COUNT];
        for model in &self.targets {
            let raw = model.forest.predict_row(row);
            values[model.property.index()] = if model.log_scaled {
                10f64.powf(raw)
            } else {
                raw
            };
        }
        PropertyVector::from_array(values)
    }

    /// Predict many rows
    #[must_use]
    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<PropertyVector> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Feature importances of the forest for `property`
    #[must_use]
    pub fn importances(&self, property: Property) -> &[f64] {
        self.targets
            .iter()
            .find(|m| m.property == property)
            .map(|m| m.forest.feature_importances())
            .unwrap_or(&[])
    }

    /// Importances averaged over all targets (sums to 1 when any forest split)
    #[must_use]
    pub fn mean_importances(&self) -> Vec<f64> {
        let n_features = self.n_features();
        let mut sum = vec![0.0; n_features];
        for model in &self.targets {
            for (acc, v) in sum.iter_mut().zip(model.forest.feature_importances()) {
                *acc += v;
            }
        }
        let total: f64 = sum.iter().sum();
        if total > 0.0 {
            sum.iter_mut().for_each(|v| *v /= total);
        }
        sum
    }

    /// Number of input features
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.targets.first().map_or(0, |m| m.forest.n_features())
    }

    /// Hyperparameters the forests were fitted with
    #[must_use]
    pub const fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Total number of trees across all targets
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.targets.iter().map(|m| m.forest.trees().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> (Vec<Vec<f64>>, Vec<PropertyVector>) {
        let x: Vec<Vec<f64>> = (0..60).map(|i| vec![f64::from(i), f64::from(i % 3)]).collect();
        let targets = x
            .iter()
            .map(|r| {
                let t = r[0];
                PropertyVector::from_array([
                    t,
                    2.0 * t,
                    5.0,
                    100.0 + t,
                    0.2,
                    60.0 - t / 2.0,
                    10f64.powf(8.0 + t / 10.0),
                    3.5,
                    0.02,
                ])
            })
            .collect();
        (x, targets)
    }

    fn params() -> ForestParams {
        ForestParams {
            n_estimators: 10,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_predicts_all_targets() {
        let (x, targets) = toy();
        let model = MultiOutputForest::fit(&x, &targets, &params()).unwrap();
        let pred = model.predict_row(&x[30]);
        assert!(pred.is_finite());
        assert!((pred.tensile_strength_mpa - 30.0).abs() < 3.0);
        assert!((pred.impact_strength_j_m - 5.0).abs() < 1e-9);
        assert_eq!(model.n_trees(), 10 * Property::COUNT);
    }

    #[test]
    fn test_resistivity_back_transformed() {
        let (x, targets) = toy();
        let model = MultiOutputForest::fit(&x, &targets, &params()).unwrap();
        let rho = model.predict_row(&x[30]).electrical_resistivity_ohm_m;
        let log = rho.log10();
        assert!((log - 11.0).abs() < 0.5, "log10 rho = {log}");
    }

    #[test]
    fn test_nonpositive_log_target_rejected() {
        let (x, mut targets) = toy();
        targets[0].electrical_resistivity_ohm_m = 0.0;
        assert!(MultiOutputForest::fit(&x, &targets, &params()).is_err());
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        let (x, targets) = toy();
        assert!(MultiOutputForest::fit(&x[..10], &targets, &params()).is_err());
    }

    #[test]
    fn test_importances_per_target() {
        let (x, targets) = toy();
        let model = MultiOutputForest::fit(&x, &targets, &params()).unwrap();
        let tensile = model.importances(Property::TensileStrength);
        assert_eq!(tensile.len(), 2);
        assert!((tensile.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // constant target never splits
        assert!(model.importances(Property::ImpactStrength).iter().all(|v| *v == 0.0));
        let mean = model.mean_importances();
        assert!((mean.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
