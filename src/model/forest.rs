//! Random forest regressor
//!
//! Bagged CART trees: each tree sees a bootstrap resample of the training
//! rows and its own feature-subsampling stream. Tree `i` is seeded with
//! `mix(seed, i)`, so the fitted forest is identical whether trees are grown
//! sequentially or in parallel with rayon.

use super::tree::{validate_training_data, MaxFeatures, RegressionTree, TreeParams};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples to split a node
    pub min_samples_split: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Features examined per split
    pub max_features: MaxFeatures,
    /// Resample rows with replacement for each tree
    pub bootstrap: bool,
    /// Base seed
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: MaxFeatures::All,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    /// Per-tree growth limits
    #[must_use]
    pub const fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        }
    }

    /// Reject settings no forest can be grown with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::Training("n_estimators must be at least 1".to_string()));
        }
        if self.max_depth == 0 {
            return Err(Error::Training("max_depth must be at least 1".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(Error::Training(format!(
                "min_samples_split must be at least 2, got {}",
                self.min_samples_split
            )));
        }
        if self.min_samples_leaf == 0 {
            return Err(Error::Training("min_samples_leaf must be at least 1".to_string()));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(Error::Training(format!(
                    "max_features fraction must be within (0, 1], got {f}"
                )));
            }
        }
        Ok(())
    }
}

/// SplitMix64 finalizer; decorrelates per-tree seeds.
#[must_use]
pub const fn mix_seed(seed: u64, stream: u64) -> u64 {
    let mut z = seed.wrapping_add(stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Fit a forest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] for invalid parameters or training data.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Result<Self> {
        params.validate()?;
        let n_features = validate_training_data(x, y)?;
        let n_rows = x.len();
        let tree_params = params.tree_params();

        let fit_tree = |i: usize| -> Result<RegressionTree> {
            let tree_seed = mix_seed(params.seed, i as u64);
            let mut rng = StdRng::seed_from_u64(tree_seed);
            let indices: Vec<usize> = if params.bootstrap {
                (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
            } else {
                (0..n_rows).collect()
            };
            RegressionTree::fit_indices(x, y, &indices, tree_params, rng.gen())
        };

        #[cfg(feature = "rayon")]
        let trees = (0..params.n_estimators)
            .into_par_iter()
            .map(fit_tree)
            .collect::<Result<Vec<_>>>()?;
        #[cfg(not(feature = "rayon"))]
        let trees = (0..params.n_estimators)
            .map(fit_tree)
            .collect::<Result<Vec<_>>>()?;

        let importances = mean_importances(&trees, n_features);
        debug!(
            n_trees = trees.len(),
            n_rows,
            mean_leaves = trees.iter().map(RegressionTree::n_leaves).sum::<usize>() / trees.len(),
            "forest fitted"
        );
        Ok(Self {
            trees,
            n_features,
            importances,
        })
    }

    /// Mean of the tree predictions for one row
    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        #[allow(clippy::cast_precision_loss)]
        let n = self.trees.len() as f64;
        total / n
    }

    /// Predictions for many rows
    #[must_use]
    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Mean tree importance per feature, normalized to sum to 1
    /// (all zero if no tree ever split)
    #[must_use]
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Fitted trees
    #[must_use]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Number of input features
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }
}

fn mean_importances(trees: &[RegressionTree], n_features: usize) -> Vec<f64> {
    let mut sum = vec![0.0; n_features];
    for tree in trees {
        for (acc, value) in sum.iter_mut().zip(tree.feature_importances()) {
            *acc += value;
        }
    }
    let total: f64 = sum.iter().sum();
    if total > 0.0 {
        sum.iter_mut().for_each(|v| *v /= total);
    }
    sum
}
