//! CART regression tree
//!
//! Greedy binary splitting on squared error. For each candidate feature the
//! node's samples are sorted once and every boundary between distinct values
//! is scored with prefix sums:
//!
//! ```text
//! gain = S_l²/n_l + S_r²/n_r − S²/n      (S = Σy over the side)
//! ```
//!
//! which equals the drop in summed squared error. Thresholds sit at the
//! midpoint between neighbouring values; `x <= threshold` goes left.
//!
//! Nodes live in a flat `Vec`, root at index 0.

use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Number of features examined at each split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Every feature
    All,
    /// `⌈√n⌉` features
    Sqrt,
    /// `⌈log2 n⌉` features
    Log2,
    /// A fraction of the features, at least one
    Fraction(f64),
}

impl MaxFeatures {
    /// Concrete feature count for `n_features` inputs, within `1..=n_features`
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            Self::All => n_features,
            Self::Sqrt => n.sqrt().ceil() as usize,
            Self::Log2 => n.log2().ceil() as usize,
            Self::Fraction(f) => (f * n).ceil() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Growth limits of a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth (root is depth 0)
    pub max_depth: usize,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
    /// Features examined per split
    pub max_features: MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 15,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: MaxFeatures::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    // number of samples left of the split in sorted order
    n_left: usize,
}

/// Fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_features: usize,
    importances: Vec<f64>,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: TreeParams,
    n_candidates: usize,
    rng: StdRng,
    nodes: Vec<Node>,
    gains: Vec<f64>,
}

impl RegressionTree {
    /// Fit on every row of `x`.
    ///
    /// # Errors
    ///
    /// See [`fit_indices`](Self::fit_indices).
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: TreeParams, seed: u64) -> Result<Self> {
        let indices: Vec<usize> = (0..x.len()).collect();
        Self::fit_indices(x, y, &indices, params, seed)
    }

    /// Fit on the rows named by `indices`; repeated indices count as
    /// repeated samples (bootstrap).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Training`] for empty or mismatched inputs, ragged
    /// rows, non-finite values or out-of-range indices.
    pub fn fit_indices(
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        params: TreeParams,
        seed: u64,
    ) -> Result<Self> {
        let n_features = validate_training_data(x, y)?;
        if indices.is_empty() {
            return Err(Error::Training("no samples to fit".to_string()));
        }
        if indices.iter().any(|&i| i >= x.len()) {
            return Err(Error::Training("sample index out of range".to_string()));
        }

        let mut builder = Builder {
            x,
            y,
            params,
            n_candidates: params.max_features.resolve(n_features),
            rng: StdRng::seed_from_u64(seed),
            nodes: Vec::new(),
            gains: vec![0.0; n_features],
        };
        let mut indices = indices.to_vec();
        builder.grow(&mut indices, 0);

        let total: f64 = builder.gains.iter().sum();
        let importances = if total > 0.0 {
            builder.gains.iter().map(|g| g / total).collect()
        } else {
            builder.gains
        };

        Ok(Self {
            nodes: builder.nodes,
            n_features,
            importances,
        })
    }

    /// Prediction for one feature row.
    ///
    /// Missing trailing features read as 0.
    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { value, .. }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if x <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    /// Normalized impurity-decrease importance per feature (all zero when
    /// the tree never split)
    #[must_use]
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Number of input features
    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Total node count
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Length of the longest root-to-leaf path
    #[must_use]
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Training samples that reached each leaf, in node order
    #[must_use]
    pub fn leaf_sizes(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Leaf { n_samples, .. } => Some(*n_samples),
                Node::Split { .. } => None,
            })
            .collect()
    }
}

impl Builder<'_> {
    fn grow(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let n = indices.len();
        let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, s2), &i| {
            let v = self.y[i];
            (s + v, v.mul_add(v, s2))
        });
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / n as f64;
        #[allow(clippy::cast_precision_loss)]
        let variance = sum.mul_add(-mean, sum_sq).max(0.0) / n as f64;

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: mean,
            n_samples: n,
        });

        let splittable = depth < self.params.max_depth
            && n >= self.params.min_samples_split
            && n >= 2 * self.params.min_samples_leaf.max(1)
            && variance > 1e-12;
        if !splittable {
            return node_id;
        }

        let Some(best) = self.best_split(indices, sum) else {
            return node_id;
        };

        let feature = best.feature;
        let x = self.x;
        indices.sort_unstable_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
        let (left_idx, right_idx) = indices.split_at_mut(best.n_left);

        self.gains[feature] += best.gain;
        let left = self.grow(left_idx, depth + 1);
        let right = self.grow(right_idx, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_id
    }

    fn best_split(&mut self, indices: &[usize], total_sum: f64) -> Option<SplitCandidate> {
        let n_features = self.gains.len();
        let candidates: Vec<usize> = if self.n_candidates >= n_features {
            (0..n_features).collect()
        } else {
            index::sample(&mut self.rng, n_features, self.n_candidates).into_vec()
        };

        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        #[allow(clippy::cast_precision_loss)]
        let parent_score = total_sum * total_sum / n as f64;

        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);
        for feature in candidates {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (self.x[i][feature], self.y[i])));
            pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for split in 1..n {
                left_sum += pairs[split - 1].1;
                if split < min_leaf || n - split < min_leaf {
                    continue;
                }
                let (lo, hi) = (pairs[split - 1].0, pairs[split].0);
                if lo >= hi {
                    continue;
                }
                let right_sum = total_sum - left_sum;
                #[allow(clippy::cast_precision_loss)]
                let gain = left_sum * left_sum / split as f64
                    + right_sum * right_sum / (n - split) as f64
                    - parent_score;
                if gain > best.map_or(1e-12, |b| b.gain) {
                    let mid = 0.5 * (lo + hi);
                    best = Some(SplitCandidate {
                        feature,
                        threshold: if mid < hi { mid } else { lo },
                        gain,
                        n_left: split,
                    });
                }
            }
        }
        best
    }
}

/// Check shapes and finiteness; returns the feature count.
pub(crate) fn validate_training_data(x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    let first = x
        .first()
        .ok_or_else(|| Error::Training("no training rows".to_string()))?;
    if x.len() != y.len() {
        return Err(Error::Training(format!(
            "{} feature rows but {} targets",
            x.len(),
            y.len()
        )));
    }
    let n_features = first.len();
    if n_features == 0 {
        return Err(Error::Training("feature rows are empty".to_string()));
    }
    if x.iter().any(|row| row.len() != n_features) {
        return Err(Error::Training("ragged feature rows".to_string()));
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(Error::Training("non-finite training value".to_string()));
    }
    Ok(n_features)
}
