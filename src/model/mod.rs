//! Regression pipeline
//!
//! ```text
//! CompositeSpec ─> Preprocessor ──────────────────> MultiOutputForest ─> PropertyVector
//!                  (LabelEncoder ×2, StandardScaler)  (RandomForest ×9)
//! ```
//!
//! References:
//! - Breiman et al. (1984): Classification and Regression Trees
//! - Breiman (2001): Random Forests

pub mod encoder;
pub mod features;
pub mod forest;
pub mod multi_output;
pub mod scaler;
pub mod tree;

pub use encoder::LabelEncoder;
pub use features::{Preprocessor, FEATURE_NAMES, N_FEATURES};
pub use forest::{ForestParams, RandomForest};
pub use multi_output::MultiOutputForest;
pub use scaler::StandardScaler;
pub use tree::{MaxFeatures, RegressionTree, TreeParams};
