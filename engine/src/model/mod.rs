// Next-bar close regression: feature scaling, tree ensemble and the predictor that owns them.
pub mod decision_tree;
pub mod predictor;
pub mod random_forest;
pub mod scaler;

pub use decision_tree::{DecisionTree, TreeConfig};
pub use predictor::{FitSummary, PricePredictor};
pub use random_forest::{ForestConfig, RandomForest};
pub use scaler::StandardScaler;
