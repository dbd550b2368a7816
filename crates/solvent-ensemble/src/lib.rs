pub mod decision_tree;
pub mod gradient_boosting;
pub mod random_forest;

pub use decision_tree::{DecisionTreeClassifier, DecisionTreeRegressor};
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingRegressor};
pub use random_forest::{RandomForestClassifier, RandomForestRegressor};
