pub mod elastic_net;
pub mod logistic;
pub mod regression;

pub use elastic_net::{ElasticNet, ElasticNetH2O};
pub use logistic::LogisticRegression;
pub use regression::{Lasso, LinearRegression, Ridge};
