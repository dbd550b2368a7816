//! Flat namespace over the solver crates.
//!
//! Every solver lives in its own sibling crate; this barrel re-exports the
//! fourteen public model types so downstream code can write one shallow
//! import path instead of reaching into each solver crate. Each name below
//! is the same type as in its source crate, and a missing sibling or a
//! renamed type fails resolution at compile time.

/// Proximal-operator graph solver (ADMM).
pub use solvent_pogs::Pogs;

/// Native coordinate-descent elastic net.
pub use solvent_linear::ElasticNetH2O;

/// Elastic net front-end with library defaults.
pub use solvent_linear::ElasticNet;

/// Binary logistic regression.
pub use solvent_linear::LogisticRegression;

/// Ordinary least squares.
pub use solvent_linear::LinearRegression;

/// L1-regularized regression.
pub use solvent_linear::Lasso;

/// L2-regularized regression.
pub use solvent_linear::Ridge;

/// Lloyd's algorithm with k-means++ seeding.
pub use solvent_cluster::KMeans;

/// Bagged regression trees.
pub use solvent_ensemble::RandomForestRegressor;

/// Bagged classification trees.
pub use solvent_ensemble::RandomForestClassifier;

/// Log-odds boosted trees.
pub use solvent_ensemble::GradientBoostingClassifier;

/// Residual-boosted trees.
pub use solvent_ensemble::GradientBoostingRegressor;

/// Native truncated SVD solver.
pub use solvent_decomposition::TruncatedSVDH2O;

/// Truncated SVD front-end with library defaults.
pub use solvent_decomposition::TruncatedSVD;
