pub mod error;
pub mod estimator;
pub mod linalg;
pub mod matrix;

pub use error::{SolverError, SolverResult};
pub use estimator::{Estimator, Transformer};
pub use matrix::Matrix;
