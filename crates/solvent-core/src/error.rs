use thiserror::Error;

/// Error type shared by every solver crate in the workspace.
#[derive(Debug, Error, Clone)]
pub enum SolverError {
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("{0} has not been fitted")]
    NotFitted(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("singular matrix: cannot factorize")]
    SingularMatrix,

    #[error("empty input")]
    EmptyInput,
}

pub type SolverResult<T> = Result<T, SolverError>;
