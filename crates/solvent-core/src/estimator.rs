use crate::error::SolverResult;
use crate::matrix::Matrix;

/// Supervised model: learn from labelled rows, then score new rows.
pub trait Estimator {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()>;
    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>>;
}

/// Unsupervised model: learn a representation, then map rows into it.
pub trait Transformer {
    fn fit(&mut self, x: &Matrix) -> SolverResult<()>;
    fn transform(&self, x: &Matrix) -> SolverResult<Matrix>;

    fn fit_transform(&mut self, x: &Matrix) -> SolverResult<Matrix> {
        self.fit(x)?;
        self.transform(x)
    }
}
