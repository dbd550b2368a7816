use solvent_core::{Estimator, Matrix, SolverError, SolverResult};
use tracing::debug;

/// Binary logistic regression trained with batch gradient descent.
///
/// Labels are 0/1. An optional L2 penalty keeps weights bounded on
/// separable data.
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub l2_penalty: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub coefficients: Option<Vec<f64>>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, max_iter: usize) -> Self {
        LogisticRegression {
            learning_rate,
            l2_penalty: 0.0,
            max_iter,
            tol: 1e-6,
            coefficients: None,
            intercept: 0.0,
        }
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Class-1 probability per row.
    pub fn predict_proba(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        let w = self
            .coefficients
            .as_ref()
            .ok_or(SolverError::NotFitted("LogisticRegression"))?;
        let scores = x.matvec(w)?;
        Ok(scores
            .iter()
            .map(|&z| Self::sigmoid(z + self.intercept))
            .collect())
    }
}

impl Estimator for LogisticRegression {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        let n = x.rows();
        let p = x.cols();
        if n == 0 || p == 0 {
            return Err(SolverError::EmptyInput);
        }
        if y.len() != n {
            return Err(SolverError::DimensionMismatch(format!(
                "{} labels for {} rows",
                y.len(),
                n
            )));
        }
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(SolverError::InvalidParameter(
                "labels must be 0 or 1".to_string(),
            ));
        }
        if self.learning_rate <= 0.0 {
            return Err(SolverError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }

        let n_f = n as f64;
        let mut w = vec![0.0; p];
        let mut b = 0.0;

        for iter in 0..self.max_iter {
            let mut dw = vec![0.0; p];
            let mut db = 0.0;

            for i in 0..n {
                let row = x.row(i);
                let z = b + row.iter().zip(&w).map(|(a, c)| a * c).sum::<f64>();
                let err = Self::sigmoid(z) - y[i];
                for (g, a) in dw.iter_mut().zip(row) {
                    *g += err * a;
                }
                db += err;
            }

            let mut max_grad: f64 = 0.0;
            for j in 0..p {
                let grad = dw[j] / n_f + self.l2_penalty * w[j];
                w[j] -= self.learning_rate * grad;
                max_grad = max_grad.max(grad.abs());
            }
            b -= self.learning_rate * (db / n_f);

            if iter % 100 == 0 {
                debug!(iter, max_grad, "logistic gradient step");
            }
            if max_grad < self.tol {
                break;
            }
        }

        self.coefficients = Some(w);
        self.intercept = b;
        Ok(())
    }

    /// Thresholded labels at probability 0.5.
    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|&prob| if prob >= 0.5 { 1.0 } else { 0.0 })
            .collect())
    }
}
