use solvent_core::{Estimator, Matrix, SolverError, SolverResult};
use tracing::{debug, warn};

/// Native elastic-net solver: cyclic coordinate descent on
/// `(1/2n)‖y − Xw‖² + λ(α‖w‖₁ + (1−α)/2‖w‖²)`.
///
/// A residual vector is maintained across coordinate updates, so each sweep
/// costs O(n·p) instead of recomputing predictions per coordinate.
pub struct ElasticNetH2O {
    /// Regularization strength λ.
    pub lambda: f64,
    /// Mix between L1 (1.0) and L2 (0.0) penalties.
    pub l1_ratio: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub fit_intercept: bool,
    pub coefficients: Option<Vec<f64>>,
    pub intercept: f64,
    /// Sweeps consumed by the last fit.
    pub iterations: usize,
}

impl ElasticNetH2O {
    pub fn new(lambda: f64, l1_ratio: f64) -> Self {
        ElasticNetH2O {
            lambda,
            l1_ratio,
            max_iter: 1000,
            tol: 1e-6,
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
            iterations: 0,
        }
    }

    fn check_params(&self) -> SolverResult<()> {
        if self.lambda < 0.0 {
            return Err(SolverError::InvalidParameter(format!(
                "lambda must be non-negative, got {}",
                self.lambda
            )));
        }
        if !(0.0..=1.0).contains(&self.l1_ratio) {
            return Err(SolverError::InvalidParameter(format!(
                "l1_ratio must lie in [0, 1], got {}",
                self.l1_ratio
            )));
        }
        Ok(())
    }

    fn soft_threshold(v: f64, kappa: f64) -> f64 {
        if v > kappa {
            v - kappa
        } else if v < -kappa {
            v + kappa
        } else {
            0.0
        }
    }
}

impl Estimator for ElasticNetH2O {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        self.check_params()?;
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

        let n_f = n as f64;
        let l1 = self.lambda * self.l1_ratio;
        let l2 = self.lambda * (1.0 - self.l1_ratio);

        // Per-column second moments, fixed for the whole fit.
        let col_sq: Vec<f64> = (0..p)
            .map(|j| x.col(j).iter().map(|v| v * v).sum::<f64>() / n_f)
            .collect();

        let mut w = vec![0.0; p];
        let mut b = 0.0;
        // residual[i] = y[i] - b - x[i]·w
        let mut residual: Vec<f64> = y.to_vec();
        self.iterations = self.max_iter;

        for sweep in 0..self.max_iter {
            let mut max_change: f64 = 0.0;

            if self.fit_intercept {
                let shift = residual.iter().sum::<f64>() / n_f;
                b += shift;
                for r in residual.iter_mut() {
                    *r -= shift;
                }
                max_change = max_change.max(shift.abs());
            }

            for j in 0..p {
                if col_sq[j] == 0.0 {
                    continue;
                }
                // Partial residual correlation with the residual restored for w[j]
                let mut rho = 0.0;
                for i in 0..n {
                    rho += x[(i, j)] * residual[i];
                }
                rho = rho / n_f + col_sq[j] * w[j];

                let new_w = Self::soft_threshold(rho, l1) / (col_sq[j] + l2);
                let delta = new_w - w[j];
                if delta != 0.0 {
                    for i in 0..n {
                        residual[i] -= delta * x[(i, j)];
                    }
                    w[j] = new_w;
                }
                max_change = max_change.max(delta.abs());
            }

            if sweep % 100 == 0 {
                debug!(sweep, max_change, "coordinate descent sweep");
            }
            if max_change < self.tol {
                self.iterations = sweep + 1;
                break;
            }
            if sweep + 1 == self.max_iter {
                warn!(max_iter = self.max_iter, "elastic net did not converge");
            }
        }

        self.coefficients = Some(w);
        self.intercept = b;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        let w = self
            .coefficients
            .as_ref()
            .ok_or(SolverError::NotFitted("ElasticNetH2O"))?;
        let mut out = x.matvec(w)?;
        for v in out.iter_mut() {
            *v += self.intercept;
        }
        Ok(out)
    }
}

/// Front-end elastic net with library defaults; delegates to the native
/// coordinate-descent solver.
pub struct ElasticNet {
    solver: ElasticNetH2O,
}

impl ElasticNet {
    pub fn new() -> Self {
        ElasticNet {
            solver: ElasticNetH2O::new(1.0, 0.5),
        }
    }

    pub fn with_penalty(lambda: f64, l1_ratio: f64) -> Self {
        ElasticNet {
            solver: ElasticNetH2O::new(lambda, l1_ratio),
        }
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.solver.coefficients.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.solver.intercept
    }
}

impl Default for ElasticNet {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for ElasticNet {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        self.solver.fit(x, y)
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        self.solver.predict(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn toy() -> (Matrix, Vec<f64>) {
        // y = 2*x1, second feature is pure noise around zero
        let x = Matrix::from_rows(&[
            vec![1.0, 0.2],
            vec![2.0, -0.3],
            vec![3.0, 0.1],
            vec![4.0, -0.2],
            vec![5.0, 0.3],
        ])
        .unwrap();
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        (x, y)
    }

    #[test]
    fn fits_clean_signal() {
        let (x, y) = toy();
        let mut model = ElasticNetH2O::new(0.01, 0.5);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(&y) {
            assert!((p - t).abs() < 0.5, "pred {} vs {}", p, t);
        }
        assert!(model.iterations < model.max_iter);
    }

    #[test]
    fn lasso_limit_zeroes_noise_feature() {
        let (x, y) = toy();
        let mut model = ElasticNetH2O::new(0.5, 1.0);
        model.fit(&x, &y).unwrap();
        let w = model.coefficients.as_ref().unwrap();
        assert_eq!(w[1], 0.0);
    }

    #[test]
    fn ridge_limit_keeps_both_dense() {
        let (x, y) = toy();
        let mut model = ElasticNetH2O::new(0.1, 0.0);
        model.fit(&x, &y).unwrap();
        let w = model.coefficients.as_ref().unwrap();
        assert!(w[0] > 1.0);
    }

    #[test]
    fn no_intercept_passes_through_origin() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let y = vec![3.0, 6.0, 9.0];
        let mut model = ElasticNetH2O::new(0.001, 0.5);
        model.fit_intercept = false;
        model.fit(&x, &y).unwrap();
        assert_relative_eq!(model.intercept, 0.0);
        assert_relative_eq!(model.coefficients.as_ref().unwrap()[0], 3.0, epsilon = 0.05);
    }

    #[test]
    fn wrapper_delegates_to_native_solver() {
        let (x, y) = toy();
        let mut front = ElasticNet::with_penalty(0.01, 0.5);
        let mut native = ElasticNetH2O::new(0.01, 0.5);
        front.fit(&x, &y).unwrap();
        native.fit(&x, &y).unwrap();
        let a = front.predict(&x).unwrap();
        let b = native.predict(&x).unwrap();
        for (p, q) in a.iter().zip(&b) {
            assert_relative_eq!(*p, *q);
        }
    }

    #[test]
    fn invalid_l1_ratio_rejected() {
        let (x, y) = toy();
        let mut model = ElasticNetH2O::new(0.1, -0.2);
        assert!(matches!(
            model.fit(&x, &y),
            Err(SolverError::InvalidParameter(_))
        ));
    }
}
