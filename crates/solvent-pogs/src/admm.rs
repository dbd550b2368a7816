use solvent_core::linalg::{cholesky, cholesky_solve};
use solvent_core::{Estimator, Matrix, SolverError, SolverResult};
use tracing::{debug, warn};

/// Proximal-operator graph solver.
///
/// Splits the regularized least-squares objective
/// `(1/2)‖Ax − b‖² + λ(α‖x‖₁ + (1−α)/2‖x‖²)`
/// into a quadratic part and a separable penalty and alternates between them
/// with ADMM. The quadratic subproblem `(AᵀA + ρI)x = Aᵀb + ρ(z − u)` is
/// solved through a Cholesky factorization computed once per fit; the penalty
/// subproblem is an elementwise soft-threshold.
pub struct Pogs {
    /// Overall regularization strength λ.
    pub lambda: f64,
    /// Mix between L1 (1.0) and L2 (0.0) penalties.
    pub l1_ratio: f64,
    /// ADMM penalty parameter ρ.
    pub rho: f64,
    pub max_iter: usize,
    pub abs_tol: f64,
    pub rel_tol: f64,
    pub fit_intercept: bool,
    pub coefficients: Option<Vec<f64>>,
    pub intercept: f64,
    /// Iterations consumed by the last fit.
    pub iterations: usize,
    /// Whether the last fit met the residual tolerances.
    pub converged: bool,
}

impl Pogs {
    pub fn new(lambda: f64, l1_ratio: f64) -> Self {
        Pogs {
            lambda,
            l1_ratio,
            rho: 1.0,
            max_iter: 1000,
            abs_tol: 1e-6,
            rel_tol: 1e-4,
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
            iterations: 0,
            converged: false,
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
        if self.rho <= 0.0 {
            return Err(SolverError::InvalidParameter(format!(
                "rho must be positive, got {}",
                self.rho
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

    fn norm(v: &[f64]) -> f64 {
        v.iter().map(|&x| x * x).sum::<f64>().sqrt()
    }
}

impl Estimator for Pogs {
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

        // Center the problem so the intercept drops out of the iteration.
        let (x_mean, y_mean) = if self.fit_intercept {
            (x.col_means(), y.iter().sum::<f64>() / n as f64)
        } else {
            (vec![0.0; p], 0.0)
        };
        let mut a = x.clone();
        for i in 0..n {
            for j in 0..p {
                a[(i, j)] -= x_mean[j];
            }
        }
        let b: Vec<f64> = y.iter().map(|&v| v - y_mean).collect();

        // Factor AᵀA + ρI once; every x-update reuses it.
        let mut gram = a.gram();
        for j in 0..p {
            gram[(j, j)] += self.rho;
        }
        let factor = cholesky(&gram)?;
        let atb = a.transpose().matvec(&b)?;

        let l1 = self.lambda * self.l1_ratio;
        let l2 = self.lambda * (1.0 - self.l1_ratio);

        let mut z = vec![0.0; p];
        let mut u = vec![0.0; p];
        self.converged = false;
        self.iterations = self.max_iter;

        for iter in 0..self.max_iter {
            // x-update
            let rhs: Vec<f64> = (0..p).map(|j| atb[j] + self.rho * (z[j] - u[j])).collect();
            let w = cholesky_solve(&factor, &rhs)?;

            // z-update: prox of the elastic-net penalty
            let z_old = z.clone();
            let shrink = 1.0 + l2 / self.rho;
            for j in 0..p {
                z[j] = Self::soft_threshold(w[j] + u[j], l1 / self.rho) / shrink;
            }

            // u-update
            for j in 0..p {
                u[j] += w[j] - z[j];
            }

            let primal: Vec<f64> = (0..p).map(|j| w[j] - z[j]).collect();
            let dual: Vec<f64> = (0..p).map(|j| -self.rho * (z[j] - z_old[j])).collect();
            let eps_pri = (p as f64).sqrt() * self.abs_tol
                + self.rel_tol * Self::norm(&w).max(Self::norm(&z));
            let eps_dual = (p as f64).sqrt() * self.abs_tol
                + self.rel_tol * self.rho * Self::norm(&u);

            if iter % 50 == 0 {
                debug!(
                    iter,
                    primal = Self::norm(&primal),
                    dual = Self::norm(&dual),
                    "pogs iteration"
                );
            }

            if Self::norm(&primal) < eps_pri && Self::norm(&dual) < eps_dual {
                self.converged = true;
                self.iterations = iter + 1;
                break;
            }
        }

        if !self.converged {
            warn!(max_iter = self.max_iter, "pogs did not converge");
        }

        self.intercept = if self.fit_intercept {
            y_mean - z.iter().zip(&x_mean).map(|(w, m)| w * m).sum::<f64>()
        } else {
            0.0
        };
        // Report the sparse iterate; it carries the exact zeros.
        self.coefficients = Some(z);
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        let w = self
            .coefficients
            .as_ref()
            .ok_or(SolverError::NotFitted("Pogs"))?;
        let mut out = x.matvec(w)?;
        for v in out.iter_mut() {
            *v += self.intercept;
        }
        Ok(out)
    }
}
