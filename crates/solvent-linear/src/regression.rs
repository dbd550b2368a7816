use crate::elastic_net::ElasticNetH2O;
use solvent_core::linalg::solve;
use solvent_core::{Estimator, Matrix, SolverError, SolverResult};

/// Ordinary least squares through the normal equations `(XᵀX)w = Xᵀy`.
pub struct LinearRegression {
    pub fit_intercept: bool,
    pub coefficients: Option<Vec<f64>>,
    pub intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        LinearRegression {
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
        }
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// Solve the (optionally ridge-damped) normal equations on centered data.
fn normal_equations(
    x: &Matrix,
    y: &[f64],
    lambda: f64,
    fit_intercept: bool,
) -> SolverResult<(Vec<f64>, f64)> {
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

    let (x_mean, y_mean) = if fit_intercept {
        (x.col_means(), y.iter().sum::<f64>() / n as f64)
    } else {
        (vec![0.0; p], 0.0)
    };
    let mut xc = x.clone();
    for i in 0..n {
        for j in 0..p {
            xc[(i, j)] -= x_mean[j];
        }
    }
    let yc: Vec<f64> = y.iter().map(|&v| v - y_mean).collect();

    let mut gram = xc.gram();
    for j in 0..p {
        gram[(j, j)] += lambda;
    }
    let xty = xc.transpose().matvec(&yc)?;
    let w = solve(&gram, &xty)?;

    let intercept = if fit_intercept {
        y_mean - w.iter().zip(&x_mean).map(|(wj, mj)| wj * mj).sum::<f64>()
    } else {
        0.0
    };
    Ok((w, intercept))
}

impl Estimator for LinearRegression {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        let (w, b) = normal_equations(x, y, 0.0, self.fit_intercept)?;
        self.coefficients = Some(w);
        self.intercept = b;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        let w = self
            .coefficients
            .as_ref()
            .ok_or(SolverError::NotFitted("LinearRegression"))?;
        let mut out = x.matvec(w)?;
        for v in out.iter_mut() {
            *v += self.intercept;
        }
        Ok(out)
    }
}

/// L2-regularized regression, closed form `(XᵀX + λI)w = Xᵀy`.
pub struct Ridge {
    pub lambda: f64,
    pub fit_intercept: bool,
    pub coefficients: Option<Vec<f64>>,
    pub intercept: f64,
}

impl Ridge {
    pub fn new(lambda: f64) -> Self {
        Ridge {
            lambda,
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
        }
    }
}

impl Estimator for Ridge {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        if self.lambda < 0.0 {
            return Err(SolverError::InvalidParameter(format!(
                "lambda must be non-negative, got {}",
                self.lambda
            )));
        }
        let (w, b) = normal_equations(x, y, self.lambda, self.fit_intercept)?;
        self.coefficients = Some(w);
        self.intercept = b;
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        let w = self
            .coefficients
            .as_ref()
            .ok_or(SolverError::NotFitted("Ridge"))?;
        let mut out = x.matvec(w)?;
        for v in out.iter_mut() {
            *v += self.intercept;
        }
        Ok(out)
    }
}

/// L1-regularized regression: the elastic-net solver pinned at `l1_ratio = 1`.
pub struct Lasso {
    solver: ElasticNetH2O,
}

impl Lasso {
    pub fn new(lambda: f64) -> Self {
        Lasso {
            solver: ElasticNetH2O::new(lambda, 1.0),
        }
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.solver.coefficients.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.solver.intercept
    }
}

impl Estimator for Lasso {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        self.solver.fit(x, y)
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        self.solver.predict(x)
    }
}
