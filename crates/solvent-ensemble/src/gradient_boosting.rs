use crate::decision_tree::DecisionTreeRegressor;
use solvent_core::{Estimator, Matrix, SolverError, SolverResult};
use tracing::debug;

fn check_input(x: &Matrix, y: &[f64]) -> SolverResult<()> {
    if x.rows() == 0 || x.cols() == 0 {
        return Err(SolverError::EmptyInput);
    }
    if y.len() != x.rows() {
        return Err(SolverError::DimensionMismatch(format!(
            "{} labels for {} rows",
            y.len(),
            x.rows()
        )));
    }
    Ok(())
}

/// Gradient-boosted trees for regression: each stage fits a shallow tree to
/// the residuals of the running prediction, added back with shrinkage.
pub struct GradientBoostingRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    trees: Vec<DecisionTreeRegressor>,
    initial_prediction: f64,
}

impl GradientBoostingRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize) -> Self {
        GradientBoostingRegressor {
            n_estimators,
            learning_rate,
            max_depth: if max_depth == 0 { 3 } else { max_depth },
            trees: Vec::new(),
            initial_prediction: 0.0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Estimator for GradientBoostingRegressor {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        check_input(x, y)?;
        if self.learning_rate <= 0.0 {
            return Err(SolverError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        let n = x.rows();
        self.initial_prediction = y.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![self.initial_prediction; n];
        self.trees = Vec::with_capacity(self.n_estimators);

        for stage in 0..self.n_estimators {
            let residuals: Vec<f64> = y
                .iter()
                .zip(&predictions)
                .map(|(t, p)| t - p)
                .collect();

            let mut tree = DecisionTreeRegressor::new(self.max_depth);
            tree.fit(x, &residuals)?;
            let update = tree.predict(x)?;
            for (p, u) in predictions.iter_mut().zip(&update) {
                *p += self.learning_rate * u;
            }
            self.trees.push(tree);

            if stage % 25 == 0 {
                let loss: f64 =
                    residuals.iter().map(|r| r * r).sum::<f64>() / n as f64;
                debug!(stage, loss, "boosting stage");
            }
        }
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(SolverError::NotFitted("GradientBoostingRegressor"));
        }
        let mut out = vec![self.initial_prediction; x.rows()];
        for tree in &self.trees {
            let update = tree.predict(x)?;
            for (p, u) in out.iter_mut().zip(&update) {
                *p += self.learning_rate * u;
            }
        }
        Ok(out)
    }
}

/// Gradient-boosted trees for binary classification.
///
/// Boosts in log-odds space against the logistic loss; trees fit the
/// pseudo-residual `y − σ(raw)`.
pub struct GradientBoostingClassifier {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    trees: Vec<DecisionTreeRegressor>,
    initial_log_odds: f64,
}

impl GradientBoostingClassifier {
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize) -> Self {
        GradientBoostingClassifier {
            n_estimators,
            learning_rate,
            max_depth: if max_depth == 0 { 3 } else { max_depth },
            trees: Vec::new(),
            initial_log_odds: 0.0,
        }
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    fn raw_scores(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        let mut raw = vec![self.initial_log_odds; x.rows()];
        for tree in &self.trees {
            let update = tree.predict(x)?;
            for (r, u) in raw.iter_mut().zip(&update) {
                *r += self.learning_rate * u;
            }
        }
        Ok(raw)
    }

    /// Class-1 probability per row.
    pub fn predict_proba(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(SolverError::NotFitted("GradientBoostingClassifier"));
        }
        Ok(self
            .raw_scores(x)?
            .iter()
            .map(|&r| Self::sigmoid(r))
            .collect())
    }
}

impl Estimator for GradientBoostingClassifier {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        check_input(x, y)?;
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(SolverError::InvalidParameter(
                "labels must be 0 or 1".to_string(),
            ));
        }
        let n = x.rows();
        let pos: f64 = y.iter().sum();
        let neg = n as f64 - pos;
        self.initial_log_odds = if pos > 0.0 && neg > 0.0 {
            (pos / neg).ln()
        } else {
            0.0
        };

        let mut raw = vec![self.initial_log_odds; n];
        self.trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let residuals: Vec<f64> = y
                .iter()
                .zip(&raw)
                .map(|(t, r)| t - Self::sigmoid(*r))
                .collect();

            let mut tree = DecisionTreeRegressor::new(self.max_depth);
            tree.fit(x, &residuals)?;
            let update = tree.predict(x)?;
            for (r, u) in raw.iter_mut().zip(&update) {
                *r += self.learning_rate * u;
            }
            self.trees.push(tree);
        }
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|&p| if p >= 0.5 { 1.0 } else { 0.0 })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regressor_learns_line() {
        let x = Matrix::from_rows(&[
            vec![1.0],
            vec![2.0],
            vec![3.0],
            vec![4.0],
            vec![5.0],
            vec![6.0],
            vec![7.0],
            vec![8.0],
        ])
        .unwrap();
        let y: Vec<f64> = x.col(0).iter().map(|v| 2.0 * v + 1.0).collect();

        let mut model = GradientBoostingRegressor::new(50, 0.1, 3);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 50);

        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(&y) {
            assert!((p - t).abs() < 2.0, "pred {} vs {}", p, t);
        }
    }

    #[test]
    fn classifier_separates_blobs() {
        let x = Matrix::from_rows(&[
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![0.2, 0.2],
            vec![0.8, 0.8],
            vec![0.9, 0.9],
            vec![1.0, 1.0],
        ])
        .unwrap();
        let y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = GradientBoostingClassifier::new(50, 0.1, 3);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[0] < 0.5 && proba[5] > 0.5);
    }

    #[test]
    fn classifier_rejects_non_binary_labels() {
        let x = Matrix::from_rows(&[vec![1.0], vec![2.0]]).unwrap();
        let mut model = GradientBoostingClassifier::new(5, 0.1, 3);
        assert!(model.fit(&x, &[0.0, 3.0]).is_err());
    }

    #[test]
    fn predict_requires_fit() {
        let x = Matrix::from_rows(&[vec![1.0]]).unwrap();
        let model = GradientBoostingRegressor::new(5, 0.1, 3);
        assert!(matches!(model.predict(&x), Err(SolverError::NotFitted(_))));
    }
}
