use crate::decision_tree::{DecisionTreeClassifier, DecisionTreeRegressor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
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

/// Draw a bootstrap sample and a feature subset for one tree.
fn bagged_view(
    x: &Matrix,
    y: &[f64],
    max_features: usize,
    seed: u64,
) -> (Matrix, Vec<f64>, Vec<usize>) {
    let n = x.rows();
    let p = x.cols();
    let mut rng = StdRng::seed_from_u64(seed);

    let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
    let mut features: Vec<usize> = (0..p).collect();
    features.shuffle(&mut rng);
    features.truncate(max_features);

    let x_sub = x.select_rows(&sample).select_cols(&features);
    let y_sub: Vec<f64> = sample.iter().map(|&i| y[i]).collect();
    (x_sub, y_sub, features)
}

fn resolve_max_features(p: usize, ratio: f64) -> usize {
    ((p as f64 * ratio).ceil() as usize).clamp(1, p)
}

/// Random forest classifier: bagged CART trees, majority vote.
pub struct RandomForestClassifier {
    pub n_estimators: usize,
    pub max_depth: usize,
    /// Fraction of features offered to each tree.
    pub max_features_ratio: f64,
    pub seed: u64,
    pub n_classes: usize,
    trees: Vec<(DecisionTreeClassifier, Vec<usize>)>,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize, max_depth: usize) -> Self {
        RandomForestClassifier {
            n_estimators,
            max_depth,
            max_features_ratio: 1.0,
            seed: 42,
            n_classes: 0,
            trees: Vec::new(),
        }
    }
}

impl Estimator for RandomForestClassifier {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        check_input(x, y)?;
        if self.n_estimators == 0 {
            return Err(SolverError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        self.n_classes = y.iter().map(|v| v.round() as usize).max().unwrap_or(0) + 1;
        let max_features = resolve_max_features(x.cols(), self.max_features_ratio);
        let base = self.seed;
        let depth = self.max_depth;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let (x_sub, y_sub, features) =
                    bagged_view(x, y, max_features, base.wrapping_add(t as u64));
                let mut tree = DecisionTreeClassifier::new(depth);
                tree.fit(&x_sub, &y_sub)?;
                Ok((tree, features))
            })
            .collect::<SolverResult<Vec<_>>>()?;
        debug!(trees = self.trees.len(), "random forest fitted");
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(SolverError::NotFitted("RandomForestClassifier"));
        }
        let mut out = Vec::with_capacity(x.rows());
        for i in 0..x.rows() {
            let mut votes = vec![0usize; self.n_classes];
            for (tree, features) in &self.trees {
                let row: Vec<f64> = features.iter().map(|&f| x[(i, f)]).collect();
                let sub = Matrix::new(row, 1, features.len())?;
                let cls = tree.predict(&sub)?[0].round() as usize;
                if cls < self.n_classes {
                    votes[cls] += 1;
                }
            }
            let winner = votes
                .iter()
                .enumerate()
                .max_by_key(|(_, &c)| c)
                .map(|(cls, _)| cls)
                .unwrap_or(0);
            out.push(winner as f64);
        }
        Ok(out)
    }
}

/// Random forest regressor: bagged CART trees, mean aggregation.
pub struct RandomForestRegressor {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub max_features_ratio: f64,
    pub seed: u64,
    trees: Vec<(DecisionTreeRegressor, Vec<usize>)>,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, max_depth: usize) -> Self {
        RandomForestRegressor {
            n_estimators,
            max_depth,
            max_features_ratio: 1.0,
            seed: 42,
            trees: Vec::new(),
        }
    }
}

impl Estimator for RandomForestRegressor {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        check_input(x, y)?;
        if self.n_estimators == 0 {
            return Err(SolverError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        let max_features = resolve_max_features(x.cols(), self.max_features_ratio);
        let base = self.seed;
        let depth = self.max_depth;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let (x_sub, y_sub, features) =
                    bagged_view(x, y, max_features, base.wrapping_add(t as u64));
                let mut tree = DecisionTreeRegressor::new(depth);
                tree.fit(&x_sub, &y_sub)?;
                Ok((tree, features))
            })
            .collect::<SolverResult<Vec<_>>>()?;
        debug!(trees = self.trees.len(), "random forest fitted");
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(SolverError::NotFitted("RandomForestRegressor"));
        }
        let mut out = Vec::with_capacity(x.rows());
        for i in 0..x.rows() {
            let mut sum = 0.0;
            for (tree, features) in &self.trees {
                let row: Vec<f64> = features.iter().map(|&f| x[(i, f)]).collect();
                let sub = Matrix::new(row, 1, features.len())?;
                sum += tree.predict(&sub)?[0];
            }
            out.push(sum / self.trees.len() as f64);
        }
        Ok(out)
    }
}
