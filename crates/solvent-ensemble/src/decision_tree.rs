use solvent_core::{Estimator, Matrix, SolverError, SolverResult};

/// Split criterion for CART.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Criterion {
    Gini,
    Mse,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        value: f64,
    },
}

impl Node {
    fn traverse(&self, row: &[f64]) -> f64 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.traverse(row)
                } else {
                    right.traverse(row)
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    x: &'a Matrix,
    y: &'a [f64],
    criterion: Criterion,
    max_depth: usize,
    min_samples_split: usize,
    min_samples_leaf: usize,
    n_classes: usize,
}

impl<'a> TreeBuilder<'a> {
    fn build(&self, indices: &[usize], depth: usize) -> Node {
        if depth >= self.max_depth || indices.len() < self.min_samples_split.max(2) {
            return Node::Leaf {
                value: self.leaf_value(indices),
            };
        }

        let first = self.y[indices[0]];
        if indices.iter().all(|&i| self.y[i] == first) {
            return Node::Leaf { value: first };
        }

        let mut best: Option<(f64, usize, f64, Vec<usize>, Vec<usize>)> = None;

        for feature in 0..self.x.cols() {
            let mut values: Vec<f64> = indices.iter().map(|&i| self.x[(i, feature)]).collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;
                let mut left = Vec::new();
                let mut right = Vec::new();
                for &i in indices {
                    if self.x[(i, feature)] <= threshold {
                        left.push(i);
                    } else {
                        right.push(i);
                    }
                }
                if left.len() < self.min_samples_leaf || right.len() < self.min_samples_leaf {
                    continue;
                }
                let score = self.split_score(&left, &right, indices.len());
                if best.as_ref().map_or(true, |b| score < b.0) {
                    best = Some((score, feature, threshold, left, right));
                }
            }
        }

        match best {
            None => Node::Leaf {
                value: self.leaf_value(indices),
            },
            Some((_, feature, threshold, left, right)) => Node::Split {
                feature,
                threshold,
                left: Box::new(self.build(&left, depth + 1)),
                right: Box::new(self.build(&right, depth + 1)),
            },
        }
    }

    fn leaf_value(&self, indices: &[usize]) -> f64 {
        match self.criterion {
            Criterion::Mse => {
                if indices.is_empty() {
                    return 0.0;
                }
                indices.iter().map(|&i| self.y[i]).sum::<f64>() / indices.len() as f64
            }
            Criterion::Gini => {
                let mut counts = vec![0usize; self.n_classes.max(1)];
                for &i in indices {
                    let cls = self.y[i].round() as usize;
                    if cls < counts.len() {
                        counts[cls] += 1;
                    }
                }
                counts
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, &c)| c)
                    .map(|(cls, _)| cls as f64)
                    .unwrap_or(0.0)
            }
        }
    }

    fn split_score(&self, left: &[usize], right: &[usize], total: usize) -> f64 {
        let lw = left.len() as f64 / total as f64;
        let rw = right.len() as f64 / total as f64;
        match self.criterion {
            Criterion::Gini => lw * self.gini(left) + rw * self.gini(right),
            Criterion::Mse => lw * self.mse(left) + rw * self.mse(right),
        }
    }

    fn gini(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            let cls = self.y[i].round() as usize;
            if cls < self.n_classes {
                counts[cls] += 1;
            }
        }
        let n = indices.len() as f64;
        1.0 - counts
            .iter()
            .map(|&c| {
                let p = c as f64 / n;
                p * p
            })
            .sum::<f64>()
    }

    fn mse(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let n = indices.len() as f64;
        let mean = indices.iter().map(|&i| self.y[i]).sum::<f64>() / n;
        indices
            .iter()
            .map(|&i| {
                let d = self.y[i] - mean;
                d * d
            })
            .sum::<f64>()
            / n
    }
}

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

/// CART classifier, Gini impurity.
pub struct DecisionTreeClassifier {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub n_classes: usize,
    root: Option<Node>,
}

impl DecisionTreeClassifier {
    pub fn new(max_depth: usize) -> Self {
        DecisionTreeClassifier {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            n_classes: 0,
            root: None,
        }
    }
}

impl Estimator for DecisionTreeClassifier {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        check_input(x, y)?;
        self.n_classes = y.iter().map(|v| v.round() as usize).max().unwrap_or(0) + 1;
        let builder = TreeBuilder {
            x,
            y,
            criterion: Criterion::Gini,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            n_classes: self.n_classes,
        };
        let indices: Vec<usize> = (0..x.rows()).collect();
        self.root = Some(builder.build(&indices, 0));
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        let root = self
            .root
            .as_ref()
            .ok_or(SolverError::NotFitted("DecisionTreeClassifier"))?;
        Ok((0..x.rows()).map(|i| root.traverse(x.row(i))).collect())
    }
}

/// CART regressor, MSE criterion.
pub struct DecisionTreeRegressor {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    root: Option<Node>,
}

impl DecisionTreeRegressor {
    pub fn new(max_depth: usize) -> Self {
        DecisionTreeRegressor {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            root: None,
        }
    }
}

impl Estimator for DecisionTreeRegressor {
    fn fit(&mut self, x: &Matrix, y: &[f64]) -> SolverResult<()> {
        check_input(x, y)?;
        let builder = TreeBuilder {
            x,
            y,
            criterion: Criterion::Mse,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            n_classes: 0,
        };
        let indices: Vec<usize> = (0..x.rows()).collect();
        self.root = Some(builder.build(&indices, 0));
        Ok(())
    }

    fn predict(&self, x: &Matrix) -> SolverResult<Vec<f64>> {
        let root = self
            .root
            .as_ref()
            .ok_or(SolverError::NotFitted("DecisionTreeRegressor"))?;
        Ok((0..x.rows()).map(|i| root.traverse(x.row(i))).collect())
    }
}
