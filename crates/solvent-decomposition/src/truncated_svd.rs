use solvent_core::linalg::symmetric_eigen;
use solvent_core::{Matrix, SolverError, SolverResult, Transformer};
use tracing::debug;

/// Native truncated SVD solver.
///
/// Computes the top-k right singular vectors of `A` from a Jacobi
/// eigendecomposition of the Gram matrix `AᵀA`; singular values are the
/// square roots of its leading eigenvalues. No centering is applied, so
/// the result is an SVD, not a PCA.
pub struct TruncatedSVDH2O {
    pub n_components: usize,
    /// Jacobi sweep budget for the eigendecomposition.
    pub max_sweeps: usize,
    /// Right singular vectors, one component per row (k×p).
    pub components: Option<Matrix>,
    /// Leading singular values, descending.
    pub singular_values: Option<Vec<f64>>,
}

impl TruncatedSVDH2O {
    pub fn new(n_components: usize) -> Self {
        TruncatedSVDH2O {
            n_components,
            max_sweeps: 200,
            components: None,
            singular_values: None,
        }
    }
}

impl Transformer for TruncatedSVDH2O {
    fn fit(&mut self, x: &Matrix) -> SolverResult<()> {
        let p = x.cols();
        if x.rows() == 0 || p == 0 {
            return Err(SolverError::EmptyInput);
        }
        if self.n_components == 0 || self.n_components > p {
            return Err(SolverError::InvalidParameter(format!(
                "n_components must lie in [1, {}], got {}",
                p, self.n_components
            )));
        }

        let gram = x.gram();
        let (eigenvalues, eigenvectors) = symmetric_eigen(&gram, self.max_sweeps)?;

        let k = self.n_components;
        let singular_values: Vec<f64> = eigenvalues[..k]
            .iter()
            .map(|&ev| ev.max(0.0).sqrt())
            .collect();
        debug!(?singular_values, "truncated svd fitted");

        // Eigenvector columns become component rows.
        let mut components = Matrix::zeros(k, p);
        for c in 0..k {
            for r in 0..p {
                components[(c, r)] = eigenvectors[(r, c)];
            }
        }

        self.components = Some(components);
        self.singular_values = Some(singular_values);
        Ok(())
    }

    /// Project rows onto the fitted components: `X Vₖ`.
    fn transform(&self, x: &Matrix) -> SolverResult<Matrix> {
        let components = self
            .components
            .as_ref()
            .ok_or(SolverError::NotFitted("TruncatedSVDH2O"))?;
        if x.cols() != components.cols() {
            return Err(SolverError::DimensionMismatch(format!(
                "{} features against components with {}",
                x.cols(),
                components.cols()
            )));
        }
        x.matmul(&components.transpose())
    }
}

/// Front-end truncated SVD with library defaults; delegates to the native
/// solver.
pub struct TruncatedSVD {
    solver: TruncatedSVDH2O,
}

impl TruncatedSVD {
    pub fn new(n_components: usize) -> Self {
        TruncatedSVD {
            solver: TruncatedSVDH2O::new(n_components),
        }
    }

    pub fn components(&self) -> Option<&Matrix> {
        self.solver.components.as_ref()
    }

    pub fn singular_values(&self) -> Option<&[f64]> {
        self.solver.singular_values.as_deref()
    }
}

impl Transformer for TruncatedSVD {
    fn fit(&mut self, x: &Matrix) -> SolverResult<()> {
        self.solver.fit(x)
    }

    fn transform(&self, x: &Matrix) -> SolverResult<Matrix> {
        self.solver.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn diagonal_matrix_has_known_spectrum() {
        let x = Matrix::from_rows(&[vec![3.0, 0.0], vec![0.0, 4.0]]).unwrap();
        let mut svd = TruncatedSVDH2O::new(2);
        svd.fit(&x).unwrap();
        let s = svd.singular_values.as_ref().unwrap();
        assert_relative_eq!(s[0], 4.0, epsilon = 1e-6);
        assert_relative_eq!(s[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn transform_preserves_rank_one_structure() {
        // Rank-1 matrix: every row is a multiple of (1, 2).
        let x = Matrix::from_rows(&[
            vec![1.0, 2.0],
            vec![2.0, 4.0],
            vec![3.0, 6.0],
        ])
        .unwrap();
        let mut svd = TruncatedSVDH2O::new(1);
        let z = svd.fit_transform(&x).unwrap();
        assert_eq!(z.shape(), (3, 1));
        // Projections scale with the row norms.
        assert_relative_eq!(z[(1, 0)] / z[(0, 0)], 2.0, epsilon = 1e-6);
        assert_relative_eq!(z[(2, 0)] / z[(0, 0)], 3.0, epsilon = 1e-6);

        // Second singular value of a rank-1 matrix is zero.
        let mut full = TruncatedSVDH2O::new(2);
        full.fit(&x).unwrap();
        let s = full.singular_values.as_ref().unwrap();
        assert!(s[1].abs() < 1e-6);
    }

    #[test]
    fn component_rows_are_unit_norm() {
        let x = Matrix::from_rows(&[
            vec![2.0, 1.0, 0.0],
            vec![1.0, 3.0, 1.0],
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
        ])
        .unwrap();
        let mut svd = TruncatedSVDH2O::new(2);
        svd.fit(&x).unwrap();
        let v = svd.components.as_ref().unwrap();
        for c in 0..2 {
            let norm: f64 = v.row(c).iter().map(|a| a * a).sum::<f64>().sqrt();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn wrapper_matches_native_solver() {
        let x = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 2.0], vec![1.0, 1.0]]).unwrap();
        let mut front = TruncatedSVD::new(1);
        let mut native = TruncatedSVDH2O::new(1);
        let a = front.fit_transform(&x).unwrap();
        let b = native.fit_transform(&x).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn too_many_components_rejected() {
        let x = Matrix::from_rows(&[vec![1.0, 2.0]]).unwrap();
        let mut svd = TruncatedSVDH2O::new(3);
        assert!(matches!(
            svd.fit(&x),
            Err(SolverError::InvalidParameter(_))
        ));
    }

    #[test]
    fn transform_requires_fit() {
        let x = Matrix::from_rows(&[vec![1.0, 2.0]]).unwrap();
        let svd = TruncatedSVDH2O::new(1);
        assert!(matches!(svd.transform(&x), Err(SolverError::NotFitted(_))));
    }
}
