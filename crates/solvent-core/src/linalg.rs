//! Small dense linear-algebra routines shared by the solver crates.

use crate::error::{SolverError, SolverResult};
use crate::matrix::Matrix;

/// Solve `Ax = b` for square `A` via Gaussian elimination with partial
/// pivoting. Overwrites nothing; `A` and `b` are copied into working storage.
pub fn solve(a: &Matrix, b: &[f64]) -> SolverResult<Vec<f64>> {
    let n = a.rows();
    if a.cols() != n {
        return Err(SolverError::DimensionMismatch(format!(
            "solve requires a square matrix, got {}x{}",
            a.rows(),
            a.cols()
        )));
    }
    if b.len() != n {
        return Err(SolverError::DimensionMismatch(format!(
            "rhs of length {} against {}x{} matrix",
            b.len(),
            n,
            n
        )));
    }

    let mut aug = a.clone();
    let mut rhs = b.to_vec();

    for col in 0..n {
        // Partial pivoting
        let mut pivot = col;
        for row in col + 1..n {
            if aug[(row, col)].abs() > aug[(pivot, col)].abs() {
                pivot = row;
            }
        }
        if aug[(pivot, col)].abs() < 1e-12 {
            return Err(SolverError::SingularMatrix);
        }
        if pivot != col {
            for j in 0..n {
                let tmp = aug[(col, j)];
                aug[(col, j)] = aug[(pivot, j)];
                aug[(pivot, j)] = tmp;
            }
            rhs.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = aug[(row, col)] / aug[(col, col)];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                aug[(row, j)] -= factor * aug[(col, j)];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = rhs[i];
        for j in i + 1..n {
            sum -= aug[(i, j)] * x[j];
        }
        x[i] = sum / aug[(i, i)];
    }
    Ok(x)
}

/// Cholesky factorization of a symmetric positive-definite matrix.
/// Returns the lower-triangular factor `L` with `A = L Lᵀ`.
pub fn cholesky(a: &Matrix) -> SolverResult<Matrix> {
    let n = a.rows();
    if a.cols() != n {
        return Err(SolverError::DimensionMismatch(
            "cholesky requires a square matrix".to_string(),
        ));
    }

    let mut l = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }
            if i == j {
                if sum <= 0.0 {
                    return Err(SolverError::SingularMatrix);
                }
                l[(i, j)] = sum.sqrt();
            } else {
                l[(i, j)] = sum / l[(j, j)];
            }
        }
    }
    Ok(l)
}

/// Solve `L Lᵀ x = b` given the Cholesky factor `L`.
/// One forward and one backward substitution, no refactorization.
pub fn cholesky_solve(l: &Matrix, b: &[f64]) -> SolverResult<Vec<f64>> {
    let n = l.rows();
    if b.len() != n {
        return Err(SolverError::DimensionMismatch(format!(
            "rhs of length {} against {}x{} factor",
            b.len(),
            n,
            n
        )));
    }

    // Forward: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[(i, j)] * y[j];
        }
        y[i] = sum / l[(i, i)];
    }

    // Backward: Lᵀ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in i + 1..n {
            sum -= l[(j, i)] * x[j];
        }
        x[i] = sum / l[(i, i)];
    }
    Ok(x)
}

/// Eigendecomposition of a symmetric matrix via classical Jacobi rotations,
/// zeroing the largest off-diagonal element each step.
///
/// Returns `(eigenvalues, eigenvectors)` sorted by descending eigenvalue;
/// eigenvectors are the columns of the returned matrix.
pub fn symmetric_eigen(a: &Matrix, max_sweeps: usize) -> SolverResult<(Vec<f64>, Matrix)> {
    let n = a.rows();
    if a.cols() != n {
        return Err(SolverError::DimensionMismatch(
            "symmetric_eigen requires a square matrix".to_string(),
        ));
    }

    let mut m = a.clone();
    let mut vecs = Matrix::eye(n);

    for _ in 0..max_sweeps {
        // Largest off-diagonal element
        let mut max_off = 0.0;
        let (mut p, mut q) = (0, 1);
        for i in 0..n {
            for j in i + 1..n {
                if m[(i, j)].abs() > max_off {
                    max_off = m[(i, j)].abs();
                    p = i;
                    q = j;
                }
            }
        }
        if max_off < 1e-12 {
            break;
        }

        let apq = m[(p, q)];
        let app = m[(p, p)];
        let aqq = m[(q, q)];
        let theta = if (app - aqq).abs() < 1e-15 {
            std::f64::consts::FRAC_PI_4
        } else {
            0.5 * (2.0 * apq / (app - aqq)).atan()
        };
        let c = theta.cos();
        let s = theta.sin();

        for l in 0..n {
            if l == p || l == q {
                continue;
            }
            let mlp = m[(l, p)];
            let mlq = m[(l, q)];
            m[(l, p)] = c * mlp + s * mlq;
            m[(p, l)] = m[(l, p)];
            m[(l, q)] = -s * mlp + c * mlq;
            m[(q, l)] = m[(l, q)];
        }
        m[(p, p)] = c * c * app + 2.0 * c * s * apq + s * s * aqq;
        m[(q, q)] = s * s * app - 2.0 * c * s * apq + c * c * aqq;
        m[(p, q)] = 0.0;
        m[(q, p)] = 0.0;

        for l in 0..n {
            let vlp = vecs[(l, p)];
            let vlq = vecs[(l, q)];
            vecs[(l, p)] = c * vlp + s * vlq;
            vecs[(l, q)] = -s * vlp + c * vlq;
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| m[(j, j)].total_cmp(&m[(i, i)]));

    let eigenvalues: Vec<f64> = order.iter().map(|&i| m[(i, i)]).collect();
    let mut sorted_vecs = Matrix::zeros(n, n);
    for (dst, &src) in order.iter().enumerate() {
        for row in 0..n {
            sorted_vecs[(row, dst)] = vecs[(row, src)];
        }
    }
    Ok((eigenvalues, sorted_vecs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solve_small_system() {
        // 2x + y = 5, x + 3y = 7
        let a = Matrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
        let x = solve(&a, &[5.0, 7.0]).unwrap();
        assert_relative_eq!(x[0], 1.6, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.8, epsilon = 1e-10);
    }

    #[test]
    fn solve_rejects_singular() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert!(matches!(
            solve(&a, &[1.0, 2.0]),
            Err(SolverError::SingularMatrix)
        ));
    }

    #[test]
    fn cholesky_round_trip() {
        let a = Matrix::from_rows(&[vec![4.0, 2.0], vec![2.0, 3.0]]).unwrap();
        let l = cholesky(&a).unwrap();
        let x = cholesky_solve(&l, &[8.0, 7.0]).unwrap();
        // Verify A x = b
        let back = a.matvec(&x).unwrap();
        assert_relative_eq!(back[0], 8.0, epsilon = 1e-10);
        assert_relative_eq!(back[1], 7.0, epsilon = 1e-10);
    }

    #[test]
    fn cholesky_rejects_indefinite() {
        let a = Matrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        assert!(cholesky(&a).is_err());
    }

    #[test]
    fn jacobi_eigen_diagonal() {
        let a = Matrix::from_rows(&[vec![3.0, 0.0], vec![0.0, 5.0]]).unwrap();
        let (vals, _) = symmetric_eigen(&a, 100).unwrap();
        assert_relative_eq!(vals[0], 5.0, epsilon = 1e-8);
        assert_relative_eq!(vals[1], 3.0, epsilon = 1e-8);
    }

    #[test]
    fn jacobi_eigen_symmetric() {
        let a = Matrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let (vals, vecs) = symmetric_eigen(&a, 100).unwrap();
        assert_relative_eq!(vals[0], 3.0, epsilon = 1e-8);
        assert_relative_eq!(vals[1], 1.0, epsilon = 1e-8);
        // A v = λ v for the leading eigenvector
        let v: Vec<f64> = (0..2).map(|i| vecs[(i, 0)]).collect();
        let av = a.matvec(&v).unwrap();
        for i in 0..2 {
            assert_relative_eq!(av[i], vals[0] * v[i], epsilon = 1e-8);
        }
    }
}
