//! Dense linear algebra helpers for symmetric matrices
//!
//! Everything here works on small, dense `Array2<f64>` matrices (one row and
//! column per security or per model feature), so plain loops are used instead
//! of a LAPACK binding.

use super::CovarianceError;
use ndarray::{Array1, Array2, ArrayView1};

/// Result of eigenvalue decomposition
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues (sorted in descending order)
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors (columns are eigenvectors)
    pub eigenvectors: Array2<f64>,
}

fn ensure_square(matrix: &Array2<f64>) -> Result<usize, CovarianceError> {
    let n = matrix.nrows();
    if n == matrix.ncols() {
        Ok(n)
    } else {
        Err(CovarianceError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        })
    }
}

/// Cyclic Jacobi eigen decomposition of a symmetric matrix
///
/// Sweeps over every off-diagonal pair until the off-diagonal mass falls
/// below `tolerance` or `max_sweeps` is reached.
///
/// # Arguments
/// * `matrix` - Symmetric matrix to decompose
/// * `max_sweeps` - Maximum number of full sweeps
/// * `tolerance` - Convergence threshold on the off-diagonal Frobenius norm
pub fn jacobi_eigendecomp(
    matrix: &Array2<f64>,
    max_sweeps: usize,
    tolerance: f64,
) -> Result<EigenDecomposition, CovarianceError> {
    let n = ensure_square(matrix)?;
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..max_sweeps {
        let off: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[[i, j]] * a[[i, j]])
            .sum();
        if off.sqrt() < tolerance {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                a[[p, p]] -= t * apq;
                a[[q, q]] += t * apq;
                a[[p, q]] = 0.0;
                a[[q, p]] = 0.0;
                for r in 0..n {
                    if r != p && r != q {
                        let arp = a[[r, p]];
                        let arq = a[[r, q]];
                        a[[r, p]] = c * arp - s * arq;
                        a[[p, r]] = a[[r, p]];
                        a[[r, q]] = s * arp + c * arq;
                        a[[q, r]] = a[[r, q]];
                    }
                }
                for r in 0..n {
                    let vrp = v[[r, p]];
                    let vrq = v[[r, q]];
                    v[[r, p]] = c * vrp - s * vrq;
                    v[[r, q]] = s * vrp + c * vrq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let eigenvalues = order.iter().map(|&i| a[[i, i]]).collect();
    let mut eigenvectors = Array2::<f64>::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        eigenvectors.column_mut(dst).assign(&v.column(src));
    }

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

/// Check that a symmetric matrix has no eigenvalue below `-tolerance`
pub fn is_positive_semidefinite(matrix: &Array2<f64>, tolerance: f64) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }
    match jacobi_eigendecomp(matrix, 100, 1e-14) {
        Ok(decomp) => decomp.eigenvalues.iter().all(|&v| v >= -tolerance),
        Err(_) => false,
    }
}

/// Ratio of the largest to the smallest eigenvalue
///
/// Infinite when the smallest eigenvalue is (numerically) zero.
pub fn condition_number(matrix: &Array2<f64>) -> f64 {
    match jacobi_eigendecomp(matrix, 100, 1e-14) {
        Ok(decomp) => {
            let n = decomp.eigenvalues.len();
            if n == 0 {
                return f64::INFINITY;
            }
            let max = decomp.eigenvalues[0];
            let min = decomp.eigenvalues[n - 1];
            if min.abs() < 1e-15 {
                f64::INFINITY
            } else {
                max / min
            }
        }
        Err(_) => f64::INFINITY,
    }
}

/// Lower-triangular Cholesky factor `L` with `A = L Lᵀ`
pub fn cholesky(matrix: &Array2<f64>) -> Result<Array2<f64>, CovarianceError> {
    let n = ensure_square(matrix)?;
    let mut l = Array2::<f64>::zeros((n, n));

    for j in 0..n {
        let mut diag = matrix[[j, j]];
        for k in 0..j {
            diag -= l[[j, k]] * l[[j, k]];
        }
        if !diag.is_finite() || diag <= 0.0 {
            return Err(CovarianceError::NotPositiveDefinite);
        }
        let ljj = diag.sqrt();
        l[[j, j]] = ljj;

        for i in (j + 1)..n {
            let mut sum = matrix[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = sum / ljj;
        }
    }

    Ok(l)
}

/// Solve `A x = b` for symmetric positive definite `A`
pub fn cholesky_solve(
    matrix: &Array2<f64>,
    rhs: ArrayView1<'_, f64>,
) -> Result<Array1<f64>, CovarianceError> {
    let l = cholesky(matrix)?;
    let n = l.nrows();
    if rhs.len() != n {
        return Err(CovarianceError::DimensionMismatch {
            expected: n,
            actual: rhs.len(),
        });
    }

    // L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = rhs[i];
        for k in 0..i {
            sum -= l[[i, k]] * y[k];
        }
        y[i] = sum / l[[i, i]];
    }

    // Lᵀ x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    Ok(x)
}

/// Average off-diagonal entry of an `N x N` correlation matrix
///
/// Computed as `(ΣR − N) / (N² − N)`; zero for fewer than two assets.
pub fn average_correlation(corr: &Array2<f64>) -> f64 {
    let n = corr.nrows() as f64;
    if corr.nrows() < 2 {
        return 0.0;
    }
    (corr.sum() - n) / (n * n - n)
}

/// Covariance `s_i R_ij s_j` from a correlation matrix and per-asset scales
pub fn scale_correlation(
    corr: &Array2<f64>,
    scale: ArrayView1<'_, f64>,
) -> Result<Array2<f64>, CovarianceError> {
    let n = ensure_square(corr)?;
    if scale.len() != n {
        return Err(CovarianceError::DimensionMismatch {
            expected: n,
            actual: scale.len(),
        });
    }
    Ok(Array2::from_shape_fn((n, n), |(i, j)| {
        scale[i] * corr[[i, j]] * scale[j]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_jacobi_diagonal_matrix() {
        let m = array![[3.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]];
        let decomp = jacobi_eigendecomp(&m, 50, 1e-14).unwrap();
        assert_eq!(decomp.eigenvalues.to_vec(), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_jacobi_reconstructs_matrix() {
        let m = array![[4.0, 1.0, 0.5], [1.0, 9.0, 1.5], [0.5, 1.5, 16.0]];
        let decomp = jacobi_eigendecomp(&m, 50, 1e-14).unwrap();

        let v = &decomp.eigenvectors;
        let lambda = Array2::from_diag(&decomp.eigenvalues);
        let rebuilt = v.dot(&lambda).dot(&v.t());
        for (a, b) in rebuilt.iter().zip(m.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
        assert_relative_eq!(decomp.eigenvalues.sum(), 29.0, epsilon = 1e-10);
    }

    #[test]
    fn test_jacobi_rejects_non_square() {
        let m = Array2::<f64>::zeros((2, 3));
        assert!(jacobi_eigendecomp(&m, 10, 1e-12).is_err());
    }

    #[test]
    fn test_positive_semidefinite() {
        let psd = array![[1.0, 1.0], [1.0, 1.0]];
        assert!(is_positive_semidefinite(&psd, 1e-12));

        // eigenvalues 3 and -1
        let indefinite = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(!is_positive_semidefinite(&indefinite, 1e-12));
    }

    #[test]
    fn test_condition_number() {
        let m = array![[4.0, 0.0], [0.0, 1.0]];
        assert_relative_eq!(condition_number(&m), 4.0, epsilon = 1e-12);
        let singular = array![[1.0, 1.0], [1.0, 1.0]];
        assert!(condition_number(&singular).is_infinite());
    }

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4.0, 2.0, 0.4], [2.0, 5.0, 1.0], [0.4, 1.0, 3.0]];
        let x_true = array![1.0, -2.0, 0.5];
        let b = a.dot(&x_true);

        let x = cholesky_solve(&a, b.view()).unwrap();
        for (got, want) in x.iter().zip(x_true.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(matches!(
            cholesky(&a),
            Err(CovarianceError::NotPositiveDefinite)
        ));
    }

    #[test]
    fn test_average_correlation() {
        let r = array![[1.0, 0.2, 0.4], [0.2, 1.0, 0.6], [0.4, 0.6, 1.0]];
        assert_relative_eq!(average_correlation(&r), 0.4, epsilon = 1e-12);
        assert_eq!(average_correlation(&array![[1.0]]), 0.0);
    }

    #[test]
    fn test_scale_correlation() {
        let r = array![[1.0, 0.5], [0.5, 1.0]];
        let cov = scale_correlation(&r, array![2.0, 3.0].view()).unwrap();
        assert_eq!(cov, array![[4.0, 3.0], [3.0, 9.0]]);
    }
}
