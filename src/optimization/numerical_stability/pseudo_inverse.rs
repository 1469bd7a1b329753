//! Eigen-based Moore–Penrose pseudo-inverse for symmetric matrices.
//!
//! GMM weighting matrices and sandwich covariances are inverses of symmetric
//! positive semi-definite matrices that can be singular or badly conditioned
//! (collinear instruments, degenerate moment columns, SU kernel on constant
//! moments). Rather than failing, every inversion in the crate goes through
//! [`symmetric_pinv`], which discards near-zero eigen-directions the way
//! NumPy's `pinv` does with `rcond = 1e-15`.
//!
//! # Provided items
//! - [`PINV_RCOND`]: relative eigenvalue cutoff.
//! - [`NEGATIVE_OBJECTIVE_RTOL`]: relative tolerance below which a quadratic
//!   form is treated as genuinely negative.
//! - [`symmetric_pinv`]: `A⁺` for a (numerically) symmetric `A`.
//! - [`fill_dmatrix`]: `ndarray` → `nalgebra` copy used for the eigensolver.
use nalgebra::DMatrix;
use ndarray::Array2;

/// Relative eigenvalue cutoff for [`symmetric_pinv`].
///
/// Eigenvalues with `|λ| <= PINV_RCOND · max|λ|` are treated as zero.
pub const PINV_RCOND: f64 = 1e-15;

/// Relative tolerance for the sign check on a quadratic form `ḡᵀWḡ`.
///
/// Values above `-NEGATIVE_OBJECTIVE_RTOL · |ḡ|² · max|W|` are rounding noise;
/// anything below is a real invariant violation.
pub const NEGATIVE_OBJECTIVE_RTOL: f64 = 1e-10;

/// Relative tolerance for treating a weighting matrix as symmetric.
///
/// `|Wᵢⱼ − Wⱼᵢ| <= SYMMETRY_RTOL · max(1, max|W|)` passes.
pub const SYMMETRY_RTOL: f64 = 1e-10;

/// Moore–Penrose pseudo-inverse of a symmetric matrix.
///
/// # Arguments
/// - `matrix`: square `n×n` matrix. It is symmetrized as `(A + Aᵀ)/2` before
///   decomposition, so small asymmetries from floating-point accumulation are
///   harmless.
///
/// # Returns
/// `A⁺ = Σ_{|λ_k| > cutoff} q_k q_kᵀ / λ_k` with `cutoff = PINV_RCOND · max|λ|`.
/// Never fails: a singular input yields the least-squares-consistent inverse
/// on the non-null eigenspace, and an all-zero input yields an all-zero matrix.
///
/// # Panics
/// Panics if `matrix` is not square; callers validate shapes upstream.
pub fn symmetric_pinv(matrix: &Array2<f64>) -> Array2<f64> {
    let n = matrix.nrows();
    assert_eq!(n, matrix.ncols(), "symmetric_pinv requires a square matrix");
    if n == 0 {
        return Array2::zeros((0, 0));
    }

    let symmetric = (matrix + &matrix.t()) * 0.5;
    let mut nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(&symmetric, &mut nalg);

    let eigen_decomp = nalg.symmetric_eigen();
    let q = eigen_decomp.eigenvectors;
    let eigenvals = eigen_decomp.eigenvalues;
    let max_abs = eigenvals.iter().fold(0.0_f64, |acc, lambda| acc.max(lambda.abs()));
    let cutoff = PINV_RCOND * max_abs;

    let mut pinv = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in eigenvals.iter().enumerate() {
        if lambda.abs() <= cutoff {
            continue;
        }
        let inv_lambda = 1.0 / lambda;
        for j in 0..n {
            let coeff = q[(j, k)] * inv_lambda;
            for i in 0..n {
                pinv[[i, j]] += q[(i, k)] * coeff;
            }
        }
    }
    pinv
}

/// Copy an `ndarray` matrix into a preallocated `nalgebra::DMatrix`.
///
/// The copy proceeds column by column to match `DMatrix`'s column-major
/// storage. No symmetrization is performed here.
///
/// # Panics
/// May panic if the two matrices have different shapes.
pub fn fill_dmatrix(source: &Array2<f64>, target: &mut DMatrix<f64>) {
    let (nrows, ncols) = source.dim();
    for j in 0..ncols {
        for i in 0..nrows {
            target[(i, j)] = source[[i, j]];
        }
    }
}
