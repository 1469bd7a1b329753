//! inference::sandwich — asymptotic covariance and Wald-type statistics for GMM.
//!
//! Purpose
//! -------
//! Turn a moment Jacobian and an efficient weighting matrix into the
//! asymptotic covariance of the GMM estimate (Hansen, 1982),
//!
//! ```text
//! V = (Gᵀ S⁻¹ G)⁺ / T,
//! ```
//!
//! where `G = dg` is the `q×k` mean Jacobian, `S⁻¹` the `q×q` optimal
//! weighting matrix and `T` the sample size, then derive per-parameter
//! standard errors and t-statistics.
//!
//! Key behaviors
//! -------------
//! - The bread `GᵀWG` is inverted with the eigen-based
//!   [`symmetric_pinv`], so a singular bread yields a (possibly degenerate)
//!   covariance rather than an error.
//! - `k = 1` needs no special casing: the bread is a `1×1` matrix.
//! - Standard errors are `sqrt(diag(V))`; t-statistics are `θ / se`. Zero or
//!   non-finite values are returned as produced and left to the caller to
//!   flag.
//!
//! Invariants & assumptions
//! ------------------------
//! - `weights` is `q×q` with `q = dg.nrows()`; anything else is
//!   [`InferenceError::ShapeMismatch`].
//! - `n_obs > 0`; zero is [`InferenceError::EmptySeries`].
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    optimization::numerical_stability::symmetric_pinv,
};
use ndarray::{Array1, Array2};

/// Sandwich covariance `V = (dgᵀ W dg)⁺ / T`.
///
/// Parameters
/// ----------
/// - `dg`: `&Array2<f64>`
///   `q×k` mean Jacobian of the moments at the estimate.
/// - `weights`: `&Array2<f64>`
///   `q×q` efficient weighting matrix, typically the pseudo-inverse of the
///   HAC long-run covariance at the same estimate.
/// - `n_obs`: `usize`
///   Sample size `T`.
///
/// Returns
/// -------
/// `InferenceResult<Array2<f64>>`
///   Symmetric `k×k` covariance matrix.
///
/// Errors
/// ------
/// - `InferenceError::ShapeMismatch` when `weights` is not `q×q`.
/// - `InferenceError::EmptySeries` when `n_obs == 0`.
pub fn gmm_covariance(
    dg: &Array2<f64>, weights: &Array2<f64>, n_obs: usize,
) -> InferenceResult<Array2<f64>> {
    let q = dg.nrows();
    if weights.dim() != (q, q) {
        return Err(InferenceError::ShapeMismatch { expected: (q, q), found: weights.dim() });
    }
    if n_obs == 0 {
        return Err(InferenceError::EmptySeries);
    }
    let bread = dg.t().dot(weights).dot(dg);
    Ok(symmetric_pinv(&bread) / n_obs as f64)
}

/// Standard errors `sqrt(diag(V))`.
///
/// A negative diagonal entry (only possible through rounding on a degenerate
/// covariance) produces `NaN`, which is reported rather than repaired.
pub fn standard_errors(covariance: &Array2<f64>) -> Array1<f64> {
    covariance.diag().mapv(f64::sqrt)
}

/// Element-wise t-statistics `θ_i / se_i`.
///
/// # Errors
/// `InferenceError::ShapeMismatch` when `theta` and `se` differ in length.
pub fn t_statistics(theta: &Array1<f64>, se: &Array1<f64>) -> InferenceResult<Array1<f64>> {
    if theta.len() != se.len() {
        return Err(InferenceError::ShapeMismatch {
            expected: (theta.len(), 1),
            found: (se.len(), 1),
        });
    }
    Ok(theta / se)
}
