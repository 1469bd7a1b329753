//! gmm::variance — asymptotic covariance of the GMM estimate.
//!
//! Purpose
//! -------
//! Compute `V = (dgᵀ S⁺ dg)⁺ / T` at a parameter vector, where `S⁺` is the
//! optimal weighting matrix evaluated at that same vector (Hansen, 1982).
//!
//! Key behaviors
//! -------------
//! - Evaluates the moment model once for `dg` and delegates `S⁺` to the
//!   [`WeightMatrixEstimator`].
//! - Singular `dgᵀ S⁺ dg` is pseudo-inverted; the resulting standard errors
//!   may be zero or undefined and are reported as produced.
//! - `k = 1` needs no special casing: the bread is a `1×1` matrix.
//!
//! Downstream usage
//! ----------------
//! - `gmm::estimator` calls [`VarianceEstimator::compute`] once, after the
//!   last step, and derives standard errors and t-statistics from it.
use ndarray::Array2;

use crate::{
    gmm::{errors::GMMResult, moment::MomentModel, weights::WeightMatrixEstimator},
    inference::sandwich::gmm_covariance,
    optimization::minimizer::Theta,
};

/// Sandwich covariance estimator built on a [`WeightMatrixEstimator`].
pub struct VarianceEstimator<'a, M: MomentModel> {
    weights: WeightMatrixEstimator<'a, M>,
}

impl<'a, M: MomentModel> VarianceEstimator<'a, M> {
    pub fn new(weights: WeightMatrixEstimator<'a, M>) -> Self {
        VarianceEstimator { weights }
    }

    /// `k×k` covariance `V` of `θ̂` at `theta`.
    ///
    /// # Errors
    /// Moment-model failures, a change in `(T, q, k)`, and HAC input errors.
    pub fn compute(&self, theta: &Theta) -> GMMResult<Array2<f64>> {
        let dims = self.weights.dims();
        let moments = self.weights.model().moments(theta, self.weights.data())?;
        dims.check(&moments)?;
        let optimal = self.weights.compute(theta)?;
        Ok(gmm_covariance(&moments.dg, &optimal, dims.n_obs)?)
    }
}
