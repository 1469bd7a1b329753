//! gmm::weights — optimal weighting matrix `W = S⁺` from the HAC long-run
//! covariance of the moments.
//!
//! [`WeightMatrixEstimator::compute`] evaluates the moment model at `θ`,
//! builds `S` with [`long_run_covariance`] under the configured kernel and
//! bandwidth, and returns its Moore–Penrose inverse. A singular `S` is not an
//! error; the pseudo-inverse simply drops its null directions.
use ndarray::Array2;

use crate::{
    gmm::{
        errors::GMMResult,
        moment::{MomentDims, MomentModel},
    },
    inference::hac::{HACOptions, long_run_covariance},
    optimization::{minimizer::Theta, numerical_stability::symmetric_pinv},
};

/// Builds HAC-based weighting matrices for one run.
pub struct WeightMatrixEstimator<'a, M: MomentModel> {
    model: &'a M,
    data: &'a M::Data,
    hac: &'a HACOptions,
    dims: MomentDims,
}

impl<'a, M: MomentModel> WeightMatrixEstimator<'a, M> {
    pub fn new(model: &'a M, data: &'a M::Data, hac: &'a HACOptions, dims: MomentDims) -> Self {
        WeightMatrixEstimator { model, data, hac, dims }
    }

    /// Long-run covariance `S` of the moments at `theta`.
    pub fn long_run(&self, theta: &Theta) -> GMMResult<Array2<f64>> {
        let moments = self.model.moments(theta, self.data)?;
        self.dims.check(&moments)?;
        Ok(long_run_covariance(self.hac, &moments.g)?)
    }

    /// Optimal weighting matrix `S⁺` at `theta` (symmetric, `q×q`).
    ///
    /// # Errors
    /// Moment-model failures, a change in `(T, q, k)`, and HAC input errors.
    pub fn compute(&self, theta: &Theta) -> GMMResult<Array2<f64>> {
        let covariance = self.long_run(theta)?;
        Ok(symmetric_pinv(&covariance))
    }

    pub fn model(&self) -> &'a M {
        self.model
    }

    pub fn data(&self) -> &'a M::Data {
        self.data
    }

    pub fn dims(&self) -> MomentDims {
        self.dims
    }
}
