//! gmm::objective — the GMM criterion `f(θ) = ḡ(θ)ᵀ W ḡ(θ)` and its gradient.
//!
//! Purpose
//! -------
//! Bind a moment model to a fixed weighting matrix and expose the resulting
//! quadratic form to the minimizer through the
//! [`Objective`](crate::optimization::minimizer::Objective) trait.
//!
//! Key behaviors
//! -------------
//! - [`GMMObjective::evaluate`] returns `f` and, when gradients are enabled,
//!   `∇f = 2 ḡᵀ W dg`, with `W` held fixed for the evaluation.
//! - A value below `−NEGATIVE_OBJECTIVE_RTOL · |ḡ|² · max|W|` is reported as
//!   [`GMMError::NegativeObjective`]; it is never clamped.
//! - With gradients disabled, `grad` reports `GradientNotImplemented` and the
//!   minimizer falls back to finite differences.
//!
//! Invariants & assumptions
//! ------------------------
//! - `W` is `q×q`, finite and symmetric ([`validate_weights`]), so
//!   `dgᵀ(Wḡ)` is the gradient of `ḡᵀWḡ` up to the factor 2. The moment
//!   dimensions match the run's [`MomentDims`].
//! - Errors cross the solver boundary as `OptError` (see
//!   `From<GMMError> for OptError`) and are lifted back by the estimator.
use ndarray::Array2;

use crate::{
    gmm::{
        errors::{GMMError, GMMResult},
        moment::{MomentDims, MomentModel},
    },
    optimization::{
        errors::{OptError, OptResult},
        minimizer::{Cost, Grad, Objective, Theta},
        numerical_stability::{NEGATIVE_OBJECTIVE_RTOL, SYMMETRY_RTOL},
    },
};

/// GMM criterion for one estimation step.
///
/// Fields
/// ------
/// - `model`: moment conditions evaluated at every call.
/// - `weights`: `q×q` weighting matrix fixed for the step.
/// - `dims`: run dimensions every evaluation is checked against.
/// - `use_gradient`: whether the analytic gradient is offered.
pub struct GMMObjective<'a, M: MomentModel> {
    model: &'a M,
    weights: &'a Array2<f64>,
    dims: MomentDims,
    use_gradient: bool,
}

impl<'a, M: MomentModel> GMMObjective<'a, M> {
    /// Bind `model` to `weights`.
    ///
    /// # Errors
    /// Any error from [`validate_weights`].
    pub fn new(
        model: &'a M, weights: &'a Array2<f64>, dims: MomentDims, use_gradient: bool,
    ) -> GMMResult<Self> {
        validate_weights(weights, dims.n_moments)?;
        Ok(GMMObjective { model, weights, dims, use_gradient })
    }

    /// Evaluate the criterion and, if enabled, its gradient at `theta`.
    ///
    /// Returns
    /// -------
    /// `GMMResult<(f64, Option<Grad>)>`
    ///   `f = ḡᵀWḡ` and `Some(2 ḡᵀ W dg)` when `use_gradient` is on.
    ///
    /// Errors
    /// ------
    /// - Any error from the moment model.
    /// - `GMMError::MomentShapeChanged` if `(T, q, k)` drifted.
    /// - `GMMError::NegativeObjective` if `f` is negative beyond rounding.
    pub fn evaluate(&self, theta: &Theta, data: &M::Data) -> GMMResult<(f64, Option<Grad>)> {
        let moments = self.model.moments(theta, data)?;
        self.dims.check(&moments)?;
        let g_bar = moments.mean()?;
        let w_g = self.weights.dot(&g_bar);
        let value = g_bar.dot(&w_g);

        let scale = g_bar.dot(&g_bar) * self.weights.iter().fold(0.0_f64, |m, w| m.max(w.abs()));
        if value < -NEGATIVE_OBJECTIVE_RTOL * scale {
            return Err(GMMError::NegativeObjective { value });
        }

        let grad = self.use_gradient.then(|| moments.dg.t().dot(&w_g) * 2.0);
        Ok((value, grad))
    }

    pub fn dims(&self) -> MomentDims {
        self.dims
    }
}

/// Check that `weights` is a usable `q×q` weighting matrix.
///
/// # Errors
/// - `GMMError::WeightsDimMismatch` if `weights` is not `q×q`.
/// - `GMMError::InvalidWeights` for a non-finite entry.
/// - `GMMError::AsymmetricWeights` if `|Wᵢⱼ − Wⱼᵢ|` exceeds
///   `SYMMETRY_RTOL · max(1, max|W|)`.
pub fn validate_weights(weights: &Array2<f64>, q: usize) -> GMMResult<()> {
    if weights.dim() != (q, q) {
        return Err(GMMError::WeightsDimMismatch { expected: (q, q), found: weights.dim() });
    }
    if let Some(((row, col), &value)) = weights.indexed_iter().find(|(_, w)| !w.is_finite()) {
        return Err(GMMError::InvalidWeights { row, col, value });
    }
    let tol = SYMMETRY_RTOL * weights.iter().fold(1.0_f64, |m, w| m.max(w.abs()));
    for row in 0..q {
        for col in (row + 1)..q {
            let gap = (weights[[row, col]] - weights[[col, row]]).abs();
            if gap > tol {
                return Err(GMMError::AsymmetricWeights { row, col, gap });
            }
        }
    }
    Ok(())
}

impl<'a, M: MomentModel> Objective for GMMObjective<'a, M> {
    type Data = M::Data;

    fn value(&self, theta: &Theta, data: &M::Data) -> OptResult<Cost> {
        let (value, _) = self.evaluate(theta, data)?;
        Ok(value)
    }

    fn check(&self, theta: &Theta, _data: &M::Data) -> OptResult<()> {
        if theta.len() != self.dims.n_params {
            return Err(OptError::GradientDimMismatch {
                expected: self.dims.n_params,
                found: theta.len(),
            });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, data: &M::Data) -> OptResult<Grad> {
        if !self.use_gradient {
            return Err(OptError::GradientNotImplemented);
        }
        match self.evaluate(theta, data)? {
            (_, Some(grad)) => Ok(grad),
            (_, None) => Err(OptError::GradientNotImplemented),
        }
    }
}
