//! gmm::moment — the moment-model capability and its dimension bookkeeping.
//!
//! Purpose
//! -------
//! Define the single operation the estimator needs from a concrete problem:
//! given `θ` and opaque data, return the per-observation moment realizations
//! `g` (`T×q`) and the mean Jacobian `dg` (`q×k`). Also infer and enforce the
//! `(T, q, k)` dimensions of a run.
//!
//! Key behaviors
//! -------------
//! - [`MomentModel`] is implemented per problem (e.g. [`LinearIV`]) and
//!   composed with the estimator rather than inherited from it.
//! - [`MomentDims::infer`] validates the first evaluation: non-empty sample,
//!   Jacobian conformable with `θ` and with `g`, and `q > k`.
//! - [`MomentDims::check`] rejects later evaluations whose shape differs
//!   from the inferred one.
//! - [`MomentFn`] adapts a closure into a data-free [`MomentModel`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Models are deterministic for a fixed `(θ, data)`.
//! - `dg` is the derivative of the column means of `g`, not of the
//!   per-observation rows.
//!
//! Conventions
//! -----------
//! - Rows of `g` are observations, columns are moment conditions.
//!
//! [`LinearIV`]: crate::gmm::models::LinearIV
use ndarray::{Array1, Array2, Axis};

use crate::{
    gmm::errors::{GMMError, GMMResult},
    optimization::minimizer::Theta,
};

/// Problem-specific moment conditions.
///
/// - `type Data`: observations carried unchanged into every evaluation.
/// - `moments(&Theta, &Data) -> GMMResult<Moments>`: `(g, dg)` at `θ`.
///   Domain failures should be reported as [`GMMError::MomentModel`].
pub trait MomentModel {
    type Data: 'static;

    fn moments(&self, theta: &Theta, data: &Self::Data) -> GMMResult<Moments>;
}

/// Moment realizations and their mean Jacobian at one parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Moments {
    /// `T×q` per-observation moments.
    pub g: Array2<f64>,
    /// `q×k` derivative of the moment means.
    pub dg: Array2<f64>,
}

impl Moments {
    pub fn new(g: Array2<f64>, dg: Array2<f64>) -> Self {
        Moments { g, dg }
    }

    /// Column means `ḡ` of the moment matrix.
    ///
    /// # Errors
    /// [`GMMError::EmptySample`] when `g` has no rows.
    pub fn mean(&self) -> GMMResult<Array1<f64>> {
        self.g.mean_axis(Axis(0)).ok_or(GMMError::EmptySample)
    }
}

/// Run dimensions `(T, q, k)` fixed by the first moment evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MomentDims {
    pub n_obs: usize,
    pub n_moments: usize,
    pub n_params: usize,
}

impl MomentDims {
    /// Infer and validate dimensions from an initial evaluation.
    ///
    /// Parameters
    /// ----------
    /// - `moments`: `&Moments`
    ///   Evaluation at the starting parameter vector.
    /// - `n_params`: `usize`
    ///   Length `k` of the parameter vector.
    ///
    /// Returns
    /// -------
    /// `GMMResult<MomentDims>`
    ///   The validated `(T, q, k)` triple.
    ///
    /// Errors
    /// ------
    /// Checked in this order:
    /// - `GMMError::EmptySample` if `T == 0`.
    /// - `GMMError::JacobianDimMismatch` if `dg` does not have `k` columns.
    /// - `GMMError::MomentDimMismatch` if `dg` does not have `q` rows.
    /// - `GMMError::InsufficientDegreesOfFreedom` if `q ≤ k`.
    pub fn infer(moments: &Moments, n_params: usize) -> GMMResult<Self> {
        let (n_obs, n_moments) = moments.g.dim();
        if n_obs == 0 {
            return Err(GMMError::EmptySample);
        }
        if moments.dg.ncols() != n_params {
            return Err(GMMError::JacobianDimMismatch {
                expected: n_params,
                found: moments.dg.ncols(),
            });
        }
        if moments.dg.nrows() != n_moments {
            return Err(GMMError::MomentDimMismatch {
                moments: n_moments,
                jacobian_rows: moments.dg.nrows(),
            });
        }
        if n_moments <= n_params {
            return Err(GMMError::InsufficientDegreesOfFreedom {
                moments: n_moments,
                params: n_params,
            });
        }
        Ok(MomentDims { n_obs, n_moments, n_params })
    }

    /// Verify that a later evaluation keeps the inferred dimensions.
    ///
    /// # Errors
    /// [`GMMError::MomentShapeChanged`] when `g` is not `T×q` or `dg` is not
    /// `q×k`.
    pub fn check(&self, moments: &Moments) -> GMMResult<()> {
        let (n_obs, n_moments) = moments.g.dim();
        let (dg_rows, n_params) = moments.dg.dim();
        if (n_obs, n_moments, n_params) != self.as_tuple() || dg_rows != n_moments {
            return Err(GMMError::MomentShapeChanged {
                expected: self.as_tuple(),
                found: (n_obs, n_moments, n_params),
            });
        }
        Ok(())
    }

    /// Degrees of freedom `q − k` of the J-test.
    pub fn df(&self) -> usize {
        self.n_moments - self.n_params
    }

    pub fn as_tuple(&self) -> (usize, usize, usize) {
        (self.n_obs, self.n_moments, self.n_params)
    }
}

/// Closure-backed moment model without separate data.
///
/// The closure captures whatever observations it needs; `Data` is `()`.
pub struct MomentFn<F>(pub F);

impl<F> MomentModel for MomentFn<F>
where
    F: Fn(&Theta) -> GMMResult<Moments>,
{
    type Data = ();

    fn moments(&self, theta: &Theta, _data: &()) -> GMMResult<Moments> {
        (self.0)(theta)
    }
}
