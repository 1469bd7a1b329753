//! gmm::models — ready-made moment models.
//!
//! Purpose
//! -------
//! Provide the linear instrumental-variables model `y = Xθ + u` with
//! instruments `Z` and moment conditions `E[z_t u_t] = 0`, both as a usable
//! estimator input and as the reference case for the closed-form checks.
//!
//! Key behaviors
//! -------------
//! - [`IVData::new`] validates that `y`, `X` and `Z` share one sample size
//!   and are finite.
//! - [`LinearIV`] returns `g_t = z_t (y_t − x_tθ)` (`T×q`) and the mean
//!   Jacobian `dg = −ZᵀX / T` (`q×k`), which does not depend on `θ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `θ` must have one entry per column of `X`; otherwise the evaluation
//!   fails with [`GMMError::JacobianDimMismatch`] rather than panicking.
use ndarray::{Array1, Array2, Axis};

use crate::{
    gmm::{
        errors::{GMMError, GMMResult},
        moment::{MomentModel, Moments},
    },
    optimization::minimizer::Theta,
};

/// Observations for a linear IV regression.
///
/// Fields
/// ------
/// - `y`: `T` outcomes.
/// - `x`: `T×k` regressors (include a column of ones for an intercept).
/// - `z`: `T×q` instruments (exogenous regressors instrument themselves).
#[derive(Debug, Clone, PartialEq)]
pub struct IVData {
    pub y: Array1<f64>,
    pub x: Array2<f64>,
    pub z: Array2<f64>,
}

impl IVData {
    /// Validate and bundle IV observations.
    ///
    /// # Errors
    /// - `GMMError::EmptySample` if `y` is empty.
    /// - `GMMError::SampleDimMismatch` if `x` or `z` has a different number
    ///   of rows than `y`.
    /// - `GMMError::MomentModel` if any entry is non-finite.
    pub fn new(y: Array1<f64>, x: Array2<f64>, z: Array2<f64>) -> GMMResult<Self> {
        let n = y.len();
        if n == 0 {
            return Err(GMMError::EmptySample);
        }
        for rows in [x.nrows(), z.nrows()] {
            if rows != n {
                return Err(GMMError::SampleDimMismatch { expected: n, found: rows });
            }
        }
        let finite = y.iter().chain(x.iter()).chain(z.iter()).all(|v| v.is_finite());
        if !finite {
            return Err(GMMError::MomentModel {
                text: "IV data must contain only finite values".to_string(),
            });
        }
        Ok(IVData { y, x, z })
    }

    pub fn n_obs(&self) -> usize {
        self.y.len()
    }
}

/// Linear instrumental-variables moment conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearIV;

impl MomentModel for LinearIV {
    type Data = IVData;

    fn moments(&self, theta: &Theta, data: &IVData) -> GMMResult<Moments> {
        if theta.len() != data.x.ncols() {
            return Err(GMMError::JacobianDimMismatch {
                expected: theta.len(),
                found: data.x.ncols(),
            });
        }
        let residuals = &data.y - &data.x.dot(theta);
        let g = &data.z * &residuals.insert_axis(Axis(1));
        let dg = data.z.t().dot(&data.x) / -(data.n_obs() as f64);
        Ok(Moments::new(g, dg))
    }
}
