//! minimizer::finite_diff — finite-difference gradients with error capture.
//!
//! Purpose
//! -------
//! Provide the numerical-gradient fallback used when an [`Objective`] does
//! not supply an analytic gradient, without letting the rest of the
//! optimizer depend directly on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - [`central_diff_gradient`] tries central differences first and falls
//!   back to forward differences when an evaluation failed or the central
//!   estimate is non-finite.
//! - [`run_fd_diff`] computes a forward-difference gradient and validates it.
//!
//! Invariants & assumptions
//! ------------------------
//! - `finitediff` closures must return plain `f64`, so evaluation errors are
//!   routed into a shared `RefCell<Option<Error>>` and the closure returns
//!   `NaN`. The first captured error wins.
//! - Gradients returned from this module always satisfy [`validate_grad`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover successful gradients, closure-error propagation, the
//!   central→forward fallback, and non-finite gradients.
//!
//! [`Objective`]: crate::optimization::minimizer::traits::Objective
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        types::{Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Finite-difference gradient of a fallible scalar function.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Point at which the gradient is approximated.
/// - `func`: `&G`
///   Fallible objective `θ ↦ Result<f64, Error>`.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   A validated gradient. Central differences are used when every
///   evaluation succeeded and the result is finite; otherwise one retry with
///   forward differences is made.
///
/// Errors
/// ------
/// - The error captured during the forward-difference retry, converted via
///   `From<argmin::core::Error> for OptError` (which recovers crate errors).
/// - `OptError::InvalidGradient` when the forward-difference gradient is
///   still non-finite.
pub fn central_diff_gradient<G>(theta: &Theta, func: &G) -> OptResult<Grad>
where
    G: Fn(&Theta) -> Result<f64, Error>,
{
    let closure_err: RefCell<Option<Error>> = RefCell::new(None);
    let cost_func = |x: &Theta| -> f64 {
        match func(x) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };
    let fd_grad = theta.central_diff(&cost_func);
    if closure_err.borrow().is_none() && validate_grad(&fd_grad, theta.len()).is_ok() {
        return Ok(fd_grad);
    }
    run_fd_diff(theta, &cost_func, &closure_err)
}

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Point in parameter space; its length defines the gradient dimension.
/// - `func`: `&G`
///   Closure passed to `forward_diff`. It is assumed to route evaluation
///   errors into `closure_err` and return `NaN` in that case.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared error slot. Cleared on entry and inspected after the FD call.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   `Ok(grad)` when no error was captured and the gradient passes
///   [`validate_grad`].
///
/// Errors
/// ------
/// - `OptError` (via `impl From<Error> for OptError`) for a captured error.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}
