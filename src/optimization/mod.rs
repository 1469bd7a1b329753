//! optimization — quasi-Newton minimizer, generalized inverses, and error surface.
//!
//! Purpose
//! -------
//! Provide the numerical engine underneath GMM estimation: an Argmin-backed
//! minimizer for scalar objectives, an eigen-based pseudo-inverse for
//! symmetric matrices, and a single error/result surface. Callers implement
//! an objective, choose tolerances, and obtain minimizers and diagnostics
//! without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **minimizing** objectives `f(θ)`
//!   (`minimizer`), including the choice of BFGS / L-BFGS, line search and
//!   stopping criteria.
//! - Supply shared numerical primitives (`numerical_stability`): the
//!   Moore–Penrose inverse of symmetric matrices and the tolerances used
//!   around it.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers operate in an unconstrained parameter space `θ` and assume
//!   that inputs are finite once validation has passed; invalid states are
//!   reported as `OptError`, not panics.
//! - Errors raised inside an objective cross Argmin's boundary boxed in
//!   `argmin::core::Error` and are recovered unchanged on the way out.
//!
//! Conventions
//! -----------
//! - Parameters and gradients are `ndarray` aliases (`Theta`, `Grad`).
//! - Public optimization entrypoints that can fail return `OptResult<T>`;
//!   callers never see raw Argmin errors.
//! - This module and its submodules avoid I/O. The only logging is the
//!   optional per-iteration observer behind the `obs_slog` feature.
//!
//! Downstream usage
//! ----------------
//! - `gmm` implements `Objective` for the GMM criterion and calls
//!   `minimize` once per estimation step.
//! - `inference` and `gmm` call `symmetric_pinv` for weighting and
//!   covariance matrices.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules focus on local concerns:
//!   - `minimizer`: solver wiring, tolerance handling, FD fallbacks, and
//!     solves on convex quadratics.
//!   - `numerical_stability`: pseudo-inverse identities on regular and
//!     singular matrices.
//!   - `errors`: conversions from backend errors into `OptError`.

pub mod errors;
pub mod minimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_gmm::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::minimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
