//! gmm — multi-step Generalized Method of Moments estimation.
//!
//! Purpose
//! -------
//! Estimate the parameters of overidentified moment-condition models by
//! minimizing the weighted quadratic form `ḡ(θ)ᵀ W ḡ(θ)`, re-estimating `W`
//! from the HAC long-run covariance of the moments between steps, and report
//! asymptotic inference (standard errors, t-statistics, Hansen's J-test).
//!
//! Key behaviors
//! -------------
//! - [`MomentModel`] is the single capability a problem supplies:
//!   `(g, dg)` at `θ`. [`LinearIV`] is a ready-made instrumental-variables
//!   implementation; [`MomentFn`] wraps a closure.
//! - [`GMMObjective`] exposes the criterion and its gradient to the
//!   minimizer.
//! - [`WeightMatrixEstimator`] builds `W = S⁺` and [`VarianceEstimator`]
//!   the sandwich covariance `(dgᵀ S⁺ dg)⁺ / T`.
//! - [`GMMEstimator`] runs the loop (default two-step efficient GMM) and
//!   returns an [`EstimationResult`] that [`report`] formats.
//!
//! Invariants & assumptions
//! ------------------------
//! - `q > k` and `dg` has `k` columns; both are checked once, from the
//!   first moment evaluation, before any optimization.
//! - `(T, q, k)` stay fixed for the whole run.
//! - Weighting and covariance matrices are symmetric; singular ones are
//!   pseudo-inverted, never rejected.
//!
//! Conventions
//! -----------
//! - Moment matrices are `T×q` (rows are observations); Jacobians are `q×k`.
//! - Errors are returned as [`GMMError`]; failures raised inside the solver
//!   are mapped back to their estimation-level kind.
//! - Progress is logged through the `log` facade; nothing in this module
//!   prints except [`report::print_report`].
//!
//! Downstream usage
//! ----------------
//! - Rust callers build a model, call [`GMMEstimator::new`] and
//!   [`GMMEstimator::estimate`], then read or print the result.
//! - The Python bindings in the crate root wrap a Python callable as a
//!   [`MomentModel`] and expose the same flow.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests on hand-computable cases.
//! - `tests/integration_gmm_pipeline.rs` checks closed-form IV agreement,
//!   exact moment conditions, a `T = 500` scenario, and re-weighting
//!   idempotence.

pub mod errors;
pub mod estimator;
pub mod models;
pub mod moment;
pub mod objective;
pub mod options;
pub mod report;
pub mod variance;
pub mod weights;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{GMMError, GMMResult};
pub use self::estimator::{EstimationResult, GMMEstimator, StepRecord};
pub use self::models::{IVData, LinearIV};
pub use self::moment::{MomentDims, MomentFn, MomentModel, Moments};
pub use self::objective::GMMObjective;
pub use self::options::{DEFAULT_STEPS, GMMOptions};
pub use self::report::{format_vector, print_report, render};
pub use self::variance::VarianceEstimator;
pub use self::weights::WeightMatrixEstimator;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_gmm::gmm::prelude::*;
//
// to import the estimation surface in a single line.

pub mod prelude {
    pub use super::errors::{GMMError, GMMResult};
    pub use super::estimator::{EstimationResult, GMMEstimator};
    pub use super::models::{IVData, LinearIV};
    pub use super::moment::{MomentFn, MomentModel, Moments};
    pub use super::options::GMMOptions;
    pub use super::report::print_report;
}
