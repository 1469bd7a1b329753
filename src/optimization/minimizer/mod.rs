//! minimizer — argmin-powered quasi-Newton minimization of scalar objectives.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed layer for **minimizing** a scalar
//! objective `f(θ)` over an unconstrained parameter vector. Callers implement
//! a single trait, [`Objective`], and invoke [`minimize`] to run BFGS or
//! L-BFGS with a configurable line search, tolerances, and a
//! finite-difference gradient fallback.
//!
//! Key behaviors
//! -------------
//! - Expose the objective to Argmin unchanged via [`adapter::ArgMinAdapter`].
//! - Expose a single, user-facing entrypoint [`minimize`] that:
//!   - validates the starting point and calls [`Objective::check`],
//!   - selects a solver via [`builders`] based on [`Method`] and
//!     [`LineSearcher`],
//!   - executes it via [`run::run_bfgs`] / [`run::run_lbfgs`], and
//!   - normalizes results into an [`OptimOutcome`].
//! - Fall back to finite differences ([`finite_diff`]) when an objective
//!   does not provide an analytic gradient.
//! - Centralize configuration ([`Tolerances`], [`MinimizerOptions`]) and
//!   validation logic ([`validation`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Objective::value`] and [`Objective::grad`] must report invalid
//!   inputs as [`OptError`](crate::optimization::errors::OptError) values,
//!   not panics. Such errors abort the run and are returned intact.
//! - Convergence means the solver met its own criterion. Hitting the
//!   iteration cap returns normally with `converged == false`.
//! - BFGS starts from the identity inverse Hessian.
//!
//! Conventions
//! -----------
//! - Parameters are [`Theta`] (`Array1<f64>`); gradients are [`Grad`].
//! - Errors bubble up as `OptResult<T>`; this module and its children never
//!   intentionally panic or use `unsafe`.
//!
//! Downstream usage
//! ----------------
//! - `gmm::objective::GMMObjective` implements [`Objective`] for the GMM
//!   criterion `ḡᵀWḡ`; `gmm::estimator` calls [`minimize`] once per step.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover gradient handling in [`adapter`], solver
//!   construction in [`builders`], FD fallbacks in [`finite_diff`],
//!   configuration in [`traits`], and full solves in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::traits::{
    LineSearcher, Method, MinimizerOptions, Objective, OptimOutcome, Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_gmm::optimization::minimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{
        LineSearcher, Method, MinimizerOptions, Objective, OptimOutcome, Tolerances,
    };
    pub use super::types::{Cost, Grad, Theta};
}
