//! inference — HAC long-run covariance and GMM sandwich inference.
//!
//! Purpose
//! -------
//! Provide the post-estimation building blocks of a GMM run: kernel-weighted
//! long-run covariance matrices of moment realizations (used to build the
//! optimal weighting matrix) and the sandwich covariance of the parameter
//! estimate with its standard errors and t-statistics.
//!
//! Key behaviors
//! -------------
//! - Define a unified error and result type, [`InferenceError`] and
//!   [`InferenceResult`], for inference-specific failures (unknown kernels,
//!   empty series, non-conformable inputs).
//! - Enumerate HAC kernel families with [`KernelType`] (SU, Bartlett,
//!   Parzen, Quadratic Spectral) and the rule-of-thumb bandwidth
//!   [`default_bandwidth`] `⌊T^{1/3}⌋`.
//! - Configure HAC behavior via [`HACOptions`] (kernel + optional fixed
//!   bandwidth).
//! - Build the HAC matrix `S = Γ₀ + Σ_l w(l)(Γ_l + Γ_lᵀ)` with
//!   [`long_run_covariance`].
//! - Map Jacobian and weights into `V = (GᵀWG)⁺/T` with
//!   [`gmm_covariance`], then [`standard_errors`] and [`t_statistics`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Moment matrices are `T×q` with rows=time; Jacobians are `q×k`.
//! - Covariance matrices are symmetric by construction.
//! - All numerical routines return [`InferenceError`] on malformed input
//!   rather than panicking. Singular matrices are not an error: inversions
//!   use the eigen-based pseudo-inverse from `optimization::numerical_stability`.
//!
//! Conventions
//! -----------
//! - Lag index `l` is zero-based; lag `l` pairs observation `t` with `t + l + 1`.
//! - All functions are pure with respect to I/O: no logging and no global
//!   state. Failures are reported via [`InferenceResult`] only.
//!
//! Downstream usage
//! ----------------
//! - `gmm::weights` calls [`long_run_covariance`] on the moment matrix at the
//!   current estimate and inverts the result.
//! - `gmm::variance` calls [`gmm_covariance`] with the final Jacobian and
//!   weights; `gmm::estimator` derives SEs and t-statistics from it.
//!
//! Testing notes
//! -------------
//! - Unit tests in each submodule cover kernel weights, degenerate HAC cases
//!   (SU kernel, zero bandwidth), symmetry, and sandwich formulas on
//!   hand-computable inputs.
//! - Integration tests exercise the full pipeline through the estimator.

pub mod errors;
pub mod hac;
pub mod kernel;
pub mod sandwich;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{InferenceError, InferenceResult};
pub use self::hac::{HACOptions, long_run_covariance};
pub use self::kernel::{KernelType, default_bandwidth, parse_kernel};
pub use self::sandwich::{gmm_covariance, standard_errors, t_statistics};

// ---- Optional convenience prelude for downstream crates ------------------
//
// Downstream crates can `use rust_gmm::inference::prelude::*;` to
// import the primary inference surface in a single line.

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hac::{HACOptions, long_run_covariance};
    pub use super::kernel::KernelType;
    pub use super::sandwich::{gmm_covariance, standard_errors, t_statistics};
}
