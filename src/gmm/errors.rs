//! Errors for GMM estimation (configuration and dimension checks, weighting
//! matrices, objective invariants, and wrapped optimizer/inference failures).
//!
//! This module defines the estimation-layer error type, [`GMMError`], used by
//! the estimator, the moment-model plumbing and the Python front-end. It
//! implements `Display`/`Error` and converts to `PyErr` for PyO3.
//!
//! ## Conventions
//! - Dimensions are reported as `(T, q, k)`: observations, moment conditions,
//!   parameters.
//! - Errors raised by a user moment model are carried as
//!   [`GMMError::MomentModel`] with the model's own message.
//! - Lower-layer errors keep their own type inside [`GMMError::Optimizer`] and
//!   [`GMMError::Inference`], except for the few kinds that have a dedicated
//!   estimation-level meaning (negative objective, unsupported kernel, moment
//!   failures raised inside the solver), which are lifted to their own
//!   variants.
use crate::{inference::errors::InferenceError, optimization::errors::OptError};
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for GMM estimation paths that may produce [`GMMError`].
pub type GMMResult<T> = Result<T, GMMError>;

/// Unified error type for GMM estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum GMMError {
    // ---- Configuration ----
    /// Fewer moment conditions than needed for overidentification (`q ≤ k`).
    InsufficientDegreesOfFreedom { moments: usize, params: usize },

    /// Number of GMM steps must be at least one.
    InvalidSteps { steps: usize },

    /// HAC kernel name is not recognized.
    UnsupportedKernel { name: String },

    // ---- Dimensions ----
    /// Jacobian column count differs from the parameter count.
    JacobianDimMismatch { expected: usize, found: usize },

    /// Jacobian row count differs from the number of moment columns.
    MomentDimMismatch { moments: usize, jacobian_rows: usize },

    /// A later moment evaluation changed `(T, q, k)`.
    MomentShapeChanged { expected: (usize, usize, usize), found: (usize, usize, usize) },

    /// Moment matrix has no observations.
    EmptySample,

    /// Data arrays disagree on the number of observations.
    SampleDimMismatch { expected: usize, found: usize },

    /// Parameter vector is empty or holds a non-finite entry.
    InvalidTheta { index: usize, value: f64 },

    // ---- Weighting matrix ----
    /// Weighting matrix is not `q×q`.
    WeightsDimMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Weighting matrix holds a non-finite entry.
    InvalidWeights { row: usize, col: usize, value: f64 },

    /// Weighting matrix is not symmetric: `W[row, col]` and `W[col, row]`
    /// differ by `gap`.
    AsymmetricWeights { row: usize, col: usize, gap: f64 },

    // ---- Numerical invariants ----
    /// Quadratic-form objective evaluated below zero.
    NegativeObjective { value: f64 },

    // ---- User model ----
    /// The moment model reported a failure.
    MomentModel { text: String },

    // ---- Wrapped ----
    Optimizer(OptError),
    Inference(InferenceError),

    /// Chi-square reference distribution could not be built.
    ChiSquared { df: usize, text: String },
}

impl std::error::Error for GMMError {}

impl std::fmt::Display for GMMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            GMMError::InsufficientDegreesOfFreedom { moments, params } => write!(
                f,
                "GMM Error: {moments} moment conditions for {params} parameters; \
                 overidentification requires more moments than parameters"
            ),
            GMMError::InvalidSteps { steps } => {
                write!(f, "GMM Error: number of steps must be positive, got {steps}")
            }
            GMMError::UnsupportedKernel { name } => write!(
                f,
                "GMM Error: kernel '{name}' is not implemented (valid: SU, Bartlett, Parzen, Quadratic)"
            ),

            // ---- Dimensions ----
            GMMError::JacobianDimMismatch { expected, found } => write!(
                f,
                "GMM Error: Jacobian has {found} columns, expected one per parameter ({expected})"
            ),
            GMMError::MomentDimMismatch { moments, jacobian_rows } => write!(
                f,
                "GMM Error: Jacobian has {jacobian_rows} rows but the moment matrix has {moments} columns"
            ),
            GMMError::MomentShapeChanged { expected, found } => write!(
                f,
                "GMM Error: moment dimensions (T, q, k) changed from {expected:?} to {found:?}"
            ),
            GMMError::EmptySample => {
                write!(f, "GMM Error: moment matrix must contain at least one observation")
            }
            GMMError::SampleDimMismatch { expected, found } => write!(
                f,
                "GMM Error: data arrays disagree on sample size, expected {expected}, found {found}"
            ),
            GMMError::InvalidTheta { index, value } => write!(
                f,
                "GMM Error: parameter vector must be non-empty and finite (index {index}, value {value})"
            ),

            // ---- Weighting matrix ----
            GMMError::WeightsDimMismatch { expected, found } => write!(
                f,
                "GMM Error: weighting matrix must be {expected:?}, found {found:?}"
            ),
            GMMError::InvalidWeights { row, col, value } => write!(
                f,
                "GMM Error: weighting matrix entry ({row}, {col}) is not finite: {value}"
            ),
            GMMError::AsymmetricWeights { row, col, gap } => write!(
                f,
                "GMM Error: weighting matrix is not symmetric at ({row}, {col}): entries differ by {gap}"
            ),

            // ---- Numerical invariants ----
            GMMError::NegativeObjective { value } => write!(
                f,
                "GMM Error: objective evaluated to {value}, a quadratic form with PSD weights cannot be negative"
            ),

            // ---- User model ----
            GMMError::MomentModel { text } => write!(f, "GMM Error: moment model failed: {text}"),

            // ---- Wrapped ----
            GMMError::Optimizer(err) => write!(f, "GMM Error: {err}"),
            GMMError::Inference(err) => write!(f, "GMM Error: {err}"),
            GMMError::ChiSquared { df, text } => write!(
                f,
                "GMM Error: chi-square distribution with {df} degrees of freedom unavailable: {text}"
            ),
        }
    }
}

impl From<OptError> for GMMError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::NegativeObjective { value } => GMMError::NegativeObjective { value },
            OptError::MomentEvaluation { text } => GMMError::MomentModel { text },
            other => GMMError::Optimizer(other),
        }
    }
}

impl From<InferenceError> for GMMError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::UnsupportedKernel { name } => GMMError::UnsupportedKernel { name },
            other => GMMError::Inference(other),
        }
    }
}

/// Errors leaving an objective evaluation must travel through the solver as
/// `OptError`; [`From<OptError> for GMMError`] undoes this on the way out.
impl From<GMMError> for OptError {
    fn from(err: GMMError) -> Self {
        match err {
            GMMError::NegativeObjective { value } => OptError::NegativeObjective { value },
            GMMError::MomentModel { text } => OptError::MomentEvaluation { text },
            GMMError::Optimizer(inner) => inner,
            other => OptError::MomentEvaluation { text: other.to_string() },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<GMMError> for PyErr {
    fn from(err: GMMError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Lifting of optimizer and inference errors into `GMMError`.
    // - The reverse mapping used inside the objective.
    //
    // They intentionally DO NOT cover:
    // - The `From<GMMError> for PyErr` conversion, which needs the Python C
    //   API and belongs to Python-level tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Optimizer errors with an estimation-level meaning get their own
    // variants; everything else stays wrapped.
    //
    // Given
    // -----
    // - `NegativeObjective`, `MomentEvaluation` and `InvalidMaxIter` values.
    //
    // Expect
    // ------
    // - The first two map to `GMMError::NegativeObjective` and
    //   `GMMError::MomentModel`; the third to `GMMError::Optimizer`.
    fn from_opt_error_lifts_domain_kinds() {
        assert_eq!(
            GMMError::from(OptError::NegativeObjective { value: -2.0 }),
            GMMError::NegativeObjective { value: -2.0 }
        );
        assert_eq!(
            GMMError::from(OptError::MomentEvaluation { text: "boom".into() }),
            GMMError::MomentModel { text: "boom".into() }
        );
        let cap = OptError::InvalidMaxIter { max_iter: 0, reason: "zero" };
        assert_eq!(GMMError::from(cap.clone()), GMMError::Optimizer(cap));
    }

    #[test]
    // Purpose
    // -------
    // Unknown kernels surface as `UnsupportedKernel`; other inference errors
    // stay wrapped.
    fn from_inference_error_lifts_unsupported_kernel() {
        assert_eq!(
            GMMError::from(InferenceError::UnsupportedKernel { name: "tukey".into() }),
            GMMError::UnsupportedKernel { name: "tukey".into() }
        );
        assert_eq!(
            GMMError::from(InferenceError::EmptySeries),
            GMMError::Inference(InferenceError::EmptySeries)
        );
    }

    #[test]
    // Purpose
    // -------
    // A `GMMError` sent through the solver as `OptError` comes back as the
    // same variant when it carries its own mapping.
    //
    // Given
    // -----
    // - `NegativeObjective` and `MomentModel` errors, plus a shape error.
    //
    // Expect
    // ------
    // - The first two round-trip exactly.
    // - The shape error comes back as `MomentModel` carrying its message.
    fn gmm_error_round_trips_through_opt_error() {
        for err in [
            GMMError::NegativeObjective { value: -1e-3 },
            GMMError::MomentModel { text: "singular data".into() },
        ] {
            assert_eq!(GMMError::from(OptError::from(err.clone())), err);
        }

        let shape = GMMError::MomentShapeChanged { expected: (10, 3, 2), found: (9, 3, 2) };
        let back = GMMError::from(OptError::from(shape.clone()));
        assert_eq!(back, GMMError::MomentModel { text: shape.to_string() });
    }
}
