//! Unified error handling for inference routines.
//!
//! This module defines `InferenceError`, the error type used by HAC kernel
//! configuration and covariance construction. An alias `InferenceResult<T>`
//! standardizes the return type across inference code.

/// Unified error type for inference routines.
///
/// Covers unsupported kernel names and shape problems in the inputs handed to
/// the HAC and sandwich routines. Readable diagnostics are provided through
/// `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Kernel configuration ----
    /// Kernel name does not match any supported taper.
    UnsupportedKernel {
        name: String,
    },

    // ---- Input shapes ----
    /// The moment series has no observations.
    EmptySeries,

    /// Jacobian and weighting matrix are not conformable.
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Kernel configuration ----
            InferenceError::UnsupportedKernel { name } => write!(
                f,
                "Inference Error: Kernel '{}' is not implemented (valid: SU, Bartlett, Parzen, Quadratic)",
                name
            ),

            // ---- Input shapes ----
            InferenceError::EmptySeries => {
                write!(f, "Inference Error: Series must contain at least one observation")
            }
            InferenceError::ShapeMismatch { expected, found } => write!(
                f,
                "Inference Error: Shape mismatch, expected {:?}, found {:?}",
                expected, found
            ),
        }
    }
}
