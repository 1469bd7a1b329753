use argmin::core::{ArgminError, Error};

/// Result alias for the minimizer layer.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// No analytic gradient; the adapter falls back to central differences.
    GradientNotImplemented,

    /// Gradient length differs from `θ` length.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Non-finite gradient entry.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MinimizerOptions ----
    /// `tol_grad` must be finite and `> 0`.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// `tol_cost` must be finite and `> 0`.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// `max_iter` must be `>= 1`.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Every stopping rule was `None`.
    NoTolerancesProvided,

    /// Invalid minimization method name.
    InvalidMethod {
        name: String,
        reason: &'static str,
    },

    /// Unknown line-search name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// `lbfgs_mem` must be `>= 1`.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Objective ----
    /// The objective returned NaN or ±inf.
    NonFiniteCost {
        value: f64,
    },

    /// Quadratic-form objective evaluated below zero.
    NegativeObjective {
        value: f64,
    },

    /// The moment model failed while the objective was being evaluated.
    MomentEvaluation {
        text: String,
    },

    /// Starting point must be non-empty and finite.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    // ---- Outcome ----
    /// Solver returned a non-finite parameter.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Solver finished without a best parameter.
    MissingThetaHat,

    // ---- Argmin ---
    /// Failure reported by argmin itself; `kind` names the argmin variant.
    Solver {
        kind: &'static str,
        text: String,
    },
    /// Error of a type neither argmin nor this crate defines.
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl OptError {
    /// `true` for failures raised by the objective itself, which end a solve
    /// outright; everything else argmin raises mid-solve is a solver failure.
    pub fn is_objective_failure(&self) -> bool {
        matches!(self, OptError::NegativeObjective { .. } | OptError::MomentEvaluation { .. })
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- MinimizerOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidMethod { name, reason } => {
                write!(f, "Invalid minimization method '{name}': {reason}")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- Objective ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::NegativeObjective { value } => {
                write!(f, "Objective evaluated to a negative value: {value}")
            }
            OptError::MomentEvaluation { text } => {
                write!(f, "Moment evaluation failed: {text}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid theta input at index {index}: {value}, must be finite")
            }

            // ---- Outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::Solver { kind, text } => write!(f, "Solver failure ({kind}): {text}"),
            OptError::BackendError { text } => write!(f, "Backend error: {text}"),

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    /// Recover an `OptError` raised inside the cost/gradient closures first,
    /// then map argmin's own error kinds, and wrap anything else as text.
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(argmin_err) => solver_failure(argmin_err),
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

fn solver_failure(err: ArgminError) -> OptError {
    let (kind, text) = match err {
        ArgminError::InvalidParameter { text } => ("invalid parameter", text),
        ArgminError::NotImplemented { text } => ("not implemented", text),
        ArgminError::NotInitialized { text } => ("not initialized", text),
        ArgminError::ConditionViolated { text } => ("condition violated", text),
        ArgminError::CheckpointNotFound { text } => ("checkpoint not found", text),
        ArgminError::PotentialBug { text } => ("potential bug", text),
        ArgminError::ImpossibleError { text } => ("impossible error", text),
        _ => return OptError::UnknownError,
    };
    OptError::Solver { kind, text }
}
