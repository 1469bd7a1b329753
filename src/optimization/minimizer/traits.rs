//! Public API surface for objective minimization.
//!
//! - [`Objective`]: trait users implement for the function being minimized.
//! - [`MinimizerOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`Method`]: quasi-Newton family (BFGS or L-BFGS).
//! - [`LineSearcher`]: choice of line search used by the quasi-Newton solver.
//! - [`OptimOutcome`]: normalized result returned by the high-level `minimize` API.
//!
//! Convention: the cost handed to `argmin` is exactly [`Objective::value`];
//! analytic gradients, when provided, are gradients of that same value.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented objective interface.
///
/// - `type Data`: per-problem data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `f(θ)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇f(θ)`.
///   Returning [`OptError::GradientNotImplemented`] (the default) switches
///   the adapter to finite differences.
pub trait Objective {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Quasi-Newton method used by [`minimize`](crate::optimization::minimizer::minimize).
///
/// - `Bfgs`: full inverse-Hessian BFGS, started from the identity.
/// - `Lbfgs`: limited-memory BFGS with `lbfgs_mem` history pairs.
///
/// Parsing is case-insensitive: `"BFGS"`, `"L-BFGS"`, `"LBFGS"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Bfgs,
    Lbfgs,
}

impl FromStr for Method {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bfgs" => Ok(Method::Bfgs),
            "lbfgs" | "l-bfgs" | "l-bfgs-b" => Ok(Method::Lbfgs),
            _ => Err(OptError::InvalidMethod {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'BFGS' or 'L-BFGS'.",
            }),
        }
    }
}

/// Choice of line search used inside the quasi-Newton solver.
///
/// Variants:
/// - `MoreThuente`: More–Thuente line search.
/// - `HagerZhang`: Hager–Zhang line search.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineSearcher {
    #[default]
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    /// Parse a line-search choice from a string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `method: Method` — BFGS or L-BFGS.
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `line_searcher: LineSearcher` — line-search algorithm.
/// - `verbose: bool` — convergence display. Controls the log level of
///   per-step progress and, behind the `obs_slog` feature, attaches a
///   per-iteration observer.
/// - `lbfgs_mem: Option<usize>` — L-BFGS history size (ignored by BFGS).
///
/// Default:
/// - `method`: `Bfgs`
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = None`, `max_iter = None`
/// - `line_searcher`: `MoreThuente`
/// - `verbose`: `true`
/// - `lbfgs_mem`: `None` (uses default of 7)
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerOptions {
    pub method: Method,
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MinimizerOptions {
    /// Create a new set of optimizer options.
    ///
    /// Numeric tolerance fields are validated inside [`Tolerances::new`];
    /// this constructor only checks `lbfgs_mem`.
    pub fn new(
        method: Method, tols: Tolerances, line_searcher: LineSearcher, verbose: bool,
        lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { method, tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MinimizerOptions {
    fn default() -> Self {
        Self {
            method: Method::default(),
            tols: Tolerances::default(),
            line_searcher: LineSearcher::default(),
            verbose: true,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations (`None` is unbounded).
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { tol_grad: Some(1e-6), tol_cost: None, max_iter: None }
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best objective value `f(θ̂)`.
/// - `converged`: `true` only if the solver met its convergence criterion
///   (`SolverConverged`) or reached a target cost. Hitting the iteration cap
///   is **not** convergence.
/// - `status`: human-readable termination message.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`
///   (e.g., `cost_count`, `gradient_count`).
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)` with
    ///   [`describe_termination`].
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = describe_termination(&termination);
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }

    /// Outcome of a solve that argmin aborted, reported at the best point
    /// evaluated before the failure.
    ///
    /// `converged` is `false` and `status` is the failure text. argmin's
    /// state is lost on failure, so `iterations` is 0, `fn_evals` holds only
    /// `cost_count` and `grad_norm` is `None`.
    ///
    /// # Errors
    /// Validation errors for a non-finite `theta_hat` or `value`.
    pub fn stopped(
        theta_hat: Theta, value: f64, status: String, cost_count: u64,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(Some(theta_hat))?;
        validate_value(value)?;
        let fn_evals = FnEvalMap::from([("cost_count".to_string(), cost_count)]);
        Ok(Self {
            theta_hat,
            value,
            converged: false,
            status,
            iterations: 0,
            fn_evals,
            grad_norm: None,
        })
    }
}

/// Map an argmin termination status to `(success, message)`.
pub fn describe_termination(termination: &TerminationStatus) -> (bool, String) {
    match termination {
        TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
        TerminationStatus::Terminated(TerminationReason::SolverConverged) => {
            (true, "Optimization terminated successfully.".to_string())
        }
        TerminationStatus::Terminated(TerminationReason::TargetCostReached) => {
            (true, "Target objective value reached.".to_string())
        }
        TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
            (false, "Maximum number of iterations has been exceeded.".to_string())
        }
        TerminationStatus::Terminated(other) => (false, format!("{other:?}")),
    }
}
