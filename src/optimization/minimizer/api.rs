//! High-level entry point for minimizing a user-provided [`Objective`].
//!
//! This selects BFGS or L-BFGS with either Hager–Zhang or More–Thuente line
//! search, wraps the objective in an [`ArgMinAdapter`], and delegates the run
//! to the matching runner.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        adapter::{ArgMinAdapter, BestPoint},
        builders::{
            build_bfgs_hager_zhang, build_bfgs_more_thuente, build_lbfgs_hager_zhang,
            build_lbfgs_more_thuente,
        },
        run::{run_bfgs, run_lbfgs},
        traits::{LineSearcher, Method, MinimizerOptions, Objective, OptimOutcome},
        types::Theta,
        validation::validate_theta0,
    },
};

/// Minimize an objective `f(θ)` with the configured quasi-Newton method.
///
/// # Behavior
/// - Validates the starting point (non-empty, finite) and then the
///   objective's own `check(theta0, data)` hook.
/// - Wraps `(f, data)` in an [`ArgMinAdapter`].
/// - Builds the solver selected by `opts.method` × `opts.line_searcher`.
/// - Runs it and returns an [`OptimOutcome`]. Non-convergence (hitting
///   `max_iter`, or argmin aborting on a failed line search or a non-finite
///   trial cost) is reported through `OptimOutcome::converged`, not as an
///   error; an aborted solve reports the best point it evaluated.
///
/// # Errors
/// - Propagates any error from `validate_theta0` or `f.check`.
/// - Propagates builder errors from `build_*`.
/// - Propagates objective failures (`NegativeObjective`,
///   `MomentEvaluation`) raised during the solve, and any solver failure
///   that happens before a finite cost was evaluated.
///
/// # Example
/// ```
/// use ndarray::array;
/// use rust_gmm::optimization::errors::OptResult;
/// use rust_gmm::optimization::minimizer::{
///     minimize, MinimizerOptions, Objective, Theta,
/// };
///
/// struct Bowl;
/// impl Objective for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = minimize(&Bowl, array![0.3, -0.2], &(), &MinimizerOptions::default())?;
/// assert!(out.value < 1e-8);
/// # Ok::<(), rust_gmm::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MinimizerOptions,
) -> OptResult<OptimOutcome> {
    validate_theta0(&theta0)?;
    f.check(&theta0, data)?;
    let best = BestPoint::default();
    let problem = ArgMinAdapter::new(f, data).tracking(&best);
    match (opts.method, opts.line_searcher) {
        (Method::Bfgs, LineSearcher::MoreThuente) => {
            let solver = build_bfgs_more_thuente(opts)?;
            run_bfgs(theta0, opts, problem, solver, &best)
        }
        (Method::Bfgs, LineSearcher::HagerZhang) => {
            let solver = build_bfgs_hager_zhang(opts)?;
            run_bfgs(theta0, opts, problem, solver, &best)
        }
        (Method::Lbfgs, LineSearcher::MoreThuente) => {
            let solver = build_lbfgs_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver, &best)
        }
        (Method::Lbfgs, LineSearcher::HagerZhang) => {
            let solver = build_lbfgs_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver, &best)
        }
    }
}
