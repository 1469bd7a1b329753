//! Execution helpers that run an `argmin` quasi-Newton solver on an
//! [`Objective`] and return a crate-friendly [`OptimOutcome`].
//!
//! A solve that argmin aborts mid-way (a line search that cannot satisfy its
//! conditions, a trial point with a non-finite cost) is reported as a
//! non-converged outcome at the best point evaluated, not as an error.
//! Failures raised by the objective itself still end the solve with an
//! error.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        adapter::{ArgMinAdapter, BestPoint},
        traits::{MinimizerOptions, Objective, OptimOutcome},
        types::{Grad, InvHessian, Theta},
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, IterState, Solver, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Solver state shared by both methods; `H` is the inverse-Hessian slot.
type QuasiNewtonState<H> = IterState<Theta, Grad, (), H, (), f64>;

/// Run an L-BFGS solve.
///
/// # Errors
/// As for [`execute`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MinimizerOptions, problem: ArgMinAdapter<'a, F>, solver: S,
    best: &BestPoint,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, QuasiNewtonState<()>>,
{
    execute(theta0, opts, problem, solver, best, |state| state)
}

/// Run a BFGS solve.
///
/// BFGS additionally needs the initial inverse Hessian in its state: the
/// `k×k` identity, so the first step is a steepest-descent line search.
///
/// # Errors
/// As for [`execute`].
pub fn run_bfgs<'a, F, S>(
    theta0: Theta, opts: &MinimizerOptions, problem: ArgMinAdapter<'a, F>, solver: S,
    best: &BestPoint,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, QuasiNewtonState<InvHessian>>,
{
    let inv_hessian = InvHessian::eye(theta0.len());
    execute(theta0, opts, problem, solver, best, |state| state.inv_hessian(inv_hessian))
}

/// Shared runner. It wires up:
/// - the user objective via [`ArgMinAdapter`] (tracking into `best`),
/// - the chosen solver and its method-specific state (`init`),
/// - initial parameter `theta0`,
/// - optional observers (behind the `obs_slog` feature),
/// - optional `max_iters`,
///
/// then executes the solver and converts the final state into
/// [`OptimOutcome`].
///
/// # Errors
/// - Failures raised by the objective (`OptError::is_objective_failure`).
/// - Any argmin failure when no finite cost was evaluated before it.
/// - Validation errors from [`OptimOutcome::new`].
fn execute<'a, F, S, H>(
    theta0: Theta, opts: &MinimizerOptions, problem: ArgMinAdapter<'a, F>, solver: S,
    best: &BestPoint, init: impl FnOnce(QuasiNewtonState<H>) -> QuasiNewtonState<H>,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, QuasiNewtonState<H>>,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| init(state.param(theta0)));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = match optimizer.run() {
        Ok(res) => res.state,
        Err(err) => return stopped_at_best(OptError::from(err), best),
    };
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

// ---- Helper Methods ----

fn stopped_at_best(err: OptError, best: &BestPoint) -> OptResult<OptimOutcome> {
    if err.is_objective_failure() {
        return Err(err);
    }
    let Some((theta_hat, value)) = best.get() else {
        return Err(err);
    };
    log::warn!("solver stopped early ({err}); keeping the best point evaluated");
    OptimOutcome::stopped(theta_hat, value, err.to_string(), best.evaluations())
}

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: Objective,
{
    let f0 = problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());

    log::info!(
        "init: f(theta0) = {:.6}{}",
        f0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
