//! minimizer::builders — BFGS / L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for the quasi-Newton solvers used by the
//! minimizer. These helpers hide Argmin’s generic wiring and apply crate-level
//! options (tolerances, L-BFGS memory) so that higher-level code can request a
//! configured solver without touching Argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - Construct BFGS and L-BFGS solvers with either Hager–Zhang or
//!   More–Thuente line search.
//! - Apply optional gradient and cost-change tolerances from
//!   [`MinimizerOptions`] via shared configuration helpers.
//! - Leave the initial parameter vector, the initial inverse Hessian and the
//!   iteration cap to the runner, keeping these builders side-effect free.
//!
//! Invariants & assumptions
//! ------------------------
//! - All solvers operate on the canonical numeric types [`Theta`], [`Grad`]
//!   and [`Cost`].
//! - The L-BFGS memory (`m`) is either provided via `opts.lbfgs_mem` or
//!   defaults to [`DEFAULT_LBFGS_MEM`]; BFGS ignores it.
//! - Any tolerance Argmin rejects is surfaced as an `OptError` via the
//!   crate’s `From<Error>` implementation.
//!
//! Testing notes
//! -------------
//! - Unit tests verify that every method/line-search pairing builds with
//!   and without explicit tolerances and memory.
//! - Full solves are exercised in `minimizer::api`.
use argmin::solver::quasinewton::{BFGS, LBFGS};

use crate::optimization::{
    errors::OptResult,
    minimizer::{
        traits::MinimizerOptions,
        types::{
            BfgsHagerZhang, BfgsMoreThuente, Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS,
            LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS, Theta,
        },
    },
};

/// Construct BFGS with Hager–Zhang line search and the configured tolerances.
pub fn build_bfgs_hager_zhang(opts: &MinimizerOptions) -> OptResult<BfgsHagerZhang> {
    configure_bfgs(BfgsHagerZhang::new(HagerZhangLS::new()), opts)
}

/// Construct BFGS with More–Thuente line search and the configured tolerances.
pub fn build_bfgs_more_thuente(opts: &MinimizerOptions) -> OptResult<BfgsMoreThuente> {
    configure_bfgs(BfgsMoreThuente::new(MoreThuenteLS::new()), opts)
}

/// build_lbfgs_hager_zhang — construct L-BFGS with Hager–Zhang line search.
///
/// Parameters
/// ----------
/// - `opts`: `&MinimizerOptions`
///   Consults `lbfgs_mem` (history size, default [`DEFAULT_LBFGS_MEM`]) and
///   `tols.tol_grad` / `tols.tol_cost`.
///
/// Returns
/// -------
/// `OptResult<LbfgsHagerZhang>`
///   The configured solver, or the error Argmin raised for a tolerance.
///
/// Notes
/// -----
/// - Initial parameters and iteration limits are applied by the runner.
pub fn build_lbfgs_hager_zhang(opts: &MinimizerOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// build_lbfgs_more_thuente — construct L-BFGS with More–Thuente line search.
///
/// Same contract as [`build_lbfgs_hager_zhang`], with [`MoreThuenteLS`] as
/// the line search.
pub fn build_lbfgs_more_thuente(opts: &MinimizerOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// configure_lbfgs — apply optional tolerances to an L-BFGS solver.
///
/// When a tolerance is `None`, the corresponding `with_tolerance_*` method
/// is not called and Argmin’s default remains in effect.
///
/// # Errors
/// `OptError` (via `From<argmin::core::Error>`) when Argmin rejects a
/// tolerance.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MinimizerOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

/// configure_bfgs — apply optional tolerances to a BFGS solver.
///
/// Mirrors [`configure_lbfgs`] for the full-memory solver.
pub fn configure_bfgs<L>(
    mut solver: BFGS<L, Cost>, opts: &MinimizerOptions,
) -> OptResult<BFGS<L, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
