//! Adapter that exposes a user [`Objective`] as an `argmin` problem.
//!
//! The cost seen by `argmin` is the user's value unchanged. Analytic
//! gradients (if provided) are validated and passed through; otherwise the
//! cost closure is finite-differenced. An attached [`BestPoint`] keeps the
//! lowest finite cost evaluated, so a solve that argmin aborts can still
//! report where it got to.
use crate::optimization::{
    errors::OptError,
    minimizer::{
        finite_diff::central_diff_gradient,
        traits::Objective,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use std::cell::{Cell, RefCell};

/// Lowest finite cost seen during one solve, with its parameters.
#[derive(Debug, Default)]
pub struct BestPoint {
    best: RefCell<Option<(Theta, Cost)>>,
    evals: Cell<u64>,
}

impl BestPoint {
    /// Count one evaluation and keep `(θ, cost)` if it is finite and lower
    /// than anything seen so far.
    pub fn record(&self, theta: &Theta, cost: Cost) {
        self.evals.set(self.evals.get() + 1);
        if !cost.is_finite() {
            return;
        }
        let mut best = self.best.borrow_mut();
        if best.as_ref().is_none_or(|(_, lowest)| cost < *lowest) {
            *best = Some((theta.clone(), cost));
        }
    }

    pub fn get(&self) -> Option<(Theta, Cost)> {
        self.best.borrow().clone()
    }

    /// Number of cost evaluations recorded.
    pub fn evaluations(&self) -> u64 {
        self.evals.get()
    }
}

/// Bridges a user [`Objective`] to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `f(θ)`.
/// - `Gradient::gradient` returns:
///   - `∇f(θ)` if the user provides an analytic gradient, or
///   - a finite-difference gradient of the cost.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub best: Option<&'a BestPoint>,
}

impl<'a, F: Objective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `f(θ)`.
    ///
    /// # Errors
    /// - Propagates any `OptError` from the user's `value` via `?`.
    /// - Returns `NonFiniteCost` if the value is not finite.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if let Some(best) = self.best {
            best.record(theta, output);
        }
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: Objective> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `θ`.
    ///
    /// Behavior:
    /// - If the user implements `grad(θ, data)`, it is validated and returned.
    /// - On `GradientNotImplemented`, central differences of the cost are
    ///   used, with a forward-difference retry when an evaluation failed or
    ///   the estimate was non-finite.
    ///
    /// # Errors
    /// - Propagates user errors from `grad` (other than `GradientNotImplemented`).
    /// - Propagates errors raised by cost evaluations during finite differencing.
    /// - Returns validation errors for wrong dimension or non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                Ok(central_diff_gradient(theta, &|x: &Theta| self.cost(x))?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user `Objective` and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data, best: None }
    }

    /// Record every cost evaluation into `best`.
    pub fn tracking(mut self, best: &'a BestPoint) -> Self {
        self.best = Some(best);
        self
    }
}
