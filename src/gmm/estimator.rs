//! gmm::estimator — multi-step GMM estimation and final inference.
//!
//! Purpose
//! -------
//! Orchestrate a GMM run: validate the problem once, alternate between
//! minimizing `ḡᵀWḡ` and re-estimating `W` from the HAC long-run covariance,
//! then compute the J-test and the sandwich standard errors at the final
//! estimate.
//!
//! Key behaviors
//! -------------
//! - [`GMMEstimator::new`] performs one moment evaluation at `θ₀` to infer
//!   `(T, q, k)` and rejects `q ≤ k`, Jacobian mismatches and invalid
//!   starting points before any optimization.
//! - [`GMMEstimator::step`] runs one minimization with a fixed `W` and returns
//!   an immutable [`StepRecord`].
//! - [`GMMEstimator::estimate`] threads step records through the loop (step 0
//!   with the starting weights, step `i > 0` with `S⁺` at the previous
//!   estimate) and returns an [`EstimationResult`]. The estimator itself is
//!   never mutated.
//! - Minimizer non-convergence is recorded in `success` / `message` and
//!   logged, but the run still proceeds to inference.
//!
//! Invariants & assumptions
//! ------------------------
//! - `df = q − k > 0` holds for every constructed estimator.
//! - `J = T·f(θ̂)` uses the final estimate and the weighting matrix of the
//!   last step; `V` uses `S⁺` re-evaluated at `θ̂`.
//! - The estimator never prints. Progress goes through the `log` facade at
//!   `info` when convergence display is on and at `debug` otherwise.
//!
//! Conventions
//! -----------
//! - Step indices are 0-based.
//! - `p-value = 1 − F_{χ²(df)}(J)`.
//!
//! Testing notes
//! -------------
//! - Unit tests below use small closed-form location models.
//! - End-to-end behavior on instrumental-variables data is covered in
//!   `tests/integration_gmm_pipeline.rs`.
use log::{Level, warn};
use ndarray::{Array1, Array2};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::{
    gmm::{
        errors::{GMMError, GMMResult},
        moment::{MomentDims, MomentModel},
        objective::{GMMObjective, validate_weights},
        options::GMMOptions,
        report::format_vector,
        variance::VarianceEstimator,
        weights::WeightMatrixEstimator,
    },
    inference::sandwich::{standard_errors, t_statistics},
    optimization::minimizer::{OptimOutcome, Theta, minimize},
};

/// Outcome of one minimization with a fixed weighting matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// 0-based step index.
    pub index: usize,
    /// Estimate produced by the step.
    pub theta: Theta,
    /// Weighting matrix the step minimized against.
    pub weights: Array2<f64>,
    /// Scaled objective `T·f(θ)` at the step's estimate.
    pub objective: f64,
    /// Raw minimizer outcome.
    pub outcome: OptimOutcome,
}

/// Final estimate and inference statistics of a GMM run.
///
/// Fields
/// ------
/// - `theta`: final parameter vector.
/// - `message` / `success`: convergence summary over all steps. `success` is
///   `true` only if every step converged; `message` is the last step's
///   status, or `"Step i: <status>"` for the first step that did not converge.
/// - `j_stat`: `T·f(θ̂)`; `df`: `q − k`; `p_value`: `1 − F_{χ²(df)}(J)`.
/// - `se`, `t_stat`: `sqrt(diag V)` and `θ̂ / se`, reported as produced.
/// - `covariance`: `V`; `weights`: weighting matrix of the last step.
/// - `n_obs`: `T`; `steps`: every step record, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult {
    pub theta: Theta,
    pub message: String,
    pub success: bool,
    pub j_stat: f64,
    pub df: usize,
    pub p_value: f64,
    pub se: Array1<f64>,
    pub t_stat: Array1<f64>,
    pub covariance: Array2<f64>,
    pub weights: Array2<f64>,
    pub n_obs: usize,
    pub steps: Vec<StepRecord>,
}

/// Multi-step GMM estimator bound to one moment model and data set.
pub struct GMMEstimator<'a, M: MomentModel> {
    model: &'a M,
    data: &'a M::Data,
    theta0: Theta,
    options: GMMOptions,
    dims: MomentDims,
    initial_weights: Array2<f64>,
}

impl<'a, M: MomentModel> GMMEstimator<'a, M> {
    /// Validate the problem and build an estimator.
    ///
    /// Parameters
    /// ----------
    /// - `model`: `&M`
    ///   Moment conditions of the problem.
    /// - `data`: `&M::Data`
    ///   Observations passed unchanged to `model`.
    /// - `theta0`: `Theta`
    ///   Starting parameter vector (length `k`, finite).
    /// - `options`: `GMMOptions`
    ///   Step count, minimizer, gradient and HAC settings.
    ///
    /// Returns
    /// -------
    /// `GMMResult<GMMEstimator>`
    ///   An estimator whose starting weighting matrix is the `q×q` identity.
    ///
    /// Errors
    /// ------
    /// - `GMMError::InvalidTheta` for an empty or non-finite `theta0` (no
    ///   moment evaluation is made).
    /// - `GMMError::InvalidSteps` for `options.steps == 0`.
    /// - Any moment-model error from the single initial evaluation.
    /// - `GMMError::EmptySample`, `JacobianDimMismatch`, `MomentDimMismatch`
    ///   or `InsufficientDegreesOfFreedom` from dimension inference.
    pub fn new(
        model: &'a M, data: &'a M::Data, theta0: Theta, options: GMMOptions,
    ) -> GMMResult<Self> {
        validate_theta(&theta0)?;
        if options.steps == 0 {
            return Err(GMMError::InvalidSteps { steps: options.steps });
        }
        let moments = model.moments(&theta0, data)?;
        let dims = MomentDims::infer(&moments, theta0.len())?;
        let initial_weights = Array2::eye(dims.n_moments);
        Ok(GMMEstimator { model, data, theta0, options, dims, initial_weights })
    }

    /// Replace the identity starting weights, e.g. to resume from a previous
    /// run's HAC-based weighting matrix.
    ///
    /// # Errors
    /// - `GMMError::WeightsDimMismatch` if `weights` is not `q×q`.
    /// - `GMMError::InvalidWeights` for a non-finite entry.
    /// - `GMMError::AsymmetricWeights` if `weights` is not symmetric.
    pub fn with_initial_weights(mut self, weights: Array2<f64>) -> GMMResult<Self> {
        validate_weights(&weights, self.dims.n_moments)?;
        self.initial_weights = weights;
        Ok(self)
    }

    /// Run one GMM step: minimize `ḡᵀWḡ` from `theta` with `weights` fixed.
    ///
    /// # Errors
    /// - `GMMError::WeightsDimMismatch` if `weights` is not `q×q`.
    /// - `GMMError::NegativeObjective` / `GMMError::MomentModel` raised while
    ///   the solver evaluates the objective.
    /// - `GMMError::Optimizer` only if the solver fails before any finite
    ///   criterion value was seen. A solve that stops early (a failed line
    ///   search, a non-finite trial cost) is recorded as a non-converged step
    ///   at its best point, like hitting the iteration cap.
    pub fn step(&self, index: usize, theta: &Theta, weights: Array2<f64>) -> GMMResult<StepRecord> {
        let outcome = {
            let objective =
                GMMObjective::new(self.model, &weights, self.dims, self.options.use_gradient)?;
            minimize(&objective, theta.clone(), self.data, &self.options.minimizer)?
        };
        let objective = outcome.value * self.dims.n_obs as f64;

        let level = self.progress_level();
        log::log!(level, "Theta {} = {}", index + 1, format_vector(&outcome.theta_hat));
        log::log!(level, "f {} = {:.6}", index + 1, objective);
        if !outcome.converged {
            warn!("GMM step {index} did not converge: {}", outcome.status);
        }

        Ok(StepRecord { index, theta: outcome.theta_hat.clone(), weights, objective, outcome })
    }

    /// Run all configured steps and compute inference at the final estimate.
    ///
    /// Returns
    /// -------
    /// `GMMResult<EstimationResult>`
    ///   Final estimate, J-test, standard errors and the step history.
    ///
    /// Errors
    /// ------
    /// - Any error from [`GMMEstimator::step`] or from weighting-matrix and
    ///   variance estimation.
    /// - `GMMError::ChiSquared` if the reference distribution cannot be built.
    pub fn estimate(&self) -> GMMResult<EstimationResult> {
        log::log!(self.progress_level(), "Theta 0 = {}", format_vector(&self.theta0));

        let weight_estimator = self.weight_estimator();
        let mut records: Vec<StepRecord> = Vec::with_capacity(self.options.steps);
        for index in 0..self.options.steps {
            let (theta, weights) = match records.last() {
                None => (self.theta0.clone(), self.initial_weights.clone()),
                Some(prev) => (prev.theta.clone(), weight_estimator.compute(&prev.theta)?),
            };
            records.push(self.step(index, &theta, weights)?);
        }
        let last = records.last().ok_or(GMMError::InvalidSteps { steps: 0 })?;

        let theta = last.theta.clone();
        let j_stat = last.objective;
        let df = self.dims.df();
        let p_value = chi_square_p_value(j_stat, df)?;

        let covariance = VarianceEstimator::new(weight_estimator).compute(&theta)?;
        let se = standard_errors(&covariance);
        let t_stat = t_statistics(&theta, &se)?;
        if se.iter().any(|s| !s.is_finite() || *s == 0.0) {
            warn!("degenerate standard errors {}", format_vector(&se));
        }

        let (success, message) = summarize_convergence(&records);
        let weights = last.weights.clone();
        Ok(EstimationResult {
            theta,
            message,
            success,
            j_stat,
            df,
            p_value,
            se,
            t_stat,
            covariance,
            weights,
            n_obs: self.dims.n_obs,
            steps: records,
        })
    }

    /// Weighting-matrix estimator sharing this run's model, data and HAC
    /// settings.
    pub fn weight_estimator(&self) -> WeightMatrixEstimator<'_, M> {
        WeightMatrixEstimator::new(self.model, self.data, &self.options.hac, self.dims)
    }

    pub fn dims(&self) -> MomentDims {
        self.dims
    }

    pub fn options(&self) -> &GMMOptions {
        &self.options
    }

    pub fn initial_weights(&self) -> &Array2<f64> {
        &self.initial_weights
    }

    fn progress_level(&self) -> Level {
        if self.options.verbose() { Level::Info } else { Level::Debug }
    }
}

// ---- Helper methods ----

fn validate_theta(theta: &Theta) -> GMMResult<()> {
    if theta.is_empty() {
        return Err(GMMError::InvalidTheta { index: 0, value: f64::NAN });
    }
    if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(GMMError::InvalidTheta { index, value });
    }
    Ok(())
}

/// Upper-tail probability of `χ²(df)` at `j_stat`.
fn chi_square_p_value(j_stat: f64, df: usize) -> GMMResult<f64> {
    let dist = ChiSquared::new(df as f64)
        .map_err(|err| GMMError::ChiSquared { df, text: err.to_string() })?;
    Ok(1.0 - dist.cdf(j_stat.max(0.0)))
}

fn summarize_convergence(records: &[StepRecord]) -> (bool, String) {
    match records.iter().find(|r| !r.outcome.converged) {
        Some(failed) => (false, format!("Step {}: {}", failed.index, failed.outcome.status)),
        None => (true, records.last().map(|r| r.outcome.status.clone()).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gmm::moment::{MomentFn, Moments},
        inference::{hac::HACOptions, kernel::KernelType},
        optimization::minimizer::{MinimizerOptions, Tolerances},
    };
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::cell::Cell;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction-time validation (dimensions, degrees of freedom,
    //   starting point, initial weights) and its evaluation count.
    // - A single step and a full run on a location model with closed-form
    //   answers.
    // - Non-convergence and early solver stops as recorded, non-fatal
    //   outcomes.
    // - A negative objective surfacing as an error.
    //
    // They intentionally DO NOT cover:
    // - Instrumental-variables scenarios; see the integration tests.
    // -------------------------------------------------------------------------

    const X: [f64; 6] = [1.0, 2.0, 0.5, 1.5, 2.5, 0.5];
    const Y: [f64; 6] = [2.0, 3.5, 3.0, 2.5, 4.0, 3.0];

    /// Two noisy measurements of one location: `g_t = (x_t − θ, y_t − θ)`.
    fn location_model() -> MomentFn<impl Fn(&Theta) -> GMMResult<Moments>> {
        MomentFn(|theta: &Theta| -> GMMResult<Moments> {
            let mut g = Array2::zeros((X.len(), 2));
            for (t, (x, y)) in X.iter().zip(Y.iter()).enumerate() {
                g[[t, 0]] = x - theta[0];
                g[[t, 1]] = y - theta[0];
            }
            Ok(Moments::new(g, array![[-1.0], [-1.0]]))
        })
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    fn quiet_options(steps: usize) -> GMMOptions {
        let mut minimizer = MinimizerOptions::default();
        minimizer.verbose = false;
        minimizer.tols = Tolerances::new(Some(1e-10), None, Some(200)).unwrap();
        GMMOptions::new(steps, minimizer, true, HACOptions::new(Some(1), KernelType::Bartlett))
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // An exactly-identified problem is a configuration error raised after a
    // single moment evaluation and before any optimization.
    //
    // Given
    // -----
    // - A model with `q = k = 2` that counts its evaluations.
    //
    // Expect
    // ------
    // - `InsufficientDegreesOfFreedom { moments: 2, params: 2 }`.
    // - Exactly one evaluation.
    fn exactly_identified_model_is_rejected_after_one_evaluation() {
        let calls = Cell::new(0usize);
        let model = MomentFn(|_theta: &Theta| -> GMMResult<Moments> {
            calls.set(calls.get() + 1);
            Ok(Moments::new(Array2::ones((5, 2)), Array2::eye(2)))
        });

        let err = GMMEstimator::new(&model, &(), array![0.0, 0.0], quiet_options(2)).err();

        assert_eq!(err, Some(GMMError::InsufficientDegreesOfFreedom { moments: 2, params: 2 }));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Invalid starting points and step counts are rejected without touching
    // the model; a Jacobian with the wrong width is a dimension error.
    fn construction_validates_inputs() {
        let calls = Cell::new(0usize);
        let model = MomentFn(|_theta: &Theta| -> GMMResult<Moments> {
            calls.set(calls.get() + 1);
            Ok(Moments::new(Array2::ones((5, 3)), Array2::zeros((3, 2))))
        });

        let err = GMMEstimator::new(&model, &(), array![f64::NAN, 0.0], quiet_options(2)).err();
        assert!(matches!(err, Some(GMMError::InvalidTheta { index: 0, .. })));

        let mut opts = quiet_options(2);
        opts.steps = 0;
        let err = GMMEstimator::new(&model, &(), array![0.0, 0.0], opts).err();
        assert_eq!(err, Some(GMMError::InvalidSteps { steps: 0 }));
        assert_eq!(calls.get(), 0);

        let err = GMMEstimator::new(&model, &(), array![0.0], quiet_options(2)).err();
        assert_eq!(err, Some(GMMError::JacobianDimMismatch { expected: 1, found: 2 }));
    }

    #[test]
    // Purpose
    // -------
    // Starting weights must be `q×q` and finite.
    fn initial_weights_are_validated() {
        let model = location_model();
        let build = || GMMEstimator::new(&model, &(), array![0.0], quiet_options(1)).unwrap();

        assert!(matches!(
            build().with_initial_weights(Array2::eye(3)),
            Err(GMMError::WeightsDimMismatch { expected: (2, 2), found: (3, 3) })
        ));
        assert!(matches!(
            build().with_initial_weights(array![[1.0, f64::INFINITY], [0.0, 1.0]]),
            Err(GMMError::InvalidWeights { row: 0, col: 1, .. })
        ));
        assert!(matches!(
            build().with_initial_weights(array![[1.0, 0.5], [0.0, 1.0]]),
            Err(GMMError::AsymmetricWeights { row: 0, col: 1, gap }) if gap == 0.5
        ));
        let est = build().with_initial_weights(array![[2.0, 0.0], [0.0, 1.0]]).unwrap();
        assert_eq!(est.initial_weights(), &array![[2.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    // Purpose
    // -------
    // With identity weights, one step lands on the average of the two sample
    // means and reports `T·f` at that point.
    //
    // Given
    // -----
    // - `x̄ = 4/3`, `ȳ = 3`, `T = 6`, `W = I`.
    //
    // Expect
    // ------
    // - `θ̂ = (x̄ + ȳ)/2`.
    // - `T·f = T·(x̄ − ȳ)²/2`.
    fn single_step_matches_closed_form() {
        let model = location_model();
        let est = GMMEstimator::new(&model, &(), array![0.0], quiet_options(1)).unwrap();
        let (x_bar, y_bar) = (mean(&X), mean(&Y));

        let record = est.step(0, &array![0.0], Array2::eye(2)).unwrap();

        assert!(record.outcome.converged);
        assert_relative_eq!(record.theta[0], (x_bar + y_bar) / 2.0, epsilon = 1e-8);
        assert_relative_eq!(record.objective, 6.0 * (x_bar - y_bar).powi(2) / 2.0, epsilon = 1e-8);
    }

    #[test]
    // Purpose
    // -------
    // A full single-step run fills every inference field consistently.
    //
    // Expect
    // ------
    // - `df = 1`, `J` equal to the step's scaled objective, and
    //   `p = 1 − F_{χ²(1)}(J)`.
    // - `se = sqrt(V₀₀)` and `t = θ̂ / se`.
    fn estimate_reports_consistent_inference() {
        let model = location_model();
        let est = GMMEstimator::new(&model, &(), array![0.0], quiet_options(1)).unwrap();

        let res = est.estimate().unwrap();

        assert!(res.success);
        assert_eq!(res.message, "Optimization terminated successfully.");
        assert_eq!(res.df, 1);
        assert_eq!(res.n_obs, 6);
        assert_eq!(res.steps.len(), 1);
        assert_relative_eq!(res.j_stat, res.steps[0].objective);
        let chi2 = ChiSquared::new(1.0).unwrap();
        assert_relative_eq!(res.p_value, 1.0 - chi2.cdf(res.j_stat), epsilon = 1e-12);
        assert_relative_eq!(res.se[0], res.covariance[[0, 0]].sqrt());
        assert_relative_eq!(res.t_stat[0], res.theta[0] / res.se[0]);
        assert_eq!(res.weights, Array2::eye(2));
    }

    #[test]
    // Purpose
    // -------
    // Step `i > 0` minimizes against `S⁺` evaluated at step `i − 1`'s
    // estimate.
    fn later_steps_use_hac_weights_from_previous_estimate() {
        let model = location_model();
        let est = GMMEstimator::new(&model, &(), array![0.0], quiet_options(3)).unwrap();

        let res = est.estimate().unwrap();

        assert_eq!(res.steps.len(), 3);
        for i in 1..3 {
            let expected = est.weight_estimator().compute(&res.steps[i - 1].theta).unwrap();
            assert_eq!(res.steps[i].weights, expected);
        }
        assert_eq!(res.weights, res.steps[2].weights);
    }

    #[test]
    // Purpose
    // -------
    // Hitting the iteration cap is recorded, not raised, and inference is
    // still computed.
    //
    // Given
    // -----
    // - A two-parameter overidentified linear model started far from the
    //   optimum with `max_iter = 1`.
    //
    // Expect
    // ------
    // - `success == false` and a message naming step 0 and the cap.
    // - Finite `theta` and `j_stat`.
    fn non_convergence_is_not_fatal() {
        let model = MomentFn(|theta: &Theta| -> GMMResult<Moments> {
            let n = 20;
            let mut g = Array2::zeros((n, 3));
            for t in 0..n {
                let z1 = (t as f64 * 0.7).sin();
                let z2 = (t as f64 * 1.3).cos();
                let x2 = z1 + 0.5 * z2;
                let u = 1.0 + 0.5 * x2 + 0.1 * (t as f64).sin() - theta[0] - theta[1] * x2;
                g[[t, 0]] = u;
                g[[t, 1]] = z1 * u;
                g[[t, 2]] = z2 * u;
            }
            let dg = array![[-1.0, -0.3], [-0.2, -1.1], [0.4, -0.6]];
            Ok(Moments::new(g, dg))
        });
        let mut opts = quiet_options(2);
        opts.minimizer.tols = Tolerances::new(Some(1e-12), None, Some(1)).unwrap();
        opts.use_gradient = false;
        let est = GMMEstimator::new(&model, &(), array![50.0, -40.0], opts).unwrap();

        let res = est.estimate().unwrap();

        assert!(!res.success);
        assert_eq!(res.message, "Step 0: Maximum number of iterations has been exceeded.");
        assert!(res.theta.iter().all(|v| v.is_finite()));
        assert!(res.j_stat.is_finite());
    }

    #[test]
    // Purpose
    // -------
    // A step whose solve is aborted by a non-finite trial cost is recorded as
    // a failed step at its best point, and estimation carries on.
    //
    // Given
    // -----
    // - The location model shifted by 8 whose moments are NaN for `θ >= 1`,
    //   started at `θ = 0`: the first BFGS trial step lands far beyond 1.
    //
    // Expect
    // ------
    // - `Ok` with `success == false` and a message naming step 0 and the
    //   non-finite cost.
    // - Step 0 stays at `θ = 0`; both steps run and `J` is finite.
    fn aborted_solve_is_recorded_not_raised() {
        let model = MomentFn(|theta: &Theta| -> GMMResult<Moments> {
            let mut g = Array2::zeros((X.len(), 2));
            for (t, (x, y)) in X.iter().zip(Y.iter()).enumerate() {
                g[[t, 0]] = x + 8.0 - theta[0];
                g[[t, 1]] = y + 8.0 - theta[0];
            }
            if theta[0] >= 1.0 {
                g.fill(f64::NAN);
            }
            Ok(Moments::new(g, array![[-1.0], [-1.0]]))
        });
        let est = GMMEstimator::new(&model, &(), array![0.0], quiet_options(2)).unwrap();

        let res = est.estimate().unwrap();

        assert!(!res.success);
        assert!(res.message.starts_with("Step 0: "), "{}", res.message);
        assert!(res.message.contains("Non-finite cost"), "{}", res.message);
        assert_eq!(res.steps.len(), 2);
        assert_eq!(res.steps[0].theta, array![0.0]);
        assert!(!res.steps[0].outcome.converged);
        assert!(res.theta[0] < 1.0);
        assert!(res.j_stat.is_finite());
    }

    #[test]
    // Purpose
    // -------
    // An indefinite starting weight that makes `ḡᵀWḡ` negative stops the run
    // with `NegativeObjective` instead of being clamped.
    fn negative_objective_aborts_estimation() {
        let model = location_model();
        let est = GMMEstimator::new(&model, &(), array![0.0], quiet_options(2))
            .unwrap()
            .with_initial_weights(-Array2::eye(2))
            .unwrap();

        let err = est.estimate().unwrap_err();

        assert!(matches!(err, GMMError::NegativeObjective { value } if value < 0.0));
    }
}
