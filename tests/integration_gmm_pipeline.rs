//! Integration tests for multi-step GMM estimation.
//!
//! Purpose
//! -------
//! - Validate the end-to-end GMM pipeline on simulated instrumental-variables
//!   data: moment evaluation, weighting by the HAC long-run covariance,
//!   quasi-Newton minimization, and the final J-test and standard errors.
//! - Compare against closed-form two-step GMM, which is available for
//!   linear moment conditions.
//!
//! Coverage
//! --------
//! - `gmm::estimator::GMMEstimator`:
//!   - Construction-time rejection of underidentified models.
//!   - Two-step estimation, resumption via `with_initial_weights`.
//! - `gmm::models::LinearIV` with `gmm::weights` and `gmm::variance`.
//! - `optimization::minimizer`: analytic vs finite-difference gradients and
//!   BFGS vs L-BFGS.
//!
//! Exclusions
//! ----------
//! - Kernel weights, pseudo-inverse identities and error mappings, which are
//!   covered by unit tests.
//! - Python bindings.
use std::cell::Cell;

use approx::assert_relative_eq;
use ndarray::{Array1, Array2, array};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use rust_gmm::{
    gmm::{
        errors::{GMMError, GMMResult},
        estimator::GMMEstimator,
        models::{IVData, LinearIV},
        moment::{MomentModel, Moments},
        options::GMMOptions,
    },
    inference::hac::{HACOptions, long_run_covariance},
    optimization::{
        minimizer::{Method, MinimizerOptions, Theta, Tolerances},
        numerical_stability::symmetric_pinv,
    },
};

/// Intercept and slope of the simulated structural equation.
fn true_theta() -> Array1<f64> {
    array![1.0, 0.5]
}

/// Purpose
/// -------
/// Simulate an overidentified linear IV design with `q = 4`, `k = 2`.
///
/// Design
/// ------
/// - Instruments `z_t = (1, z1, z2, z3)` with independent standard normals.
/// - Endogenous regressor `x2 = z1 + 0.5 z2 + 0.3 z3 + v`; `X = (1, x2)`.
/// - Errors `u_t = 0.3 u_{t−1} + noise · (0.5 v_t + ε_t (1 + 0.5|z1|))`:
///   correlated with `x2`, heteroskedastic and autocorrelated. `noise` scales
///   the error standard deviation and leaves the instruments valid.
/// - `kept`: share of the sample correlation `Zᵀu` that is kept. `1.0` is the
///   raw draw; `0.0` projects `u` off the instruments so the moment
///   conditions hold exactly in-sample at the true parameters.
fn simulate(n: usize, seed: u64, noise: f64, kept: f64) -> IVData {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut z = Array2::zeros((n, 4));
    let mut x = Array2::zeros((n, 2));
    let mut u = Array1::zeros(n);
    let mut prev = 0.0;
    for t in 0..n {
        let draws: Vec<f64> = (0..5).map(|_| rng.sample(StandardNormal)).collect();
        let (z1, z2, z3, v, eps) = (draws[0], draws[1], draws[2], draws[3], draws[4]);
        z.row_mut(t).assign(&array![1.0, z1, z2, z3]);
        x[[t, 0]] = 1.0;
        x[[t, 1]] = z1 + 0.5 * z2 + 0.3 * z3 + v;
        prev = 0.3 * prev + noise * (0.5 * v + eps * (1.0 + 0.5 * z1.abs()));
        u[t] = prev;
    }
    if kept < 1.0 {
        let coef = symmetric_pinv(&z.t().dot(&z)).dot(&z.t().dot(&u));
        u = &u - &(z.dot(&coef) * (1.0 - kept));
    }
    let y = x.dot(&true_theta()) + &u;
    IVData::new(y, x, z).expect("simulated data should be valid")
}

fn quiet_options(steps: usize, method: Method, use_gradient: bool) -> GMMOptions {
    let tol_grad = if use_gradient { 1e-9 } else { 1e-7 };
    let tols = Tolerances::new(Some(tol_grad), None, Some(500)).expect("valid tolerances");
    let mut minimizer = MinimizerOptions::default();
    minimizer.method = method;
    minimizer.tols = tols;
    minimizer.verbose = false;
    GMMOptions::new(steps, minimizer, use_gradient, HACOptions::default()).expect("valid options")
}

/// Closed-form GMM estimate `(XᵀZ W ZᵀX)⁻¹ XᵀZ W Zᵀy` for fixed `W`.
fn linear_gmm(data: &IVData, weights: &Array2<f64>) -> Array1<f64> {
    let zx = data.z.t().dot(&data.x);
    let zy = data.z.t().dot(&data.y);
    let lhs = zx.t().dot(weights).dot(&zx);
    let rhs = zx.t().dot(weights).dot(&zy);
    symmetric_pinv(&lhs).dot(&rhs)
}

/// Moment model wrapper that counts evaluations.
struct Counting<'a> {
    calls: &'a Cell<usize>,
}

impl MomentModel for Counting<'_> {
    type Data = IVData;

    fn moments(&self, theta: &Theta, data: &IVData) -> GMMResult<Moments> {
        self.calls.set(self.calls.get() + 1);
        LinearIV.moments(theta, data)
    }
}

#[test]
// Purpose
// -------
// Two-step GMM with the Bartlett kernel reproduces the closed-form linear
// estimator.
//
// Given
// -----
// - `T = 200` raw IV draws, start `θ₀ = (0, 0)`.
// - Closed form: `θ₁` with `W = I`, then `W₁ = S(θ₁)⁺` under the default
//   Bartlett / `⌊T^{1/3}⌋` HAC, then `θ₂` with `W₁`.
//
// Expect
// ------
// - Estimated `θ` within `1e-4` relative of `θ₂`; both steps converge.
fn two_step_matches_closed_form_iv() {
    let data = simulate(200, 7, 1.0, 1.0);
    let opts = quiet_options(2, Method::Bfgs, true);
    let est = GMMEstimator::new(&LinearIV, &data, array![0.0, 0.0], opts)
        .expect("estimator should build");

    let res = est.estimate().expect("estimation should succeed");

    let theta1 = linear_gmm(&data, &Array2::eye(4));
    let g1 = LinearIV.moments(&theta1, &data).unwrap().g;
    let w1 = symmetric_pinv(&long_run_covariance(&HACOptions::default(), &g1).unwrap());
    let theta2 = linear_gmm(&data, &w1);

    assert!(res.success, "{}", res.message);
    assert_eq!(res.df, 2);
    for i in 0..2 {
        assert_relative_eq!(res.steps[0].theta[i], theta1[i], max_relative = 1e-4);
        assert_relative_eq!(res.theta[i], theta2[i], max_relative = 1e-4);
    }
    assert!(res.se.iter().all(|s| s.is_finite() && *s > 0.0));
    assert!(res.p_value > 0.0 && res.p_value <= 1.0);
}

#[test]
// Purpose
// -------
// When the moment conditions hold exactly in-sample, the estimator recovers
// the true parameters with `J ≈ 0` and `p ≈ 1`.
//
// Given
// -----
// - `T = 300` draws with errors projected off the instruments.
//
// Expect
// ------
// - `θ̂ ≈ (1, 0.5)`, `J < 1e-8`, `p > 0.9999`.
fn exact_moment_conditions_give_zero_j() {
    let data = simulate(300, 11, 1.0, 0.0);
    let opts = quiet_options(2, Method::Bfgs, true);
    let est = GMMEstimator::new(&LinearIV, &data, array![0.0, 0.0], opts)
        .expect("estimator should build");

    let res = est.estimate().expect("estimation should succeed");

    assert_relative_eq!(res.theta[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(res.theta[1], 0.5, epsilon = 1e-6);
    assert!(res.j_stat.abs() < 1e-8, "J = {}", res.j_stat);
    assert!(res.p_value > 0.9999, "p = {}", res.p_value);
}

#[test]
// Purpose
// -------
// End-to-end scenario: `T = 500`, `q = 4`, `k = 2`, Bartlett kernel with
// bandwidth `⌊500^{1/3}⌋ = 7`, two steps.
//
// Given
// -----
// - 20 independent raw draws (seeds 2024..2044) with valid instruments and
//   error scale `noise = 0.1`, so the standard errors are near `0.01`.
//
// Expect
// ------
// - `θ̂` within `0.05` of the data-generating values for every draw.
// - `J` below the 95% critical value of `χ²(2)` (≈ 5.99) for at least 15
//   of the 20 draws; the test is correctly specified, so about one in
//   twenty exceeds it.
// - `t = θ̂ / se` element-wise.
fn five_hundred_observation_scenario() {
    let mut accepted = 0;
    for seed in 2024..2044 {
        let data = simulate(500, seed, 0.1, 1.0);
        let mut opts = quiet_options(2, Method::Bfgs, true);
        opts.hac = HACOptions::new(Some(7), opts.hac.kernel);
        let est = GMMEstimator::new(&LinearIV, &data, array![0.0, 0.0], opts)
            .expect("estimator should build");

        let res = est.estimate().expect("estimation should succeed");

        assert_eq!(res.n_obs, 500);
        assert!((res.theta[0] - 1.0).abs() < 0.05, "seed {seed}: theta = {}", res.theta);
        assert!((res.theta[1] - 0.5).abs() < 0.05, "seed {seed}: theta = {}", res.theta);
        assert!(res.j_stat.is_finite() && res.j_stat >= -1e-8, "seed {seed}: J = {}", res.j_stat);
        for i in 0..2 {
            assert_relative_eq!(res.t_stat[i], res.theta[i] / res.se[i], max_relative = 1e-12);
        }
        if res.j_stat < 5.99 {
            accepted += 1;
        }
    }
    assert!(accepted >= 15, "J below 5.99 for only {accepted} of 20 draws");
}

#[test]
// Purpose
// -------
// Running one step twice, feeding the first step's estimate and its
// HAC-based weighting matrix into a fresh estimator, matches a single
// two-step run.
fn one_step_twice_matches_two_steps() {
    let data = simulate(200, 3, 1.0, 1.0);
    let theta0 = array![0.0, 0.0];
    let steps = |n| quiet_options(n, Method::Bfgs, true);

    let two_step =
        GMMEstimator::new(&LinearIV, &data, theta0.clone(), steps(2)).unwrap().estimate().unwrap();

    let first = GMMEstimator::new(&LinearIV, &data, theta0, steps(1)).unwrap();
    let first_res = first.estimate().unwrap();
    let w1 = first.weight_estimator().compute(&first_res.theta).unwrap();
    let second_res = GMMEstimator::new(&LinearIV, &data, first_res.theta.clone(), steps(1))
        .unwrap()
        .with_initial_weights(w1)
        .unwrap()
        .estimate()
        .unwrap();

    for i in 0..2 {
        assert_relative_eq!(second_res.theta[i], two_step.theta[i], max_relative = 1e-8);
    }
    assert_relative_eq!(second_res.j_stat, two_step.j_stat, max_relative = 1e-8);
}

#[test]
// Purpose
// -------
// An underidentified configuration fails with the configuration error after
// exactly one moment evaluation and no optimization.
//
// Given
// -----
// - Instruments restricted to `(1, z1)`, so `q = k = 2`.
//
// Expect
// ------
// - `InsufficientDegreesOfFreedom { moments: 2, params: 2 }`, one call.
fn underidentified_model_is_rejected_before_optimization() {
    let full = simulate(50, 5, 1.0, 1.0);
    let z = full.z.slice(ndarray::s![.., ..2]).to_owned();
    let data = IVData::new(full.y.clone(), full.x.clone(), z).unwrap();
    let calls = Cell::new(0);
    let model = Counting { calls: &calls };

    let err = GMMEstimator::new(&model, &data, array![0.0, 0.0], GMMOptions::default()).err();

    assert_eq!(err, Some(GMMError::InsufficientDegreesOfFreedom { moments: 2, params: 2 }));
    assert_eq!(calls.get(), 1);
}

#[test]
// Purpose
// -------
// Analytic gradients, finite differences and L-BFGS all reach the same
// estimate.
fn gradient_paths_and_methods_agree() {
    let data = simulate(200, 13, 1.0, 1.0);
    let run = |method, use_gradient| {
        let mut opts = quiet_options(2, method, use_gradient);
        opts.minimizer.tols = Tolerances::new(Some(1e-7), None, Some(500)).unwrap();
        GMMEstimator::new(&LinearIV, &data, array![0.0, 0.0], opts)
            .unwrap()
            .estimate()
            .unwrap()
    };

    let analytic = run(Method::Bfgs, true);
    let numeric = run(Method::Bfgs, false);
    let limited = run(Method::Lbfgs, true);

    for i in 0..2 {
        assert_relative_eq!(numeric.theta[i], analytic.theta[i], max_relative = 1e-4);
        assert_relative_eq!(limited.theta[i], analytic.theta[i], max_relative = 1e-4);
    }
}
