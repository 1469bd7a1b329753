//! inference::hac — HAC long-run covariance of moment realizations.
//!
//! Purpose
//! -------
//! Build HAC (Heteroskedasticity & Autocorrelation Consistent) long-run
//! covariance matrices of per-observation moment vectors. These are inverted
//! to form the optimal GMM weighting matrix. The estimator has the form
//!
//! ```text
//! S  =  Γ₀  +  ∑_{l=0}^{L−1} w(l) ( Γ_l + Γ_lᵀ ),
//! Γ₀ = (1/T) VᵀV,
//! Γ_l = (1/T) V_{0:T−l−1}ᵀ V_{l+1:T},
//! ```
//!
//! where `V` is the column-demeaned `T×q` moment matrix (rows=time,
//! cols=moment conditions), `w(l)` are kernel weights and `L` is the
//! truncation bandwidth.
//!
//! Key behaviors
//! -------------
//! - Columns are always demeaned before aggregation, which improves the
//!   small-sample accuracy of the covariance estimate.
//! - Every cross-product is scaled by `1/T` (no small-sample correction).
//! - Bandwidth is either fixed by the caller or taken from the rule of thumb
//!   [`default_bandwidth`], `⌊T^{1/3}⌋`.
//! - With `L = 0` the lag loop is skipped and `S = Γ₀` exactly, for any kernel.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input must have at least one row; an empty series is reported as
//!   [`InferenceError::EmptySeries`].
//! - The caller's matrix is never modified; the demeaned copy is owned here.
//! - Lags whose shift reaches past the sample (`l + 1 ≥ T`) contribute an
//!   empty cross-product and are skipped.
//! - The result is symmetric by construction since every lag enters as
//!   `Γ_l + Γ_lᵀ`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the SU and `L = 0` degenerate cases, symmetry,
//!   invariance to a constant shift (demeaning), and agreement with a
//!   hand-rolled Bartlett computation.
use crate::inference::{
    errors::{InferenceError, InferenceResult},
    kernel::{KernelType, default_bandwidth},
};
use ndarray::{Array2, Axis, s};

/// HACOptions — configuration for HAC long-run covariance estimation.
///
/// Fields
/// ------
/// - `kernel`: [`KernelType`]
///   Taper family controlling the per-lag weights.
/// - `bandwidth`: `Option<usize>`
///   Truncation bandwidth `L`. `None` selects `⌊T^{1/3}⌋` at compute time.
///
/// Notes
/// -----
/// - `Default` gives the Bartlett kernel with the rule-of-thumb bandwidth.
#[derive(Debug, Clone, PartialEq)]
pub struct HACOptions {
    /// Kernel type for the HAC estimator.
    pub kernel: KernelType,
    /// Truncation bandwidth; `None` means `⌊T^{1/3}⌋`.
    pub bandwidth: Option<usize>,
}

impl HACOptions {
    /// Construct a `HACOptions` value from explicit settings.
    ///
    /// No validation is needed: every kernel and every bandwidth (including
    /// zero) is admissible.
    pub fn new(bandwidth: Option<usize>, kernel: KernelType) -> HACOptions {
        HACOptions { kernel, bandwidth }
    }

    /// Bandwidth that will be used for a series with `n` observations.
    pub fn effective_bandwidth(&self, n: usize) -> usize {
        self.bandwidth.unwrap_or_else(|| default_bandwidth(n))
    }
}

impl Default for HACOptions {
    fn default() -> Self {
        Self { kernel: KernelType::Bartlett, bandwidth: None }
    }
}

/// Build the `q×q` HAC long-run covariance of a `T×q` series of moment vectors.
///
/// Parameters
/// ----------
/// - `hac_opts`: `&HACOptions`
///   Kernel and bandwidth. A `None` bandwidth resolves to `⌊T^{1/3}⌋`.
/// - `vectors`: `&Array2<f64>`
///   `T×q` matrix of moment realizations (rows=time, columns=moments).
///
/// Returns
/// -------
/// `InferenceResult<Array2<f64>>`
///   The symmetric `q×q` matrix `S = Γ₀ + Σ_l w(l)(Γ_l + Γ_lᵀ)` built from the
///   column-demeaned series.
///
/// Errors
/// ------
/// - `InferenceError::EmptySeries`
///   Returned when `vectors` has no rows.
///
/// Notes
/// -----
/// - With `KernelType::SU` every lag weight is zero and the result equals the
///   demeaned sample covariance `VᵀV/T`, for any bandwidth.
/// - Zero-weight lags are skipped without forming their cross-products.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_gmm::inference::hac::{HACOptions, long_run_covariance};
/// # use rust_gmm::inference::kernel::KernelType;
/// let g = array![[1.0, -1.0],
///                [0.5, -0.5],
///                [1.5, -1.5]];
/// let opts = HACOptions::new(Some(1), KernelType::Bartlett);
/// let s = long_run_covariance(&opts, &g).unwrap();
/// assert_eq!(s.shape(), &[2, 2]);
/// ```
pub fn long_run_covariance(
    hac_opts: &HACOptions, vectors: &Array2<f64>,
) -> InferenceResult<Array2<f64>> {
    let n = vectors.nrows();
    let col_means = vectors.mean_axis(Axis(0)).ok_or(InferenceError::EmptySeries)?;
    let centered = vectors - &col_means;

    let bandwidth = hac_opts.effective_bandwidth(n);
    let mut covar = centered.t().dot(&centered) / n as f64;
    for lag in 0..bandwidth.min(n - 1) {
        add_hac_component(&mut covar, &centered, lag, bandwidth, hac_opts.kernel);
    }
    Ok(covar)
}

// ---- Helper methods ----

/// Add the weighted, symmetrized lag-`lag` autocovariance to `covar`.
///
/// `centered` must have more than `lag + 1` rows; the caller bounds the loop.
fn add_hac_component(
    covar: &mut Array2<f64>, centered: &Array2<f64>, lag: usize, bandwidth: usize,
    kernel: KernelType,
) {
    let weight = kernel.weight(lag, bandwidth);
    if weight == 0.0 {
        return;
    }
    let n = centered.nrows();
    let leading = centered.slice(s![..n - lag - 1, ..]);
    let lagged = centered.slice(s![lag + 1.., ..]);
    let gamma = leading.t().dot(&lagged) / n as f64;
    covar.scaled_add(weight, &gamma);
    covar.scaled_add(weight, &gamma.t());
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Default and explicit configuration of `HACOptions`.
    // - Degenerate cases: SU kernel and zero bandwidth reduce to Γ₀.
    // - Symmetry, demeaning, and agreement with a manual Bartlett sum.
    //
    // They intentionally DO NOT cover:
    // - Per-lag kernel formulas; see `inference::kernel`.
    // - Inversion into a weighting matrix; see `gmm::weights`.
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-12;

    fn assert_matrices_close(a: &Array2<f64>, b: &Array2<f64>, tol: f64) {
        assert_eq!(a.shape(), b.shape(), "shape mismatch: {:?} vs {:?}", a.shape(), b.shape());
        for ((i, j), value) in a.indexed_iter() {
            assert_relative_eq!(*value, b[[i, j]], epsilon = tol, max_relative = tol);
        }
    }

    fn demeaned_gamma0(v: &Array2<f64>) -> Array2<f64> {
        let means = v.mean_axis(Axis(0)).unwrap();
        let c = v - &means;
        c.t().dot(&c) / v.nrows() as f64
    }

    fn sample() -> Array2<f64> {
        array![
            [0.5, -1.0, 2.0],
            [1.0, 0.0, -0.5],
            [-0.5, 1.5, 0.25],
            [2.0, -0.5, 1.0],
            [0.75, 0.25, -1.25],
            [-1.0, 0.5, 0.5]
        ]
    }

    #[test]
    // Purpose
    // -------
    // `HACOptions::default` is Bartlett with the rule-of-thumb bandwidth.
    fn hacoptions_default_is_bartlett_rule_of_thumb() {
        let opts = HACOptions::default();
        assert_eq!(opts.kernel, KernelType::Bartlett);
        assert!(opts.bandwidth.is_none());
        assert_eq!(opts.effective_bandwidth(500), 7);
        assert_eq!(HACOptions::new(Some(3), KernelType::SU).effective_bandwidth(500), 3);
    }

    #[test]
    // Purpose
    // -------
    // With the SU kernel the estimator equals the demeaned sample covariance
    // for any bandwidth.
    //
    // Given
    // -----
    // - A 6×3 series and bandwidths 0..=5.
    //
    // Expect
    // ------
    // - `S == VᵀV/T` after demeaning.
    fn su_kernel_equals_sample_covariance_for_any_bandwidth() {
        let v = sample();
        let gamma0 = demeaned_gamma0(&v);
        for band in 0..=5 {
            let opts = HACOptions::new(Some(band), KernelType::SU);
            let s = long_run_covariance(&opts, &v).unwrap();
            assert_matrices_close(&s, &gamma0, TOL);
        }
    }

    #[test]
    // Purpose
    // -------
    // Zero bandwidth skips every lag term, for every kernel.
    fn zero_bandwidth_returns_gamma0_for_every_kernel() {
        let v = sample();
        let gamma0 = demeaned_gamma0(&v);
        for kernel in
            [KernelType::SU, KernelType::Bartlett, KernelType::Parzen, KernelType::Quadratic]
        {
            let opts = HACOptions::new(Some(0), kernel);
            let s = long_run_covariance(&opts, &v).unwrap();
            assert_matrices_close(&s, &gamma0, TOL);
        }
    }

    #[test]
    // Purpose
    // -------
    // The result is symmetric for every kernel.
    fn long_run_covariance_is_symmetric() {
        let v = sample();
        for kernel in [KernelType::Bartlett, KernelType::Parzen, KernelType::Quadratic] {
            let opts = HACOptions::new(Some(3), kernel);
            let s = long_run_covariance(&opts, &v).unwrap();
            assert_matrices_close(&s, &s.t().to_owned(), TOL);
        }
    }

    #[test]
    // Purpose
    // -------
    // Adding a constant to every observation leaves the estimate unchanged,
    // and the caller's matrix is untouched.
    fn long_run_covariance_is_shift_invariant_and_non_mutating() {
        let v = sample();
        let shifted = &v + 10.0;
        let opts = HACOptions::new(Some(2), KernelType::Bartlett);

        let s = long_run_covariance(&opts, &v).unwrap();
        let s_shifted = long_run_covariance(&opts, &shifted).unwrap();

        assert_matrices_close(&s, &s_shifted, 1e-10);
        assert_eq!(v, sample());
    }

    #[test]
    // Purpose
    // -------
    // Match a direct univariate implementation of the Bartlett sum.
    //
    // Given
    // -----
    // - A 5×1 series with known mean 1.0 and bandwidth 2.
    //
    // Expect
    // ------
    // - `S = γ₀ + (2/3)·2γ₁ + (1/3)·2γ₂` with `γ_j = Σ_t v_t v_{t+j+1} / T`
    //   shifted by one as in the lag convention (`j` zero-based).
    fn matches_manual_bartlett_sum() {
        let v = array![[2.0], [0.0], [1.0], [3.0], [-1.0]];
        let c: Vec<f64> = v.column(0).iter().map(|x| x - 1.0).collect();
        let n = c.len() as f64;
        let gamma = |shift: usize| -> f64 {
            (0..c.len() - shift).map(|t| c[t] * c[t + shift]).sum::<f64>() / n
        };
        let expected = gamma(0) + (2.0 / 3.0) * 2.0 * gamma(1) + (1.0 / 3.0) * 2.0 * gamma(2);

        let opts = HACOptions::new(Some(2), KernelType::Bartlett);
        let s = long_run_covariance(&opts, &v).unwrap();

        assert_relative_eq!(s[[0, 0]], expected, epsilon = TOL);
    }

    #[test]
    // Purpose
    // -------
    // A bandwidth larger than the sample only uses the available lags.
    fn bandwidth_beyond_sample_is_truncated() {
        let v = array![[1.0], [-1.0]];
        let opts = HACOptions::new(Some(10), KernelType::Bartlett);
        let s = long_run_covariance(&opts, &v).unwrap();
        // γ₀ = 1, γ₁ = -1/2, w(0) = 10/11.
        let expected = 1.0 + (10.0 / 11.0) * 2.0 * (-0.5);
        assert_relative_eq!(s[[0, 0]], expected, epsilon = TOL);
    }

    #[test]
    // Purpose
    // -------
    // An empty series is reported instead of panicking.
    fn empty_series_is_an_error() {
        let v = Array2::<f64>::zeros((0, 3));
        let err = long_run_covariance(&HACOptions::default(), &v).unwrap_err();
        assert_eq!(err, InferenceError::EmptySeries);
    }
}
