//! gmm::options — configuration of a GMM run.
//!
//! [`GMMOptions`] groups the step count, the minimizer configuration, the
//! gradient switch and the HAC settings used to build weighting matrices.
//! Defaults reproduce two-step efficient GMM: BFGS with an analytic gradient,
//! convergence display on, Bartlett kernel with a `⌊T^{1/3}⌋` bandwidth.
use crate::{
    gmm::errors::{GMMError, GMMResult},
    inference::{hac::HACOptions, kernel::KernelType},
    optimization::minimizer::MinimizerOptions,
};

/// Default number of GMM steps (two-step efficient GMM).
pub const DEFAULT_STEPS: usize = 2;

/// Estimation-level configuration.
///
/// Fields:
/// - `steps: usize` — number of minimize/re-weight rounds (`> 0`). Step 0
///   uses the starting weighting matrix; later steps use `S⁺` at the previous
///   estimate.
/// - `minimizer: MinimizerOptions` — method, tolerances (including the
///   iteration cap), line search, and convergence display.
/// - `use_gradient: bool` — offer `2ḡᵀW·dg` to the minimizer; `false` falls
///   back to finite differences.
/// - `hac: HACOptions` — kernel and bandwidth of the long-run covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct GMMOptions {
    pub steps: usize,
    pub minimizer: MinimizerOptions,
    pub use_gradient: bool,
    pub hac: HACOptions,
}

impl GMMOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// [`GMMError::InvalidSteps`] if `steps == 0`.
    pub fn new(
        steps: usize, minimizer: MinimizerOptions, use_gradient: bool, hac: HACOptions,
    ) -> GMMResult<Self> {
        if steps == 0 {
            return Err(GMMError::InvalidSteps { steps });
        }
        Ok(GMMOptions { steps, minimizer, use_gradient, hac })
    }

    /// Replace the HAC kernel by name (case-insensitive).
    ///
    /// # Errors
    /// [`GMMError::UnsupportedKernel`] for an unknown name.
    pub fn with_kernel_name(mut self, name: &str) -> GMMResult<Self> {
        self.hac.kernel = name.parse::<KernelType>()?;
        Ok(self)
    }

    pub fn verbose(&self) -> bool {
        self.minimizer.verbose
    }
}

impl Default for GMMOptions {
    fn default() -> Self {
        GMMOptions {
            steps: DEFAULT_STEPS,
            minimizer: MinimizerOptions::default(),
            use_gradient: true,
            hac: HACOptions::default(),
        }
    }
}
