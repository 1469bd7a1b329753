//! Kernel taps and the rule-of-thumb bandwidth for HAC estimation.
//!
//! This module provides:
//! - A `KernelType` enum with the supported HAC tapers (serially uncorrelated,
//!   Bartlett/Newey–West, Parzen/Gallant, Quadratic Spectral/Andrews).
//! - Per-lag weights `w(l)` computed from the zero-based lag index `l` and the
//!   truncation bandwidth `L`, with `a = (l+1)/(L+1)` and `d = (l+1)/L`.
//! - Case-insensitive parsing of kernel names, rejecting unknown names with
//!   [`InferenceError::UnsupportedKernel`] at configuration time.
//! - The default bandwidth `⌊T^{1/3}⌋`.
//!
//! Conventions:
//! - Lag index `l` runs over `0..L`; lag `l` pairs observation `t` with `t + l + 1`.
//! - No plug-in bandwidth selection is performed; callers either fix `L` or take
//!   the rule of thumb.
use crate::inference::errors::{InferenceError, InferenceResult};
use std::{f64::consts::PI, str::FromStr};

/// HAC taper family.
///
/// - `SU`: serially uncorrelated; every lag weight is zero, so the estimator
///   degenerates to the demeaned sample covariance.
/// - `Bartlett`: triangular (Newey–West, 1987) kernel.
/// - `Parzen`: Gallant (1987) kernel, piecewise cubic.
/// - `Quadratic`: quadratic spectral kernel of Andrews (1991), infinite support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelType {
    SU,
    #[default]
    Bartlett,
    Parzen,
    Quadratic,
}

impl KernelType {
    /// Kernel weight for zero-based lag `lag` under truncation bandwidth `bandwidth`.
    ///
    /// # Arguments
    /// - `lag`: loop index `l ≥ 0`; the corresponding autocovariance shifts the
    ///   series by `l + 1` observations.
    /// - `bandwidth`: truncation parameter `L ≥ 1`. With `L = 0` there are no
    ///   lags to weight and callers never reach this function.
    ///
    /// # Returns
    /// The scalar weight `w(l)`:
    /// - `SU`: `0`.
    /// - `Bartlett`: `1 − a` for `a ≤ 1`, else `0`.
    /// - `Parzen`: `1 − 6d²(1 − a)` for `a ≤ 0.5`, `2(1 − a)³` for `0.5 < a ≤ 1`, else `0`.
    /// - `Quadratic`: `25/(12(dπ)²) · (sin(m)/m − cos(m))` with `m = 6πd/5`.
    pub fn weight(&self, lag: usize, bandwidth: usize) -> f64 {
        let shift = (lag + 1) as f64;
        let a_coef = shift / (bandwidth + 1) as f64;
        let d_coef = shift / bandwidth as f64;
        match self {
            KernelType::SU => 0.0,
            KernelType::Bartlett => {
                if a_coef <= 1.0 {
                    1.0 - a_coef
                } else {
                    0.0
                }
            }
            KernelType::Parzen => {
                if a_coef <= 0.5 {
                    1.0 - 6.0 * d_coef * d_coef * (1.0 - a_coef)
                } else if a_coef <= 1.0 {
                    2.0 * (1.0 - a_coef).powi(3)
                } else {
                    0.0
                }
            }
            KernelType::Quadratic => {
                let m_coef = 6.0 * PI * d_coef / 5.0;
                25.0 / (12.0 * (d_coef * PI).powi(2)) * (m_coef.sin() / m_coef - m_coef.cos())
            }
        }
    }

    /// Canonical display name, matching what [`FromStr`] accepts.
    pub fn name(&self) -> &'static str {
        match self {
            KernelType::SU => "SU",
            KernelType::Bartlett => "Bartlett",
            KernelType::Parzen => "Parzen",
            KernelType::Quadratic => "Quadratic",
        }
    }
}

impl FromStr for KernelType {
    type Err = InferenceError;

    /// Parse a kernel name (case-insensitive).
    ///
    /// Accepts `"SU"`, `"Bartlett"`, `"Parzen"`, `"Quadratic"` and the aliases
    /// `"QuadraticSpectral"` / `"QS"`. Anything else returns
    /// `InferenceError::UnsupportedKernel`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "su" => Ok(KernelType::SU),
            "bartlett" => Ok(KernelType::Bartlett),
            "parzen" => Ok(KernelType::Parzen),
            "quadratic" | "quadraticspectral" | "qs" => Ok(KernelType::Quadratic),
            _ => Err(InferenceError::UnsupportedKernel { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for KernelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Rule-of-thumb truncation bandwidth `⌊n^{1/3}⌋`.
///
/// The floating-point cube root is corrected with an integer check so perfect
/// cubes map exactly (e.g. `8 → 2`, `500 → 7`).
pub fn default_bandwidth(n: usize) -> usize {
    let mut band = (n as f64).cbrt().floor() as usize;
    while (band + 1).pow(3) <= n {
        band += 1;
    }
    while band > 0 && band.pow(3) > n {
        band -= 1;
    }
    band
}

/// Parse an optional kernel name, falling back to the default kernel.
pub fn parse_kernel(name: Option<&str>) -> InferenceResult<KernelType> {
    match name {
        Some(name) => name.parse(),
        None => Ok(KernelType::default()),
    }
}
