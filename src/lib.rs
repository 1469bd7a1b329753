//! rust_gmm — Generalized Method of Moments estimation with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the GMM estimator to Python via the `_rust_gmm` extension module. When the
//! `python-bindings` feature is enabled, this module defines the
//! Python-facing classes used by the `rust_gmm` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`gmm`, `inference`, `optimization`) as
//!   the public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_gmm` Python extension.
//! - Wrap any Python callable `moment(theta) -> (g, dg)` as a
//!   [`MomentModel`](crate::gmm::moment::MomentModel), so Python users supply
//!   moment conditions the way they would subclass a GMM base class.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work happens in the inner Rust modules; this file performs
//!   only FFI glue, input conversion, and error mapping.
//! - The Python moment callable is invoked with the GIL held; its exceptions
//!   become `GMMError::MomentModel` and abort the estimation.
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_rust_gmm.gmm` and are re-exported by
//!   the pure-Python `rust_gmm` package.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on [`gmm`] and can ignore the
//!   PyO3 items guarded by the `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by `tests/integration_gmm_pipeline.rs`.
//! - The bindings themselves are exercised from Python.

pub mod gmm;
pub mod inference;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use numpy::ToPyArray;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyRuntimeError, PyTypeError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use crate::{
    gmm::{
        errors::{GMMError, GMMResult},
        estimator::{EstimationResult, GMMEstimator},
        moment::{MomentModel, Moments},
        options::GMMOptions,
        report::{print_report, render},
    },
    optimization::minimizer::Theta,
    utils::{extract_f64_matrix, extract_f64_vector, gmm_options_from_names},
};

/// Python callable adapted to [`MomentModel`].
///
/// The callable receives `theta` as a 1-D `float64` array and must return a
/// pair `(g, dg)` of 2-D array-likes (`T×q` and `q×k`).
#[cfg(feature = "python-bindings")]
struct PyMomentModel {
    callable: Py<PyAny>,
}

#[cfg(feature = "python-bindings")]
impl MomentModel for PyMomentModel {
    type Data = ();

    fn moments(&self, theta: &Theta, _data: &()) -> GMMResult<Moments> {
        Python::with_gil(|py| {
            let out = self.callable.bind(py).call1((theta.to_pyarray(py),)).map_err(moment_error)?;
            let (g, dg): (Bound<'_, PyAny>, Bound<'_, PyAny>) =
                out.extract().map_err(moment_error)?;
            let g = extract_f64_matrix(&g).map_err(moment_error)?;
            let dg = extract_f64_matrix(&dg).map_err(moment_error)?;
            Ok(Moments::new(g, dg))
        })
    }
}

#[cfg(feature = "python-bindings")]
fn moment_error(err: PyErr) -> GMMError {
    GMMError::MomentModel { text: err.to_string() }
}

/// GMM — Python-facing multi-step GMM estimator.
///
/// Purpose
/// -------
/// Bind a Python moment function and a starting point to an estimation
/// configuration, run the estimation on request, and keep the last result.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `GMM(moment, theta0, steps=2, method=None, max_iter=None, disp=True,
/// use_jacob=True, kernel=None, bandwidth=None)`:
/// - `moment`: callable `theta -> (g, dg)`.
/// - `theta0`: 1-D array-like of `float64`, the starting parameters.
/// - `steps`: number of GMM steps; `2` is two-step efficient GMM.
/// - `method`: `"BFGS"` (default) or `"L-BFGS"`.
/// - `max_iter`: per-step iteration cap; `None` is unbounded.
/// - `disp`: log per-step progress at `info` level.
/// - `use_jacob`: use the analytic gradient `2ḡᵀW·dg`.
/// - `kernel`: `"SU"`, `"Bartlett"` (default), `"Parzen"`, `"Quadratic"`.
/// - `bandwidth`: HAC bandwidth; `None` is `⌊T^{1/3}⌋`.
///
/// Notes
/// -----
/// - Configuration errors (unknown kernel or method, zero steps) are raised
///   at construction; dimension errors are raised by `gmmest`, which is
///   where the moment function is first evaluated.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_gmm.gmm")]
pub struct GMM {
    model: PyMomentModel,
    theta0: Array1<f64>,
    options: GMMOptions,
    results: Option<EstimationResult>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl GMM {
    #[new]
    #[pyo3(
        text_signature = "(moment, theta0, /, steps=2, method=None, max_iter=None, disp=True, use_jacob=True, kernel=None, bandwidth=None)",
        signature = (moment, theta0, steps = 2, method = None, max_iter = None, disp = true, use_jacob = true, kernel = None, bandwidth = None)
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new<'py>(
        py: Python<'py>, moment: &Bound<'py, PyAny>, theta0: &Bound<'py, PyAny>, steps: usize,
        method: Option<&str>, max_iter: Option<usize>, disp: bool, use_jacob: bool,
        kernel: Option<&str>, bandwidth: Option<usize>,
    ) -> PyResult<GMM> {
        if !moment.is_callable() {
            return Err(PyTypeError::new_err("moment must be callable as moment(theta) -> (g, dg)"));
        }
        let theta0 = extract_f64_vector(py, theta0)?;
        let options =
            gmm_options_from_names(steps, method, max_iter, disp, use_jacob, kernel, bandwidth)?;
        let model = PyMomentModel { callable: moment.clone().unbind() };
        Ok(GMM { model, theta0, options, results: None })
    }

    /// Run the estimation and return its results.
    pub fn gmmest(&mut self) -> PyResult<GMMResults> {
        let estimator =
            GMMEstimator::new(&self.model, &(), self.theta0.clone(), self.options.clone())?;
        let result = estimator.estimate()?;
        self.results = Some(result.clone());
        Ok(GMMResults { inner: result })
    }

    /// Print the report of the last estimation.
    pub fn print_results(&self) -> PyResult<()> {
        let result = self.last_result()?;
        print_report(result);
        Ok(())
    }

    /// Results of the last estimation, or `None` before `gmmest`.
    #[getter]
    pub fn results(&self) -> Option<GMMResults> {
        self.results.as_ref().map(|inner| GMMResults { inner: inner.clone() })
    }
}

#[cfg(feature = "python-bindings")]
impl GMM {
    fn last_result(&self) -> PyResult<&EstimationResult> {
        self.results
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("call gmmest() before requesting results"))
    }
}

/// GMMResults — read-only view of an [`EstimationResult`] for Python.
///
/// Vectors are copied into Python lists on access; `str(results)` is the
/// formatted report.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_gmm.gmm")]
pub struct GMMResults {
    pub inner: EstimationResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl GMMResults {
    #[getter]
    pub fn theta(&self) -> Vec<f64> {
        self.inner.theta.to_vec()
    }

    #[getter]
    pub fn se(&self) -> Vec<f64> {
        self.inner.se.to_vec()
    }

    #[getter]
    pub fn t_stat(&self) -> Vec<f64> {
        self.inner.t_stat.to_vec()
    }

    #[getter]
    pub fn j_stat(&self) -> f64 {
        self.inner.j_stat
    }

    #[getter]
    pub fn df(&self) -> usize {
        self.inner.df
    }

    #[getter]
    pub fn p_value(&self) -> f64 {
        self.inner.p_value
    }

    #[getter]
    pub fn message(&self) -> String {
        self.inner.message.clone()
    }

    #[getter]
    pub fn success(&self) -> bool {
        self.inner.success
    }

    #[getter]
    pub fn covariance(&self) -> Vec<Vec<f64>> {
        self.inner.covariance.rows().into_iter().map(|row| row.to_vec()).collect()
    }

    #[getter]
    pub fn weights(&self) -> Vec<Vec<f64>> {
        self.inner.weights.rows().into_iter().map(|row| row.to_vec()).collect()
    }

    pub fn __str__(&self) -> String {
        render(&self.inner)
    }
}

/// _rust_gmm — PyO3 module initializer for the Python extension.
///
/// Creates the `gmm` submodule, registers [`GMM`] and [`GMMResults`] in it,
/// and records it in `sys.modules` so `rust_gmm.gmm` is importable by dotted
/// path.
///
/// # Errors
/// `PyErr` if creating the submodule or updating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_gmm<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let gmm_mod = PyModule::new(_py, "gmm")?;
    gmm_module(_py, m, &gmm_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_gmm.gmm", gmm_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn gmm_module<'py>(
    _py: Python, rust_gmm: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<GMM>()?;
    m.add_class::<GMMResults>()?;
    rust_gmm.add_submodule(m)?;
    Ok(())
}
