//! utils — conversion helpers for the Python front-end.
//!
//! The option builder and the row-to-matrix conversion are plain Rust so they
//! can be tested without an interpreter; the array extractors are compiled
//! only with the `python-bindings` feature.
use ndarray::Array2;

use crate::{
    gmm::{
        errors::{GMMError, GMMResult},
        options::GMMOptions,
    },
    inference::{hac::HACOptions, kernel::parse_kernel},
    optimization::minimizer::{LineSearcher, Method, MinimizerOptions, Tolerances},
};

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArray2,
};

/// Build [`GMMOptions`] from the keyword arguments of the Python `GMM` class.
///
/// Parameters
/// ----------
/// - `steps`: number of GMM steps (`> 0`).
/// - `method`: optimizer name (`"BFGS"`, `"L-BFGS"`); `None` is BFGS.
/// - `max_iter`: iteration cap per step; `None` is unbounded.
/// - `disp`: convergence display.
/// - `use_jacob`: use the analytic gradient `2ḡᵀW·dg`.
/// - `kernel`: HAC kernel name; `None` is Bartlett.
/// - `bandwidth`: HAC bandwidth; `None` is `⌊T^{1/3}⌋`.
///
/// Errors
/// ------
/// - `GMMError::InvalidSteps`, `GMMError::UnsupportedKernel`.
/// - `GMMError::Optimizer` for an unknown method or `max_iter == 0`.
pub fn gmm_options_from_names(
    steps: usize, method: Option<&str>, max_iter: Option<usize>, disp: bool, use_jacob: bool,
    kernel: Option<&str>, bandwidth: Option<usize>,
) -> GMMResult<GMMOptions> {
    let method = match method {
        Some(name) => name.parse::<Method>()?,
        None => Method::default(),
    };
    let tols = Tolerances::new(Tolerances::default().tol_grad, None, max_iter)?;
    let minimizer = MinimizerOptions::new(method, tols, LineSearcher::default(), disp, None)?;
    let hac = HACOptions::new(bandwidth, parse_kernel(kernel)?);
    GMMOptions::new(steps, minimizer, use_jacob, hac)
}

/// Stack equally long rows into a matrix.
///
/// # Errors
/// `GMMError::MomentModel` for ragged rows.
pub fn matrix_from_rows(rows: Vec<Vec<f64>>) -> GMMResult<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().position(|row| row.len() != n_cols) {
        return Err(GMMError::MomentModel {
            text: format!("row {bad} has {} entries, expected {n_cols}", rows[bad].len()),
        });
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|err| GMMError::MomentModel { text: err.to_string() })
}

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a 1-D array-like into an owned parameter vector.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vector<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    Ok(arr.as_array().to_owned())
}

/// Copy a 2-D array-like (ndarray or nested sequence) into an owned matrix.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix(raw_data: &Bound<'_, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 2-D numpy.ndarray or nested sequence of float64")
    })?;
    Ok(matrix_from_rows(rows)?)
}
