//! numerical_stability — generalized inverses and shared numeric tolerances.
//!
//! Purpose
//! -------
//! Centralize the linear-algebra primitive every GMM layer leans on: a
//! Moore–Penrose pseudo-inverse of symmetric matrices that never fails on
//! singular input. Together with the small tolerances defined next to it,
//! this keeps inversion behavior identical in the weighting-matrix and
//! sandwich-covariance code paths.
//!
//! Key behaviors
//! -------------
//! - [`symmetric_pinv`] inverts via `nalgebra`'s symmetric eigensolver,
//!   dropping eigenvalues with `|λ| <= PINV_RCOND · max|λ|`.
//! - [`fill_dmatrix`] bridges `ndarray` inputs into `nalgebra::DMatrix`.
//! - [`NEGATIVE_OBJECTIVE_RTOL`] defines when a quadratic form counts as
//!   negative rather than rounding noise; [`SYMMETRY_RTOL`] when a weighting
//!   matrix counts as symmetric.
//!
//! Conventions
//! -----------
//! - Inputs are symmetrized before decomposition; outputs are symmetric.
//! - This module never logs, performs I/O, or touches global state.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`pseudo_inverse`] check exact inverses, rank-deficient
//!   inputs (`A A⁺ A = A`), the all-zero matrix, and symmetrization.

pub mod pseudo_inverse;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::pseudo_inverse::{
    NEGATIVE_OBJECTIVE_RTOL, PINV_RCOND, SYMMETRY_RTOL, fill_dmatrix, symmetric_pinv,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_gmm::optimization::numerical_stability::prelude::*;
//
// to import the main numerical-stability surface in a single line.

pub mod prelude {
    pub use super::pseudo_inverse::{
        NEGATIVE_OBJECTIVE_RTOL, PINV_RCOND, SYMMETRY_RTOL, symmetric_pinv,
    };
}
