//! Scalar and linear-algebra primitives for the gpe lattice engine.
//!
//! Every other crate in the workspace computes in [`Real`]. Precision is a
//! compile-time choice: `f64` by default, `f32` with the `f32` feature.

use nalgebra as na;

/// Working floating-point type.
#[cfg(not(feature = "f32"))]
pub type Real = f64;
/// Working floating-point type.
#[cfg(feature = "f32")]
pub type Real = f32;

/// Mathematical constants at working precision.
#[cfg(not(feature = "f32"))]
pub use std::f64::consts;
/// Mathematical constants at working precision.
#[cfg(feature = "f32")]
pub use std::f32::consts;

/// Dynamic vector.
pub type DVec = na::DVector<Real>;
/// Dynamic matrix.
pub type DMat = na::DMatrix<Real>;

/// Squared Euclidean norm of a Cartesian pair of per-site vectors,
/// i.e. Σ (x² + y²).
#[inline]
pub fn pair_norm_squared(x: &DVec, y: &DVec) -> Real {
    x.norm_squared() + y.norm_squared()
}

/// Stack two equal-length vectors into one `[a..., b...]` vector.
pub fn stack(a: &DVec, b: &DVec) -> DVec {
    let n = a.len();
    DVec::from_fn(n + b.len(), |i, _| if i < n { a[i] } else { b[i - n] })
}

/// Split a stacked `[a..., b...]` vector at `n`.
pub fn split(v: &DVec, n: usize) -> (DVec, DVec) {
    (v.rows(0, n).into_owned(), v.rows(n, v.len() - n).into_owned())
}
