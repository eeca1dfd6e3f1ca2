//! Polar ↔ Cartesian coordinate maps for per-site amplitudes.

use gpe_math::{DVec, Real};

/// Phase-continuity hook applied to every phase produced or consumed by the
/// transforms. Currently the identity.
#[inline]
pub fn phase_unwrap(theta: Real) -> Real {
    theta
}

/// `(ρ, θ) → (|ρ| cos θ, |ρ| sin θ)` for every site.
pub fn polar_to_cartesian(rho: &DVec, theta: &DVec) -> (DVec, DVec) {
    let n = rho.len();
    let mut x = DVec::zeros(n);
    let mut y = DVec::zeros(n);
    for i in 0..n {
        let r = rho[i].abs();
        let (s, c) = phase_unwrap(theta[i]).sin_cos();
        x[i] = r * c;
        y[i] = r * s;
    }
    (x, y)
}

/// `(x, y) → (sqrt(x² + y²), atan2(y, x))` for every site.
pub fn cartesian_to_polar(x: &DVec, y: &DVec) -> (DVec, DVec) {
    let n = x.len();
    let mut rho = DVec::zeros(n);
    let mut theta = DVec::zeros(n);
    for i in 0..n {
        rho[i] = x[i].hypot(y[i]);
        theta[i] = phase_unwrap(y[i].atan2(x[i]));
    }
    (rho, theta)
}
