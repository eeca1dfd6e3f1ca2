//! Right-hand sides of the equations of motion.
//!
//! Both fields act on a stacked lattice vector of length `2 * n_sites`:
//! `[ρ..., θ...]` for [`PolarField`] and `[x..., y...]` for [`CartesianField`].

use gpe_math::DVec;

use crate::hamiltonian::Hamiltonian;

/// Time derivative of a stacked lattice state.
pub trait VectorField {
    fn derivative(&self, state: &DVec) -> DVec;
}

/// Amplitude/phase equations of motion.
///
/// ```text
/// dρ_i/dt = −J Σ_j ρ_j sin(θ_j − θ_i)
/// dθ_i/dt = −β ρ_i² − ε_i + (J / ρ_i) Σ_j ρ_j cos(θ_j − θ_i)
/// ```
///
/// Singular at ρ_i = 0; callers must keep amplitudes away from zero.
#[derive(Debug, Clone, Copy)]
pub struct PolarField<'a> {
    pub hamiltonian: &'a Hamiltonian,
}

impl<'a> PolarField<'a> {
    pub fn new(hamiltonian: &'a Hamiltonian) -> Self {
        Self { hamiltonian }
    }
}

impl VectorField for PolarField<'_> {
    fn derivative(&self, state: &DVec) -> DVec {
        let h = self.hamiltonian;
        let n = h.n_sites();
        let j = h.coupling;
        let rho = state.rows(0, n);
        let theta = state.rows(n, n);

        let mut out = DVec::zeros(2 * n);
        for i in 0..n {
            let mut d_rho = 0.0;
            let mut hop = 0.0;
            for &k in h.lattice.neighbors(i) {
                let (s, c) = (theta[k] - theta[i]).sin_cos();
                d_rho -= j * rho[k] * s;
                hop += j * rho[k] * c;
            }
            out[i] = d_rho;
            out[n + i] =
                -h.nonlinearity * rho[i] * rho[i] - h.disorder.get(i) + hop / rho[i];
        }
        out
    }
}

/// Real/imaginary equations of motion, regular everywhere.
///
/// ```text
/// dx_i/dt =  ε_i y_i − J Σ_j y_j + β (x_i² + y_i²) y_i
/// dy_i/dt = −ε_i x_i + J Σ_j x_j − β (x_i² + y_i²) x_i
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CartesianField<'a> {
    pub hamiltonian: &'a Hamiltonian,
}

impl<'a> CartesianField<'a> {
    pub fn new(hamiltonian: &'a Hamiltonian) -> Self {
        Self { hamiltonian }
    }
}

impl VectorField for CartesianField<'_> {
    fn derivative(&self, state: &DVec) -> DVec {
        let h = self.hamiltonian;
        let n = h.n_sites();
        let j = h.coupling;
        let x = state.rows(0, n);
        let y = state.rows(n, n);

        let mut out = DVec::zeros(2 * n);
        for i in 0..n {
            let eps = h.disorder.get(i);
            let density = x[i] * x[i] + y[i] * y[i];
            let (mut sum_x, mut sum_y) = (0.0, 0.0);
            for &k in h.lattice.neighbors(i) {
                sum_x += x[k];
                sum_y += y[k];
            }
            out[i] = eps * y[i] - j * sum_y + h.nonlinearity * density * y[i];
            out[n + i] = -eps * x[i] + j * sum_x - h.nonlinearity * density * x[i];
        }
        out
    }
}
