//! Linearization of the polar equations of motion.

use gpe_math::{DMat, DVec};

use crate::hamiltonian::Hamiltonian;

/// Analytic Jacobian `∂(ρ̇, θ̇) / ∂(ρ, θ)` of [`PolarField`](crate::PolarField)
/// at the stacked state `[ρ..., θ...]`.
///
/// Rows and columns follow the stacked layout: block `(0, 0)` is `∂ρ̇/∂ρ`,
/// `(0, 1)` is `∂ρ̇/∂θ`, `(1, 0)` is `∂θ̇/∂ρ` and `(1, 1)` is `∂θ̇/∂θ`.
/// Neighbor terms are accumulated, so repeated neighbors on small lattices
/// are handled by the chain rule. Singular at ρ_i = 0 like the field itself.
pub fn polar_jacobian(h: &Hamiltonian, state: &DVec) -> DMat {
    let n = h.n_sites();
    let j = h.coupling;
    let rho = state.rows(0, n);
    let theta = state.rows(n, n);

    let mut jac = DMat::zeros(2 * n, 2 * n);
    for i in 0..n {
        let inv_rho = 1.0 / rho[i];
        let (ri, ti) = (i, n + i);

        for &k in h.lattice.neighbors(i) {
            let (rk, tk) = (k, n + k);
            let (s, c) = (theta[k] - theta[i]).sin_cos();

            // ρ̇_i = −J Σ ρ_k sin(θ_k − θ_i)
            jac[(ri, rk)] -= j * s;
            jac[(ri, tk)] -= j * rho[k] * c;
            jac[(ri, ti)] += j * rho[k] * c;

            // θ̇_i = −β ρ_i² − ε_i + (J/ρ_i) Σ ρ_k cos(θ_k − θ_i)
            jac[(ti, rk)] += j * inv_rho * c;
            jac[(ti, ri)] -= j * rho[k] * c * inv_rho * inv_rho;
            jac[(ti, tk)] -= j * inv_rho * rho[k] * s;
            jac[(ti, ti)] += j * inv_rho * rho[k] * s;
        }
        jac[(ti, ri)] -= 2.0 * h.nonlinearity * rho[i];
    }
    jac
}
