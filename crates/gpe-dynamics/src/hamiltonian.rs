//! Physical parameters of the lattice Hamiltonian.

use gpe_lattice::{DisorderField, Lattice};
use gpe_math::Real;
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::debug;

/// Coupling J, nonlinearity β and on-site disorder ε on a fixed lattice.
#[derive(Debug, Clone)]
pub struct Hamiltonian {
    pub lattice: Lattice,
    /// Nearest-neighbor hopping strength J.
    pub coupling: Real,
    /// On-site nonlinearity β.
    pub nonlinearity: Real,
    pub disorder: DisorderField,
}

impl Hamiltonian {
    pub fn new(lattice: Lattice, coupling: Real, nonlinearity: Real, disorder: DisorderField) -> Self {
        Self {
            lattice,
            coupling,
            nonlinearity,
            disorder,
        }
    }

    /// Clean lattice without disorder.
    pub fn clean(lattice: Lattice, coupling: Real, nonlinearity: Real) -> Self {
        let disorder = DisorderField::zeros(lattice.n_sites());
        Self::new(lattice, coupling, nonlinearity, disorder)
    }

    #[inline]
    pub fn n_sites(&self) -> usize {
        self.lattice.n_sites()
    }

    /// Flip the sign of J, β and the disorder field, each scaled by an
    /// independent relative Gaussian error `1 + err·N(0, 1)`.
    ///
    /// With zero errors this is exact time reversal of the dynamics.
    pub fn reverse<R: Rng + ?Sized>(
        &mut self,
        error_coupling: Real,
        error_nonlinearity: Real,
        error_disorder: Real,
        rng: &mut R,
    ) {
        let z_j: Real = rng.sample(StandardNormal);
        let z_beta: Real = rng.sample(StandardNormal);
        let z_disorder: Real = rng.sample(StandardNormal);

        self.coupling = -self.coupling * (1.0 + error_coupling * z_j);
        self.nonlinearity = -self.nonlinearity * (1.0 + error_nonlinearity * z_beta);
        self.disorder.scale(-(1.0 + error_disorder * z_disorder));

        debug!(
            coupling = self.coupling,
            nonlinearity = self.nonlinearity,
            "reversed hamiltonian"
        );
    }
}
