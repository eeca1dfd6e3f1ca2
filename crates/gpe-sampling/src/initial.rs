//! Initial lattice states.

use gpe_dynamics::{SiteState, phase_unwrap};
use gpe_lattice::Lattice;
use gpe_math::consts::PI;
use gpe_math::{DVec, Real};
use rand::Rng;
use rand_distr::StandardNormal;

/// Phase pattern of a uniform-amplitude initial state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InitialCondition {
    /// Independent phases uniform in [0, 2π).
    RandomPhase,
    /// π/2 on sites with odd coordinate sum, 0 elsewhere, plus Gaussian
    /// phase noise of standard deviation `phase_noise`.
    Antiferromagnetic { phase_noise: Real },
    /// All phases zero.
    ZeroPhase,
}

impl InitialCondition {
    /// Antiferromagnetic-like pattern with the standard 0.1π noise.
    pub fn antiferromagnetic() -> Self {
        Self::Antiferromagnetic {
            phase_noise: 0.1 * PI,
        }
    }

    /// Build the state: amplitude `sqrt(particles_per_site)` on every site,
    /// phases per the pattern.
    pub fn build<R: Rng + ?Sized>(&self, lattice: &Lattice, particles_per_site: Real, rng: &mut R) -> SiteState {
        let n = lattice.n_sites();
        let rho = DVec::from_element(n, particles_per_site.sqrt());
        let mut theta = DVec::zeros(n);

        match *self {
            Self::RandomPhase => {
                for t in theta.iter_mut() {
                    *t = 2.0 * PI * rng.r#gen::<Real>();
                }
            }
            Self::Antiferromagnetic { phase_noise } => {
                for (site, t) in theta.iter_mut().enumerate() {
                    let [x, y, z] = lattice.site_coords(site);
                    let base = if (x + y + z) % 2 == 1 { PI / 2.0 } else { 0.0 };
                    let noise: Real = rng.sample(StandardNormal);
                    *t = base + phase_noise * noise;
                }
            }
            Self::ZeroPhase => {}
        }

        theta.apply(|t| *t = phase_unwrap(*t));
        SiteState::from_polar(rho, theta)
    }
}
