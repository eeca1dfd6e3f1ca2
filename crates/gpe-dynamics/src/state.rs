//! Lattice state at a single instant, held in both representations.

use gpe_math::{DVec, Real};

use crate::transform::{cartesian_to_polar, polar_to_cartesian};

/// One time slice of the lattice: amplitude/phase and real/imaginary parts.
///
/// The two representations describe the same physical state; the
/// constructors derive one from the other.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteState {
    pub rho: DVec,
    pub theta: DVec,
    pub x: DVec,
    pub y: DVec,
}

impl SiteState {
    pub fn from_polar(rho: DVec, theta: DVec) -> Self {
        let (x, y) = polar_to_cartesian(&rho, &theta);
        Self { rho, theta, x, y }
    }

    pub fn from_cartesian(x: DVec, y: DVec) -> Self {
        let (rho, theta) = cartesian_to_polar(&x, &y);
        Self { rho, theta, x, y }
    }

    pub fn n_sites(&self) -> usize {
        self.rho.len()
    }

    /// Smallest squared amplitude over all sites.
    pub fn min_density(&self) -> Real {
        self.rho
            .iter()
            .map(|r| r * r)
            .fold(Real::INFINITY, Real::min)
    }

    /// Total particle number Σ ρ².
    pub fn particle_number(&self) -> Real {
        self.rho.norm_squared()
    }
}
