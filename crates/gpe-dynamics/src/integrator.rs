//! Fixed-step RK4 with per-step choice of coordinates.
//!
//! The polar equations are singular at zero amplitude. Each step looks at
//! the previous slice: if any site has `ρ² < threshold` the whole step is
//! taken in Cartesian form, otherwise in polar form. The decision carries no
//! state between steps.

use gpe_math::{DVec, Real, split, stack};

use crate::field::{CartesianField, PolarField, VectorField};
use crate::hamiltonian::Hamiltonian;
use crate::state::SiteState;
use crate::transform::{cartesian_to_polar, polar_to_cartesian};

/// Classic 4-stage Runge-Kutta step of size `dt`.
pub fn rk4_step<F: VectorField + ?Sized>(field: &F, y0: &DVec, dt: Real) -> DVec {
    let k1 = field.derivative(y0);
    let k2 = field.derivative(&(y0 + &k1 * (dt / 2.0)));
    let k3 = field.derivative(&(y0 + &k2 * (dt / 2.0)));
    let k4 = field.derivative(&(y0 + &k3 * dt));

    y0 + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// Coordinates used for one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Polar,
    Cartesian,
}

/// How many steps of a run went through each representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCounts {
    pub polar: usize,
    pub cartesian: usize,
}

impl StepCounts {
    pub fn record(&mut self, repr: Representation) {
        match repr {
            Representation::Polar => self.polar += 1,
            Representation::Cartesian => self.cartesian += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.polar + self.cartesian
    }
}

/// RK4 integrator that switches to Cartesian form near zero amplitude.
#[derive(Debug, Clone, Copy)]
pub struct SwitchingIntegrator {
    /// Squared-amplitude threshold below which the Cartesian form is used.
    pub threshold: Real,
}

impl SwitchingIntegrator {
    pub fn new(threshold: Real) -> Self {
        Self { threshold }
    }

    /// Representation for the step that starts from `prev`.
    pub fn select(&self, prev: &SiteState) -> Representation {
        if prev.rho.iter().any(|r| r * r < self.threshold) {
            Representation::Cartesian
        } else {
            Representation::Polar
        }
    }

    /// Advance one step of size `dt`.
    ///
    /// After a Cartesian step the polar pair is derived from the result and
    /// the Cartesian pair is re-derived from it, so both describe one state.
    /// After a polar step only the Cartesian pair is derived.
    pub fn advance(&self, h: &Hamiltonian, prev: &SiteState, dt: Real) -> (SiteState, Representation) {
        let n = prev.n_sites();
        let repr = self.select(prev);
        let next = match repr {
            Representation::Cartesian => {
                let psi = rk4_step(&CartesianField::new(h), &stack(&prev.x, &prev.y), dt);
                let (x, y) = split(&psi, n);
                let (rho, theta) = cartesian_to_polar(&x, &y);
                let (x, y) = polar_to_cartesian(&rho, &theta);
                SiteState { rho, theta, x, y }
            }
            Representation::Polar => {
                let psi = rk4_step(&PolarField::new(h), &stack(&prev.rho, &prev.theta), dt);
                let (rho, theta) = split(&psi, n);
                let (x, y) = polar_to_cartesian(&rho, &theta);
                SiteState { rho, theta, x, y }
            }
        };
        (next, repr)
    }
}
