//! Engine configuration.

use gpe_lattice::LatticeShape;
use gpe_math::Real;
use serde::{Deserialize, Serialize};

use crate::error::{GpeError, Result};

/// Seeds of the three independent random streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seeds {
    /// Disorder realization.
    pub disorder: u64,
    /// Initial conditions.
    pub trajectory: u64,
    /// Perturbations and Hamiltonian reversal.
    pub perturbation: u64,
}

impl Default for Seeds {
    fn default() -> Self {
        Self {
            disorder: 78,
            trajectory: 78,
            perturbation: 123,
        }
    }
}

/// Numeric tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Relative energy mismatch accepted by the shell solver.
    pub energy: Real,
    /// Relative particle-number mismatch accepted by the shell solver.
    pub particle_number: Real,
    /// Function tolerance of the bounded minimizer.
    pub ftol: Real,
    /// Displacement length of [`crate::Simulation::tiny_perturbation`].
    pub perturbation_step: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            energy: 1e-2,
            particle_number: 1e-2,
            ftol: 1e-14,
            perturbation_step: 1e-8,
        }
    }
}

/// Everything needed to build a [`crate::Simulation`].
///
/// `time` is measured in characteristic times; the simulated span is
/// `time * tau_char`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub shape: LatticeShape,
    /// Requested dimensionality, raised by the shape when needed.
    pub dimensionality: usize,
    /// Hopping strength J.
    pub coupling: Real,
    /// Nonlinearity β.
    pub nonlinearity: Real,
    /// Disorder width W.
    pub disorder_width: Real,
    pub particles_per_site: Real,
    /// Integration step.
    pub step: Real,
    pub time: Real,
    /// Characteristic time; `1/sqrt(3·β·J·particles_per_site)` when unset.
    pub tau_char: Option<Real>,
    /// Number of stored time steps; `floor(time·tau_char/step)` when unset.
    pub n_steps: Option<usize>,
    pub seeds: Seeds,
    pub tolerances: Tolerances,
    /// Squared-amplitude threshold for the Cartesian fallback; 1.0 in 1D and
    /// 2.0 otherwise when unset.
    pub threshold_xy_to_polar: Option<Real>,
    /// Target energy of constrained perturbations.
    pub energy_calibration: Real,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shape: LatticeShape::default(),
            dimensionality: 1,
            coupling: 1.0,
            nonlinearity: 0.01,
            disorder_width: 0.0,
            particles_per_site: 100_000.0,
            step: 5.7e-5,
            time: 70.0,
            tau_char: None,
            n_steps: None,
            seeds: Seeds::default(),
            tolerances: Tolerances::default(),
            threshold_xy_to_polar: None,
            energy_calibration: 0.0,
        }
    }
}

impl SimulationConfig {
    pub fn new(shape: LatticeShape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    pub fn dimensionality(mut self, dimensionality: usize) -> Self {
        self.dimensionality = dimensionality;
        self
    }

    pub fn coupling(mut self, coupling: Real) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn nonlinearity(mut self, nonlinearity: Real) -> Self {
        self.nonlinearity = nonlinearity;
        self
    }

    pub fn disorder_width(mut self, width: Real) -> Self {
        self.disorder_width = width;
        self
    }

    pub fn particles_per_site(mut self, particles: Real) -> Self {
        self.particles_per_site = particles;
        self
    }

    pub fn step(mut self, step: Real) -> Self {
        self.step = step;
        self
    }

    pub fn time(mut self, time: Real) -> Self {
        self.time = time;
        self
    }

    pub fn tau_char(mut self, tau: Real) -> Self {
        self.tau_char = Some(tau);
        self
    }

    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = Some(n_steps);
        self
    }

    pub fn seeds(mut self, seeds: Seeds) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn threshold_xy_to_polar(mut self, threshold: Real) -> Self {
        self.threshold_xy_to_polar = Some(threshold);
        self
    }

    pub fn energy_calibration(mut self, energy: Real) -> Self {
        self.energy_calibration = energy;
        self
    }

    /// Resolved characteristic time.
    pub fn resolve_tau_char(&self) -> Result<Real> {
        let tau = match self.tau_char {
            Some(tau) => tau,
            None => 1.0 / (3.0 * self.nonlinearity * self.coupling * self.particles_per_site).sqrt(),
        };
        if !tau.is_finite() || tau <= 0.0 {
            return Err(GpeError::InvalidParameter(format!(
                "characteristic time must be positive and finite, got {tau}"
            )));
        }
        Ok(tau)
    }

    /// Resolved number of stored time steps, including the initial one.
    pub fn resolve_n_steps(&self) -> Result<usize> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(GpeError::InvalidParameter(format!(
                "integration step must be positive, got {}",
                self.step
            )));
        }
        if !self.time.is_finite() || self.time < 0.0 {
            return Err(GpeError::InvalidParameter(format!(
                "simulated time must be non-negative, got {}",
                self.time
            )));
        }
        let n_steps = match self.n_steps {
            Some(n) => n,
            None => (self.time * self.resolve_tau_char()? / self.step).floor() as usize,
        };
        if n_steps == 0 {
            return Err(GpeError::InvalidParameter("number of time steps must be positive".into()));
        }
        Ok(n_steps)
    }

    /// Resolved Cartesian fallback threshold for a lattice of the given
    /// dimensionality.
    pub fn resolve_threshold(&self, dimensionality: usize) -> Real {
        self.threshold_xy_to_polar
            .unwrap_or(if dimensionality == 1 { 1.0 } else { 2.0 })
    }
}
