//! Constants of motion and conservation drift.
//!
//! Neighbor sums run over every site and every entry of its stencil, so each
//! undirected bond enters the hopping energy twice. This matches the factor
//! in the equations of motion. The bond current is summed once per bond.

use gpe_dynamics::Hamiltonian;
use gpe_math::{DMat, DVec, Real};

/// Total particle number Σ ρ².
pub fn particle_number(rho: &DVec) -> Real {
    rho.norm_squared()
}

/// Total particle number Σ (x² + y²).
pub fn particle_number_xy(x: &DVec, y: &DVec) -> Real {
    gpe_math::pair_norm_squared(x, y)
}

/// Energy of a polar state.
///
/// `E = Σ_i (β/2 ρ_i⁴ + ε_i ρ_i²) − J Σ_i Σ_{j∈nn(i)} ρ_i ρ_j cos(θ_j − θ_i)`
pub fn energy(h: &Hamiltonian, rho: &DVec, theta: &DVec) -> Real {
    let mut e = 0.0;
    for i in 0..h.n_sites() {
        let density = rho[i] * rho[i];
        e += h.nonlinearity / 2.0 * density * density + h.disorder.get(i) * density;
        for &k in h.lattice.neighbors(i) {
            e -= h.coupling * rho[k] * rho[i] * (theta[k] - theta[i]).cos();
        }
    }
    e
}

/// Energy split into its three terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyComponents {
    /// Hopping term −J Σ_i Σ_j (x_i x_j + y_i y_j).
    pub kinetic: Real,
    /// Nonlinear term β/2 Σ (x² + y²)².
    pub potential: Real,
    /// On-site term Σ ε (x² + y²).
    pub disorder: Real,
}

impl EnergyComponents {
    pub fn total(&self) -> Real {
        self.kinetic + self.potential + self.disorder
    }
}

/// Decompose the energy of a Cartesian state.
pub fn energy_components(h: &Hamiltonian, x: &DVec, y: &DVec) -> EnergyComponents {
    let mut parts = EnergyComponents {
        kinetic: 0.0,
        potential: 0.0,
        disorder: 0.0,
    };
    for i in 0..h.n_sites() {
        let density = x[i] * x[i] + y[i] * y[i];
        for &k in h.lattice.neighbors(i) {
            parts.kinetic -= h.coupling * (x[i] * x[k] + y[i] * y[k]);
        }
        parts.potential += h.nonlinearity / 2.0 * density * density;
        parts.disorder += h.disorder.get(i) * density;
    }
    parts
}

/// Energy of a Cartesian state.
pub fn energy_xy(h: &Hamiltonian, x: &DVec, y: &DVec) -> Real {
    energy_components(h, x, y).total()
}

/// Gradient `(∂E/∂x, ∂E/∂y)` of [`energy_xy`].
pub fn energy_gradient_xy(h: &Hamiltonian, x: &DVec, y: &DVec) -> (DVec, DVec) {
    let n = h.n_sites();
    let mut gx = DVec::zeros(n);
    let mut gy = DVec::zeros(n);
    for i in 0..n {
        let density = x[i] * x[i] + y[i] * y[i];
        let onsite = 2.0 * (h.nonlinearity * density + h.disorder.get(i));
        gx[i] += onsite * x[i];
        gy[i] += onsite * y[i];
        for &k in h.lattice.neighbors(i) {
            gx[i] -= h.coupling * x[k];
            gy[i] -= h.coupling * y[k];
            gx[k] -= h.coupling * x[i];
            gy[k] -= h.coupling * y[i];
        }
    }
    (gx, gy)
}

/// Bond current `−2J Σ_i (x_i y_k − y_i x_k)`, where `k` is the last entry of
/// the stencil of site `i`: `-x` in 1D, `-y` in 2D, `+z` in 3D.
pub fn angular_momentum(h: &Hamiltonian, x: &DVec, y: &DVec) -> Real {
    let mut l = 0.0;
    for i in 0..h.n_sites() {
        let k = h.lattice.last_neighbor(i);
        l -= 2.0 * h.coupling * (x[i] * y[k] - y[i] * x[k]);
    }
    l
}

/// Euclidean distance between two Cartesian states.
pub fn trajectory_distance(x0: &DVec, y0: &DVec, x1: &DVec, y1: &DVec) -> Real {
    ((x0 - x1).norm_squared() + (y0 - y1).norm_squared()).sqrt()
}

/// Per-time-step constants of motion of a trajectory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConservedSeries {
    pub energy: Vec<Real>,
    pub particle_number: Vec<Real>,
    pub angular_momentum: Vec<Real>,
}

impl ConservedSeries {
    /// Evaluate every column of the `n_sites × n_steps` trajectory matrices.
    pub fn from_trajectory(h: &Hamiltonian, rho: &DMat, theta: &DMat, x: &DMat, y: &DMat) -> Self {
        let n_steps = rho.ncols();
        let mut series = Self {
            energy: Vec::with_capacity(n_steps),
            particle_number: Vec::with_capacity(n_steps),
            angular_momentum: Vec::with_capacity(n_steps),
        };
        for t in 0..n_steps {
            let r = rho.column(t).clone_owned();
            let th = theta.column(t).clone_owned();
            let xt = x.column(t).clone_owned();
            let yt = y.column(t).clone_owned();
            series.energy.push(energy(h, &r, &th));
            series.particle_number.push(particle_number(&r));
            series.angular_momentum.push(angular_momentum(h, &xt, &yt));
        }
        series
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

/// Baseline conserved quantities to track drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConservationState {
    pub baseline_energy: Real,
    pub baseline_particle_number: Real,
}

impl ConservationState {
    /// Capture the baseline from a Cartesian state.
    pub fn new(h: &Hamiltonian, x: &DVec, y: &DVec) -> Self {
        Self {
            baseline_energy: energy_xy(h, x, y),
            baseline_particle_number: particle_number_xy(x, y),
        }
    }
}

/// Conservation errors of a state relative to a baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConservationMonitor {
    /// Relative energy error: |E − E₀| / |E₀|
    pub energy_error: Real,
    /// Relative particle-number error: |N − N₀| / |N₀|
    pub particle_number_error: Real,
}

impl ConservationMonitor {
    /// Check a Cartesian state against the baseline.
    pub fn check(baseline: &ConservationState, h: &Hamiltonian, x: &DVec, y: &DVec) -> Self {
        Self::from_values(baseline, energy_xy(h, x, y), particle_number_xy(x, y))
    }

    /// Compare already evaluated quantities against the baseline.
    pub fn from_values(baseline: &ConservationState, energy: Real, particle_number: Real) -> Self {
        Self {
            energy_error: relative_error(energy, baseline.baseline_energy),
            particle_number_error: relative_error(particle_number, baseline.baseline_particle_number),
        }
    }

    /// Check if either conservation law is violated beyond tolerance.
    pub fn is_violated(&self, energy_tol: Real, particle_tol: Real) -> bool {
        self.energy_error > energy_tol || self.particle_number_error > particle_tol
    }

    pub fn max_relative_error(&self) -> Real {
        self.energy_error.max(self.particle_number_error)
    }
}

// Falls back to the absolute error when the baseline vanishes.
fn relative_error(value: Real, baseline: Real) -> Real {
    if baseline.abs() > 1e-12 {
        (value - baseline).abs() / baseline.abs()
    } else {
        (value - baseline).abs()
    }
}
