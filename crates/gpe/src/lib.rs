//! gpe — mean-field dynamics of disordered nonlinear oscillator lattices.
//!
//! This is the umbrella crate that provides the [`Simulation`] engine and
//! re-exports core types from the sub-crates.
//!
//! ```no_run
//! use gpe::{InitialCondition, LatticeShape, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::new(LatticeShape::chain(16))
//!     .particles_per_site(100.0)
//!     .disorder_width(0.5);
//! let mut sim = Simulation::new(config)?;
//! sim.generate_initial_state(InitialCondition::RandomPhase, 78, 0.0);
//! let counts = sim.run_dynamics();
//! sim.set_constants_of_motion();
//! println!("{} polar / {} cartesian steps", counts.polar, counts.cartesian);
//! # Ok::<(), gpe::GpeError>(())
//! ```

pub mod config;
pub mod error;
pub mod simulation;

pub use config::{Seeds, SimulationConfig, Tolerances};
pub use error::{GpeError, Result};
pub use simulation::Simulation;

pub use gpe_dynamics::{
    self, CartesianField, Hamiltonian, PolarField, Representation, SiteState, StepCounts,
    SwitchingIntegrator, VectorField, cartesian_to_polar, polar_jacobian, polar_to_cartesian,
};
pub use gpe_lattice::{self, DisorderField, Lattice, LatticeError, LatticeShape};
pub use gpe_math::{self, DMat, DVec, Real};
pub use gpe_observables::{
    self, ConservationMonitor, ConservedSeries, EnergyComponents, Histogram1d, Histogram2d,
    LocalizationSeries, SiteHistograms,
};
pub use gpe_sampling::{
    self, FaultLog, InitialCondition, ShellConfig, ShellFault, ShellOutcome, ShellSolver, ShellTarget,
};
