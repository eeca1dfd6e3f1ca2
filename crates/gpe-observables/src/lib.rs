//! Observables of lattice trajectories.
//!
//! This crate provides:
//! - Constants of motion: energy, particle number, bond current ("angular momentum")
//! - Energy decomposition into hopping, nonlinear and disorder parts
//! - Localization measures: participation rate and effective nonlinearity
//! - Per-site histograms of (x, y) and ρ² over a trajectory
//! - Drift monitoring against a baseline state
//!
//! Trajectories are `n_sites × n_steps` matrices: column `t` is the lattice at
//! time index `t`.

pub mod conservation;
pub mod histogram;
pub mod localization;

pub use conservation::{
    ConservationMonitor, ConservationState, ConservedSeries, EnergyComponents, angular_momentum,
    energy, energy_components, energy_gradient_xy, energy_xy, particle_number, particle_number_xy,
    trajectory_distance,
};
pub use histogram::{Histogram1d, Histogram2d, SiteHistograms};
pub use localization::{LocalizationSeries, effective_nonlinearity, participation_rate};
