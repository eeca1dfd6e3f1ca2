//! Mean-field dynamics of a lattice of coupled nonlinear oscillators.
//!
//! Each site carries a complex amplitude `ψ = x + iy = ρ·e^{iθ}` evolving under
//!
//! ```text
//! H = Σ_i (β/2 ρ_i⁴ + ε_i ρ_i²) − J Σ_i Σ_{j∈nn(i)} ρ_i ρ_j cos(θ_j − θ_i)
//! ```
//!
//! This crate provides:
//! - [`Hamiltonian`]: couplings, nonlinearity and disorder on a [`Lattice`](gpe_lattice::Lattice)
//! - [`PolarField`] / [`CartesianField`]: the two equivalent vector fields
//! - [`polar_jacobian`]: linearization of the polar equations
//! - [`SwitchingIntegrator`]: RK4 that drops to Cartesian form near zero amplitude

pub mod field;
pub mod hamiltonian;
pub mod integrator;
pub mod jacobian;
pub mod state;
pub mod transform;

pub use field::{CartesianField, PolarField, VectorField};
pub use hamiltonian::Hamiltonian;
pub use integrator::{Representation, StepCounts, SwitchingIntegrator, rk4_step};
pub use jacobian::polar_jacobian;
pub use state::SiteState;
pub use transform::{cartesian_to_polar, phase_unwrap, polar_to_cartesian};
