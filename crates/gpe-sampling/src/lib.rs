//! Initial conditions and nearby states on a fixed energy shell.
//!
//! This crate provides:
//! - [`InitialCondition`]: uniform-amplitude initial states with random or
//!   antiferromagnetic-like phases
//! - [`ShellSolver`]: perturb a state while keeping its energy and particle
//!   number, via bounded least squares with widening retries
//! - [`tiny_perturbation`]: unconstrained displacement of exact length
//! - [`FaultLog`]: cross-call record of solver failures

pub mod fault;
pub mod initial;
pub mod minimize;
pub mod shell;

pub use fault::{FaultLog, ShellFault};
pub use initial::InitialCondition;
pub use minimize::{Bounds, MinimizerConfig, MinimizerResult, Residuals, minimize_bounded};
pub use shell::{ShellConfig, ShellOutcome, ShellSolver, ShellTarget, tiny_perturbation};
