//! Error types for the gpe engine.

use gpe_lattice::LatticeError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GpeError {
    #[error("lattice error: {0}")]
    Lattice(#[from] LatticeError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, GpeError>;
