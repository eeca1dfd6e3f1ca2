//! Error types for gpe-lattice.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LatticeError {
    #[error("lattice extent along {axis} must be positive")]
    ZeroExtent { axis: char },

    #[error("unsupported dimensionality {0}: expected 1, 2 or 3")]
    UnsupportedDimensionality(usize),

    #[error("state has {got} entries but the lattice has {expected} sites")]
    LengthMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, LatticeError>;
