//! Lattice topology and on-site disorder.
//!
//! Provides:
//! - [`Lattice`]: a periodic 1D/2D/3D grid with a precomputed nearest-neighbor stencil
//! - [`DisorderField`]: seeded uniform on-site energies in [-W, W]
//!
//! # Example
//!
//! ```
//! use gpe_lattice::{DisorderField, Lattice};
//!
//! let lattice = Lattice::chain(4).unwrap();
//! assert_eq!(lattice.neighbors(0), &[1, 3]);
//!
//! let disorder = DisorderField::from_seed(&lattice, 0.5, 78);
//! assert_eq!(disorder.len(), 4);
//! ```

pub mod disorder;
pub mod error;
pub mod lattice;

pub use disorder::DisorderField;
pub use error::{LatticeError, Result};
pub use lattice::{Lattice, LatticeShape};
