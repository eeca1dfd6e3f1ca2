//! On-site energy disorder.

use gpe_math::{DVec, Real};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::lattice::Lattice;

/// Fixed per-site random energy offsets drawn uniformly from [-W, W].
///
/// Read-only during integration. Regenerate with a new seed to get a new
/// disorder realization.
#[derive(Debug, Clone, PartialEq)]
pub struct DisorderField {
    width: Real,
    values: DVec,
}

impl DisorderField {
    /// Clean lattice (W = 0).
    pub fn zeros(n_sites: usize) -> Self {
        Self {
            width: 0.0,
            values: DVec::zeros(n_sites),
        }
    }

    /// Draw one value per site as `-W + 2W·u`, `u ~ U[0, 1)`.
    pub fn generate<R: Rng + ?Sized>(lattice: &Lattice, width: Real, rng: &mut R) -> Self {
        let values = DVec::from_fn(lattice.n_sites(), |_, _| {
            -width + 2.0 * width * rng.r#gen::<Real>()
        });
        Self { width, values }
    }

    /// Deterministic realization: same seed and shape give the same field.
    pub fn from_seed(lattice: &Lattice, width: Real, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(lattice, width, &mut rng)
    }

    /// Nominal disorder width W.
    pub fn width(&self) -> Real {
        self.width
    }

    pub fn values(&self) -> &DVec {
        &self.values
    }

    #[inline]
    pub fn get(&self, site: usize) -> Real {
        self.values[site]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Multiply every on-site energy by `factor`.
    pub fn scale(&mut self, factor: Real) {
        self.values *= factor;
        self.width *= factor.abs();
    }
}
