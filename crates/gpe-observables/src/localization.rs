//! Localization measures.

use gpe_math::{DMat, DVec, Real};

/// Participation rate `Σ ρ⁴ / (Σ ρ²)²`.
///
/// Equals `1/n` for a uniform state on `n` sites and 1 when every particle
/// sits on a single site. Returns 0 for an empty lattice state.
pub fn participation_rate(rho: &DVec) -> Real {
    let (mut n2, mut n4) = (0.0, 0.0);
    for &r in rho.iter() {
        let d = r * r;
        n2 += d;
        n4 += d * d;
    }
    if n2 > 0.0 { n4 / (n2 * n2) } else { 0.0 }
}

/// Effective nonlinearity `β · P / n_sites`.
pub fn effective_nonlinearity(nonlinearity: Real, participation: Real, n_sites: usize) -> Real {
    nonlinearity * participation / n_sites as Real
}

/// Localization measures at every time step of a trajectory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizationSeries {
    pub participation_rate: Vec<Real>,
    pub effective_nonlinearity: Vec<Real>,
}

impl LocalizationSeries {
    pub fn from_trajectory(nonlinearity: Real, rho: &DMat) -> Self {
        let n_sites = rho.nrows();
        let participation_rate: Vec<Real> = rho
            .column_iter()
            .map(|col| participation_rate(&col.clone_owned()))
            .collect();
        let effective_nonlinearity = participation_rate
            .iter()
            .map(|&p| effective_nonlinearity(nonlinearity, p, n_sites))
            .collect();
        Self {
            participation_rate,
            effective_nonlinearity,
        }
    }
}
