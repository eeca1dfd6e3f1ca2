//! Empirical per-site distributions over a trajectory.
//!
//! Bins split the sample range `[min, max]` into equal widths; the last bin
//! includes its right edge. A degenerate range is widened to
//! `[v − 0.5, v + 0.5]`. Non-finite samples are skipped.

use gpe_math::{DMat, Real};

/// Default number of bins per axis.
pub const DEFAULT_BINS: usize = 100;

fn sample_range(samples: &[Real]) -> (Real, Real) {
    let (lo, hi) = samples
        .iter()
        .filter(|v| v.is_finite())
        .fold((Real::INFINITY, Real::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn edges(lo: Real, hi: Real, bins: usize) -> Vec<Real> {
    let width = (hi - lo) / bins as Real;
    (0..=bins).map(|i| lo + width * i as Real).collect()
}

fn bin_of(v: Real, lo: Real, hi: Real, bins: usize) -> usize {
    let idx = ((v - lo) / (hi - lo) * bins as Real) as usize;
    idx.min(bins - 1)
}

/// One-dimensional histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1d {
    /// `bins + 1` bin edges.
    pub edges: Vec<Real>,
    pub counts: Vec<u64>,
}

impl Histogram1d {
    pub fn from_samples(samples: &[Real], bins: usize) -> Self {
        let bins = bins.max(1);
        let (lo, hi) = sample_range(samples);
        let mut counts = vec![0; bins];
        for &v in samples.iter().filter(|v| v.is_finite()) {
            counts[bin_of(v, lo, hi, bins)] += 1;
        }
        Self {
            edges: edges(lo, hi, bins),
            counts,
        }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Two-dimensional histogram, counts stored x-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2d {
    pub x_edges: Vec<Real>,
    pub y_edges: Vec<Real>,
    /// `counts[ix * y_bins + iy]`.
    pub counts: Vec<u64>,
}

impl Histogram2d {
    /// Joint histogram of paired samples.
    ///
    /// Pairs with a non-finite coordinate are skipped.
    pub fn from_samples(xs: &[Real], ys: &[Real], bins: usize) -> Self {
        let bins = bins.max(1);
        let (x_lo, x_hi) = sample_range(xs);
        let (y_lo, y_hi) = sample_range(ys);
        let mut counts = vec![0; bins * bins];
        for (&x, &y) in xs.iter().zip(ys) {
            if x.is_finite() && y.is_finite() {
                let ix = bin_of(x, x_lo, x_hi, bins);
                let iy = bin_of(y, y_lo, y_hi, bins);
                counts[ix * bins + iy] += 1;
            }
        }
        Self {
            x_edges: edges(x_lo, x_hi, bins),
            y_edges: edges(y_lo, y_hi, bins),
            counts,
        }
    }

    pub fn get(&self, ix: usize, iy: usize) -> u64 {
        self.counts[ix * (self.y_edges.len() - 1) + iy]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Histograms of (x, y) and ρ² for every site over the full time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteHistograms {
    pub xy: Vec<Histogram2d>,
    pub density: Vec<Histogram1d>,
}

impl SiteHistograms {
    /// Build from `n_sites × n_steps` trajectory matrices; row `i` is the time
    /// series of site `i`.
    pub fn from_trajectory(x: &DMat, y: &DMat, rho: &DMat, bins: usize) -> Self {
        let n_sites = rho.nrows();
        let mut xy = Vec::with_capacity(n_sites);
        let mut density = Vec::with_capacity(n_sites);
        for i in 0..n_sites {
            let xs: Vec<Real> = x.row(i).iter().copied().collect();
            let ys: Vec<Real> = y.row(i).iter().copied().collect();
            let ds: Vec<Real> = rho.row(i).iter().map(|r| r * r).collect();
            xy.push(Histogram2d::from_samples(&xs, &ys, bins));
            density.push(Histogram1d::from_samples(&ds, bins));
        }
        Self { xy, density }
    }
}
