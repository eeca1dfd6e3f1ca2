//! Periodic lattice of oscillator sites.

use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};

/// Extents of the lattice along x, y and z.
///
/// Unused axes have extent 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeShape {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl LatticeShape {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// 1D ring of `n` sites.
    pub fn chain(n: usize) -> Self {
        Self::new(n, 1, 1)
    }

    /// 2D torus of `nx × ny` sites.
    pub fn square(nx: usize, ny: usize) -> Self {
        Self::new(nx, ny, 1)
    }

    /// 3D torus of `nx × ny × nz` sites.
    pub fn cubic(nx: usize, ny: usize, nz: usize) -> Self {
        Self::new(nx, ny, nz)
    }

    /// Total number of sites.
    pub fn n_sites(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    fn extents(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }
}

impl Default for LatticeShape {
    fn default() -> Self {
        Self::chain(10)
    }
}

/// Periodic nearest-neighbor lattice.
///
/// Sites are enumerated in nested x, y, z order (z fastest), so the linear
/// index of `(x, y, z)` is `(x * ny + y) * nz + z`. Each site has
/// `2 * dimensionality` neighbors, listed in stencil order
/// `+x, -x, +y, -y, -z, +z` truncated to the active axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    shape: LatticeShape,
    dimensionality: usize,
    n_sites: usize,
    /// Flat neighbor table with stride `2 * dimensionality`.
    neighbors: Vec<usize>,
}

impl Lattice {
    /// Build a lattice whose dimensionality is derived from the shape.
    pub fn new(shape: LatticeShape) -> Result<Self> {
        Self::with_dimensionality(shape, 1)
    }

    /// Build a lattice from a requested dimensionality.
    ///
    /// `ny > 1` raises the dimensionality to at least 2 and `nz > 1` raises
    /// it to 3, whatever was requested.
    pub fn with_dimensionality(shape: LatticeShape, requested: usize) -> Result<Self> {
        for (axis, extent) in ['x', 'y', 'z'].into_iter().zip(shape.extents()) {
            if extent == 0 {
                return Err(LatticeError::ZeroExtent { axis });
            }
        }
        if !(1..=3).contains(&requested) {
            return Err(LatticeError::UnsupportedDimensionality(requested));
        }

        let mut dimensionality = requested;
        if shape.ny > 1 {
            dimensionality = dimensionality.max(2);
        }
        if shape.nz > 1 {
            dimensionality = 3;
        }

        let mut lattice = Self {
            shape,
            dimensionality,
            n_sites: shape.n_sites(),
            neighbors: Vec::new(),
        };
        lattice.neighbors = lattice.build_neighbor_table();
        Ok(lattice)
    }

    /// 1D ring of `n` sites.
    pub fn chain(n: usize) -> Result<Self> {
        Self::new(LatticeShape::chain(n))
    }

    fn build_neighbor_table(&self) -> Vec<usize> {
        let mut table = Vec::with_capacity(self.n_sites * self.coordination());
        for site in 0..self.n_sites {
            for coords in self.neighbor_coords(self.site_coords(site)) {
                table.push(self.site_index(coords[0], coords[1], coords[2]));
            }
        }
        table
    }

    pub fn shape(&self) -> LatticeShape {
        self.shape
    }

    /// Number of active axes (1, 2 or 3).
    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Neighbors per site.
    #[inline]
    pub fn coordination(&self) -> usize {
        2 * self.dimensionality
    }

    /// Convert (x, y, z) coordinates to linear site index.
    #[inline]
    pub fn site_index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.shape.ny + y) * self.shape.nz + z
    }

    /// Convert linear site index to (x, y, z) coordinates.
    #[inline]
    pub fn site_coords(&self, site: usize) -> [usize; 3] {
        let z = site % self.shape.nz;
        let y = (site / self.shape.nz) % self.shape.ny;
        let x = site / (self.shape.nz * self.shape.ny);
        [x, y, z]
    }

    /// All site coordinates in enumeration order.
    pub fn sites(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (0..self.n_sites).map(|site| self.site_coords(site))
    }

    /// Wrap coordinates one step outside the box back onto the torus.
    ///
    /// `-1` maps to `extent - 1` and `extent` maps to `0`.
    pub fn wrap(&self, coords: [isize; 3]) -> [usize; 3] {
        let extents = self.shape.extents();
        let mut out = [0; 3];
        for axis in 0..3 {
            let n = extents[axis] as isize;
            out[axis] = if coords[axis] < 0 {
                (n - 1) as usize
            } else if coords[axis] >= n {
                0
            } else {
                coords[axis] as usize
            };
        }
        out
    }

    /// Neighbor coordinates of a site, in stencil order.
    pub fn neighbor_coords(&self, coords: [usize; 3]) -> Vec<[usize; 3]> {
        let [x, y, z] = coords.map(|c| c as isize);
        let mut stencil = vec![[x + 1, y, z], [x - 1, y, z]];
        if self.dimensionality >= 2 {
            stencil.push([x, y + 1, z]);
            stencil.push([x, y - 1, z]);
        }
        if self.dimensionality == 3 {
            stencil.push([x, y, z - 1]);
            stencil.push([x, y, z + 1]);
        }
        stencil.into_iter().map(|c| self.wrap(c)).collect()
    }

    /// Linear indices of the neighbors of `site`.
    #[inline]
    pub fn neighbors(&self, site: usize) -> &[usize] {
        let k = self.coordination();
        &self.neighbors[site * k..(site + 1) * k]
    }

    /// Final entry of the stencil of `site`: `-x` in 1D, `-y` in 2D, `+z` in 3D.
    #[inline]
    pub fn last_neighbor(&self, site: usize) -> usize {
        self.neighbors[(site + 1) * self.coordination() - 1]
    }

    /// Check that a per-site vector matches the lattice.
    pub fn check_len(&self, len: usize) -> Result<()> {
        if len == self.n_sites {
            Ok(())
        } else {
            Err(LatticeError::LengthMismatch {
                expected: self.n_sites,
                got: len,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_neighbors_wrap() {
        let lattice = Lattice::chain(4).unwrap();
        assert_eq!(lattice.dimensionality(), 1);
        assert_eq!(lattice.neighbors(0), &[1, 3]);
        assert_eq!(lattice.neighbors(3), &[0, 2]);

        let mut n3 = lattice.neighbors(3).to_vec();
        n3.sort_unstable();
        assert_eq!(n3, vec![0, 2]);
    }

    #[test]
    fn test_site_indexing() {
        let lattice = Lattice::new(LatticeShape::cubic(3, 4, 5)).unwrap();
        assert_eq!(lattice.n_sites(), 60);
        let site = lattice.site_index(2, 1, 3);
        assert_eq!(lattice.site_coords(site), [2, 1, 3]);

        // z runs fastest
        assert_eq!(lattice.site_index(0, 0, 1), 1);
        assert_eq!(lattice.site_index(0, 1, 0), 5);
        assert_eq!(lattice.site_index(1, 0, 0), 20);
    }

    #[test]
    fn test_sites_enumeration_order() {
        let lattice = Lattice::new(LatticeShape::square(2, 2)).unwrap();
        let sites: Vec<_> = lattice.sites().collect();
        assert_eq!(sites, vec![[0, 0, 0], [0, 1, 0], [1, 0, 0], [1, 1, 0]]);
    }

    #[test]
    fn test_dimensionality_forcing() {
        let square = Lattice::new(LatticeShape::square(4, 3)).unwrap();
        assert_eq!(square.dimensionality(), 2);
        assert_eq!(square.coordination(), 4);

        let cube = Lattice::with_dimensionality(LatticeShape::cubic(3, 3, 3), 1).unwrap();
        assert_eq!(cube.dimensionality(), 3);

        let requested = Lattice::with_dimensionality(LatticeShape::chain(5), 2).unwrap();
        assert_eq!(requested.dimensionality(), 2);
    }

    #[test]
    fn test_invalid_configurations() {
        assert_eq!(
            Lattice::new(LatticeShape::new(0, 1, 1)),
            Err(LatticeError::ZeroExtent { axis: 'x' })
        );
        assert_eq!(
            Lattice::new(LatticeShape::new(3, 0, 1)),
            Err(LatticeError::ZeroExtent { axis: 'y' })
        );
        assert_eq!(
            Lattice::with_dimensionality(LatticeShape::chain(3), 4),
            Err(LatticeError::UnsupportedDimensionality(4))
        );
        assert_eq!(
            Lattice::with_dimensionality(LatticeShape::chain(3), 0),
            Err(LatticeError::UnsupportedDimensionality(0))
        );
    }

    #[test]
    fn test_square_neighbors() {
        let lattice = Lattice::new(LatticeShape::square(3, 3)).unwrap();
        let origin = lattice.site_index(0, 0, 0);
        let expected = vec![
            lattice.site_index(1, 0, 0),
            lattice.site_index(2, 0, 0),
            lattice.site_index(0, 1, 0),
            lattice.site_index(0, 2, 0),
        ];
        assert_eq!(lattice.neighbors(origin), expected.as_slice());
    }

    #[test]
    fn test_cubic_neighbors_stencil_order() {
        let lattice = Lattice::new(LatticeShape::cubic(3, 3, 3)).unwrap();
        let site = lattice.site_index(1, 1, 1);
        let coords: Vec<_> = lattice
            .neighbors(site)
            .iter()
            .map(|&n| lattice.site_coords(n))
            .collect();
        assert_eq!(
            coords,
            vec![
                [2, 1, 1],
                [0, 1, 1],
                [1, 2, 1],
                [1, 0, 1],
                [1, 1, 0],
                [1, 1, 2]
            ]
        );
    }

    #[test]
    fn test_neighbor_symmetry() {
        let lattice = Lattice::new(LatticeShape::square(4, 5)).unwrap();
        for site in 0..lattice.n_sites() {
            for &n in lattice.neighbors(site) {
                assert!(lattice.neighbors(n).contains(&site));
            }
        }
    }

    #[test]
    fn test_last_neighbor() {
        let chain = Lattice::chain(5).unwrap();
        assert_eq!(chain.last_neighbor(0), 4);
        assert_eq!(chain.last_neighbor(3), 2);

        let square = Lattice::new(LatticeShape::square(4, 3)).unwrap();
        let site = square.site_index(2, 0, 0);
        assert_eq!(square.last_neighbor(site), square.site_index(2, 2, 0));

        let cubic = Lattice::new(LatticeShape::cubic(3, 3, 3)).unwrap();
        let site = cubic.site_index(1, 1, 2);
        assert_eq!(cubic.last_neighbor(site), cubic.site_index(1, 1, 0));
    }

    #[test]
    fn test_check_len() {
        let lattice = Lattice::chain(4).unwrap();
        assert!(lattice.check_len(4).is_ok());
        assert_eq!(
            lattice.check_len(3),
            Err(LatticeError::LengthMismatch {
                expected: 4,
                got: 3
            })
        );
    }
}
