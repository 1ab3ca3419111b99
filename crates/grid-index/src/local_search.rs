//! Downhill nearest-neighbour search over curvilinear grids.
//!
//! Swath products change with every granule, so building a look-up table per
//! grid rarely pays off. Instead each query walks the grid from a seed point,
//! one neighbour at a time, while the great-circle distance to the target
//! keeps decreasing. Output pixels are visited in raster order, so seeding
//! each query with the previous answer usually converges in a step or two.
//!
//! The walk stops at a local minimum. On grids with strong curvature or holes
//! that minimum is not guaranteed to be the global one; this is accepted.

use std::sync::Arc;

use tracing::debug;

use crate::curvilinear::CurvilinearGrid;
use crate::distance::haversine_distance;

/// Outcome of a local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearestResult {
    /// The point is covered by the grid; `(i, j)` is the nearest sample.
    Found { i: usize, j: usize },
    /// The search converged on `(i, j)` at the edge of the grid but the point
    /// is further away than a representative grid spacing.
    NotCovered { i: usize, j: usize },
}

impl NearestResult {
    /// Indices of a covered point.
    pub fn found(&self) -> Option<(usize, usize)> {
        match *self {
            NearestResult::Found { i, j } => Some((i, j)),
            NearestResult::NotCovered { .. } => None,
        }
    }

    /// Indices where the search converged, covered or not.
    pub fn indices(&self) -> (usize, usize) {
        match *self {
            NearestResult::Found { i, j } | NearestResult::NotCovered { i, j } => (i, j),
        }
    }
}

/// Seed for the next local search, updated after every query.
///
/// Owned by a single in-flight mapping; never shared between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchState {
    pub last_i: usize,
    pub last_j: usize,
}

impl SearchState {
    pub fn new(last_i: usize, last_j: usize) -> Self {
        Self { last_i, last_j }
    }
}

/// Local-search index over a curvilinear grid.
///
/// The first axis (`i`) wraps around; the second (`j`) is bounded.
#[derive(Debug, Clone)]
pub struct LocalSearchIndex {
    grid: Arc<CurvilinearGrid>,
    spacing: f64,
}

impl LocalSearchIndex {
    pub fn new(grid: Arc<CurvilinearGrid>) -> Self {
        let spacing = estimate_spacing(&grid);
        debug!(
            ni = grid.ni(),
            nj = grid.nj(),
            spacing_m = spacing,
            "Local search index ready"
        );
        Self { grid, spacing }
    }

    pub fn grid(&self) -> &Arc<CurvilinearGrid> {
        &self.grid
    }

    /// Representative grid spacing in meters: the largest distance between
    /// consecutive points along the middle row `i = ni / 2`.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    #[inline]
    fn distance(&self, lon: f64, lat: f64, i: usize, j: usize) -> f64 {
        let (plon, plat) = self.grid.point(i, j);
        haversine_distance(lon, lat, plon, plat)
    }

    /// Search from `(seed_i, seed_j)`.
    ///
    /// A seed that is out of range or missing is replaced with the first
    /// non-missing point. A grid with no valid points, or a non-finite query,
    /// reports `NotCovered` at the starting point.
    pub fn nearest(&self, lon: f64, lat: f64, seed_i: usize, seed_j: usize) -> NearestResult {
        let (mut i, mut j) = if self.grid.is_valid(seed_i, seed_j) {
            (seed_i, seed_j)
        } else {
            match self.grid.first_valid() {
                Some(start) => start,
                None => return NearestResult::NotCovered { i: 0, j: 0 },
            }
        };
        if !lon.is_finite() || !lat.is_finite() {
            return NearestResult::NotCovered { i, j };
        }

        let ni = self.grid.ni();
        let nj = self.grid.nj();
        let mut dist = self.distance(lon, lat, i, j);

        loop {
            let (mut best_i, mut best_j) = (i, j);
            let left = if i == 0 { ni - 1 } else { i - 1 };
            let right = if i == ni - 1 { 0 } else { i + 1 };
            let neighbours = [
                Some((left, j)),
                Some((right, j)),
                j.checked_sub(1).map(|down| (i, down)),
                (j + 1 < nj).then_some((i, j + 1)),
            ];

            for (ti, tj) in neighbours.into_iter().flatten() {
                if self.grid.is_missing(ti, tj) {
                    continue;
                }
                let test = self.distance(lon, lat, ti, tj);
                if test < dist {
                    best_i = ti;
                    best_j = tj;
                    dist = test;
                }
            }

            if (best_i, best_j) == (i, j) {
                break;
            }
            i = best_i;
            j = best_j;
        }

        if self.on_edge(i, j) && dist > self.spacing {
            NearestResult::NotCovered { i, j }
        } else {
            NearestResult::Found { i, j }
        }
    }

    /// Search seeded from `state`, storing the converged indices back into it.
    pub fn nearest_from(&self, lon: f64, lat: f64, state: &mut SearchState) -> NearestResult {
        let result = self.nearest(lon, lat, state.last_i, state.last_j);
        let (i, j) = result.indices();
        state.last_i = i;
        state.last_j = j;
        result
    }

    /// On the index boundary, or next to a missing point.
    fn on_edge(&self, i: usize, j: usize) -> bool {
        i == 0
            || i == self.grid.ni() - 1
            || j == 0
            || j == self.grid.nj() - 1
            || self.grid.is_missing(i - 1, j)
            || self.grid.is_missing(i + 1, j)
            || self.grid.is_missing(i, j - 1)
            || self.grid.is_missing(i, j + 1)
    }

    /// Brute-force nearest non-missing point. Diagnostic use only.
    pub fn exhaustive_nearest(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f64)> = None;
        for i in 0..self.grid.ni() {
            for j in 0..self.grid.nj() {
                if self.grid.is_missing(i, j) {
                    continue;
                }
                let d = self.distance(lon, lat, i, j);
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some(((i, j), d));
                }
            }
        }
        best.map(|(p, _)| p)
    }
}

fn estimate_spacing(grid: &CurvilinearGrid) -> f64 {
    let i = grid.ni() / 2;
    let mut max_dist: f64 = 0.0;
    for j in 0..grid.nj() - 1 {
        let (lon1, lat1) = grid.point(i, j);
        let (lon2, lat2) = grid.point(i, j + 1);
        let d = haversine_distance(lon1, lat1, lon2, lat2);
        if !d.is_nan() {
            max_dist = max_dist.max(d);
        }
    }
    max_dist
}
