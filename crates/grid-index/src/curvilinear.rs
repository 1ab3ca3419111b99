//! Curvilinear grids with two-dimensional coordinate arrays.
//!
//! Each non-missing grid point `(i, j)` owns a quadrilateral footprint. The
//! corners of the footprint are the centroids of the four 2x2 blocks of grid
//! points that contain `(i, j)`. Points beyond the edge of the grid are
//! extrapolated linearly from the nearest two rows or columns, so edge cells
//! get footprints of the same size as their neighbours.
//!
//! All footprint geometry is computed with longitudes unwrapped relative to
//! the owning point, so a footprint never spans the antimeridian the long way
//! round. Footprint longitudes may therefore fall outside [-180, 180].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use grid_common::longitude::unwrap_near;
use grid_common::BoundingBox;

use crate::error::{IndexError, IndexResult};

/// Offsets from a point to the lower-left point of each 2x2 block containing
/// it, in winding order.
const CORNER_BLOCKS: [(isize, isize); 4] = [(-1, -1), (0, -1), (0, 0), (-1, 0)];

/// A grid whose points have individual longitude and latitude values.
///
/// Coordinates are stored row-major with `i` varying fastest: point `(i, j)`
/// is at offset `j * ni + i`. A point is missing when either of its
/// coordinates is not finite.
#[derive(Debug, Clone)]
pub struct CurvilinearGrid {
    ni: usize,
    nj: usize,
    lon: Vec<f64>,
    lat: Vec<f64>,
    missing: Vec<bool>,
    fingerprint: u64,
}

impl CurvilinearGrid {
    /// Wrap coordinate arrays of `ni * nj` values each.
    pub fn new(ni: usize, nj: usize, lon: Vec<f64>, lat: Vec<f64>) -> IndexResult<Self> {
        let expected = ni * nj;
        if lon.len() != expected || lat.len() != expected {
            return Err(IndexError::DimensionMismatch {
                lon: lon.len(),
                lat: lat.len(),
                expected,
            });
        }
        if ni < 2 || nj < 2 {
            return Err(IndexError::GridTooSmall { ni, nj });
        }

        let missing: Vec<bool> = lon
            .iter()
            .zip(&lat)
            .map(|(x, y)| !(x.is_finite() && y.is_finite()))
            .collect();

        let mut hasher = DefaultHasher::new();
        ni.hash(&mut hasher);
        nj.hash(&mut hasher);
        for (x, y) in lon.iter().zip(&lat) {
            x.to_bits().hash(&mut hasher);
            y.to_bits().hash(&mut hasher);
        }
        let fingerprint = hasher.finish();

        Ok(Self {
            ni,
            nj,
            lon,
            lat,
            missing,
            fingerprint,
        })
    }

    pub fn ni(&self) -> usize {
        self.ni
    }

    pub fn nj(&self) -> usize {
        self.nj
    }

    /// Total number of grid points, missing ones included.
    pub fn len(&self) -> usize {
        self.ni * self.nj
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hash of the grid shape and every coordinate bit pattern.
    ///
    /// Two grids with the same fingerprint are treated as the same grid when
    /// caching look-up tables.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        j * self.ni + i
    }

    /// Coordinates of point `(i, j)` as `(lon, lat)`; NaN or infinite for
    /// missing points.
    #[inline]
    pub fn point(&self, i: usize, j: usize) -> (f64, f64) {
        let k = self.offset(i, j);
        (self.lon[k], self.lat[k])
    }

    /// Whether `(i, j)` is in range and has both coordinates.
    #[inline]
    pub fn is_valid(&self, i: usize, j: usize) -> bool {
        i < self.ni && j < self.nj && !self.missing[self.offset(i, j)]
    }

    /// Whether `(i, j)` is missing. Out-of-range indices count as missing.
    #[inline]
    pub fn is_missing(&self, i: usize, j: usize) -> bool {
        !self.is_valid(i, j)
    }

    /// Number of non-missing points.
    pub fn valid_count(&self) -> usize {
        self.missing.iter().filter(|m| !**m).count()
    }

    /// The first non-missing point in storage order.
    pub fn first_valid(&self) -> Option<(usize, usize)> {
        self.missing
            .iter()
            .position(|m| !*m)
            .map(|k| (k % self.ni, k / self.ni))
    }

    /// Iterate over non-missing points as `(i, j)`, `i` varying fastest.
    pub fn valid_points(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.nj)
            .flat_map(move |j| (0..self.ni).map(move |i| (i, j)))
            .filter(move |&(i, j)| self.is_valid(i, j))
    }

    /// Point coordinates with linear extrapolation beyond the grid edge.
    ///
    /// `i` and `j` may be at most one step outside the grid. Longitudes are
    /// unwrapped relative to `ref_lon` before any arithmetic.
    fn sample(&self, i: isize, j: isize, ref_lon: f64) -> (f64, f64) {
        let ni = self.ni as isize;
        let nj = self.nj as isize;
        if i < 0 {
            return extrapolate(self.sample(0, j, ref_lon), self.sample(1, j, ref_lon));
        }
        if i >= ni {
            return extrapolate(
                self.sample(ni - 1, j, ref_lon),
                self.sample(ni - 2, j, ref_lon),
            );
        }
        if j < 0 {
            return extrapolate(self.sample(i, 0, ref_lon), self.sample(i, 1, ref_lon));
        }
        if j >= nj {
            return extrapolate(
                self.sample(i, nj - 1, ref_lon),
                self.sample(i, nj - 2, ref_lon),
            );
        }
        let (lon, lat) = self.point(i as usize, j as usize);
        (unwrap_near(lon, ref_lon), lat)
    }

    /// Footprint corners of point `(i, j)` in winding order, or `None` for a
    /// missing point.
    ///
    /// Corner longitudes are unwrapped relative to the point's own longitude.
    pub fn cell_corners(&self, i: usize, j: usize) -> Option<[(f64, f64); 4]> {
        if !self.is_valid(i, j) {
            return None;
        }
        let (ref_lon, _) = self.point(i, j);
        let (ci, cj) = (i as isize, j as isize);

        let mut corners = [(0.0, 0.0); 4];
        for (corner, (di, dj)) in corners.iter_mut().zip(CORNER_BLOCKS) {
            let mut sum_lon = 0.0;
            let mut sum_lat = 0.0;
            let mut count = 0usize;
            for (bi, bj) in [(0, 0), (1, 0), (1, 1), (0, 1)] {
                let (lon, lat) = self.sample(ci + di + bi, cj + dj + bj, ref_lon);
                if lon.is_finite() && lat.is_finite() {
                    sum_lon += lon;
                    sum_lat += lat;
                    count += 1;
                }
            }
            // The owning point belongs to every block, so count >= 1
            *corner = (sum_lon / count as f64, sum_lat / count as f64);
        }
        Some(corners)
    }

    /// Whether the footprint of `(i, j)` contains the point.
    ///
    /// The query longitude may use any 360-degree convention.
    pub fn cell_contains(&self, i: usize, j: usize, lon: f64, lat: f64) -> bool {
        let Some(corners) = self.cell_corners(i, j) else {
            return false;
        };
        let (ref_lon, _) = self.point(i, j);
        point_in_polygon(unwrap_near(lon, ref_lon), lat, &corners)
    }

    /// Area of the footprint of `(i, j)` in square degrees.
    pub fn cell_area(&self, i: usize, j: usize) -> Option<f64> {
        self.cell_corners(i, j).map(|corners| polygon_area(&corners))
    }

    /// Mean footprint area over all non-missing points, in square degrees.
    pub fn mean_cell_area(&self) -> Option<f64> {
        let mut total = 0.0;
        let mut count = 0usize;
        for (i, j) in self.valid_points() {
            if let Some(area) = self.cell_area(i, j) {
                total += area;
                count += 1;
            }
        }
        (count > 0).then(|| total / count as f64)
    }

    /// Bounding box of every footprint corner, in unwrapped longitudes.
    pub fn footprint_bbox(&self) -> Option<BoundingBox> {
        let mut bbox = BoundingBox::empty();
        for (i, j) in self.valid_points() {
            if let Some(corners) = self.cell_corners(i, j) {
                for (lon, lat) in corners {
                    bbox.include_point(lon, lat);
                }
            }
        }
        (!bbox.is_empty()).then_some(bbox)
    }
}

/// Reflect `far` through `near`: the next point on the line far -> near.
#[inline]
fn extrapolate(near: (f64, f64), far: (f64, f64)) -> (f64, f64) {
    (2.0 * near.0 - far.0, 2.0 * near.1 - far.1)
}

/// Crossing-number point-in-polygon test.
pub(crate) fn point_in_polygon(x: f64, y: f64, polygon: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    for k in 0..n {
        let (x1, y1) = polygon[k];
        let (x2, y2) = polygon[(k + 1) % n];
        if (y1 > y) != (y2 > y) {
            let cross_x = x1 + (y - y1) * (x2 - x1) / (y2 - y1);
            if x < cross_x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Absolute shoelace area.
fn polygon_area(polygon: &[(f64, f64)]) -> f64 {
    let n = polygon.len();
    let mut twice = 0.0;
    for k in 0..n {
        let (x1, y1) = polygon[k];
        let (x2, y2) = polygon[(k + 1) % n];
        twice += x1 * y2 - x2 * y1;
    }
    (twice / 2.0).abs()
}
