//! Synthetic source grids and data values.
//!
//! Coordinate arrays are returned as plain vectors so any crate can wrap them
//! in its own grid type. Layout is row-major with `i` varying fastest:
//! the point `(i, j)` lives at `j * ni + i`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Longitude and latitude arrays for a two-dimensional grid.
#[derive(Debug, Clone)]
pub struct SyntheticCoords {
    pub ni: usize,
    pub nj: usize,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
}

impl SyntheticCoords {
    fn from_fn(ni: usize, nj: usize, f: impl Fn(usize, usize) -> (f64, f64)) -> Self {
        let mut lon = Vec::with_capacity(ni * nj);
        let mut lat = Vec::with_capacity(ni * nj);
        for j in 0..nj {
            for i in 0..ni {
                let (x, y) = f(i, j);
                lon.push(x);
                lat.push(y);
            }
        }
        Self { ni, nj, lon, lat }
    }

    /// Flat offset of point `(i, j)`.
    pub fn offset(&self, i: usize, j: usize) -> usize {
        j * self.ni + i
    }

    /// Coordinates of point `(i, j)` as `(lon, lat)`.
    pub fn point(&self, i: usize, j: usize) -> (f64, f64) {
        let k = self.offset(i, j);
        (self.lon[k], self.lat[k])
    }

    /// Mark the given points as missing by setting both coordinates to NaN.
    pub fn with_missing(mut self, points: &[(usize, usize)]) -> Self {
        for &(i, j) in points {
            let k = self.offset(i, j);
            self.lon[k] = f64::NAN;
            self.lat[k] = f64::NAN;
        }
        self
    }
}

/// A regular lon/lat grid expressed as 2D coordinate arrays.
///
/// ```
/// use test_utils::regular_as_curvilinear;
///
/// let coords = regular_as_curvilinear(-10.0, -10.0, 5.0, 5.0, 4, 4);
/// assert_eq!(coords.point(3, 0), (5.0, -10.0));
/// ```
pub fn regular_as_curvilinear(
    lon0: f64,
    lat0: f64,
    dlon: f64,
    dlat: f64,
    ni: usize,
    nj: usize,
) -> SyntheticCoords {
    SyntheticCoords::from_fn(ni, nj, |i, j| {
        (lon0 + i as f64 * dlon, lat0 + j as f64 * dlat)
    })
}

/// A grid rotated by `angle_deg` about its centre point.
///
/// The unrotated grid has spacing `spacing` degrees on both axes.
pub fn rotated_grid(
    center_lon: f64,
    center_lat: f64,
    spacing: f64,
    angle_deg: f64,
    ni: usize,
    nj: usize,
) -> SyntheticCoords {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let ci = (ni as f64 - 1.0) / 2.0;
    let cj = (nj as f64 - 1.0) / 2.0;
    SyntheticCoords::from_fn(ni, nj, |i, j| {
        let u = (i as f64 - ci) * spacing;
        let v = (j as f64 - cj) * spacing;
        (center_lon + u * cos - v * sin, center_lat + u * sin + v * cos)
    })
}

/// A curved satellite-swath-like grid.
///
/// Scan lines (`j`) advance northwards along a track that drifts westwards,
/// and each scan line bows slightly so cells are neither square nor aligned.
pub fn swath_grid(
    start_lon: f64,
    start_lat: f64,
    spacing: f64,
    ni: usize,
    nj: usize,
) -> SyntheticCoords {
    let ci = (ni as f64 - 1.0) / 2.0;
    SyntheticCoords::from_fn(ni, nj, |i, j| {
        let across = (i as f64 - ci) * spacing;
        let along = j as f64 * spacing;
        let bow = 0.02 * across * across / spacing.max(f64::EPSILON);
        (
            start_lon + across - 0.15 * along,
            start_lat + along + bow * 0.1,
        )
    })
}

/// A regular grid centred on the antimeridian with longitudes stored in the
/// (-180, 180] convention, so they jump from about +180 to about -180 midway.
pub fn antimeridian_grid(spacing: f64, ni: usize, nj: usize, lat0: f64) -> SyntheticCoords {
    let ci = (ni as f64 - 1.0) / 2.0;
    SyntheticCoords::from_fn(ni, nj, |i, j| {
        let mut lon = 180.0 + (i as f64 - ci) * spacing;
        if lon > 180.0 {
            lon -= 360.0;
        }
        (lon, lat0 + j as f64 * spacing)
    })
}

/// A regular grid with every point displaced by a deterministic random
/// fraction (`jitter`, in units of `spacing`) of the grid spacing.
pub fn jittered_grid(
    lon0: f64,
    lat0: f64,
    spacing: f64,
    jitter: f64,
    ni: usize,
    nj: usize,
    seed: u64,
) -> SyntheticCoords {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut offsets = Vec::with_capacity(ni * nj);
    for _ in 0..ni * nj {
        let dx: f64 = rng.gen_range(-jitter..=jitter);
        let dy: f64 = rng.gen_range(-jitter..=jitter);
        offsets.push((dx * spacing, dy * spacing));
    }
    SyntheticCoords::from_fn(ni, nj, |i, j| {
        let (dx, dy) = offsets[j * ni + i];
        (lon0 + i as f64 * spacing + dx, lat0 + j as f64 * spacing + dy)
    })
}

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being read correctly by checking
/// that grid[row][col] == col * 1000 + row.
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}
