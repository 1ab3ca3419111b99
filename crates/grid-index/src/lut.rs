//! Rasterized look-up tables for curvilinear grids.
//!
//! A [`LookupTable`] is a regular lon/lat raster in which every pixel holds
//! the `(i, j)` of the source cell whose footprint covers the pixel centre.
//! Building it costs one polygon fill per source cell; afterwards a query is a
//! single array read.
//!
//! Each footprint is painted twice: at its own longitude, and shifted by a
//! full turn towards the other side of the antimeridian (-360 for cells east
//! of the prime meridian, +360 otherwise). Together with the retry in
//! [`LookupTable::lookup`] this lets queries use either the [-180, 180] or
//! the [0, 360] longitude convention.

use std::sync::Arc;
use std::time::Instant;

use grid_common::longitude::next_equivalent;
use tracing::{debug, info};

use crate::curvilinear::CurvilinearGrid;
use crate::error::{IndexError, IndexResult};

/// Default number of table pixels per mean cell width.
pub const DEFAULT_OVERSAMPLING: f64 = 3.0;

/// Default upper bound on table size (pixels per table).
pub const DEFAULT_MAX_LUT_PIXELS: u64 = 64_000_000;

/// Marker for pixels not covered by any footprint.
const UNSET: i32 = -1;

/// Neighbours tried, in order, when the table answer does not contain the
/// query point: edges first, then corners.
const REFINE_NEIGHBOURS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Pre-computed `(i, j)` indices for a lon/lat raster.
///
/// Pixels are square in degrees: one `resolution` serves as both the
/// longitude and the latitude pixel size. Row 0 is at the minimum latitude.
/// Pixel `(x, y)` covers `[origin_lon + x * res, origin_lon + (x + 1) * res)`
/// in longitude and the analogous range in latitude.
#[derive(Debug, Clone)]
pub struct LookupTable {
    origin_lon: f64,
    origin_lat: f64,
    resolution: f64,
    width: usize,
    height: usize,
    i_values: Vec<i32>,
    j_values: Vec<i32>,
}

impl LookupTable {
    /// Table resolution giving roughly `oversampling` pixels per mean cell
    /// width: `sqrt(mean cell area) / oversampling`.
    pub fn suggested_resolution(grid: &CurvilinearGrid, oversampling: f64) -> IndexResult<f64> {
        if !(oversampling.is_finite() && oversampling > 0.0) {
            return Err(IndexError::InvalidOversampling(oversampling));
        }
        let area = grid.mean_cell_area().ok_or(IndexError::NoValidCells)?;
        let resolution = area.sqrt() / oversampling;
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(IndexError::InvalidResolution(resolution));
        }
        Ok(resolution)
    }

    /// Build a table at `resolution` degrees per pixel with the default size
    /// limit.
    pub fn build(grid: &CurvilinearGrid, resolution: f64) -> IndexResult<Self> {
        Self::build_with_limit(grid, resolution, DEFAULT_MAX_LUT_PIXELS)
    }

    /// Build a table at `resolution` degrees per pixel, refusing to allocate
    /// more than `max_pixels` pixels.
    pub fn build_with_limit(
        grid: &CurvilinearGrid,
        resolution: f64,
        max_pixels: u64,
    ) -> IndexResult<Self> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(IndexError::InvalidResolution(resolution));
        }

        let Some(bbox) = grid.footprint_bbox() else {
            debug!("Grid has no valid cells, building empty look-up table");
            return Ok(Self::empty(resolution));
        };

        let width_f = (bbox.width() / resolution).ceil().max(1.0);
        let height_f = (bbox.height() / resolution).ceil().max(1.0);
        if width_f * height_f > max_pixels as f64 {
            return Err(IndexError::LutTooLarge {
                width: width_f as u64,
                height: height_f as u64,
                max_pixels,
            });
        }
        let width = width_f as usize;
        let height = height_f as usize;

        debug!(
            ni = grid.ni(),
            nj = grid.nj(),
            width,
            height,
            resolution,
            "Building look-up table"
        );
        let start = Instant::now();

        let mut table = Self {
            origin_lon: bbox.min_x,
            origin_lat: bbox.min_y,
            resolution,
            width,
            height,
            i_values: vec![UNSET; width * height],
            j_values: vec![UNSET; width * height],
        };

        // Later cells overwrite earlier ones where footprints overlap
        for i in 0..grid.ni() {
            for j in 0..grid.nj() {
                let Some(corners) = grid.cell_corners(i, j) else {
                    continue;
                };
                let (lon, _) = grid.point(i, j);
                let shift = if lon > 0.0 { -360.0 } else { 360.0 };
                table.paint(&corners, 0.0, i as i32, j as i32);
                table.paint(&corners, shift, i as i32, j as i32);
            }
        }

        info!(
            width,
            height,
            painted = table.painted_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Look-up table built"
        );
        Ok(table)
    }

    fn empty(resolution: f64) -> Self {
        Self {
            origin_lon: 0.0,
            origin_lat: 0.0,
            resolution,
            width: 0,
            height: 0,
            i_values: Vec::new(),
            j_values: Vec::new(),
        }
    }

    /// Scanline fill: set every pixel whose centre lies inside the polygon.
    fn paint(&mut self, polygon: &[(f64, f64); 4], lon_shift: f64, i: i32, j: i32) {
        let res = self.resolution;
        let min_lat = polygon.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_lat = polygon.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        let row_start = self.first_centre_at_or_after(min_lat - self.origin_lat, self.height);
        let row_end = self.first_centre_at_or_after(max_lat - self.origin_lat, self.height);

        let mut crossings: Vec<f64> = Vec::with_capacity(4);
        for row in row_start..row_end {
            let y = self.origin_lat + (row as f64 + 0.5) * res;

            crossings.clear();
            for k in 0..polygon.len() {
                let (x1, y1) = polygon[k];
                let (x2, y2) = polygon[(k + 1) % polygon.len()];
                if (y1 > y) != (y2 > y) {
                    crossings.push(x1 + (y - y1) * (x2 - x1) / (y2 - y1) + lon_shift);
                }
            }
            crossings.sort_by(f64::total_cmp);

            for span in crossings.chunks_exact(2) {
                let col_start =
                    self.first_centre_at_or_after(span[0] - self.origin_lon, self.width);
                let col_end = self.first_centre_at_or_after(span[1] - self.origin_lon, self.width);
                let base = row * self.width;
                for col in col_start..col_end {
                    self.i_values[base + col] = i;
                    self.j_values[base + col] = j;
                }
            }
        }
    }

    /// Index of the first pixel whose centre is at or after `offset` from the
    /// origin, clamped to `[0, limit]`.
    fn first_centre_at_or_after(&self, offset: f64, limit: usize) -> usize {
        let pos = (offset / self.resolution - 0.5).ceil();
        pos.clamp(0.0, limit as f64) as usize
    }

    /// Source `(i, j)` covering the point, or `None` when outside coverage.
    ///
    /// Longitudes outside the table are retried at their equivalent inside
    /// the table's 360-degree window.
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        if !lon.is_finite() || !lat.is_finite() || self.width == 0 {
            return None;
        }

        let row = ((lat - self.origin_lat) / self.resolution).floor();
        if row < 0.0 || row >= self.height as f64 {
            return None;
        }

        let mut col = ((lon - self.origin_lon) / self.resolution).floor();
        if col < 0.0 || col >= self.width as f64 {
            let shifted = next_equivalent(self.origin_lon, lon);
            col = ((shifted - self.origin_lon) / self.resolution).floor();
            if col < 0.0 || col >= self.width as f64 {
                return None;
            }
        }

        let k = row as usize * self.width + col as usize;
        let (i, j) = (self.i_values[k], self.j_values[k]);
        if i == UNSET || j == UNSET {
            None
        } else {
            Some((i as usize, j as usize))
        }
    }

    /// Lower-left corner of the table as `(lon, lat)`.
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_lon, self.origin_lat)
    }

    /// Pixel size in degrees (same on both axes).
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels covered by some footprint.
    pub fn painted_count(&self) -> usize {
        self.i_values.iter().filter(|&&v| v != UNSET).count()
    }
}

/// A look-up table paired with its grid, refining table answers with an
/// exact footprint containment test.
#[derive(Debug, Clone)]
pub struct LutIndex {
    grid: Arc<CurvilinearGrid>,
    table: LookupTable,
}

impl LutIndex {
    pub fn new(grid: Arc<CurvilinearGrid>, table: LookupTable) -> Self {
        Self { grid, table }
    }

    /// Build a table at the suggested resolution for `oversampling`.
    pub fn build(
        grid: Arc<CurvilinearGrid>,
        oversampling: f64,
        max_pixels: u64,
    ) -> IndexResult<Self> {
        let resolution = LookupTable::suggested_resolution(&grid, oversampling)?;
        let table = LookupTable::build_with_limit(&grid, resolution, max_pixels)?;
        Ok(Self::new(grid, table))
    }

    pub fn grid(&self) -> &Arc<CurvilinearGrid> {
        &self.grid
    }

    pub fn table(&self) -> &LookupTable {
        &self.table
    }

    /// Find the source cell for a point.
    ///
    /// The table answer is accepted if its footprint contains the point.
    /// Otherwise the edge neighbours and then the corner neighbours are
    /// tried; if none contains the point the table answer is returned as is.
    pub fn find(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        let (i, j) = self.table.lookup(lon, lat)?;
        if self.grid.cell_contains(i, j, lon, lat) {
            return Some((i, j));
        }

        for (di, dj) in REFINE_NEIGHBOURS {
            let (Some(ni), Some(nj)) = (i.checked_add_signed(di), j.checked_add_signed(dj)) else {
                continue;
            };
            if self.grid.cell_contains(ni, nj, lon, lat) {
                return Some((ni, nj));
            }
        }
        Some((i, j))
    }
}
