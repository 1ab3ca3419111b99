//! The raster a request asks to fill.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, CrsCode, GridError};

/// The regularly spaced raster a request asks to be filled.
///
/// Pixel `(x, y)` has `x` varying fastest and row 0 at the top (maximum Y)
/// edge. Its flat index is `y * width + x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputGrid {
    pub crs: CrsCode,
    pub width: usize,
    pub height: usize,
    pub bbox: BoundingBox,
}

impl OutputGrid {
    /// Create an output grid, rejecting empty dimensions and degenerate boxes.
    pub fn new(
        crs: CrsCode,
        width: usize,
        height: usize,
        bbox: BoundingBox,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        bbox.validate()?;

        Ok(Self {
            crs,
            width,
            height,
            bbox,
        })
    }

    /// Pixel size in CRS units as `(dx, dy)`.
    pub fn pixel_size(&self) -> (f64, f64) {
        (
            self.bbox.width() / self.width as f64,
            self.bbox.height() / self.height as f64,
        )
    }

    /// CRS coordinates of the centre of pixel `(x, y)`.
    pub fn pixel_center(&self, x: usize, y: usize) -> (f64, f64) {
        let (dx, dy) = self.pixel_size();
        (
            self.bbox.min_x + (x as f64 + 0.5) * dx,
            self.bbox.max_y - (y as f64 + 0.5) * dy,
        )
    }

    /// Flat pixel index for `(x, y)`.
    pub fn pixel_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Never true for a validated grid; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> OutputGrid {
        OutputGrid::new(
            CrsCode::Epsg4326,
            4,
            4,
            BoundingBox::new(-10.0, -10.0, 10.0, 10.0),
        )
        .unwrap()
    }

    #[test]
    fn test_pixel_centers() {
        let grid = sample_grid();
        assert_eq!(grid.pixel_center(0, 0), (-7.5, 7.5));
        assert_eq!(grid.pixel_center(3, 0), (7.5, 7.5));
        assert_eq!(grid.pixel_center(0, 3), (-7.5, -7.5));
        assert_eq!(grid.pixel_index(1, 2), 9);
        assert_eq!(grid.len(), 16);
    }

    #[test]
    fn test_rejects_invalid() {
        let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
        assert!(OutputGrid::new(CrsCode::Epsg4326, 0, 4, bbox).is_err());
        assert!(OutputGrid::new(CrsCode::Epsg4326, 4, 0, bbox).is_err());
        assert!(OutputGrid::new(
            CrsCode::Epsg4326,
            4,
            4,
            BoundingBox::new(10.0, -10.0, -10.0, 10.0)
        )
        .is_err());
    }
}
