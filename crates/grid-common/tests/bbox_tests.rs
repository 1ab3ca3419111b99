//! Tests for BoundingBox geometry and OutputGrid construction.

use grid_common::{BoundingBox, CrsCode, GridError, OutputGrid};

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_extent() {
    let bbox = BoundingBox::new(-20037508.34, -10.0, 20037508.34, 30.0);
    assert!((bbox.width() - 40075016.68).abs() < 0.01);
    assert_eq!(bbox.height(), 40.0);
}

#[test]
fn test_validate_rejects_infinite() {
    let bbox = BoundingBox::new(f64::NEG_INFINITY, 0.0, 1.0, 1.0);
    assert!(matches!(bbox.validate(), Err(GridError::InvalidBbox(_))));
}

// ============================================================================
// OutputGrid construction
// ============================================================================

#[test]
fn test_output_grid_from_parts() {
    let crs = CrsCode::parse("CRS:84").unwrap();
    let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
    let grid = OutputGrid::new(crs, 256, 128, bbox).unwrap();

    assert_eq!(grid.crs, CrsCode::Epsg4326);
    assert_eq!(grid.pixel_size(), (20.0 / 256.0, 20.0 / 128.0));
    assert_eq!(grid.len(), 256 * 128);
}

#[test]
fn test_output_grid_rejects_zero_width() {
    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let result = OutputGrid::new(CrsCode::Epsg4326, 0, 10, bbox);
    assert!(matches!(
        result,
        Err(GridError::InvalidDimensions { width: 0, height: 10 })
    ));
}

#[test]
fn test_output_grid_rejects_inverted_bbox() {
    let bbox = BoundingBox::new(10.0, 0.0, 0.0, 1.0);
    let result = OutputGrid::new(CrsCode::Epsg3857, 4, 4, bbox);
    assert!(matches!(result, Err(GridError::InvalidBbox(_))));
}
