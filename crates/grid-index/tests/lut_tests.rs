//! Look-up table round trips on synthetic curvilinear grids.

use std::sync::Arc;

use grid_index::{CurvilinearGrid, LookupTable, LutIndex, DEFAULT_OVERSAMPLING};
use test_utils::{
    antimeridian_grid, jittered_grid, regular_as_curvilinear, rotated_grid, swath_grid,
    SyntheticCoords,
};

fn to_grid(coords: SyntheticCoords) -> Arc<CurvilinearGrid> {
    Arc::new(CurvilinearGrid::new(coords.ni, coords.nj, coords.lon, coords.lat).unwrap())
}

/// Every grid point must look up to itself.
fn assert_round_trip(grid: &Arc<CurvilinearGrid>, index: &LutIndex) {
    for (i, j) in grid.valid_points() {
        let (lon, lat) = grid.point(i, j);
        assert_eq!(index.find(lon, lat), Some((i, j)), "point ({i}, {j}) at ({lon}, {lat})");
    }
}

#[test]
fn test_round_trip_regular() {
    let grid = to_grid(regular_as_curvilinear(-20.0, 30.0, 0.5, 0.5, 40, 30));
    let index = LutIndex::build(Arc::clone(&grid), DEFAULT_OVERSAMPLING, 10_000_000).unwrap();
    assert_round_trip(&grid, &index);
}

#[test]
fn test_round_trip_rotated() {
    let grid = to_grid(rotated_grid(10.0, 45.0, 0.25, 30.0, 32, 24));
    let index = LutIndex::build(Arc::clone(&grid), DEFAULT_OVERSAMPLING, 10_000_000).unwrap();
    assert_round_trip(&grid, &index);
}

#[test]
fn test_round_trip_swath() {
    let grid = to_grid(swath_grid(-60.0, -10.0, 0.2, 25, 40));
    let index = LutIndex::build(Arc::clone(&grid), 4.0, 10_000_000).unwrap();
    assert_round_trip(&grid, &index);
}

#[test]
fn test_round_trip_jittered_without_refinement_at_fine_resolution() {
    let grid = to_grid(jittered_grid(100.0, -5.0, 1.0, 0.05, 12, 12, 7));
    let table = LookupTable::build(&grid, 0.05).unwrap();
    for (i, j) in grid.valid_points() {
        let (lon, lat) = grid.point(i, j);
        assert_eq!(table.lookup(lon, lat), Some((i, j)));
    }
}

#[test]
fn test_round_trip_with_missing_points() {
    let coords = regular_as_curvilinear(0.0, 0.0, 1.0, 1.0, 10, 10).with_missing(&[(4, 4), (0, 9)]);
    let grid = to_grid(coords);
    let index = LutIndex::build(Arc::clone(&grid), DEFAULT_OVERSAMPLING, 10_000_000).unwrap();
    assert_round_trip(&grid, &index);
    assert_eq!(index.find(4.0, 4.0), None);
}

#[test]
fn test_outside_coverage() {
    let grid = to_grid(regular_as_curvilinear(0.0, 0.0, 1.0, 1.0, 5, 5));
    let index = LutIndex::build(Arc::clone(&grid), DEFAULT_OVERSAMPLING, 10_000_000).unwrap();
    assert_eq!(index.find(10.0, 2.0), None);
    assert_eq!(index.find(2.0, -3.0), None);
}

#[test]
fn test_antimeridian_cell_from_both_conventions() {
    // Longitudes 177.5, 178.5, 179.5, -179.5, -178.5, -177.5
    let grid = to_grid(antimeridian_grid(1.0, 6, 4, -2.0));
    let index = LutIndex::build(Arc::clone(&grid), DEFAULT_OVERSAMPLING, 10_000_000).unwrap();

    // The cell centred on -179.5, from the -180..180 and 0..360 sides
    assert_eq!(index.find(-179.6, 0.1), Some((3, 2)));
    assert_eq!(index.find(180.4, 0.1), Some((3, 2)));

    // The cell centred on 179.5, from the -180..180 and 0..360 sides
    assert_eq!(index.find(179.6, 0.1), Some((2, 2)));
    assert_eq!(index.find(-180.4, 0.1), Some((2, 2)));

    // A point right on the antimeridian resolves to one of its two
    // neighbours whichever way it is written
    let east = index.find(180.0, -1.0).unwrap();
    let west = index.find(-180.0, -1.0).unwrap();
    assert_eq!(east, west);
    assert!(east == (2, 1) || east == (3, 1));
}

#[test]
fn test_grid_in_0_360_convention() {
    // Longitudes 358.0 .. 363.0 wrapped into 0..360
    let mut coords = regular_as_curvilinear(358.0, 0.0, 1.0, 1.0, 6, 3);
    for lon in coords.lon.iter_mut() {
        if *lon >= 360.0 {
            *lon -= 360.0;
        }
    }
    let grid = to_grid(coords);
    let index = LutIndex::build(Arc::clone(&grid), DEFAULT_OVERSAMPLING, 10_000_000).unwrap();

    assert_eq!(index.find(-1.9, 1.0), Some((0, 1)));
    assert_eq!(index.find(358.1, 1.0), Some((0, 1)));
    assert_eq!(index.find(0.1, 1.0), Some((2, 1)));
    assert_eq!(index.find(3.0, 2.0), Some((5, 2)));
}

#[test]
fn test_lut_too_large_is_rejected() {
    let grid = to_grid(regular_as_curvilinear(0.0, 0.0, 1.0, 1.0, 50, 50));
    assert!(LutIndex::build(grid, 100.0, 1_000).is_err());
}
