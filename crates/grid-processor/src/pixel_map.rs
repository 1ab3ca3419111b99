//! Mapping output pixels onto source grid samples.
//!
//! A [`PixelMap`] groups the pixels of an output raster by the source sample
//! each one needs, so that every source value is read once no matter how many
//! pixels it fills. The [`PixelMapper`] builds it: for every output pixel it
//! transforms the pixel centre to geographic coordinates, asks the
//! [`HorizontalIndex`] for the nearest source `(i, j)` and records the pixel
//! in that bucket.

use std::collections::BTreeMap;

use grid_common::{CrsCode, OutputGrid};
use grid_index::{HorizontalIndex, SearchState};
use projection::PointTransform;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Position of a sample in the source grid.
///
/// Ordered by row (`j`) first, then column (`i`), which is the order data
/// readers prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceIndex {
    pub j: usize,
    pub i: usize,
}

impl SourceIndex {
    pub fn new(i: usize, j: usize) -> Self {
        Self { j, i }
    }
}

/// Number of output pixels left unmapped, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    /// The pixel centre fell outside the latitude range of the output CRS.
    pub out_of_latitude_range: usize,
    /// The coordinate transform failed for the pixel centre.
    pub transform_failed: usize,
    /// The index found no source sample covering the point.
    pub not_covered: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.out_of_latitude_range + self.transform_failed + self.not_covered
    }
}

/// Output pixels grouped by source sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelMap {
    output_size: usize,
    // j -> i -> ascending output pixel indices
    rows: BTreeMap<usize, BTreeMap<usize, Vec<usize>>>,
    unique: usize,
    mapped: usize,
    dropped: DropCounts,
}

impl PixelMap {
    /// An empty map for an output raster of `output_size` pixels.
    pub fn new(output_size: usize) -> Self {
        Self {
            output_size,
            ..Default::default()
        }
    }

    /// Record that output pixel `pixel` takes its value from source `(i, j)`.
    ///
    /// Pixels must be inserted in ascending order for each sample.
    pub fn insert(&mut self, i: usize, j: usize, pixel: usize) {
        let pixels = self.rows.entry(j).or_default().entry(i).or_insert_with(|| {
            self.unique += 1;
            Vec::new()
        });
        debug_assert!(pixels.last().map_or(true, |&last| last < pixel));
        pixels.push(pixel);
        self.mapped += 1;
    }

    /// Output pixels that take their value from source `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> Option<&[usize]> {
        self.rows
            .get(&j)
            .and_then(|row| row.get(&i))
            .map(Vec::as_slice)
    }

    /// All buckets in `(j, i)` order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceIndex, &[usize])> + '_ {
        self.rows.iter().flat_map(|(&j, row)| {
            row.iter()
                .map(move |(&i, pixels)| (SourceIndex::new(i, j), pixels.as_slice()))
        })
    }

    /// Number of distinct source samples needed.
    pub fn len(&self) -> usize {
        self.unique
    }

    pub fn is_empty(&self) -> bool {
        self.unique == 0
    }

    /// Number of output pixels that were mapped to a source sample.
    pub fn mapped_pixel_count(&self) -> usize {
        self.mapped
    }

    /// Pixels left unmapped, by reason.
    pub fn dropped(&self) -> DropCounts {
        self.dropped
    }

    /// Size of the output raster this map was built for.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Distinct source rows, ascending.
    pub fn j_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    /// Distinct source columns needed in row `j`, ascending.
    pub fn i_indices(&self, j: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows.get(&j).into_iter().flat_map(|row| row.keys().copied())
    }

    pub fn min_i_in_row(&self, j: usize) -> Option<usize> {
        self.rows.get(&j)?.keys().next().copied()
    }

    pub fn max_i_in_row(&self, j: usize) -> Option<usize> {
        self.rows.get(&j)?.keys().next_back().copied()
    }

    pub fn min_i(&self) -> Option<usize> {
        self.rows.values().filter_map(|row| row.keys().next()).min().copied()
    }

    pub fn max_i(&self) -> Option<usize> {
        self.rows
            .values()
            .filter_map(|row| row.keys().next_back())
            .max()
            .copied()
    }

    pub fn min_j(&self) -> Option<usize> {
        self.rows.keys().next().copied()
    }

    pub fn max_j(&self) -> Option<usize> {
        self.rows.keys().next_back().copied()
    }

    /// Number of values a scanline read fetches: the sum over rows of
    /// `max_i - min_i + 1`.
    pub fn sum_row_lengths(&self) -> usize {
        self.rows
            .values()
            .filter_map(|row| {
                let min = row.keys().next()?;
                let max = row.keys().next_back()?;
                Some(max - min + 1)
            })
            .sum()
    }

    /// Number of values in the `(i, j)` box enclosing every needed sample.
    pub fn bounding_box_size(&self) -> usize {
        match (self.min_i(), self.max_i(), self.min_j(), self.max_j()) {
            (Some(min_i), Some(max_i), Some(min_j), Some(max_j)) => {
                (max_i - min_i + 1) * (max_j - min_j + 1)
            }
            _ => 0,
        }
    }
}

/// Latitudes an output CRS can produce sensible pixels for.
///
/// Polar stereographic projections fold the far hemisphere back onto the
/// plane; those points are dropped before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatitudeRange {
    /// [-90, 90]
    #[default]
    Global,
    /// [0, 90]
    NorthPolar,
    /// [-90, 0]
    SouthPolar,
}

impl LatitudeRange {
    pub fn for_crs(crs: CrsCode) -> Self {
        match crs {
            CrsCode::Epsg3413 => LatitudeRange::NorthPolar,
            CrsCode::Epsg3031 => LatitudeRange::SouthPolar,
            CrsCode::Epsg4326 | CrsCode::Epsg3857 => LatitudeRange::Global,
        }
    }

    /// NaN is never contained.
    pub fn contains(&self, lat: f64) -> bool {
        match self {
            LatitudeRange::Global => (-90.0..=90.0).contains(&lat),
            LatitudeRange::NorthPolar => (0.0..=90.0).contains(&lat),
            LatitudeRange::SouthPolar => (-90.0..=0.0).contains(&lat),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PixelOutcome {
    Mapped(usize, usize),
    OutOfRange,
    TransformFailed,
    NotCovered,
}

/// Builds [`PixelMap`]s for an index and a CRS transform.
pub struct PixelMapper<'a> {
    index: &'a HorizontalIndex,
    transform: &'a dyn PointTransform,
    latitude_range: LatitudeRange,
    parallel: bool,
}

impl<'a> PixelMapper<'a> {
    /// A mapper accepting all latitudes, mapping in parallel when the index
    /// allows it.
    pub fn new(index: &'a HorizontalIndex, transform: &'a dyn PointTransform) -> Self {
        Self {
            index,
            transform,
            latitude_range: LatitudeRange::Global,
            parallel: true,
        }
    }

    /// A mapper with the latitude range of `output`'s CRS.
    pub fn for_output(
        index: &'a HorizontalIndex,
        transform: &'a dyn PointTransform,
        output: &OutputGrid,
    ) -> Self {
        Self::new(index, transform).with_latitude_range(LatitudeRange::for_crs(output.crs))
    }

    pub fn with_latitude_range(mut self, latitude_range: LatitudeRange) -> Self {
        self.latitude_range = latitude_range;
        self
    }

    /// Allow or forbid row-parallel mapping. Local searches always run
    /// sequentially.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Map `output` with the latitude range of its CRS.
    pub fn build(
        output: &OutputGrid,
        index: &HorizontalIndex,
        transform: &dyn PointTransform,
    ) -> PixelMap {
        PixelMapper::for_output(index, transform, output).map(output)
    }

    /// Map every pixel of `output`.
    pub fn map(&self, output: &OutputGrid) -> PixelMap {
        let mut map = PixelMap::new(output.len());

        if self.parallel && self.index.is_stateless() && output.height > 1 {
            let rows: Vec<Vec<PixelOutcome>> = (0..output.height)
                .into_par_iter()
                .map(|y| {
                    let mut state = SearchState::default();
                    (0..output.width)
                        .map(|x| self.map_pixel(output, x, y, &mut state))
                        .collect()
                })
                .collect();

            for (y, row) in rows.into_iter().enumerate() {
                for (x, outcome) in row.into_iter().enumerate() {
                    record(&mut map, output.pixel_index(x, y), outcome);
                }
            }
        } else {
            let mut state = SearchState::default();
            for y in 0..output.height {
                for x in 0..output.width {
                    let outcome = self.map_pixel(output, x, y, &mut state);
                    record(&mut map, output.pixel_index(x, y), outcome);
                }
            }
        }

        let dropped = map.dropped;
        if dropped.transform_failed > 0 {
            warn!(
                failed = dropped.transform_failed,
                total = output.len(),
                crs = %output.crs,
                "Coordinate transform failed for some output pixels"
            );
        }
        debug!(
            width = output.width,
            height = output.height,
            mapped = map.mapped,
            unique = map.unique,
            out_of_latitude_range = dropped.out_of_latitude_range,
            not_covered = dropped.not_covered,
            "Built pixel map"
        );

        map
    }

    fn map_pixel(
        &self,
        output: &OutputGrid,
        x: usize,
        y: usize,
        state: &mut SearchState,
    ) -> PixelOutcome {
        let (px, py) = output.pixel_center(x, y);
        let (lon, lat) = match self.transform.transform(px, py) {
            Ok(coords) => coords,
            Err(e) => {
                debug!(x, y, error = %e, "Transform failed for pixel");
                return PixelOutcome::TransformFailed;
            }
        };

        if !self.latitude_range.contains(lat) {
            return PixelOutcome::OutOfRange;
        }

        match self.index.query(lon, lat, state) {
            Some((i, j)) => PixelOutcome::Mapped(i, j),
            None => PixelOutcome::NotCovered,
        }
    }
}

fn record(map: &mut PixelMap, pixel: usize, outcome: PixelOutcome) {
    match outcome {
        PixelOutcome::Mapped(i, j) => map.insert(i, j, pixel),
        PixelOutcome::OutOfRange => map.dropped.out_of_latitude_range += 1,
        PixelOutcome::TransformFailed => map.dropped.transform_failed += 1,
        PixelOutcome::NotCovered => map.dropped.not_covered += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::BoundingBox;
    use grid_index::{CurvilinearIndexMode, IndexOptions, SourceGrid};
    use projection::{CrsTransform, ProjectionError};

    fn output(width: usize, height: usize, bbox: [f64; 4]) -> OutputGrid {
        OutputGrid::new(
            CrsCode::Epsg4326,
            width,
            height,
            BoundingBox::from_array(bbox),
        )
        .unwrap()
    }

    fn identity() -> CrsTransform {
        CrsTransform::to_geographic(CrsCode::Epsg4326)
    }

    #[test]
    fn test_pixel_map_queries() {
        let mut map = PixelMap::new(10);
        map.insert(4, 2, 0);
        map.insert(4, 2, 1);
        map.insert(7, 2, 2);
        map.insert(1, 5, 3);

        assert_eq!(map.len(), 3);
        assert_eq!(map.mapped_pixel_count(), 4);
        assert_eq!(map.get(4, 2), Some(&[0, 1][..]));
        assert_eq!(map.get(2, 4), None);
        assert_eq!(map.j_indices().collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(map.i_indices(2).collect::<Vec<_>>(), vec![4, 7]);
        assert_eq!(map.i_indices(3).count(), 0);
        assert_eq!(map.min_i_in_row(2), Some(4));
        assert_eq!(map.max_i_in_row(2), Some(7));
        assert_eq!((map.min_i(), map.max_i()), (Some(1), Some(7)));
        assert_eq!((map.min_j(), map.max_j()), (Some(2), Some(5)));
        assert_eq!(map.sum_row_lengths(), 4 + 1);
        assert_eq!(map.bounding_box_size(), 7 * 4);

        let order: Vec<SourceIndex> = map.iter().map(|(s, _)| s).collect();
        assert_eq!(
            order,
            vec![
                SourceIndex::new(4, 2),
                SourceIndex::new(7, 2),
                SourceIndex::new(1, 5)
            ]
        );
    }

    #[test]
    fn test_empty_map() {
        let map = PixelMap::new(4);
        assert!(map.is_empty());
        assert_eq!(map.bounding_box_size(), 0);
        assert_eq!(map.min_i(), None);
        assert_eq!(map.output_size(), 4);
    }

    #[test]
    fn test_latitude_ranges() {
        assert!(LatitudeRange::Global.contains(-90.0));
        assert!(!LatitudeRange::Global.contains(f64::NAN));
        assert!(LatitudeRange::NorthPolar.contains(0.0));
        assert!(!LatitudeRange::NorthPolar.contains(-0.5));
        assert!(!LatitudeRange::SouthPolar.contains(0.5));
        assert_eq!(
            LatitudeRange::for_crs(CrsCode::Epsg3031),
            LatitudeRange::SouthPolar
        );
    }

    #[test]
    fn test_regular_mapping() {
        let grid = SourceGrid::regular(0.0, 0.0, 1.0, 1.0, 4, 4, false).unwrap();
        let index = HorizontalIndex::build(&grid, &IndexOptions::default()).unwrap();
        let out = output(2, 2, [-0.5, -0.5, 3.5, 3.5]);
        let transform = identity();

        let map = PixelMapper::build(&out, &index, &transform);
        assert_eq!(map.mapped_pixel_count(), 4);
        // Top-left pixel centre (0.5, 2.5) rounds half-way down to (0, 2)
        assert_eq!(map.get(0, 2), Some(&[0][..]));
        assert_eq!(map.get(2, 0), Some(&[3][..]));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut lon = Vec::new();
        let mut lat = Vec::new();
        for j in 0..12 {
            for i in 0..12 {
                lon.push(i as f64 + 0.1 * j as f64);
                lat.push(j as f64 - 0.1 * i as f64);
            }
        }
        let grid = SourceGrid::curvilinear(12, 12, lon, lat).unwrap();
        let index = HorizontalIndex::build(&grid, &IndexOptions::default()).unwrap();
        let out = output(37, 29, [-1.0, -2.0, 12.0, 11.0]);
        let transform = identity();

        let sequential = PixelMapper::new(&index, &transform)
            .with_parallel(false)
            .map(&out);
        let parallel = PixelMapper::new(&index, &transform).map(&out);

        assert_eq!(sequential, parallel);
        assert!(sequential.mapped_pixel_count() > 0);
        assert!(sequential.dropped().not_covered > 0);
    }

    #[test]
    fn test_local_search_mapping() {
        let mut lon = Vec::new();
        let mut lat = Vec::new();
        for j in 0..6 {
            for i in 0..6 {
                lon.push(i as f64);
                lat.push(j as f64);
            }
        }
        let grid = SourceGrid::curvilinear(6, 6, lon, lat).unwrap();
        let options = IndexOptions {
            curvilinear: CurvilinearIndexMode::LocalSearch,
            ..IndexOptions::default()
        };
        let index = HorizontalIndex::build(&grid, &options).unwrap();
        let out = output(6, 6, [-0.5, -0.5, 5.5, 5.5]);
        let transform = identity();

        let map = PixelMapper::build(&out, &index, &transform);
        assert_eq!(map.mapped_pixel_count(), 36);
        assert_eq!(map.len(), 36);
        // Row 0 of the output is the top (j = 5) of the grid
        assert_eq!(map.get(0, 5), Some(&[0][..]));
        assert_eq!(map.get(5, 0), Some(&[35][..]));
    }

    #[test]
    fn test_drops_are_counted() {
        let grid = SourceGrid::regular(0.0, 0.0, 1.0, 1.0, 4, 4, false).unwrap();
        let index = HorizontalIndex::build(&grid, &IndexOptions::default()).unwrap();
        // Pixel centres at x = 0, 1, 2, 3
        let out = output(4, 1, [-0.5, 0.0, 3.5, 1.0]);

        let transform = |x: f64, y: f64| -> Result<(f64, f64), ProjectionError> {
            if x < 0.5 {
                Err(ProjectionError::Failed("test".into()))
            } else if x < 1.5 {
                Ok((x, 95.0))
            } else if x < 2.5 {
                Ok((x + 10.0, y))
            } else {
                Ok((x, y))
            }
        };

        let map = PixelMapper::build(&out, &index, &transform);
        assert_eq!(map.get(3, 0), Some(&[3][..]));
        assert_eq!(
            map.dropped(),
            DropCounts {
                out_of_latitude_range: 1,
                transform_failed: 1,
                not_covered: 1,
            }
        );
        assert_eq!(map.mapped_pixel_count(), 1);
        assert_eq!(map.dropped().total() + map.mapped_pixel_count(), 4);
    }
}
