//! One query interface over every index kind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, AxisIndex};
use crate::error::IndexResult;
use crate::local_search::{LocalSearchIndex, SearchState};
use crate::lut::{LutIndex, DEFAULT_MAX_LUT_PIXELS, DEFAULT_OVERSAMPLING};
use crate::source_grid::SourceGrid;

/// How to index curvilinear grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvilinearIndexMode {
    /// Build (and usually cache) a look-up table.
    #[default]
    LookupTable,
    /// Downhill search from the previous answer; no precomputation.
    LocalSearch,
}

impl std::str::FromStr for CurvilinearIndexMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lookup_table" | "lut" => Ok(CurvilinearIndexMode::LookupTable),
            "local_search" | "local" => Ok(CurvilinearIndexMode::LocalSearch),
            other => Err(format!("unknown curvilinear index mode: {other}")),
        }
    }
}

/// Parameters for [`HorizontalIndex::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    pub curvilinear: CurvilinearIndexMode,
    pub oversampling: f64,
    pub max_lut_pixels: u64,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            curvilinear: CurvilinearIndexMode::default(),
            oversampling: DEFAULT_OVERSAMPLING,
            max_lut_pixels: DEFAULT_MAX_LUT_PIXELS,
        }
    }
}

/// Finds the source `(i, j)` nearest to a geographic point.
#[derive(Debug, Clone)]
pub enum HorizontalIndex {
    /// Separate lookups on the longitude and latitude axes.
    Axis { lon: Axis, lat: Axis },
    /// Shared look-up table for a curvilinear grid.
    Lut(Arc<LutIndex>),
    /// Downhill search over a curvilinear grid.
    LocalSearch(LocalSearchIndex),
}

impl HorizontalIndex {
    /// Build the index matching the grid's topology, without caching.
    pub fn build(grid: &SourceGrid, options: &IndexOptions) -> IndexResult<Self> {
        Ok(match grid {
            SourceGrid::Regular { lon, lat } => HorizontalIndex::Axis {
                lon: Axis::Regular(lon.clone()),
                lat: Axis::Regular(lat.clone()),
            },
            SourceGrid::Rectilinear { lon, lat } => HorizontalIndex::Axis {
                lon: Axis::Referenceable(lon.clone()),
                lat: Axis::Referenceable(lat.clone()),
            },
            SourceGrid::Curvilinear(curvilinear) => match options.curvilinear {
                CurvilinearIndexMode::LookupTable => HorizontalIndex::Lut(Arc::new(
                    LutIndex::build(
                        Arc::clone(curvilinear),
                        options.oversampling,
                        options.max_lut_pixels,
                    )?,
                )),
                CurvilinearIndexMode::LocalSearch => {
                    HorizontalIndex::LocalSearch(LocalSearchIndex::new(Arc::clone(curvilinear)))
                }
            },
        })
    }

    /// Whether queries are independent of each other (no search state), so
    /// they may run in any order or in parallel.
    pub fn is_stateless(&self) -> bool {
        !matches!(self, HorizontalIndex::LocalSearch(_))
    }

    /// Grid shape as `(ni, nj)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            HorizontalIndex::Axis { lon, lat } => (lon.len(), lat.len()),
            HorizontalIndex::Lut(lut) => (lut.grid().ni(), lut.grid().nj()),
            HorizontalIndex::LocalSearch(search) => (search.grid().ni(), search.grid().nj()),
        }
    }

    /// Nearest source `(i, j)`, or `None` if the point is not covered.
    ///
    /// `state` seeds local searches and receives their result; other index
    /// kinds ignore it.
    pub fn query(&self, lon: f64, lat: f64, state: &mut SearchState) -> Option<(usize, usize)> {
        match self {
            HorizontalIndex::Axis {
                lon: lon_axis,
                lat: lat_axis,
            } => Some((lon_axis.index_of(lon)?, lat_axis.index_of(lat)?)),
            HorizontalIndex::Lut(lut) => lut.find(lon, lat),
            HorizontalIndex::LocalSearch(search) => search.nearest_from(lon, lat, state).found(),
        }
    }
}
