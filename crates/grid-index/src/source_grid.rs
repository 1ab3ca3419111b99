//! Source grid topologies.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::axis::{AxisIndex, ReferenceableAxis, RegularAxis};
use crate::curvilinear::CurvilinearGrid;
use crate::error::IndexResult;

/// The kind of grid data lives on, without its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GridTopology {
    Regular,
    Rectilinear,
    Curvilinear,
}

impl GridTopology {
    pub fn as_str(&self) -> &'static str {
        match self {
            GridTopology::Regular => "regular",
            GridTopology::Rectilinear => "rectilinear",
            GridTopology::Curvilinear => "curvilinear",
        }
    }
}

impl fmt::Display for GridTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source grid: where each data sample sits on the globe.
///
/// `i` indexes longitude (or the first grid axis) and `j` latitude (or the
/// second grid axis).
#[derive(Debug, Clone)]
pub enum SourceGrid {
    /// Evenly spaced lon/lat axes.
    Regular { lon: RegularAxis, lat: RegularAxis },
    /// Independent, irregularly spaced lon/lat axes.
    Rectilinear {
        lon: ReferenceableAxis,
        lat: ReferenceableAxis,
    },
    /// Per-point coordinates.
    Curvilinear(Arc<CurvilinearGrid>),
}

impl SourceGrid {
    /// A regular grid whose first cell is centred on `(origin_lon, origin_lat)`.
    pub fn regular(
        origin_lon: f64,
        origin_lat: f64,
        stride_lon: f64,
        stride_lat: f64,
        n_cols: usize,
        n_rows: usize,
        lon_is_cyclic: bool,
    ) -> IndexResult<Self> {
        Ok(SourceGrid::Regular {
            lon: RegularAxis::new(origin_lon, stride_lon, n_cols, lon_is_cyclic)?,
            lat: RegularAxis::new(origin_lat, stride_lat, n_rows, false)?,
        })
    }

    /// A rectilinear grid. The longitude axis is cyclic.
    pub fn rectilinear(lon_values: Vec<f64>, lat_values: Vec<f64>) -> IndexResult<Self> {
        Ok(SourceGrid::Rectilinear {
            lon: ReferenceableAxis::new(lon_values, true)?,
            lat: ReferenceableAxis::new(lat_values, false)?,
        })
    }

    /// A curvilinear grid from `ni * nj` coordinate arrays, `i` fastest.
    pub fn curvilinear(ni: usize, nj: usize, lon: Vec<f64>, lat: Vec<f64>) -> IndexResult<Self> {
        Ok(SourceGrid::Curvilinear(Arc::new(CurvilinearGrid::new(
            ni, nj, lon, lat,
        )?)))
    }

    pub fn topology(&self) -> GridTopology {
        match self {
            SourceGrid::Regular { .. } => GridTopology::Regular,
            SourceGrid::Rectilinear { .. } => GridTopology::Rectilinear,
            SourceGrid::Curvilinear(_) => GridTopology::Curvilinear,
        }
    }

    /// Grid shape as `(ni, nj)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            SourceGrid::Regular { lon, lat } => (lon.len(), lat.len()),
            SourceGrid::Rectilinear { lon, lat } => (lon.len(), lat.len()),
            SourceGrid::Curvilinear(grid) => (grid.ni(), grid.nj()),
        }
    }
}
