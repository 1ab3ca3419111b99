//! Nearest-cell indexes for source grids.
//!
//! Given a geographic point, find the source grid sample that should be used
//! to colour it. Three strategies exist, one per grid topology:
//!
//! - [`Axis`]: closed-form or binary-search lookup on independent lon/lat
//!   axes (regular and rectilinear grids)
//! - [`LookupTable`]: a rasterized table mapping lon/lat cells to `(i, j)`
//!   for curvilinear grids, built once and shared
//! - [`LocalSearchIndex`]: downhill search seeded with the previous answer,
//!   for swath grids where a table is not worth building
//!
//! [`HorizontalIndex`] wraps all three behind one query interface.

pub mod axis;
pub mod curvilinear;
pub mod distance;
pub mod error;
pub mod index;
pub mod local_search;
pub mod lut;
pub mod source_grid;

pub use axis::{Axis, AxisIndex, ReferenceableAxis, RegularAxis};
pub use curvilinear::CurvilinearGrid;
pub use error::{IndexError, IndexResult};
pub use index::{CurvilinearIndexMode, HorizontalIndex, IndexOptions};
pub use local_search::{LocalSearchIndex, NearestResult, SearchState};
pub use lut::{LookupTable, LutIndex, DEFAULT_MAX_LUT_PIXELS, DEFAULT_OVERSAMPLING};
pub use source_grid::{GridTopology, SourceGrid};
