//! Common types shared across the resampling crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod longitude;
pub mod output_grid;

pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use error::{GridError, GridResult};
pub use output_grid::OutputGrid;
