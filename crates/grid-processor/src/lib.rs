//! Grid-to-raster resampling with cached indexes and tiles.
//!
//! This crate fills an output raster (a regular grid in some CRS) from data
//! on an arbitrary source grid. It enables:
//!
//! - **Batched reads**: output pixels are grouped by the source sample they
//!   need, so each sample is read once
//! - **Pluggable reading**: scanline, bounding-box or per-sample reads through
//!   a [`DataReader`]
//! - **Caching**: look-up tables and finished tiles are memoized under keys
//!   that change whenever the source data changes
//!
//! # Architecture
//!
//! ```text
//! OutputGrid + SourceGrid
//!      │
//!      ▼
//! HorizontalIndex (axis lookup, look-up table or local search)
//!      │
//!      ▼
//! PixelMapper ──► PixelMap (source (i, j) → output pixels)
//!      │
//!      ▼
//! DataReadingStrategy + DataReader ──► Vec<f32>
//!      │
//!      ▼
//! ResultCache<CacheKey, _>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{GridProcessorConfig, RenderRequest, ResamplingService};
//!
//! let service = ResamplingService::new(GridProcessorConfig::default())?;
//! let request = RenderRequest::new(output, "/data/sst.nc");
//! let values = service.render(&request, &grid, &reader, &transform, &FsMetadataProvider)?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod pixel_map;
pub mod service;
pub mod strategy;
pub mod types;

// Re-export commonly used types at crate root
pub use cache::{
    CacheKey, FileIdentity, FileMetadata, FileState, FsMetadataProvider, GridIdentity,
    MetadataProvider, ResultCache,
};
pub use config::GridProcessorConfig;
pub use error::{GridProcessorError, Result};
pub use pixel_map::{DropCounts, LatitudeRange, PixelMap, PixelMapper, SourceIndex};
pub use service::{LutCacheKey, RenderRequest, ResamplingService};
pub use strategy::{DataReader, DataReadingStrategy};
pub use types::{CacheStats, DataSelection};
