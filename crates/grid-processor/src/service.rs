//! End-to-end resampling with cached look-up tables and tiles.
//!
//! The `ResamplingService` ties the pieces together for one render request:
//!
//! ```text
//! RenderRequest
//!      │
//!      ├─► CacheKey (output grid + file freshness + layer + selection)
//!      │
//!      ├─► Tile cache hit: return cached values
//!      │
//!      └─► Tile cache miss:
//!               ├─► HorizontalIndex for the source grid (LUTs cached)
//!               ├─► PixelMapper builds the PixelMap
//!               └─► DataReadingStrategy fills the output
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let service = ResamplingService::new(GridProcessorConfig::from_env())?;
//! let request = RenderRequest::new(output, "/data/sst.nc").with_layer("sst");
//! let transform = CrsTransform::to_geographic(request.output.crs);
//! let values = service.render(&request, &grid, &reader, &transform, &FsMetadataProvider)?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use grid_common::OutputGrid;
use grid_index::{
    CurvilinearGrid, CurvilinearIndexMode, HorizontalIndex, LookupTable, LutIndex, SourceGrid,
};
use projection::PointTransform;
use tracing::{debug, info};

use crate::cache::{CacheKey, FileIdentity, GridIdentity, MetadataProvider, ResultCache};
use crate::config::GridProcessorConfig;
use crate::error::{GridProcessorError, Result};
use crate::pixel_map::{PixelMap, PixelMapper};
use crate::strategy::DataReader;
use crate::types::{CacheStats, DataSelection};

/// Identity of a look-up table: the grid it indexes and its resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LutCacheKey {
    fingerprint: u64,
    ni: usize,
    nj: usize,
    resolution_bits: u64,
}

impl LutCacheKey {
    pub fn new(grid: &CurvilinearGrid, resolution: f64) -> Self {
        Self {
            fingerprint: grid.fingerprint(),
            ni: grid.ni(),
            nj: grid.nj(),
            resolution_bits: resolution.to_bits(),
        }
    }
}

/// One render: which raster to fill from which source.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub output: OutputGrid,
    /// Path or URL of the source data.
    pub location: String,
    /// Last refresh of the dataset owning `location`. Required for remote
    /// and aggregated sources.
    pub dataset_last_refresh: Option<DateTime<Utc>>,
    pub layer: Option<String>,
    pub selection: DataSelection,
}

impl RenderRequest {
    pub fn new(output: OutputGrid, location: impl Into<String>) -> Self {
        Self {
            output,
            location: location.into(),
            dataset_last_refresh: None,
            layer: None,
            selection: DataSelection::default(),
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_selection(mut self, selection: DataSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_dataset_refresh(mut self, refresh: DateTime<Utc>) -> Self {
        self.dataset_last_refresh = Some(refresh);
        self
    }
}

/// Resamples source grids onto output rasters, caching look-up tables and
/// finished tiles.
///
/// Safe to share between threads; all caches are internally synchronized.
pub struct ResamplingService {
    config: GridProcessorConfig,
    lut_cache: ResultCache<LutCacheKey, Arc<LutIndex>>,
    tile_cache: ResultCache<CacheKey, Arc<Vec<f32>>>,
}

impl ResamplingService {
    /// Create a service, rejecting invalid configuration.
    pub fn new(config: GridProcessorConfig) -> Result<Self> {
        config.validate().map_err(GridProcessorError::config_error)?;
        Ok(Self {
            lut_cache: ResultCache::new(config.lut_cache_entries),
            tile_cache: ResultCache::new(config.tile_cache_entries),
            config,
        })
    }

    pub fn config(&self) -> &GridProcessorConfig {
        &self.config
    }

    /// The index for `grid`, picked by topology.
    ///
    /// Look-up tables are cached by grid fingerprint and resolution, so
    /// repeated requests against the same curvilinear grid share one table.
    pub fn index_for(&self, grid: &SourceGrid) -> Result<HorizontalIndex> {
        let curvilinear = match grid {
            SourceGrid::Curvilinear(curvilinear)
                if self.config.curvilinear_index == CurvilinearIndexMode::LookupTable =>
            {
                curvilinear
            }
            _ => return Ok(HorizontalIndex::build(grid, &self.config.index_options())?),
        };

        let resolution =
            LookupTable::suggested_resolution(curvilinear, self.config.lut_oversampling)?;
        let key = LutCacheKey::new(curvilinear, resolution);
        let cached = self.lut_cache.contains(&key);
        debug!(
            ni = curvilinear.ni(),
            nj = curvilinear.nj(),
            resolution,
            cached,
            "Resolving look-up table"
        );

        let lut = self.lut_cache.try_get_or_compute(key, || -> Result<_> {
            let table = LookupTable::build_with_limit(
                curvilinear,
                resolution,
                self.config.max_lut_pixels,
            )?;
            Ok(Arc::new(LutIndex::new(Arc::clone(curvilinear), table)))
        })?;
        Ok(HorizontalIndex::Lut(lut))
    }

    /// The tile cache key for `request`.
    pub fn cache_key(
        &self,
        request: &RenderRequest,
        grid: &SourceGrid,
        metadata: &dyn MetadataProvider,
    ) -> Result<CacheKey> {
        let grid_identity = GridIdentity::new(grid.topology(), &request.output);
        let file = FileIdentity::resolve(
            &request.location,
            request.dataset_last_refresh,
            metadata,
        )?;
        let key = CacheKey::compose(
            grid_identity,
            file,
            request.selection.time_index,
            request.selection.z_index,
        );
        Ok(match &request.layer {
            Some(layer) => key.with_layer(layer.as_str()),
            None => key,
        })
    }

    /// Map the pixels of `output` onto `index`.
    pub fn pixel_map(
        &self,
        output: &OutputGrid,
        index: &HorizontalIndex,
        transform: &dyn PointTransform,
    ) -> PixelMap {
        PixelMapper::for_output(index, transform, output)
            .with_parallel(self.config.parallel_mapping)
            .map(output)
    }

    /// Resample `grid` onto the request's output raster.
    ///
    /// Returns one value per output pixel (row-major, row 0 at the top), NaN
    /// where there is no data. Results are cached; a failed render is not.
    pub fn render(
        &self,
        request: &RenderRequest,
        grid: &SourceGrid,
        reader: &dyn DataReader,
        transform: &dyn PointTransform,
        metadata: &dyn MetadataProvider,
    ) -> Result<Arc<Vec<f32>>> {
        let key = self.cache_key(request, grid, metadata)?;
        debug!(key = %key, "Render requested");

        self.tile_cache.try_get_or_compute(key, || -> Result<Arc<Vec<f32>>> {
            let start = Instant::now();
            let index = self.index_for(grid)?;
            let map = self.pixel_map(&request.output, &index, transform);
            let values = self
                .config
                .reading_strategy
                .read(reader, &request.selection, &map)?;

            info!(
                width = request.output.width,
                height = request.output.height,
                topology = %grid.topology(),
                mapped = map.mapped_pixel_count(),
                samples = map.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Rendered tile"
            );
            Ok(Arc::new(values))
        })
    }

    pub fn lut_cache_stats(&self) -> CacheStats {
        self.lut_cache.stats()
    }

    pub fn tile_cache_stats(&self) -> CacheStats {
        self.tile_cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_index::IndexError;

    fn curvilinear(ni: usize, nj: usize) -> SourceGrid {
        let mut lon = Vec::new();
        let mut lat = Vec::new();
        for j in 0..nj {
            for i in 0..ni {
                lon.push(i as f64 * 0.5);
                lat.push(j as f64 * 0.5);
            }
        }
        SourceGrid::curvilinear(ni, nj, lon, lat).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = GridProcessorConfig {
            lut_cache_entries: 0,
            ..Default::default()
        };
        assert!(matches!(
            ResamplingService::new(config),
            Err(GridProcessorError::ConfigError(_))
        ));
    }

    #[test]
    fn test_lut_is_cached() {
        let service = ResamplingService::new(GridProcessorConfig::default()).unwrap();
        let grid = curvilinear(8, 8);

        let first = service.index_for(&grid).unwrap();
        let second = service.index_for(&grid).unwrap();
        match (first, second) {
            (HorizontalIndex::Lut(a), HorizontalIndex::Lut(b)) => assert!(Arc::ptr_eq(&a, &b)),
            other => panic!("expected look-up tables, got {other:?}"),
        }

        let stats = service.lut_cache_stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_local_search_mode_skips_lut_cache() {
        let config = GridProcessorConfig {
            curvilinear_index: CurvilinearIndexMode::LocalSearch,
            ..Default::default()
        };
        let service = ResamplingService::new(config).unwrap();
        let index = service.index_for(&curvilinear(4, 4)).unwrap();
        assert!(matches!(index, HorizontalIndex::LocalSearch(_)));
        assert_eq!(service.lut_cache_stats().misses, 0);
    }

    #[test]
    fn test_oversized_lut_is_an_error() {
        let config = GridProcessorConfig {
            max_lut_pixels: 10,
            ..Default::default()
        };
        let service = ResamplingService::new(config).unwrap();
        let err = service.index_for(&curvilinear(8, 8)).unwrap_err();
        assert!(matches!(
            err,
            GridProcessorError::Index(IndexError::LutTooLarge { .. })
        ));
        assert_eq!(service.lut_cache_stats().entries, 0);
    }
}
