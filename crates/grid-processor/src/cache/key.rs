//! Cache keys for resampled tiles.
//!
//! A key must change whenever the data behind it may have changed. Local
//! files are tracked by size and modification time. Remote feeds (OPeNDAP,
//! HTTP) and aggregations cannot be stat'ed cheaply or meaningfully, so they
//! are tracked by the last refresh time of the owning dataset instead. The
//! dataset refresh time is also the fallback for local paths that cannot be
//! stat'ed.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use grid_common::longitude::constrain_180;
use grid_common::{CrsCode, OutputGrid};
use grid_index::GridTopology;
use serde::Serialize;

use crate::error::{GridProcessorError, Result};

/// The output side of a request: what raster is being drawn from what kind
/// of grid.
///
/// Geographic bounding boxes are canonicalized so equivalent requests share a
/// key: the western edge is wrapped into (-180, 180] and the eastern edge
/// keeps its distance from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GridIdentity {
    topology: GridTopology,
    crs: CrsCode,
    bbox_bits: [u64; 4],
    width: usize,
    height: usize,
}

impl GridIdentity {
    pub fn new(topology: GridTopology, output: &OutputGrid) -> Self {
        let [min_x, min_y, max_x, max_y] = output.bbox.to_array();
        let (min_x, max_x) = if output.crs.is_geographic() {
            let west = constrain_180(min_x);
            (west, west + (max_x - min_x))
        } else {
            (min_x, max_x)
        };
        // Adding 0.0 turns -0.0 into 0.0
        let bbox_bits = [min_x, min_y, max_x, max_y].map(|v| (v + 0.0).to_bits());

        Self {
            topology,
            crs: output.crs,
            bbox_bits,
            width: output.width,
            height: output.height,
        }
    }

    pub fn topology(&self) -> GridTopology {
        self.topology
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    /// The canonical bounding box.
    pub fn bbox(&self) -> [f64; 4] {
        self.bbox_bits.map(f64::from_bits)
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// What a [`MetadataProvider`] reports about a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub is_file: bool,
}

/// Looks up size and modification time of source locations.
pub trait MetadataProvider: Send + Sync {
    /// `None` when the location cannot be stat'ed.
    fn stat(&self, location: &str) -> Option<FileMetadata>;
}

/// Stats paths on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMetadataProvider;

impl MetadataProvider for FsMetadataProvider {
    fn stat(&self, location: &str) -> Option<FileMetadata> {
        let metadata = std::fs::metadata(Path::new(location)).ok()?;
        let modified = metadata.modified().ok()?;
        Some(FileMetadata {
            size: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
            is_file: metadata.is_file(),
        })
    }
}

/// Size and modification time of a static file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileState {
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// The source side of a request: where the data comes from and how fresh
/// it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileIdentity {
    location: String,
    file_state: Option<FileState>,
    dataset_refresh: Option<DateTime<Utc>>,
}

impl FileIdentity {
    /// Work out the freshness of `location`.
    ///
    /// Local files that can be stat'ed contribute their size and modification
    /// time. Remote locations, aggregations and paths that cannot be stat'ed
    /// contribute `dataset_last_refresh`, which is then required. A location
    /// that exists but is not a regular file is rejected.
    pub fn resolve(
        location: &str,
        dataset_last_refresh: Option<DateTime<Utc>>,
        provider: &dyn MetadataProvider,
    ) -> Result<Self> {
        let file_state = if is_remote(location) {
            None
        } else {
            match provider.stat(location) {
                Some(meta) if !meta.is_file => {
                    return Err(GridProcessorError::invalid_source(format!(
                        "{location} exists but is not a regular file"
                    )));
                }
                Some(meta) => Some(FileState {
                    size: meta.size,
                    modified: meta.modified,
                }),
                None => None,
            }
        };

        let needs_refresh = file_state.is_none() || is_aggregation(location);
        let dataset_refresh = if needs_refresh {
            match dataset_last_refresh {
                Some(refresh) => Some(refresh),
                None => return Err(GridProcessorError::MissingFreshness(location.to_string())),
            }
        } else {
            None
        };

        Ok(Self {
            location: location.to_string(),
            file_state,
            dataset_refresh,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn file_state(&self) -> Option<FileState> {
        self.file_state
    }

    pub fn dataset_refresh(&self) -> Option<DateTime<Utc>> {
        self.dataset_refresh
    }
}

fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("dods://")
}

fn is_aggregation(location: &str) -> bool {
    location.to_ascii_lowercase().ends_with(".ncml")
}

/// Identity of a resampled tile.
///
/// Two keys are equal only when every component is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    grid: GridIdentity,
    file: FileIdentity,
    layer: Option<String>,
    time_index: Option<usize>,
    z_index: Option<usize>,
}

impl CacheKey {
    pub fn compose(
        grid: GridIdentity,
        file: FileIdentity,
        time_index: Option<usize>,
        z_index: Option<usize>,
    ) -> Self {
        Self {
            grid,
            file,
            layer: None,
            time_index,
            z_index,
        }
    }

    /// Add the layer or variable id.
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn grid(&self) -> &GridIdentity {
        &self.grid
    }

    pub fn file(&self) -> &FileIdentity {
        &self.file
    }

    pub fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [min_x, min_y, max_x, max_y] = self.grid.bbox();
        write!(
            f,
            "{},{},{},{{{min_x},{min_y},{max_x},{max_y}}},{}x{},{}",
            self.layer.as_deref().unwrap_or("-"),
            self.grid.topology,
            self.grid.crs,
            self.grid.width,
            self.grid.height,
            self.file.location,
        )?;
        match self.file.file_state {
            Some(state) => write!(f, ",{},{}", state.modified.timestamp_millis(), state.size)?,
            None => write!(f, ",-,-")?,
        }
        let index = |v: Option<usize>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(
            f,
            ",{},{},{}",
            index(self.time_index),
            index(self.z_index),
            self.file
                .dataset_refresh
                .map_or_else(|| "-".to_string(), |t| t.timestamp_millis().to_string())
        )
    }
}
