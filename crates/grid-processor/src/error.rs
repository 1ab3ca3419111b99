//! Error types for resampling.

use grid_common::GridError;
use grid_index::IndexError;
use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while mapping, reading or caching resampled data.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// The output grid description was rejected.
    #[error("invalid output grid: {0}")]
    Grid(#[from] GridError),

    /// A source grid or index could not be built.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// A whole-request transform could not be set up.
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// The data reader failed.
    #[error("failed to read grid data: {0}")]
    ReadFailed(String),

    /// The data reader returned fewer values than requested.
    #[error("short read: expected {expected} values, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// The source location exists but cannot be used as a data source.
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// Neither a file timestamp nor a dataset refresh time is available.
    #[error("no freshness information for {0}")]
    MissingFreshness(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl GridProcessorError {
    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create an InvalidSource error.
    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSource(msg.into())
    }

    /// Create a ConfigError.
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<std::io::Error> for GridProcessorError {
    fn from(err: std::io::Error) -> Self {
        Self::ReadFailed(err.to_string())
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
