//! Error types for shared grid types.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised when constructing grid descriptions.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}
