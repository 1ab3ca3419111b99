//! Error types for index construction.

use thiserror::Error;

/// Result type alias using IndexError.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised while validating source grids or building indexes.
///
/// Queries never fail: a point outside a grid is an absent result, not an
/// error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// An axis has no values.
    #[error("axis is empty")]
    EmptyAxis,

    /// Regular axis spacing is zero, negative or not finite.
    #[error("invalid axis spacing: {0}")]
    InvalidSpacing(f64),

    /// An axis value is NaN or infinite.
    #[error("non-finite axis value at index {0}")]
    NonFiniteAxisValue(usize),

    /// Rectilinear axis values are neither strictly increasing nor strictly
    /// decreasing.
    #[error("axis is not strictly monotonic at index {0}")]
    NonMonotonicAxis(usize),

    /// Coordinate arrays do not match the declared grid shape.
    #[error("coordinate arrays have {lon} and {lat} values, expected {expected}")]
    DimensionMismatch {
        lon: usize,
        lat: usize,
        expected: usize,
    },

    /// Curvilinear grids need at least two points along each axis.
    #[error("curvilinear grid {ni}x{nj} is too small, need at least 2x2")]
    GridTooSmall { ni: usize, nj: usize },

    /// Look-up table resolution is zero, negative or not finite.
    #[error("invalid look-up table resolution: {0}")]
    InvalidResolution(f64),

    /// The table would exceed the configured size limit.
    #[error("look-up table of {width}x{height} pixels exceeds the limit of {max_pixels}")]
    LutTooLarge {
        width: u64,
        height: u64,
        max_pixels: u64,
    },

    /// Oversampling factor is zero, negative or not finite.
    #[error("invalid oversampling factor: {0}")]
    InvalidOversampling(f64),

    /// The grid has no usable cells to derive a resolution from.
    #[error("grid has no valid cells")]
    NoValidCells,
}
