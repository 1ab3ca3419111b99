use thiserror::Error;

/// Errors raised by point transforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("Non-finite input coordinate: ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    #[error("Coordinate ({x}, {y}) is outside the valid domain of {crs}")]
    OutOfDomain { crs: String, x: f64, y: f64 },

    #[error("Transform failed: {0}")]
    Failed(String),
}

pub(crate) fn check_finite(x: f64, y: f64) -> Result<(), ProjectionError> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::NonFinite { x, y })
    }
}
