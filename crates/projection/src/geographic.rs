//! Geographic (plate carrée) coordinates.

use crate::error::{check_finite, ProjectionError};

/// Pass lon/lat through unchanged, rejecting non-finite values.
///
/// Longitudes are not normalized; indexes handle any 360-degree convention.
pub fn geographic_identity(lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
    check_finite(lon, lat)?;
    Ok((lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keeps_longitude_convention() {
        assert_eq!(geographic_identity(350.0, 10.0).unwrap(), (350.0, 10.0));
        assert!(geographic_identity(0.0, f64::INFINITY).is_err());
    }
}
