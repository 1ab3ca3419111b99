//! Spherical Web Mercator (EPSG:3857).

use std::f64::consts::PI;

use crate::error::{check_finite, ProjectionError};

/// Sphere radius used by Web Mercator, in meters.
pub const WEB_MERCATOR_RADIUS: f64 = 6378137.0;

/// Half the projected width of the world, in meters.
pub const WEB_MERCATOR_EXTENT: f64 = PI * WEB_MERCATOR_RADIUS;

/// Latitude at which the projected square world is clipped.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Convert Web Mercator (EPSG:3857) coordinates to WGS84 lon/lat in degrees.
pub fn mercator_to_wgs84(x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
    check_finite(x, y)?;
    let lon = (x / WEB_MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    Ok((lon, lat))
}

/// Convert WGS84 lon/lat in degrees to Web Mercator meters.
pub fn wgs84_to_mercator(lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
    check_finite(lon, lat)?;
    if lat.abs() >= 90.0 {
        return Err(ProjectionError::OutOfDomain {
            crs: "EPSG:3857".to_string(),
            x: lon,
            y: lat,
        });
    }
    let x = lon.to_radians() * WEB_MERCATOR_RADIUS;
    let y = ((PI / 4.0) + (lat.to_radians() / 2.0)).tan().ln() * WEB_MERCATOR_RADIUS;
    Ok((x, y))
}
