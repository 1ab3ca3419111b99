//! Polar stereographic projection on a sphere.
//!
//! Covers the two NSIDC sea-ice grids:
//! - EPSG:3413 (north, central meridian -45°, true scale at 70°N)
//! - EPSG:3031 (south, central meridian 0°, true scale at 71°S)
//!
//! Ellipsoidal corrections are ignored; the error is well below one pixel at
//! the resolutions the resampler works with.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

use crate::error::{check_finite, ProjectionError};

const EARTH_RADIUS: f64 = 6378137.0;

/// Which pole the projection plane touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    North,
    South,
}

/// Spherical polar stereographic projection parameters.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    pub pole: Pole,
    /// Central meridian in degrees
    pub central_meridian: f64,
    /// Latitude of true scale in degrees (absolute value)
    pub true_scale_lat: f64,
    pub radius: f64,
    /// R * cos(lat_ts) / tan(pi/4 - lat_ts/2)
    scale: f64,
}

impl PolarStereographic {
    pub fn new(pole: Pole, central_meridian: f64, true_scale_lat: f64) -> Self {
        let lat_ts = true_scale_lat.abs().to_radians();
        let scale = EARTH_RADIUS * lat_ts.cos() / (FRAC_PI_4 - lat_ts / 2.0).tan();
        Self {
            pole,
            central_meridian,
            true_scale_lat: true_scale_lat.abs(),
            radius: EARTH_RADIUS,
            scale,
        }
    }

    /// NSIDC Sea Ice Polar Stereographic North.
    pub fn epsg_3413() -> Self {
        Self::new(Pole::North, -45.0, 70.0)
    }

    /// Antarctic Polar Stereographic.
    pub fn epsg_3031() -> Self {
        Self::new(Pole::South, 0.0, 71.0)
    }

    /// Convert lon/lat in degrees to projected meters.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        check_finite(lon, lat)?;
        // Distance from the pole, measured on the pole's own hemisphere
        let phi = match self.pole {
            Pole::North => lat,
            Pole::South => -lat,
        };
        if phi <= -90.0 {
            return Err(ProjectionError::OutOfDomain {
                crs: self.name().to_string(),
                x: lon,
                y: lat,
            });
        }

        let rho = self.scale * (FRAC_PI_4 - phi.to_radians() / 2.0).tan();
        let dlon = (lon - self.central_meridian).to_radians();
        let x = rho * dlon.sin();
        let y = match self.pole {
            Pole::North => -rho * dlon.cos(),
            Pole::South => rho * dlon.cos(),
        };
        Ok((x, y))
    }

    /// Convert projected meters to lon/lat in degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        check_finite(x, y)?;
        let rho = x.hypot(y);
        let phi = FRAC_PI_2 - 2.0 * (rho / self.scale).atan();

        let dlon = if rho == 0.0 {
            0.0
        } else {
            match self.pole {
                Pole::North => x.atan2(-y),
                Pole::South => x.atan2(y),
            }
        };

        let lat = match self.pole {
            Pole::North => phi.to_degrees(),
            Pole::South => -phi.to_degrees(),
        };
        let lon = self.central_meridian + dlon.to_degrees();
        Ok((lon, lat))
    }

    fn name(&self) -> &'static str {
        match self.pole {
            Pole::North => "polar stereographic north",
            Pole::South => "polar stereographic south",
        }
    }
}
