//! The point-transform seam used by the pixel mapper.

use grid_common::CrsCode;

use crate::error::ProjectionError;
use crate::geographic::geographic_identity;
use crate::mercator::mercator_to_wgs84;
use crate::polar::PolarStereographic;

/// Converts a coordinate in some CRS to geographic lon/lat in degrees.
///
/// A failing point is not fatal to a render: the caller drops that pixel.
pub trait PointTransform: Send + Sync {
    fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError>;
}

impl<F> PointTransform for F
where
    F: Fn(f64, f64) -> Result<(f64, f64), ProjectionError> + Send + Sync,
{
    fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        self(x, y)
    }
}

/// Built-in transforms from a supported output CRS to WGS84.
#[derive(Debug, Clone)]
pub enum CrsTransform {
    Geographic,
    WebMercator,
    Polar(PolarStereographic),
}

impl CrsTransform {
    /// Transform from `crs` to geographic lon/lat.
    pub fn to_geographic(crs: CrsCode) -> Self {
        match crs {
            CrsCode::Epsg4326 => CrsTransform::Geographic,
            CrsCode::Epsg3857 => CrsTransform::WebMercator,
            CrsCode::Epsg3413 => CrsTransform::Polar(PolarStereographic::epsg_3413()),
            CrsCode::Epsg3031 => CrsTransform::Polar(PolarStereographic::epsg_3031()),
        }
    }
}

impl PointTransform for CrsTransform {
    fn transform(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        match self {
            CrsTransform::Geographic => geographic_identity(x, y),
            CrsTransform::WebMercator => mercator_to_wgs84(x, y),
            CrsTransform::Polar(polar) => polar.inverse(x, y),
        }
    }
}
