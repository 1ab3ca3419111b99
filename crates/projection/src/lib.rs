//! Coordinate reference system transformations.
//!
//! The resampling core only ever needs one direction: from an output CRS to
//! geographic lon/lat. That direction is expressed by [`PointTransform`], and
//! the handful of CRSs understood by [`grid_common::CrsCode`] have built-in
//! implementations here. All projections are spherical.

pub mod error;
pub mod geographic;
pub mod mercator;
pub mod polar;
pub mod transform;

pub use error::ProjectionError;
pub use polar::PolarStereographic;
pub use transform::{CrsTransform, PointTransform};
