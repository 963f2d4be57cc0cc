//! Geometric primitives used by the `kartta` map registry.
//!
//! The crate deals with three coordinate spaces:
//!
//! * geographic coordinates ([`GeoCoord`](geo::GeoCoord)), always in degrees, referenced to
//!   some [`Datum`](geo::Datum) (WGS84 when nothing else is said);
//! * projected coordinates ([`ProjectedCoord`](cartesian::ProjectedCoord)), northing and easting in
//!   the linear units of one particular projection;
//! * integer pixel rectangles ([`Rect<i32>`](cartesian::Rect)) in screen or map image space.
//!
//! Conversion between the first two is done by [`Projection`](geo::Projection) implementations
//! obtained from a [`Crs`](geo::Crs).

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod area;
pub mod cartesian;
pub mod error;
pub mod geo;

#[cfg(feature = "geo-types")]
mod geo_types;

pub use area::{Area, AreaCorner};
