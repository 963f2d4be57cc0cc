//! Geographic coordinates, datums and projections.

mod crs;
mod datum;
mod ellipsoid;
mod point;
pub mod projection;

pub use crs::{Crs, MapProjection, ProjectionParams, ProjectionType};
pub use datum::{datum_shift, Datum, DatumTable, ShiftMethod};
pub use ellipsoid::Ellipsoid;
pub use point::GeoCoord;
pub use projection::Projection;

pub use crate::area::GeoArea;
