//! Conversions from and into `geo-types` coordinates.
//!
//! `geo-types` stores `x` before `y`, so a geographic coordinate becomes `(lon, lat)` and a
//! projected one `(easting, northing)`.

use geo_types::Coord;

use crate::cartesian::ProjectedCoord;
use crate::geo::GeoCoord;

impl From<Coord<f64>> for GeoCoord {
    fn from(value: Coord<f64>) -> Self {
        GeoCoord::latlon(value.y, value.x)
    }
}

impl From<GeoCoord> for Coord<f64> {
    fn from(value: GeoCoord) -> Self {
        Coord {
            x: value.lon(),
            y: value.lat(),
        }
    }
}

impl From<Coord<f64>> for ProjectedCoord {
    fn from(value: Coord<f64>) -> Self {
        ProjectedCoord::new(value.y, value.x)
    }
}

impl From<ProjectedCoord> for Coord<f64> {
    fn from(value: ProjectedCoord) -> Self {
        Coord {
            x: value.easting(),
            y: value.northing(),
        }
    }
}
