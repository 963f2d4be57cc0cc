use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees.
///
/// The datum is implicit; unless a function states otherwise it is WGS84.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    lat: f64,
    lon: f64,
}

impl GeoCoord {
    /// Creates a coordinate from latitude and longitude in degrees.
    pub const fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in radians.
    pub fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    /// Longitude in radians.
    pub fn lon_rad(&self) -> f64 {
        self.lon.to_radians()
    }

    /// Returns true if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Creates a [`GeoCoord`] from latitude and longitude.
///
/// ```
/// use kartta_types::latlon;
///
/// let helsinki = latlon!(60.17, 24.94);
/// assert_eq!(helsinki.lon(), 24.94);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        $crate::geo::GeoCoord::latlon($lat, $lon)
    };
}
