use serde::{Deserialize, Serialize};

/// Coordinate in the linear units of a projection.
///
/// The value is only meaningful together with the projection definition it was produced by.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedCoord {
    northing: f64,
    easting: f64,
}

impl ProjectedCoord {
    /// Creates a new coordinate.
    pub const fn new(northing: f64, easting: f64) -> Self {
        Self { northing, easting }
    }

    /// Coordinate with both components set to NaN. Returned where a projection is undefined.
    pub const INVALID: Self = Self::new(f64::NAN, f64::NAN);

    /// Northing.
    pub fn northing(&self) -> f64 {
        self.northing
    }

    /// Easting.
    pub fn easting(&self) -> f64 {
        self.easting
    }

    /// Returns true if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.northing.is_finite() && self.easting.is_finite()
    }
}
