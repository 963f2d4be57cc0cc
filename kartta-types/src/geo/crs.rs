use std::str::FromStr;

use crate::cartesian::ProjectedCoord;
use crate::error::KarttaTypesError;
use crate::geo::projection::{
    ChainProjection, DatumShiftProjection, Mercator, Projection, TransverseMercator,
};
use crate::geo::{Datum, GeoCoord};

/// Projection from WGS84 geographic coordinates into the projected space of a [`Crs`].
pub type MapProjection =
    dyn Projection<InPoint = GeoCoord, OutPoint = ProjectedCoord> + Send + Sync;

/// Coordinate reference system of a map: the datum its coordinates refer to and the projection
/// of its image.
#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    datum: Datum,
    projection_type: ProjectionType,
}

/// Parameters shared by the cylindrical projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Longitude of the central meridian in degrees (`lon_0`).
    pub central_meridian: f64,
    /// Latitude of origin in degrees (`lat_0`).
    pub latitude_of_origin: f64,
    /// Scale factor on the central line (`k_0`).
    pub scale_factor: f64,
    /// False easting in meters (`x_0`).
    pub false_easting: f64,
    /// False northing in meters (`y_0`).
    pub false_northing: f64,
}

/// Projection family and its parameters.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProjectionType {
    /// Normal aspect Mercator.
    Mercator(ProjectionParams),
    /// Transverse Mercator, including UTM zones and national grids.
    TransverseMercator(ProjectionParams),
    /// Any other projection, given as a `geodesy` operator definition.
    Other(String),
}

impl ProjectionParams {
    /// Parameters with zero origin and unit scale.
    pub const DEFAULT: Self = Self {
        central_meridian: 0.0,
        latitude_of_origin: 0.0,
        scale_factor: 1.0,
        false_easting: 0.0,
        false_northing: 0.0,
    };

    /// Sets the central meridian.
    pub fn with_central_meridian(mut self, lon_0: f64) -> Self {
        self.central_meridian = lon_0;
        self
    }

    /// Sets the latitude of origin.
    pub fn with_latitude_of_origin(mut self, lat_0: f64) -> Self {
        self.latitude_of_origin = lat_0;
        self
    }

    /// Sets the scale factor.
    pub fn with_scale_factor(mut self, k_0: f64) -> Self {
        self.scale_factor = k_0;
        self
    }

    /// Sets the false easting.
    pub fn with_false_easting(mut self, x_0: f64) -> Self {
        self.false_easting = x_0;
        self
    }

    /// Sets the false northing.
    pub fn with_false_northing(mut self, y_0: f64) -> Self {
        self.false_northing = y_0;
        self
    }

    /// Reads `lon_0`, `lat_0`, `k_0`, `x_0` and `y_0` with `lookup`. Missing keys keep their
    /// default values.
    pub fn from_lookup<S: AsRef<str>>(
        lookup: impl Fn(&str) -> Option<S>,
    ) -> Result<Self, KarttaTypesError> {
        let mut params = Self::DEFAULT;
        let fields: [(&str, &mut f64); 5] = [
            ("lon_0", &mut params.central_meridian),
            ("lat_0", &mut params.latitude_of_origin),
            ("k_0", &mut params.scale_factor),
            ("x_0", &mut params.false_easting),
            ("y_0", &mut params.false_northing),
        ];
        for (name, field) in fields {
            if let Some(value) = lookup(name) {
                *field = parse_param(name, value.as_ref())?;
            }
        }

        Ok(params)
    }

    /// Parameters as key/value pairs, the inverse of [`ProjectionParams::from_lookup`].
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lon_0", self.central_meridian.to_string()),
            ("lat_0", self.latitude_of_origin.to_string()),
            ("k_0", self.scale_factor.to_string()),
            ("x_0", self.false_easting.to_string()),
            ("y_0", self.false_northing.to_string()),
        ]
    }

    fn same_origin(&self, other: &Self) -> bool {
        self.central_meridian == other.central_meridian
            && self.false_easting == other.false_easting
            && self.false_northing == other.false_northing
    }
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn parse_param<T: FromStr>(name: &str, value: &str) -> Result<T, KarttaTypesError> {
    value
        .trim()
        .parse()
        .map_err(|_| KarttaTypesError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        })
}

impl ProjectionType {
    /// Builds a projection from its name and parameters.
    ///
    /// Recognized names are `merc`, `tmerc`, `utm` (with `zone` and optional `south`) and
    /// `geodesy` (with the operator definition in `proj-def`).
    pub fn from_definition<S: AsRef<str>>(
        name: &str,
        lookup: impl Fn(&str) -> Option<S>,
    ) -> Result<Self, KarttaTypesError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "merc" | "mercator" => Ok(Self::Mercator(ProjectionParams::from_lookup(lookup)?)),
            "tmerc" | "transverse_mercator" => Ok(Self::TransverseMercator(
                ProjectionParams::from_lookup(lookup)?,
            )),
            "utm" => {
                let zone = lookup("zone").ok_or_else(|| KarttaTypesError::InvalidParameter {
                    name: "zone".into(),
                    value: String::new(),
                })?;
                let zone: u8 = parse_param("zone", zone.as_ref())?;
                let south = lookup("south").is_some_and(|v| {
                    matches!(v.as_ref().trim(), "" | "1" | "true" | "yes")
                });
                Self::utm(zone, south)
            }
            "geodesy" => match lookup("proj-def") {
                Some(def) => Ok(Self::Other(def.as_ref().to_string())),
                None => Err(KarttaTypesError::InvalidParameter {
                    name: "proj-def".into(),
                    value: String::new(),
                }),
            },
            _ => Err(KarttaTypesError::UnknownProjection(name.to_string())),
        }
    }

    /// Transverse Mercator parameters of a UTM zone.
    pub fn utm(zone: u8, south: bool) -> Result<Self, KarttaTypesError> {
        if !(1..=60).contains(&zone) {
            return Err(KarttaTypesError::InvalidParameter {
                name: "zone".into(),
                value: zone.to_string(),
            });
        }

        Ok(Self::TransverseMercator(
            ProjectionParams::DEFAULT
                .with_central_meridian(f64::from(zone) * 6.0 - 183.0)
                .with_scale_factor(0.9996)
                .with_false_easting(500_000.0)
                .with_false_northing(if south { 10_000_000.0 } else { 0.0 }),
        ))
    }

    /// Short name of the projection family, as accepted by [`ProjectionType::from_definition`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mercator(_) => "merc",
            Self::TransverseMercator(_) => "tmerc",
            Self::Other(_) => "geodesy",
        }
    }

    /// Parameters as key/value pairs.
    pub fn parameters(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Mercator(params) | Self::TransverseMercator(params) => params.to_pairs(),
            Self::Other(def) => vec![("proj-def", def.clone())],
        }
    }
}

impl Crs {
    /// Mercator on WGS84.
    pub const WGS84_MERCATOR: Crs = Crs {
        datum: Datum::WGS84,
        projection_type: ProjectionType::Mercator(ProjectionParams::DEFAULT),
    };

    /// Creates a new CRS.
    pub fn new(datum: Datum, projection_type: ProjectionType) -> Self {
        Self {
            datum,
            projection_type,
        }
    }

    /// Datum of the CRS.
    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    /// Projection of the CRS.
    pub fn projection_type(&self) -> &ProjectionType {
        &self.projection_type
    }

    /// Returns true if coordinates projected with the two systems can be compared directly:
    /// same projection family, same central meridian and same false origin.
    ///
    /// Datums are not compared. Maps on different datums are aligned by the datum shift done
    /// while projecting WGS84 input, and the remaining offset is far below a pixel at the scales
    /// such maps are drawn at.
    pub fn is_compatible(&self, other: &Crs) -> bool {
        match (&self.projection_type, &other.projection_type) {
            (ProjectionType::Mercator(a), ProjectionType::Mercator(b))
            | (ProjectionType::TransverseMercator(a), ProjectionType::TransverseMercator(b)) => {
                a.same_origin(b)
            }
            (ProjectionType::Other(a), ProjectionType::Other(b)) => a == b,
            _ => false,
        }
    }

    /// Creates the projection from WGS84 geographic coordinates into this system.
    ///
    /// The projection is computed on the datum's ellipsoid, with input coordinates first moved
    /// into the datum.
    pub fn get_projection(&self) -> Result<Box<MapProjection>, KarttaTypesError> {
        let ellipsoid = self.datum.ellipsoid();
        let base: Box<MapProjection> = match &self.projection_type {
            ProjectionType::Mercator(params) => Box::new(Mercator::new(ellipsoid, *params)),
            ProjectionType::TransverseMercator(params) => {
                Box::new(TransverseMercator::new(ellipsoid, *params))
            }
            ProjectionType::Other(definition) => Self::geodesy_projection(definition)?,
        };

        if self.datum.is_wgs84() {
            return Ok(base);
        }

        Ok(Box::new(ChainProjection::new(
            DatumShiftProjection::new(Datum::WGS84, self.datum),
            base,
        )))
    }

    #[cfg(feature = "geodesy")]
    fn geodesy_projection(definition: &str) -> Result<Box<MapProjection>, KarttaTypesError> {
        match crate::geo::projection::GeodesyProjection::new(definition) {
            Some(projection) => Ok(Box::new(projection)),
            None => Err(KarttaTypesError::UnsupportedProjection(
                definition.to_string(),
            )),
        }
    }

    #[cfg(not(feature = "geodesy"))]
    fn geodesy_projection(definition: &str) -> Result<Box<MapProjection>, KarttaTypesError> {
        Err(KarttaTypesError::UnsupportedProjection(
            definition.to_string(),
        ))
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WGS84_MERCATOR
    }
}
