//! Georeferenced raster map.

use std::any::Any;
use std::fmt::{Debug, Formatter};

use kartta_types::cartesian::{ProjectedArea, ProjectedCoord};
use kartta_types::error::KarttaTypesError;
use kartta_types::geo::{Crs, Datum, GeoArea, GeoCoord, MapProjection};
use serde::{Deserialize, Serialize};

/// Identifier of a map, unique within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(pub(crate) u64);

impl MapId {
    /// Id of a map that has not been registered.
    pub const UNREGISTERED: MapId = MapId(u64::MAX);

    /// Numeric value of the id.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Size of one map pixel in projection units, per axis.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Scale {
    /// Easting units per pixel column.
    pub x: f64,
    /// Northing units per pixel row.
    pub y: f64,
}

impl Scale {
    /// Returns true if both components are finite and positive.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }

    /// Mean of the two components.
    pub fn mean(&self) -> f64 {
        (self.x + self.y) / 2.0
    }
}

/// A raster map with a known geographic footprint.
///
/// A map is created with its footprint only. The provider that owns it fills in the pixel
/// dimensions, coordinate system and private decoding state, then the registry derives the
/// projected footprint and pixel scale. After registration the map does not change.
pub struct Map {
    pub(crate) id: MapId,
    area: GeoArea,
    marea: ProjectedArea,
    width: u32,
    height: u32,
    scale: Scale,
    crs: Crs,
    projection: Box<MapProjection>,
    pub(crate) provider: String,
    provider_state: Option<Box<dyn Any + Send + Sync>>,
}

impl Map {
    /// Creates an unregistered map with the given geographic footprint (WGS84).
    pub fn new(area: GeoArea) -> Self {
        let crs = Crs::WGS84_MERCATOR;
        let projection = Box::new(kartta_types::geo::projection::Mercator::default());
        Self {
            id: MapId::UNREGISTERED,
            area,
            marea: ProjectedArea::new(ProjectedCoord::INVALID, ProjectedCoord::INVALID),
            width: 0,
            height: 0,
            scale: Scale::default(),
            crs,
            projection,
            provider: String::new(),
            provider_state: None,
        }
    }

    /// Id assigned at registration.
    pub fn id(&self) -> MapId {
        self.id
    }

    /// Geographic footprint (WGS84).
    pub fn area(&self) -> &GeoArea {
        &self.area
    }

    /// Footprint in the map's own projection.
    pub fn marea(&self) -> &ProjectedArea {
        &self.marea
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Projection units per pixel.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Coordinate system of the map image.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Datum of the map image.
    pub fn datum(&self) -> &Datum {
        self.crs.datum()
    }

    /// Name of the provider that decodes the map.
    pub fn provider_name(&self) -> &str {
        &self.provider
    }

    /// Sets the geographic footprint.
    pub fn set_area(&mut self, area: GeoArea) {
        self.area = area;
    }

    /// Sets the pixel dimensions.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Sets the coordinate system, building its projection.
    pub fn set_crs(&mut self, crs: Crs) -> Result<(), KarttaTypesError> {
        self.projection = crs.get_projection()?;
        self.crs = crs;
        Ok(())
    }

    /// Stores provider specific decoding state.
    pub fn set_provider_state<T: Any + Send + Sync>(&mut self, state: T) {
        self.provider_state = Some(Box::new(state));
    }

    /// Provider specific decoding state, if it has the type `T`.
    pub fn provider_state<T: Any>(&self) -> Option<&T> {
        self.provider_state.as_ref()?.downcast_ref()
    }

    /// Removes and returns provider specific state.
    pub fn take_provider_state(&mut self) -> Option<Box<dyn Any + Send + Sync>> {
        self.provider_state.take()
    }

    /// Projects a WGS84 coordinate into the map's projected space.
    ///
    /// Points the projection is not defined for give [`ProjectedCoord::INVALID`].
    pub fn project(&self, coord: &GeoCoord) -> ProjectedCoord {
        self.projection
            .project(coord)
            .unwrap_or(ProjectedCoord::INVALID)
    }

    /// Converts a coordinate of the map's projected space into WGS84.
    pub fn unproject(&self, coord: &ProjectedCoord) -> GeoCoord {
        self.projection
            .unproject(coord)
            .unwrap_or(GeoCoord::latlon(f64::NAN, f64::NAN))
    }

    /// Projects both corners of a geographic area.
    pub fn project_area(&self, area: &GeoArea) -> ProjectedArea {
        ProjectedArea::new(self.project(&area.start()), self.project(&area.end()))
    }

    /// Size of a geographic area in square projection units of this map.
    pub fn area_of(&self, area: &GeoArea) -> f64 {
        self.project_area(area).size()
    }

    /// Returns true if the coordinate is inside the map footprint.
    pub fn contains(&self, coord: &GeoCoord) -> bool {
        self.area.contains(coord)
    }

    /// Position of a WGS84 coordinate in map pixels, counted from the top-left corner.
    pub fn pixel_for_coord(&self, coord: &GeoCoord) -> (f64, f64) {
        self.pixel_for_projected(&self.project(coord))
    }

    /// Position of a projected coordinate in map pixels, counted from the top-left corner.
    pub fn pixel_for_projected(&self, coord: &ProjectedCoord) -> (f64, f64) {
        let x = (coord.easting() - self.marea.start().easting()) / self.scale.x;
        let y = f64::from(self.height)
            - (coord.northing() - self.marea.start().northing()) / self.scale.y;
        (x, y)
    }

    /// Projected coordinate of a map pixel position.
    pub fn projected_for_pixel(&self, x: f64, y: f64) -> ProjectedCoord {
        ProjectedCoord::new(
            self.marea.start().northing() + (f64::from(self.height) - y) * self.scale.y,
            self.marea.start().easting() + x * self.scale.x,
        )
    }

    /// WGS84 coordinate of a map pixel position.
    pub fn coord_for_pixel(&self, x: f64, y: f64) -> GeoCoord {
        self.unproject(&self.projected_for_pixel(x, y))
    }

    /// Derives the projected footprint and the pixel scale from footprint and dimensions.
    pub(crate) fn compute_geometry(&mut self) -> Scale {
        self.marea = self.project_area(&self.area);
        self.scale = Scale {
            x: self.marea.width() / f64::from(self.width),
            y: self.marea.height() / f64::from(self.height),
        };
        self.scale
    }
}

impl Debug for Map {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("id", &self.id)
            .field("area", &self.area)
            .field("marea", &self.marea)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .field("crs", &self.crs)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}
