use geodesy::prelude::*;

use super::Projection;
use crate::cartesian::ProjectedCoord;
use crate::geo::GeoCoord;

/// Projection backed by a `geodesy` operator pipeline, e.g. `"laea lon_0=10 lat_0=52"`.
///
/// Only the definition is stored. The operator is instantiated in a fresh context on every call,
/// since `geodesy` contexts are not guaranteed to be `Send + Sync`.
#[derive(Debug, Clone)]
pub struct GeodesyProjection {
    definition: String,
}

impl GeodesyProjection {
    /// Parses the operator definition. Returns `None` if `geodesy` does not accept it.
    pub fn new(definition: &str) -> Option<Self> {
        let mut context = Minimal::new();
        context.op(definition).ok()?;
        Some(Self {
            definition: definition.to_string(),
        })
    }

    /// Operator definition.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    fn apply(&self, direction: Direction, data: &mut [Coor2D; 1]) -> Option<()> {
        let mut context = Minimal::new();
        let op = context.op(&self.definition).ok()?;
        context.apply(op, direction, data).ok()?;
        Some(())
    }
}

impl Projection for GeodesyProjection {
    type InPoint = GeoCoord;
    type OutPoint = ProjectedCoord;

    fn project(&self, input: &GeoCoord) -> Option<ProjectedCoord> {
        let mut data = [Coor2D::geo(input.lat(), input.lon())];
        self.apply(Fwd, &mut data)?;

        let [easting, northing] = data[0].0;
        if !easting.is_finite() || !northing.is_finite() {
            return None;
        }

        Some(ProjectedCoord::new(northing, easting))
    }

    fn unproject(&self, input: &ProjectedCoord) -> Option<GeoCoord> {
        let mut data = [Coor2D([input.easting(), input.northing()])];
        self.apply(Inv, &mut data)?;

        let [lon, lat] = data[0].0;
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }

        Some(GeoCoord::latlon(lat.to_degrees(), lon.to_degrees()))
    }
}
