use super::Projection;
use crate::geo::{datum_shift, Datum, GeoCoord};

/// Moves geographic coordinates from one datum into another.
#[derive(Debug, Clone, Copy)]
pub struct DatumShiftProjection {
    from: Datum,
    to: Datum,
}

impl DatumShiftProjection {
    /// Creates a new shift.
    pub fn new(from: Datum, to: Datum) -> Self {
        Self { from, to }
    }
}

impl Projection for DatumShiftProjection {
    type InPoint = GeoCoord;
    type OutPoint = GeoCoord;

    fn project(&self, input: &GeoCoord) -> Option<GeoCoord> {
        let shifted = datum_shift(*input, &self.from, &self.to);
        shifted.is_finite().then_some(shifted)
    }

    fn unproject(&self, input: &GeoCoord) -> Option<GeoCoord> {
        let shifted = datum_shift(*input, &self.to, &self.from);
        shifted.is_finite().then_some(shifted)
    }
}
