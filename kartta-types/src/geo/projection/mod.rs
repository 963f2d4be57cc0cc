//! Conversions between coordinate spaces.

mod chain;
mod datum_shift;
#[cfg(feature = "geodesy")]
mod geodesy;
mod mercator;
mod transverse_mercator;

pub use chain::ChainProjection;
pub use datum_shift::DatumShiftProjection;
#[cfg(feature = "geodesy")]
pub use geodesy::GeodesyProjection;
pub use mercator::Mercator;
pub use transverse_mercator::TransverseMercator;

/// Converts points from one coordinate space into another and back.
pub trait Projection {
    /// Type of the input point.
    type InPoint;
    /// Type of the output point.
    type OutPoint;

    /// Forward conversion. `None` if the point cannot be projected.
    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint>;
    /// Inverse conversion. `None` if the point cannot be converted back.
    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint>;
}

impl<P: Projection + ?Sized> Projection for Box<P> {
    type InPoint = P::InPoint;
    type OutPoint = P::OutPoint;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        (**self).project(input)
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        (**self).unproject(input)
    }
}
