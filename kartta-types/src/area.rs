//! Axis aligned boxes defined by two corner points.

use serde::{Deserialize, Serialize};

use crate::cartesian::ProjectedCoord;
use crate::geo::GeoCoord;

/// A point type that can serve as a corner of an [`Area`].
///
/// The two axes are compared independently. For geographic coordinates the first axis is
/// latitude, for projected coordinates it is northing.
pub trait AreaCorner: Copy {
    /// Value along the first axis.
    fn first(&self) -> f64;
    /// Value along the second axis.
    fn second(&self) -> f64;
    /// Creates a point from its two axis values.
    fn from_axes(first: f64, second: f64) -> Self;
}

impl AreaCorner for GeoCoord {
    fn first(&self) -> f64 {
        self.lat()
    }

    fn second(&self) -> f64 {
        self.lon()
    }

    fn from_axes(first: f64, second: f64) -> Self {
        GeoCoord::latlon(first, second)
    }
}

impl AreaCorner for ProjectedCoord {
    fn first(&self) -> f64 {
        self.northing()
    }

    fn second(&self) -> f64 {
        self.easting()
    }

    fn from_axes(first: f64, second: f64) -> Self {
        ProjectedCoord::new(first, second)
    }
}

/// Box between a `start` (bottom-left) and an `end` (top-right) corner.
///
/// An area with `start` not strictly less than `end` along either axis is empty. Empty areas are
/// normal values: they are what [`Area::intersect`] returns for boxes that do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area<P> {
    start: P,
    end: P,
}

/// Geographic footprint.
pub type GeoArea = Area<GeoCoord>;

/// Footprint in the coordinates of one projection ("marea").
pub type ProjectedArea = Area<ProjectedCoord>;

impl<P: AreaCorner> Area<P> {
    /// Creates a new area. The corners are stored as given.
    pub fn new(start: P, end: P) -> Self {
        Self { start, end }
    }

    /// Creates an area from any two opposite corners, ordering the axes.
    pub fn from_corners(a: P, b: P) -> Self {
        Self {
            start: P::from_axes(a.first().min(b.first()), a.second().min(b.second())),
            end: P::from_axes(a.first().max(b.first()), a.second().max(b.second())),
        }
    }

    /// Bottom-left corner.
    pub fn start(&self) -> P {
        self.start
    }

    /// Top-right corner.
    pub fn end(&self) -> P {
        self.end
    }

    /// Overlap of two areas.
    ///
    /// The result may be empty; check it with [`Area::is_empty`].
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            start: P::from_axes(
                self.start.first().max(other.start.first()),
                self.start.second().max(other.start.second()),
            ),
            end: P::from_axes(
                self.end.first().min(other.end.first()),
                self.end.second().min(other.end.second()),
            ),
        }
    }

    /// Returns true if the area has no interior. Areas with NaN corners are empty.
    pub fn is_empty(&self) -> bool {
        !(self.start.first() < self.end.first() && self.start.second() < self.end.second())
    }

    /// Returns true if the two areas have a non-degenerate overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Closed point-in-box test.
    pub fn contains(&self, point: &P) -> bool {
        self.start.first() <= point.first()
            && point.first() <= self.end.first()
            && self.start.second() <= point.second()
            && point.second() <= self.end.second()
    }

    /// Returns true if `other` lies entirely inside this area.
    pub fn contains_area(&self, other: &Self) -> bool {
        self.contains(&other.start) && self.contains(&other.end)
    }

    /// Extent along the first axis.
    pub fn first_extent(&self) -> f64 {
        self.end.first() - self.start.first()
    }

    /// Extent along the second axis.
    pub fn second_extent(&self) -> f64 {
        self.end.second() - self.start.second()
    }

    /// Center point.
    pub fn center(&self) -> P {
        P::from_axes(
            (self.start.first() + self.end.first()) / 2.0,
            (self.start.second() + self.end.second()) / 2.0,
        )
    }
}

impl ProjectedArea {
    /// Easting extent.
    pub fn width(&self) -> f64 {
        self.second_extent()
    }

    /// Northing extent.
    pub fn height(&self) -> f64 {
        self.first_extent()
    }

    /// Absolute size of the area in square projection units.
    pub fn size(&self) -> f64 {
        (self.width() * self.height()).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latlon;

    fn geo(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> GeoArea {
        GeoArea::new(latlon!(lat0, lon0), latlon!(lat1, lon1))
    }

    #[test]
    fn intersect_overlapping() {
        let a = geo(0.0, 0.0, 2.0, 2.0);
        let b = geo(1.0, -1.0, 3.0, 1.5);
        let i = a.intersect(&b);
        assert_eq!(i, geo(1.0, 0.0, 2.0, 1.5));
        assert!(!i.is_empty());
        assert_eq!(i, b.intersect(&a));
    }

    #[test]
    fn intersect_is_idempotent() {
        let a = geo(59.5, 21.0, 61.0, 25.5);
        assert_eq!(a.intersect(&a), a);
    }

    #[test]
    fn disjoint_areas_give_empty_intersection() {
        let a = geo(0.0, 0.0, 1.0, 1.0);
        let b = geo(5.0, 5.0, 6.0, 6.0);
        assert!(a.intersect(&b).is_empty());
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn touching_areas_do_not_overlap() {
        let a = geo(0.0, 0.0, 1.0, 1.0);
        let b = geo(0.0, 1.0, 1.0, 2.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn nan_area_is_empty() {
        let a = ProjectedArea::new(
            ProjectedCoord::new(f64::NAN, 0.0),
            ProjectedCoord::new(10.0, 10.0),
        );
        assert!(a.is_empty());
    }

    #[test]
    fn contains_is_closed() {
        let a = geo(0.0, 0.0, 1.0, 1.0);
        assert!(a.contains(&latlon!(0.0, 0.0)));
        assert!(a.contains(&latlon!(1.0, 1.0)));
        assert!(a.contains(&latlon!(0.5, 0.25)));
        assert!(!a.contains(&latlon!(1.0001, 0.5)));
    }

    #[test]
    fn from_corners_normalizes() {
        let a = GeoArea::from_corners(latlon!(2.0, 1.0), latlon!(1.0, 3.0));
        assert_eq!(a, geo(1.0, 1.0, 2.0, 3.0));
    }

    #[test]
    fn projected_area_size() {
        let a = ProjectedArea::new(
            ProjectedCoord::new(100.0, 200.0),
            ProjectedCoord::new(150.0, 300.0),
        );
        assert_eq!(a.height(), 50.0);
        assert_eq!(a.width(), 100.0);
        assert_eq!(a.size(), 5000.0);
    }
}
