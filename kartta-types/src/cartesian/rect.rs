use num_traits::Num;
use serde::{Deserialize, Serialize};

/// Axis aligned rectangle given by its minimum and maximum corners.
///
/// Used with integer coordinates for screen and map pixel rectangles. The maximum bounds are
/// exclusive, so `Rect::new(0, 0, 500, 500)` has width and height of 500.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect<N = f64> {
    /// Minimum x.
    pub x_min: N,
    /// Minimum y.
    pub y_min: N,
    /// Maximum x.
    pub x_max: N,
    /// Maximum y.
    pub y_max: N,
}

impl<N: Num + Copy + PartialOrd> Rect<N> {
    /// Creates a new rectangle.
    pub fn new(x_min: N, y_min: N, x_max: N, y_max: N) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Creates a rectangle from its origin and size.
    pub fn from_origin(x: N, y: N, width: N, height: N) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Minimum x.
    pub fn x_min(&self) -> N {
        self.x_min
    }

    /// Maximum x.
    pub fn x_max(&self) -> N {
        self.x_max
    }

    /// Minimum y.
    pub fn y_min(&self) -> N {
        self.y_min
    }

    /// Maximum y.
    pub fn y_max(&self) -> N {
        self.y_max
    }

    /// Width.
    pub fn width(&self) -> N {
        self.x_max - self.x_min
    }

    /// Height.
    pub fn height(&self) -> N {
        self.y_max - self.y_min
    }

    /// Width times height.
    pub fn area(&self) -> N {
        self.width() * self.height()
    }

    /// Returns true if the rectangle has no interior.
    pub fn is_empty(&self) -> bool {
        !(self.x_min < self.x_max && self.y_min < self.y_max)
    }

    /// Intersection of two rectangles. May be empty.
    pub fn limit(&self, other: Self) -> Self {
        Self {
            x_min: max(self.x_min, other.x_min),
            y_min: max(self.y_min, other.y_min),
            x_max: min(self.x_max, other.x_max),
            y_max: min(self.y_max, other.y_max),
        }
    }

    /// Smallest rectangle containing both rectangles.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: min(self.x_min, other.x_min),
            y_min: min(self.y_min, other.y_min),
            x_max: max(self.x_max, other.x_max),
            y_max: max(self.y_max, other.y_max),
        }
    }

    /// Returns true if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x_min <= other.x_min
            && other.x_max <= self.x_max
            && self.y_min <= other.y_min
            && other.y_max <= self.y_max
    }

    /// Returns true if the two rectangles share some interior.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.limit(*other).is_empty()
    }

    /// Moves the rectangle by the given offset.
    pub fn translate(&self, dx: N, dy: N) -> Self {
        Self {
            x_min: self.x_min + dx,
            y_min: self.y_min + dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }
}

fn min<N: PartialOrd>(a: N, b: N) -> N {
    if a < b {
        a
    } else {
        b
    }
}

fn max<N: PartialOrd>(a: N, b: N) -> N {
    if a > b {
        a
    } else {
        b
    }
}
