use kartta_types::cartesian::{ProjectedArea, ProjectedCoord, Rect, Size};

/// Smallest allowed viewport scale, in projection units per screen pixel.
pub const MIN_SCALE: f64 = 0.1;

/// Part of a reference map's projected space shown on a screen.
///
/// The screen has its origin in the top-left corner with `y` growing downwards, the projected
/// space has northing growing upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: ProjectedCoord,
    scale: f64,
    size: Size<u32>,
}

impl Viewport {
    /// Creates a new viewport. Scales below [`MIN_SCALE`] are raised to it.
    pub fn new(center: ProjectedCoord, scale: f64, size: Size<u32>) -> Self {
        Self {
            center,
            scale: clamp_scale(scale),
            size,
        }
    }

    /// Projected coordinate at the center of the screen.
    pub fn center(&self) -> ProjectedCoord {
        self.center
    }

    /// Projection units per screen pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen size in pixels.
    pub fn size(&self) -> Size<u32> {
        self.size
    }

    /// Returns a copy of the viewport centered at another coordinate.
    pub fn with_center(&self, center: ProjectedCoord) -> Self {
        Self { center, ..*self }
    }

    /// Returns a copy of the viewport with another scale.
    pub fn with_scale(&self, scale: f64) -> Self {
        Self {
            scale: clamp_scale(scale),
            ..*self
        }
    }

    /// Returns a copy of the viewport with another screen size.
    pub fn with_size(&self, size: Size<u32>) -> Self {
        Self { size, ..*self }
    }

    /// The whole screen.
    pub fn screen_rect(&self) -> Rect<i32> {
        Rect::new(0, 0, to_i32(self.size.width()), to_i32(self.size.height()))
    }

    /// Projected area covered by the screen.
    ///
    /// The bottom-left corner is snapped to a multiple of the scale, so panning by a fraction of a
    /// pixel does not shift map pixels against screen pixels.
    pub fn projected_area(&self) -> ProjectedArea {
        let width = f64::from(self.size.width()) * self.scale;
        let height = f64::from(self.size.height()) * self.scale;

        let mut start_n = self.center.northing() - height / 2.0;
        let mut start_e = self.center.easting() - width / 2.0;
        start_n -= start_n % self.scale;
        start_e -= start_e % self.scale;

        ProjectedArea::new(
            ProjectedCoord::new(start_n, start_e),
            ProjectedCoord::new(start_n + height, start_e + width),
        )
    }

    /// Projected area covered by a part of the screen.
    pub fn projected_area_of(&self, rect: &Rect<i32>) -> ProjectedArea {
        let area = self.projected_area();
        let end_n = area.end().northing() - f64::from(rect.y_min) * self.scale;
        let start_e = area.start().easting() + f64::from(rect.x_min) * self.scale;

        ProjectedArea::new(
            ProjectedCoord::new(end_n - f64::from(rect.height()) * self.scale, start_e),
            ProjectedCoord::new(end_n, start_e + f64::from(rect.width()) * self.scale),
        )
    }

    /// Projected coordinate of a screen position.
    pub fn screen_to_projected(&self, x: f64, y: f64) -> ProjectedCoord {
        let area = self.projected_area();
        ProjectedCoord::new(
            area.end().northing() - y * self.scale,
            area.start().easting() + x * self.scale,
        )
    }

    /// Screen position of a projected coordinate. The result may be outside the screen.
    pub fn projected_to_screen(&self, coord: &ProjectedCoord) -> (f64, f64) {
        let area = self.projected_area();
        (
            (coord.easting() - area.start().easting()) / self.scale,
            (area.end().northing() - coord.northing()) / self.scale,
        )
    }
}

fn clamp_scale(scale: f64) -> f64 {
    // `f64::max` returns the other operand for NaN.
    scale.max(MIN_SCALE)
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
