use kartta_types::cartesian::{ProjectedArea, Rect};

use crate::map::Map;
use crate::pixel::PixelRect;

/// Where a map's pixels land on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Placement {
    /// Rectangle in the map image.
    pub source: Rect<i32>,
    /// Rectangle on the screen.
    pub screen: Rect<i32>,
}

impl Placement {
    pub(super) fn source_pixels(&self) -> PixelRect {
        let source = self.source;
        PixelRect::new(
            non_negative(source.x_min),
            non_negative(source.y_min),
            non_negative(source.width()),
            non_negative(source.height()),
        )
    }
}

/// One axis of a placement, in pixels: origin and extent in the map and on the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    map_start: f64,
    map_len: f64,
    screen_start: f64,
    screen_len: f64,
}

impl Span {
    /// Snaps the span to whole pixels.
    ///
    /// When the map and screen extents differ by less than a pixel, both get the same extent, so
    /// the map can be copied without resampling. That extent is rounded up if it still fits into
    /// both `screen_end` and `map_end`.
    fn snap(self, screen_end: i32, map_end: i32) -> (i32, i32, i32, i32) {
        let map_start = self.map_start.round_ties_even();
        let screen_start = self.screen_start.round_ties_even();

        let (map_len, screen_len) = if (self.map_len - self.screen_len).abs() < 1.0 {
            let mean = (self.map_len + self.screen_len) / 2.0;
            let len = if screen_start + mean.ceil() <= f64::from(screen_end)
                && map_start + mean.ceil() <= f64::from(map_end)
            {
                mean.ceil()
            } else {
                mean.floor()
            };
            (len, len)
        } else {
            (
                self.map_len.round_ties_even(),
                self.screen_len.round_ties_even(),
            )
        };

        (
            map_start as i32,
            map_len as i32,
            screen_start as i32,
            screen_len as i32,
        )
    }
}

/// Places the part of `map` inside `area` on `screen`.
///
/// `area` is the projected area shown by `screen` at `scale` units per screen pixel. Both
/// resulting rectangles are clipped to the screen rectangle and to the map image.
pub(super) fn place(map: &Map, screen: &Rect<i32>, area: &ProjectedArea, scale: f64) -> Placement {
    let isect = area.intersect(map.marea());
    let marea = map.marea();
    let native = map.scale();
    let map_height = f64::from(map.height());

    let map_y = map_height - (isect.end().northing() - marea.start().northing()) / native.y;
    let map_y_end = map_height - (isect.start().northing() - marea.start().northing()) / native.y;
    let map_x = (isect.start().easting() - marea.start().easting()) / native.x;
    let map_x_end = (isect.end().easting() - marea.start().easting()) / native.x;

    let screen_height = f64::from(screen.height());
    let screen_y = screen_height - (isect.end().northing() - area.start().northing()) / scale;
    let screen_y_end = screen_height - (isect.start().northing() - area.start().northing()) / scale;
    let screen_x = (isect.start().easting() - area.start().easting()) / scale;
    let screen_x_end = (isect.end().easting() - area.start().easting()) / scale;

    let horizontal = Span {
        map_start: map_x,
        map_len: map_x_end - map_x,
        screen_start: screen_x + f64::from(screen.x_min),
        screen_len: screen_x_end - screen_x,
    };
    let vertical = Span {
        map_start: map_y,
        map_len: map_y_end - map_y,
        screen_start: screen_y + f64::from(screen.y_min),
        screen_len: screen_y_end - screen_y,
    };

    let map_width = i32::try_from(map.width()).unwrap_or(i32::MAX);
    let map_height = i32::try_from(map.height()).unwrap_or(i32::MAX);
    let (mx, mw, sx, sw) = horizontal.snap(screen.x_max, map_width);
    let (my, mh, sy, sh) = vertical.snap(screen.y_max, map_height);

    Placement {
        source: Rect::from_origin(mx, my, mw, mh).limit(Rect::new(0, 0, map_width, map_height)),
        screen: Rect::from_origin(sx, sy, sw, sh).limit(*screen),
    }
}

fn non_negative(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
