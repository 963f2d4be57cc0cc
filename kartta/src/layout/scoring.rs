use kartta_types::cartesian::ProjectedArea;

use super::TilingConfig;
use crate::map::Map;

/// How well `map` serves `area` at `scale`, or `None` if it should not be shown there.
///
/// Maps overlapping the area by less than one screen pixel or less than one of their own pixels
/// along either axis contribute nothing. Maps much coarser than the requested scale are
/// rejected outright, and so are maps so much finer that decoding them would be wasteful. The
/// rest score by overlap area weighted by how close their scale is.
pub(super) fn score(
    config: &TilingConfig,
    map: &Map,
    area: &ProjectedArea,
    scale: f64,
) -> Option<f64> {
    let isect = map.marea().intersect(area);
    if isect.is_empty() {
        return None;
    }

    let (width, height) = (isect.width(), isect.height());
    if !(width >= scale && height >= scale) {
        return None;
    }
    let native = map.scale();
    if !(width >= native.x && height >= native.y) {
        return None;
    }

    let closeness = if native.y <= scale {
        if !(native.y / scale >= config.zoom_in_floor()) {
            return None;
        }
        1.0
    } else {
        scale / native.y
    };
    if closeness < config.zoom_out_floor() {
        return None;
    }

    Some(width * height * closeness * config.scale_weight())
}

/// Highest scoring candidate. Ties go to the earlier one.
pub(super) fn best_map<'a>(
    config: &TilingConfig,
    candidates: &[&'a Map],
    area: &ProjectedArea,
    scale: f64,
) -> Option<&'a Map> {
    let mut best: Option<(&Map, f64)> = None;
    for &map in candidates {
        let Some(points) = score(config, map, area, scale) else {
            continue;
        };
        match best {
            Some((_, best_points)) if points <= best_points => {}
            _ => best = Some((map, points)),
        }
    }

    best.map(|(map, _)| map)
}
