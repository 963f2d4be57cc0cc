//! Tiling of a screen with the best available maps.
//!
//! The screen is covered recursively: the best map for the requested area is placed, then every
//! uncovered strip around it is tiled the same way. The resulting [`TileNode`]s cover the screen
//! exactly, without gaps or overlaps. Parts no map can serve are marked as
//! [`TileSource::Blank`].

use kartta_types::cartesian::{ProjectedArea, Rect};

use crate::error::KarttaError;
use crate::map::{Map, MapId};
use crate::pixel::PixelRect;
use crate::registry::MapRegistry;

mod placement;
mod scoring;
mod viewport;

pub use viewport::{Viewport, MIN_SCALE};

/// Configuration of a [`TilingEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilingConfig {
    zoom_out_floor: f64,
    zoom_in_floor: f64,
    scale_weight: f64,
    max_depth: usize,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            zoom_out_floor: 0.25,
            zoom_in_floor: 0.0025,
            scale_weight: 0.5,
            max_depth: 256,
        }
    }
}

impl TilingConfig {
    /// Smallest ratio of requested to native scale a coarser map may have to be shown.
    pub fn zoom_out_floor(&self) -> f64 {
        self.zoom_out_floor
    }

    /// Sets the smallest ratio of requested to native scale a coarser map may have to be shown.
    pub fn with_zoom_out_floor(mut self, floor: f64) -> Self {
        self.zoom_out_floor = floor;
        self
    }

    /// Sets the smallest ratio of requested to native scale a coarser map may have to be shown.
    pub fn set_zoom_out_floor(&mut self, floor: f64) {
        self.zoom_out_floor = floor;
    }

    /// Smallest ratio of native to requested scale a finer map may have to be shown.
    pub fn zoom_in_floor(&self) -> f64 {
        self.zoom_in_floor
    }

    /// Sets the smallest ratio of native to requested scale a finer map may have to be shown.
    pub fn with_zoom_in_floor(mut self, floor: f64) -> Self {
        self.zoom_in_floor = floor;
        self
    }

    /// Sets the smallest ratio of native to requested scale a finer map may have to be shown.
    pub fn set_zoom_in_floor(&mut self, floor: f64) {
        self.zoom_in_floor = floor;
    }

    /// Factor all map scores are multiplied by.
    pub fn scale_weight(&self) -> f64 {
        self.scale_weight
    }

    /// Sets the factor all map scores are multiplied by.
    pub fn with_scale_weight(mut self, weight: f64) -> Self {
        self.scale_weight = weight;
        self
    }

    /// Sets the factor all map scores are multiplied by.
    pub fn set_scale_weight(&mut self, weight: f64) {
        self.scale_weight = weight;
    }

    /// Maximum recursion depth of a layout.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Sets the maximum recursion depth of a layout.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the maximum recursion depth of a layout.
    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }
}

/// What to draw in a [`TileNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSource {
    /// No map covers the area.
    Blank,
    /// Pixels of a map.
    Map {
        /// The map.
        map: MapId,
        /// Part of the map image to draw, without a pixel depth.
        rect: PixelRect,
    },
}

/// A rectangle of the screen and what to draw into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileNode {
    /// Screen rectangle.
    pub screen: Rect<i32>,
    /// Source of the pixels.
    pub source: TileSource,
}

impl TileNode {
    fn blank(screen: Rect<i32>) -> Self {
        Self {
            screen,
            source: TileSource::Blank,
        }
    }

    /// Returns true if no map covers the node.
    pub fn is_blank(&self) -> bool {
        self.source == TileSource::Blank
    }

    /// Map drawn into the node.
    pub fn map(&self) -> Option<MapId> {
        match self.source {
            TileSource::Map { map, .. } => Some(map),
            TileSource::Blank => None,
        }
    }

    /// Returns true if the map pixels must be resampled to fill the screen rectangle.
    pub fn needs_scaling(&self) -> bool {
        match self.source {
            TileSource::Map { rect, .. } => {
                i64::from(rect.width) != i64::from(self.screen.width())
                    || i64::from(rect.height) != i64::from(self.screen.height())
            }
            TileSource::Blank => false,
        }
    }
}

/// Orders nodes top to bottom, then left to right.
pub fn sort_by_screen_position(nodes: &mut [TileNode]) {
    nodes.sort_by_key(|node| (node.screen.y_min, node.screen.x_min));
}

/// Splits a viewport into [`TileNode`]s.
#[derive(Debug, Default, Clone)]
pub struct TilingEngine {
    config: TilingConfig,
}

impl TilingEngine {
    /// Creates a new engine.
    pub fn new(config: TilingConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    /// Sets the engine configuration.
    pub fn set_config(&mut self, config: TilingConfig) {
        self.config = config;
    }

    /// Covers the screen of `viewport` with maps of `registry`.
    ///
    /// The viewport is in the projected space of the `reference` map, and only maps with a
    /// compatible projection are considered.
    ///
    /// # Panics
    ///
    /// If the recursion gets deeper than [`TilingConfig::max_depth`].
    pub fn layout(
        &self,
        registry: &MapRegistry,
        reference: MapId,
        viewport: &Viewport,
    ) -> Result<Vec<TileNode>, KarttaError> {
        let reference = registry.get(reference).ok_or(KarttaError::NotFound)?;
        let screen = viewport.screen_rect();
        let mut nodes = Vec::new();
        if screen.is_empty() {
            return Ok(nodes);
        }

        let request = LayoutRequest {
            registry,
            reference,
            viewport,
        };
        self.fill(&request, screen, 0, &mut nodes);
        log::debug!(
            "Laid out {}x{} screen at scale {} in {} nodes",
            screen.width(),
            screen.height(),
            viewport.scale(),
            nodes.len()
        );

        Ok(nodes)
    }

    fn fill(
        &self,
        request: &LayoutRequest<'_>,
        screen: Rect<i32>,
        depth: usize,
        nodes: &mut Vec<TileNode>,
    ) {
        assert!(
            depth < self.config.max_depth,
            "layout recursion exceeded {} levels at {screen:?}",
            self.config.max_depth
        );
        debug_assert!(!screen.is_empty());

        let scale = request.viewport.scale();
        let area = request.viewport.projected_area_of(&screen);
        let Some(map) = request.best_map(&self.config, &area, scale) else {
            log::debug!("No map for {screen:?}");
            nodes.push(TileNode::blank(screen));
            return;
        };

        let placement = placement::place(map, &screen, &area, scale);
        assert!(
            !placement.screen.is_empty() && !placement.source.is_empty(),
            "map {:?} placed degenerately: {placement:?}",
            map.id()
        );
        nodes.push(TileNode {
            screen: placement.screen,
            source: TileSource::Map {
                map: map.id(),
                rect: placement.source_pixels(),
            },
        });
        if placement.screen == screen {
            return;
        }

        for remainder in remainders(&screen, &placement.screen) {
            self.fill(request, remainder, depth + 1, nodes);
        }
    }
}

struct LayoutRequest<'a> {
    registry: &'a MapRegistry,
    reference: &'a Map,
    viewport: &'a Viewport,
}

impl<'a> LayoutRequest<'a> {
    fn best_map(&self, config: &TilingConfig, area: &ProjectedArea, scale: f64) -> Option<&'a Map> {
        let candidates = self.registry.find_for_marea(self.reference, area);
        scoring::best_map(config, &candidates, area, scale)
    }
}

/// Parts of `screen` outside `covered`: the full width strips above and below, then the strips
/// left and right of `covered` between them.
fn remainders(screen: &Rect<i32>, covered: &Rect<i32>) -> Vec<Rect<i32>> {
    let candidates = [
        Rect::new(screen.x_min, screen.y_min, screen.x_max, covered.y_min),
        Rect::new(screen.x_min, covered.y_max, screen.x_max, screen.y_max),
        Rect::new(screen.x_min, covered.y_min, covered.x_min, covered.y_max),
        Rect::new(covered.x_max, covered.y_min, screen.x_max, covered.y_max),
    ];
    candidates.into_iter().filter(|r| !r.is_empty()).collect()
}
