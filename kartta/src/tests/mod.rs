//! Fixtures shared by unit and integration tests.
//!
//! [`PatternProvider`] registers maps that have no backing file. Their pixels are a pattern
//! computed from the pixel position, so any decoded block can be checked without a reference
//! image.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use kartta_types::geo::{DatumTable, GeoArea, GeoCoord};
use parking_lot::Mutex;

use crate::error::ProviderError;
use crate::map::Map;
use crate::pixel::{PixelBuf, PixelRect, DEFAULT_BPP};
use crate::provider::{MapProvider, Metadata, ProviderTable, RegistrationContext};
use crate::registry::{MapRegistry, RegistryConfig};

/// Counters updated by a [`PatternProvider`].
#[derive(Debug, Default)]
pub struct PatternStats {
    /// Number of `get_pixels` calls that produced pixels.
    pub decodes: AtomicUsize,
    /// Maps added and not yet freed.
    pub live_maps: AtomicUsize,
    /// Set when the provider is finished.
    pub finished: AtomicBool,
    /// Rectangles decoded so far, in call order.
    pub decoded: Mutex<Vec<PixelRect>>,
}

#[derive(Debug)]
struct PatternMap {
    source: Option<String>,
}

/// Provider of synthetic maps.
///
/// Recognized metadata keys:
/// * `width`, `height` - required pixel dimensions;
/// * `source` - optional name, adding two maps with the same source fails;
/// * `fail` - any value makes `add_map` fail;
/// * coordinate system keys as read by [`RegistrationContext::crs`].
#[derive(Debug)]
pub struct PatternProvider {
    stats: Arc<PatternStats>,
    sources: Mutex<HashSet<String, ahash::RandomState>>,
    name: &'static str,
    fail_init: bool,
}

impl PatternProvider {
    /// Name of the provider.
    pub const NAME: &'static str = "pattern";

    /// Creates a provider and the handle to its counters.
    pub fn new() -> (Self, Arc<PatternStats>) {
        let stats = Arc::new(PatternStats::default());
        let provider = Self {
            stats: stats.clone(),
            sources: Default::default(),
            name: Self::NAME,
            fail_init: false,
        };
        (provider, stats)
    }

    /// Registers the provider under another name.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Makes the provider fail to initialize.
    pub fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Metadata of a `width` x `height` Mercator map.
    pub fn metadata(width: u32, height: u32) -> Metadata {
        Metadata::new()
            .with("width", width.to_string())
            .with("height", height.to_string())
    }

    /// Value of a channel of the pixel at the given map position.
    pub fn pattern(x: u32, y: u32, channel: usize) -> u8 {
        (x.wrapping_mul(7) ^ y.wrapping_mul(13)).wrapping_add(channel as u32 * 61) as u8
    }
}

impl MapProvider for PatternProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn init(&mut self) -> Result<(), ProviderError> {
        if self.fail_init {
            return Err(ProviderError::BadMetadata("initialization failed".into()));
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.stats.finished.store(true, Ordering::SeqCst);
    }

    fn add_map(
        &self,
        map: &mut Map,
        metadata: &Metadata,
        context: &RegistrationContext<'_>,
    ) -> Result<(), ProviderError> {
        if metadata.get("fail").is_some() {
            return Err(ProviderError::BadMetadata("asked to fail".into()));
        }
        let width = metadata
            .parse("width")?
            .ok_or_else(|| ProviderError::BadMetadata("missing key 'width'".into()))?;
        let height = metadata
            .parse("height")?
            .ok_or_else(|| ProviderError::BadMetadata("missing key 'height'".into()))?;
        let crs = context.crs(metadata)?;

        let source = metadata.get("source").map(str::to_string);
        if let Some(source) = &source {
            if !self.sources.lock().insert(source.clone()) {
                return Err(ProviderError::DuplicateSource(source.clone()));
            }
        }

        map.set_dimensions(width, height);
        map.set_provider_state(PatternMap { source });
        self.stats.live_maps.fetch_add(1, Ordering::SeqCst);
        map.set_crs(crs)
            .map_err(|err| ProviderError::BadMetadata(err.to_string()))
    }

    fn get_map_info(
        &self,
        map: &Map,
        _base_path: Option<&Path>,
    ) -> Result<Metadata, ProviderError> {
        let state = map
            .provider_state::<PatternMap>()
            .ok_or_else(|| ProviderError::BadMetadata("not a pattern map".into()))?;
        let mut metadata = Self::metadata(map.width(), map.height());
        if let Some(source) = &state.source {
            metadata.insert("source", source.as_str());
        }
        metadata.insert_crs(map.crs());
        Ok(metadata)
    }

    fn get_pixels(&self, map: &Map, rect: &PixelRect) -> Result<PixelBuf, ProviderError> {
        if !rect.fits_within(map.width(), map.height()) {
            return Err(ProviderError::OutOfBounds {
                rect: *rect,
                width: map.width(),
                height: map.height(),
            });
        }
        let rect = if rect.bpp == 0 {
            rect.with_bpp(DEFAULT_BPP)
        } else {
            *rect
        };
        if !matches!(rect.bpp, 8 | 16 | 24 | 32) {
            return Err(ProviderError::UnsupportedDepth(rect.bpp));
        }

        let channels = rect.bytes_per_pixel();
        let mut data = Vec::with_capacity(rect.byte_len());
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                data.extend((0..channels).map(|c| Self::pattern(x, y, c)));
            }
        }

        self.stats.decodes.fetch_add(1, Ordering::SeqCst);
        self.stats.decoded.lock().push(rect);
        PixelBuf::new(rect, data)
    }

    fn free_map(&self, map: &mut Map) {
        if let Some(state) = map.take_provider_state() {
            if let Ok(state) = state.downcast::<PatternMap>() {
                if let Some(source) = &state.source {
                    self.sources.lock().remove(source);
                }
                self.stats.live_maps.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

/// Registry with a single [`PatternProvider`].
pub fn pattern_registry() -> MapRegistry {
    pattern_registry_with_stats().0
}

/// Registry with a single [`PatternProvider`] and the handle to the provider's counters.
pub fn pattern_registry_with_stats() -> (MapRegistry, Arc<PatternStats>) {
    let (provider, stats) = PatternProvider::new();
    let registry = MapRegistry::new(
        ProviderTable::new().with_provider(provider),
        DatumTable::standard(),
        RegistryConfig::default(),
    );
    (registry, stats)
}

/// Footprint from its south-west and north-east corners.
pub fn geo_area(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> GeoArea {
    GeoArea::new(GeoCoord::latlon(lat0, lon0), GeoCoord::latlon(lat1, lon1))
}
