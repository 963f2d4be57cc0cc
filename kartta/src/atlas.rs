//! [`Atlas`] ties the registry, the pixel cache and the tiling engine together.

use std::path::Path;
use std::sync::Arc;

use kartta_types::cartesian::Size;
use kartta_types::geo::{DatumTable, GeoCoord};
use parking_lot::Mutex;

use crate::catalog::MapRecord;
use crate::error::{KarttaError, ProviderError};
use crate::layout::{TileNode, TilingConfig, TilingEngine, Viewport};
use crate::map::{Map, MapId};
use crate::pixel::{PixelBuf, PixelRect, DEFAULT_BPP};
use crate::pixel_cache::{PixelCache, PixelCacheConfig};
use crate::provider::{MapProvider, Metadata, ProviderTable};
use crate::registry::{MapRegistry, RegistryConfig};

/// A collection of maps ready to be laid out on a screen and drawn.
///
/// ```
/// use kartta::{AtlasBuilder, Map};
/// use kartta::tests::{geo_area, PatternProvider};
/// use kartta::kartta_types::cartesian::Size;
/// use kartta::kartta_types::latlon;
///
/// let mut atlas = AtlasBuilder::default()
///     .with_provider(PatternProvider::new().0)
///     .build();
/// atlas
///     .register(
///         Map::new(geo_area(60.0, 24.0, 61.0, 26.0)),
///         PatternProvider::NAME,
///         &PatternProvider::metadata(2000, 2000),
///         None,
///     )
///     .unwrap();
///
/// let (reference, viewport) = atlas
///     .initial_view(&latlon!(60.5, 25.0), Size::new(640, 480))
///     .unwrap();
/// let nodes = atlas.layout(reference, &viewport).unwrap();
/// for node in &nodes {
///     if let Some(map) = node.map() {
///         let rect = match node.source {
///             kartta::TileSource::Map { rect, .. } => rect,
///             kartta::TileSource::Blank => unreachable!(),
///         };
///         let pixels = atlas.get_map_pixels(map, &rect).unwrap();
///         assert!(pixels.rect().contains(&rect));
///     }
/// }
/// ```
pub struct Atlas {
    registry: MapRegistry,
    cache: Mutex<PixelCache>,
    engine: TilingEngine,
}

impl Atlas {
    /// Creates an atlas from its parts.
    pub fn new(
        registry: MapRegistry,
        cache_config: PixelCacheConfig,
        engine: TilingEngine,
    ) -> Self {
        Self {
            registry,
            cache: Mutex::new(PixelCache::new(cache_config)),
            engine,
        }
    }

    /// The map registry.
    pub fn registry(&self) -> &MapRegistry {
        &self.registry
    }

    /// The tiling engine.
    pub fn engine(&self) -> &TilingEngine {
        &self.engine
    }

    /// Registers a map. See [`MapRegistry::register`].
    pub fn register(
        &mut self,
        map: Map,
        provider_name: &str,
        metadata: &Metadata,
        base_path: Option<&Path>,
    ) -> Result<MapId, KarttaError> {
        self.registry
            .register(map, provider_name, metadata, base_path)
    }

    /// Registers a map from a catalog record.
    pub fn register_record(
        &mut self,
        record: &MapRecord,
        base_path: Option<&Path>,
    ) -> Result<MapId, KarttaError> {
        self.registry.register_record(record, base_path)
    }

    /// Registers all records of a catalog.
    ///
    /// Records of maps that are already registered are skipped. Returns the ids of the maps
    /// registered and the errors of the records that failed.
    pub fn load_records<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a MapRecord>,
        base_path: Option<&Path>,
    ) -> (Vec<MapId>, Vec<KarttaError>) {
        let mut ids = Vec::new();
        let mut errors = Vec::new();
        for record in records {
            match self.registry.register_record(record, base_path) {
                Ok(id) => ids.push(id),
                Err(KarttaError::AlreadyExists(source)) => {
                    log::debug!("Skipping already registered map {source}");
                }
                Err(err) => {
                    log::warn!("Failed to register {} map: {err}", record.provider);
                    errors.push(err);
                }
            }
        }

        (ids, errors)
    }

    /// Catalog records of all maps. See [`MapRegistry::records`].
    pub fn records(&self, base_path: Option<&Path>) -> Vec<MapRecord> {
        self.registry.records(base_path)
    }

    /// Reference map and viewport for showing `coord` on a screen of the given size.
    ///
    /// The reference map is the coarsest one containing the coordinate, the scale is its mean
    /// pixel scale. Returns `None` if no map contains the coordinate.
    pub fn initial_view(&self, coord: &GeoCoord, size: Size<u32>) -> Option<(MapId, Viewport)> {
        let map = self.registry.reference_map_for(coord)?;
        let viewport = Viewport::new(map.project(coord), map.scale().mean(), size);
        Some((map.id(), viewport))
    }

    /// Covers the viewport with maps. See [`TilingEngine::layout`].
    pub fn layout(
        &self,
        reference: MapId,
        viewport: &Viewport,
    ) -> Result<Vec<TileNode>, KarttaError> {
        self.engine.layout(&self.registry, reference, viewport)
    }

    /// Pixels of a map, from the cache if possible.
    ///
    /// The returned buffer contains `rect` but may be larger, up to the whole map: when the whole
    /// map fits into the cache it is decoded at once. Use [`PixelBuf::extract`] or
    /// [`PixelBuf::pixel`] to read the requested part. A depth of 0 in `rect` means 24 bits.
    ///
    /// The cache is not locked while the provider decodes.
    pub fn get_map_pixels(
        &self,
        id: MapId,
        rect: &PixelRect,
    ) -> Result<Arc<PixelBuf>, KarttaError> {
        let rect = if rect.bpp == 0 {
            rect.with_bpp(DEFAULT_BPP)
        } else {
            *rect
        };
        if let Some(pixels) = self.cache.lock().get(id, &rect) {
            return Ok(pixels);
        }

        let map = self.registry.get(id).ok_or(KarttaError::NotFound)?;
        if !rect.fits_within(map.width(), map.height()) {
            return Err(KarttaError::DecodeFailure(ProviderError::OutOfBounds {
                rect,
                width: map.width(),
                height: map.height(),
            }));
        }

        let whole = PixelRect::whole(map.width(), map.height()).with_bpp(rect.bpp);
        let max_size = self.cache.lock().max_size();
        let request = if PixelCache::entry_size(&whole) <= max_size {
            whole
        } else {
            rect
        };
        log::debug!("Decoding {request:?} of map {id:?}");
        let pixels = Arc::new(self.registry.get_pixels(id, &request)?);

        if !self.cache.lock().add(id, pixels.clone()) {
            log::warn!(
                "Decoded block of {} bytes does not fit into the pixel cache",
                PixelCache::entry_size(pixels.rect())
            );
        }

        Ok(pixels)
    }

    /// Empties the pixel cache.
    pub fn purge_cache(&self) {
        self.cache.lock().purge();
    }

    /// Changes the pixel cache budget, evicting blocks that no longer fit.
    pub fn set_cache_size(&self, max_size: usize) {
        self.cache.lock().set_max_size(max_size);
    }

    /// Bytes currently held by the pixel cache.
    pub fn cached_bytes(&self) -> usize {
        self.cache.lock().current_size()
    }
}

impl std::fmt::Debug for Atlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Atlas")
            .field("registry", &self.registry)
            .field("cache", &*self.cache.lock())
            .field("engine", &self.engine)
            .finish()
    }
}

/// Convenience type to assemble an [`Atlas`].
#[derive(Debug, Default)]
pub struct AtlasBuilder {
    providers: ProviderTable,
    datums: Option<DatumTable>,
    registry_config: RegistryConfig,
    cache_config: PixelCacheConfig,
    tiling_config: TilingConfig,
}

impl AtlasBuilder {
    /// Adds a provider to the built-in ones.
    pub fn with_provider(mut self, provider: impl MapProvider + 'static) -> Self {
        self.providers = self.providers.with_provider(provider);
        self
    }

    /// Replaces the provider table.
    pub fn with_providers(mut self, providers: ProviderTable) -> Self {
        self.providers = providers;
        self
    }

    /// Sets the datum table. Defaults to [`DatumTable::standard`].
    pub fn with_datums(mut self, datums: DatumTable) -> Self {
        self.datums = Some(datums);
        self
    }

    /// Sets the registry configuration.
    pub fn with_registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Sets the pixel cache configuration.
    pub fn with_cache_config(mut self, config: PixelCacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Sets the tiling configuration.
    pub fn with_tiling_config(mut self, config: TilingConfig) -> Self {
        self.tiling_config = config;
        self
    }

    /// Creates the atlas, initializing the providers.
    pub fn build(self) -> Atlas {
        let registry = MapRegistry::new(
            self.providers,
            self.datums.unwrap_or_default(),
            self.registry_config,
        );
        Atlas::new(
            registry,
            self.cache_config,
            TilingEngine::new(self.tiling_config),
        )
    }
}
