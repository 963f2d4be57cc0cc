//! Set of registered maps and spatial queries over it.

use std::path::Path;

use kartta_types::cartesian::ProjectedArea;
use kartta_types::geo::{DatumTable, GeoArea, GeoCoord};

use crate::catalog::MapRecord;
use crate::error::KarttaError;
use crate::map::{Map, MapId};
use crate::pixel::{PixelBuf, PixelRect};
use crate::provider::{MapProvider, Metadata, ProviderTable, RegistrationContext};

/// Configuration of a [`MapRegistry`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RegistryConfig {
    max_scale_mismatch: Option<f64>,
}

/// Relative difference between the axis scales above which a warning is logged.
const SCALE_MISMATCH_WARNING: f64 = 0.01;

impl RegistryConfig {
    /// Largest allowed relative difference between vertical and horizontal pixel scale.
    ///
    /// `None` (the default) accepts any difference and only logs suspicious maps.
    pub fn max_scale_mismatch(&self) -> Option<f64> {
        self.max_scale_mismatch
    }

    /// Sets the largest allowed relative difference between vertical and horizontal pixel scale.
    pub fn with_max_scale_mismatch(mut self, mismatch: Option<f64>) -> Self {
        self.max_scale_mismatch = mismatch;
        self
    }

    /// Sets the largest allowed relative difference between vertical and horizontal pixel scale.
    pub fn set_max_scale_mismatch(&mut self, mismatch: Option<f64>) {
        self.max_scale_mismatch = mismatch;
    }
}

/// Owner of all registered maps and of the providers that decode them.
///
/// Queries return maps most recently registered first.
pub struct MapRegistry {
    maps: Vec<Map>,
    providers: ProviderTable,
    datums: DatumTable,
    config: RegistryConfig,
    next_id: u64,
}

impl MapRegistry {
    /// Creates an empty registry, initializing the providers.
    ///
    /// Providers that fail to initialize are left out.
    pub fn new(mut providers: ProviderTable, datums: DatumTable, config: RegistryConfig) -> Self {
        providers.init_all();
        Self {
            maps: Vec::new(),
            providers,
            datums,
            config,
            next_id: 0,
        }
    }

    /// Known datums.
    pub fn datums(&self) -> &DatumTable {
        &self.datums
    }

    /// Registered providers.
    pub fn providers(&self) -> &ProviderTable {
        &self.providers
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers a map.
    ///
    /// The provider fills in the map from `metadata`, then the projected footprint and the pixel
    /// scale are derived. A map with a degenerate scale is rejected with
    /// [`KarttaError::InvalidScale`] and its provider state is released.
    pub fn register(
        &mut self,
        mut map: Map,
        provider_name: &str,
        metadata: &Metadata,
        base_path: Option<&Path>,
    ) -> Result<MapId, KarttaError> {
        let provider = self
            .providers
            .find(provider_name)
            .ok_or_else(|| KarttaError::UnknownProvider(provider_name.to_string()))?;
        let context = RegistrationContext {
            datums: &self.datums,
            base_path,
        };

        map.provider = provider_name.to_string();
        if let Err(err) = provider.add_map(&mut map, metadata, &context) {
            provider.free_map(&mut map);
            return Err(err.into());
        }

        if let Err(err) = self.check_geometry(&mut map) {
            provider.free_map(&mut map);
            return Err(err);
        }

        let id = MapId(self.next_id);
        self.next_id += 1;
        map.id = id;
        log::info!(
            "Registered {provider_name} map {id:?}: {}x{} px, {:.3} x {:.3} units/px",
            map.width(),
            map.height(),
            map.scale().x,
            map.scale().y
        );
        self.maps.push(map);

        Ok(id)
    }

    /// Registers a map from a catalog record.
    pub fn register_record(
        &mut self,
        record: &MapRecord,
        base_path: Option<&Path>,
    ) -> Result<MapId, KarttaError> {
        self.register(
            Map::new(record.area()),
            &record.provider,
            &record.metadata,
            base_path,
        )
    }

    /// Catalog records of all maps, oldest first, ready to be registered again.
    ///
    /// Maps whose provider cannot describe them are skipped.
    pub fn records(&self, base_path: Option<&Path>) -> Vec<MapRecord> {
        self.maps
            .iter()
            .filter_map(|map| match self.map_info(map, base_path) {
                Ok(metadata) => Some(MapRecord::new(
                    *map.area(),
                    map.provider_name(),
                    metadata,
                )),
                Err(err) => {
                    log::warn!("Skipping map {:?} in catalog: {err}", map.id());
                    None
                }
            })
            .collect()
    }

    fn check_geometry(&self, map: &mut Map) -> Result<(), KarttaError> {
        let scale = map.compute_geometry();
        let invalid = KarttaError::InvalidScale {
            scale_x: scale.x,
            scale_y: scale.y,
        };
        if !scale.is_valid() {
            return Err(invalid);
        }

        let mismatch = (1.0 - scale.y / scale.x).abs();
        match self.config.max_scale_mismatch {
            Some(max) if mismatch > max => return Err(invalid),
            _ if mismatch > SCALE_MISMATCH_WARNING => {
                log::warn!(
                    "Map pixel scales differ by {:.1}%: {} x {}",
                    mismatch * 100.0,
                    scale.x,
                    scale.y
                );
            }
            _ => {}
        }

        Ok(())
    }

    /// Map with the given id.
    pub fn get(&self, id: MapId) -> Option<&Map> {
        // Ids are assigned in increasing order and maps are never removed.
        self.maps
            .binary_search_by_key(&id, |map| map.id())
            .ok()
            .map(|index| &self.maps[index])
    }

    /// Number of registered maps.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Returns true if no maps are registered.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Iterates over maps, most recently registered first.
    pub fn iter(&self) -> impl Iterator<Item = &Map> + '_ {
        self.maps.iter().rev()
    }

    /// All maps satisfying the predicate, most recently registered first.
    pub fn find(&self, predicate: impl Fn(&Map) -> bool) -> Vec<&Map> {
        self.iter().filter(|map| predicate(map)).collect()
    }

    /// Maps whose footprint contains the coordinate.
    pub fn find_for_coord(&self, coord: &GeoCoord) -> Vec<&Map> {
        self.find(|map| map.contains(coord))
    }

    /// Maps whose footprint overlaps the area.
    pub fn find_for_area(&self, area: &GeoArea) -> Vec<&Map> {
        self.find(|map| map.area().overlaps(area))
    }

    /// Maps in a projection compatible with the reference map whose projected footprint overlaps
    /// `area`, given in the reference map's projected space.
    pub fn find_for_marea(&self, reference: &Map, area: &ProjectedArea) -> Vec<&Map> {
        self.find(|map| map.crs().is_compatible(reference.crs()) && map.marea().overlaps(area))
    }

    /// Among the maps containing the coordinate, the one with the coarsest horizontal scale.
    ///
    /// This is the map a view centered at `coord` is usually laid out in.
    pub fn reference_map_for(&self, coord: &GeoCoord) -> Option<&Map> {
        self.find_for_coord(coord)
            .into_iter()
            .fold(None, |best: Option<&Map>, map| match best {
                Some(best) if best.scale().x >= map.scale().x => Some(best),
                _ => Some(map),
            })
    }

    /// Provider responsible for the map.
    pub fn provider_for(&self, map: &Map) -> Result<&dyn MapProvider, KarttaError> {
        self.providers
            .find(map.provider_name())
            .ok_or_else(|| KarttaError::UnknownProvider(map.provider_name().to_string()))
    }

    /// Metadata describing the map, as written to a catalog.
    pub fn get_map_info(
        &self,
        id: MapId,
        base_path: Option<&Path>,
    ) -> Result<Metadata, KarttaError> {
        let map = self.get(id).ok_or(KarttaError::NotFound)?;
        self.map_info(map, base_path)
    }

    fn map_info(&self, map: &Map, base_path: Option<&Path>) -> Result<Metadata, KarttaError> {
        self.provider_for(map)?
            .get_map_info(map, base_path)
            .map_err(KarttaError::Provider)
    }

    /// Decodes pixels of a map directly, bypassing any cache.
    pub fn get_pixels(&self, id: MapId, rect: &PixelRect) -> Result<PixelBuf, KarttaError> {
        let map = self.get(id).ok_or(KarttaError::NotFound)?;
        self.provider_for(map)?
            .get_pixels(map, rect)
            .map_err(KarttaError::DecodeFailure)
    }
}

impl Drop for MapRegistry {
    fn drop(&mut self) {
        for mut map in self.maps.drain(..) {
            if let Some(provider) = self.providers.find(map.provider_name()) {
                provider.free_map(&mut map);
            }
        }
        self.providers.finish_all();
    }
}

impl std::fmt::Debug for MapRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapRegistry")
            .field("maps", &self.maps.len())
            .field("providers", &self.providers)
            .field("config", &self.config)
            .finish()
    }
}
