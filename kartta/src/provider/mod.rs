//! Map providers decode the pixels of the maps they own.
//!
//! Every map source format is handled by one [`MapProvider`]. Providers are collected into a
//! [`ProviderTable`] that is handed to the [`MapRegistry`](crate::MapRegistry) when it is created.

use std::path::{Path, PathBuf};

use kartta_types::geo::{Crs, Datum, DatumTable, ProjectionType};

use crate::error::ProviderError;
use crate::map::Map;
use crate::pixel::{PixelBuf, PixelRect};

mod metadata;
#[cfg(feature = "image")]
mod raster;

pub use metadata::Metadata;
#[cfg(feature = "image")]
pub use raster::{PixelFormat, RasterProvider};

/// Everything a provider may need while adding a map besides the map record itself.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationContext<'a> {
    /// Known datums, for resolving datum names in the metadata.
    pub datums: &'a DatumTable,
    /// Directory relative file names are resolved against.
    pub base_path: Option<&'a Path>,
}

impl RegistrationContext<'_> {
    /// Resolves a file name from map metadata.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        match self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Coordinate system described by the `datum` and `projection` keys of map metadata.
    ///
    /// A missing datum means WGS84, a missing projection means Mercator. Projection parameters
    /// are read from their own keys (`lon_0`, `x_0`, ...).
    pub fn crs(&self, metadata: &Metadata) -> Result<Crs, ProviderError> {
        let datum = match metadata.get("datum") {
            Some(name) => *self
                .datums
                .find(name)
                .ok_or_else(|| ProviderError::BadMetadata(format!("unknown datum '{name}'")))?,
            None => Datum::WGS84,
        };
        let projection = ProjectionType::from_definition(
            metadata.get("projection").unwrap_or("merc"),
            |key| metadata.get(key),
        )
        .map_err(|err| ProviderError::BadMetadata(err.to_string()))?;

        Ok(Crs::new(datum, projection))
    }
}

/// Decoder for one kind of map source.
///
/// A single instance of a provider serves all maps of its kind for the lifetime of a registry.
pub trait MapProvider: Send + Sync {
    /// Name the provider is referred to by in map records.
    fn name(&self) -> &str;

    /// Sets up state shared by all maps of the provider. Called once when the registry is
    /// created.
    fn init(&mut self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Releases shared state. Called once when the registry is dropped.
    fn finish(&mut self) {}

    /// Fills in dimensions, coordinate system and decoding state of `map` from `metadata`.
    fn add_map(
        &self,
        map: &mut Map,
        metadata: &Metadata,
        context: &RegistrationContext<'_>,
    ) -> Result<(), ProviderError>;

    /// Metadata that [`MapProvider::add_map`] would accept to recreate `map`.
    fn get_map_info(&self, map: &Map, base_path: Option<&Path>) -> Result<Metadata, ProviderError>;

    /// Decodes exactly `rect` of the map.
    ///
    /// Implementations must return an error rather than partial pixels if `rect` does not fit
    /// into the map. A depth of 0 in `rect` lets the provider choose.
    fn get_pixels(&self, map: &Map, rect: &PixelRect) -> Result<PixelBuf, ProviderError>;

    /// Releases the decoding state of a map that is being removed.
    fn free_map(&self, _map: &mut Map) {}
}

/// Set of providers known to a registry.
pub struct ProviderTable {
    providers: Vec<Box<dyn MapProvider>>,
}

impl ProviderTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Table with the providers built into the crate.
    pub fn standard() -> Self {
        let table = Self::new();
        #[cfg(feature = "image")]
        let table = table.with_provider(RasterProvider::new());
        table
    }

    /// Adds a provider. A provider with the same name replaces the earlier one.
    pub fn with_provider(mut self, provider: impl MapProvider + 'static) -> Self {
        self.providers.retain(|p| p.name() != provider.name());
        self.providers.push(Box::new(provider));
        self
    }

    /// Finds a provider by name.
    pub fn find(&self, name: &str) -> Option<&dyn MapProvider> {
        self.providers
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Names of all providers.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.providers.iter().map(|p| p.name())
    }

    /// Number of providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if the table has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Initializes all providers, dropping the ones that fail.
    pub(crate) fn init_all(&mut self) {
        self.providers.retain_mut(|provider| match provider.init() {
            Ok(()) => true,
            Err(err) => {
                log::error!("Failed to initialize map provider {}: {err}", provider.name());
                false
            }
        });
    }

    pub(crate) fn finish_all(&mut self) {
        for provider in &mut self.providers {
            provider.finish();
        }
    }
}

impl Default for ProviderTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ProviderTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
