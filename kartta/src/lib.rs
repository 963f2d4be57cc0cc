//! Kartta keeps a collection of georeferenced raster maps and lays them out on a screen.
//!
//! Maps may come in different projections, datums, resolutions and storage formats. Given a
//! viewport, Kartta picks the best available map for every part of the screen and hands out
//! decoded pixels through a memory bounded cache.
//!
//! # Main components
//!
//! * [`MapRegistry`] owns the registered [`Map`]s and answers spatial queries over them.
//! * [`MapProvider`](provider::MapProvider)s decode the pixels of the maps they own. The crate
//!   comes with a [`RasterProvider`](provider::RasterProvider) for ordinary image files.
//! * [`TilingEngine`] splits a [`Viewport`] into [`TileNode`]s, each showing one map or nothing.
//! * [`PixelCache`] keeps recently decoded pixel blocks within a byte budget.
//! * [`Atlas`] puts all of the above together and is usually the only type an application needs.
//!
//! Coordinates, areas, datums and projections live in the [`kartta_types`] crate, which is
//! re-exported.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod atlas;
pub mod catalog;
pub mod error;
pub mod layout;
mod map;
pub mod pixel;
pub mod pixel_cache;
pub mod provider;
mod registry;

#[cfg(any(test, feature = "_tests"))]
#[doc(hidden)]
pub mod tests;

pub use atlas::{Atlas, AtlasBuilder};
pub use catalog::MapRecord;
pub use error::{KarttaError, ProviderError};
pub use layout::{TileNode, TileSource, TilingConfig, TilingEngine, Viewport};
pub use map::{Map, MapId, Scale};
pub use pixel::{PixelBuf, PixelRect};
pub use pixel_cache::{PixelCache, PixelCacheConfig};
pub use registry::{MapRegistry, RegistryConfig};

// Reexport kartta_types
pub use kartta_types;
