//! Error types used by the crate.

use kartta_types::error::KarttaTypesError;
use thiserror::Error;

use crate::pixel::PixelRect;

/// Error returned by a [`MapProvider`](crate::provider::MapProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Metadata record is missing a key or has a value the provider cannot use.
    #[error("bad map metadata: {0}")]
    BadMetadata(String),
    /// The backing source of the map is already registered.
    #[error("map source is already registered: {0}")]
    DuplicateSource(String),
    /// Requested pixels are not inside the map image.
    #[error("pixel rectangle {rect:?} is outside of the {width}x{height} map")]
    OutOfBounds {
        /// Requested rectangle.
        rect: PixelRect,
        /// Map width.
        width: u32,
        /// Map height.
        height: u32,
    },
    /// The provider cannot produce pixels of this depth.
    #[error("unsupported pixel depth: {0} bits")]
    UnsupportedDepth(u8),
    /// Pixel buffer size does not match its rectangle.
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    InvalidBuffer {
        /// Size implied by the rectangle.
        expected: usize,
        /// Actual size.
        actual: usize,
    },
    /// Error reading the map source.
    #[error("failed to read map source")]
    Io(#[from] std::io::Error),
    /// Image decoding error.
    #[cfg(feature = "image")]
    #[error("image decode error: {0:?}")]
    ImageDecode(#[from] image::ImageError),
}

/// Kartta error type.
#[derive(Debug, Error)]
pub enum KarttaError {
    /// Pixel scale of the map is degenerate.
    #[error("invalid map scale: {scale_x} x {scale_y} units per pixel")]
    InvalidScale {
        /// Horizontal scale.
        scale_x: f64,
        /// Vertical scale.
        scale_y: f64,
    },
    /// The map is already registered.
    #[error("map already exists: {0}")]
    AlreadyExists(String),
    /// No provider with this name.
    #[error("unknown map provider: {0}")]
    UnknownProvider(String),
    /// Map id does not belong to the registry.
    #[error("map not found")]
    NotFound,
    /// The provider refused to register the map.
    #[error("map provider error")]
    Provider(#[source] ProviderError),
    /// The provider failed to decode pixels.
    #[error("failed to decode map pixels")]
    DecodeFailure(#[source] ProviderError),
    /// Invalid coordinate system definition.
    #[error("invalid coordinate system")]
    Crs(#[from] KarttaTypesError),
}

impl From<ProviderError> for KarttaError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::DuplicateSource(source) => Self::AlreadyExists(source),
            other => Self::Provider(other),
        }
    }
}
