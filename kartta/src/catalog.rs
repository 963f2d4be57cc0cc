//! Records through which map catalogs are saved and loaded.
//!
//! The on-disk format of a catalog is up to the application. A record carries everything
//! needed to register a map again: its footprint, the name of its provider and the provider's
//! metadata.

use kartta_types::geo::{GeoArea, GeoCoord};
use serde::{Deserialize, Serialize};

use crate::provider::Metadata;

/// One map of a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    /// South-west corner of the footprint.
    pub bottom_left: GeoCoord,
    /// North-east corner of the footprint.
    pub top_right: GeoCoord,
    /// Name of the provider.
    pub provider: String,
    /// Provider specific metadata.
    pub metadata: Metadata,
}

impl MapRecord {
    /// Creates a new record.
    pub fn new(area: GeoArea, provider: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            bottom_left: area.start(),
            top_right: area.end(),
            provider: provider.into(),
            metadata,
        }
    }

    /// Footprint of the map.
    pub fn area(&self) -> GeoArea {
        GeoArea::new(self.bottom_left, self.top_right)
    }
}
