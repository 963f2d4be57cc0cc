use std::str::FromStr;

use kartta_types::geo::Crs;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Ordered list of key/value pairs describing a map to its provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a key that must be present.
    pub fn require(&self, key: &str) -> Result<&str, ProviderError> {
        self.get(key)
            .ok_or_else(|| ProviderError::BadMetadata(format!("missing key '{key}'")))
    }

    /// Parses the value of a key, if present.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ProviderError> {
        self.get(key)
            .map(|value| {
                value.trim().parse().map_err(|_| {
                    ProviderError::BadMetadata(format!("invalid value '{value}' for '{key}'"))
                })
            })
            .transpose()
    }

    /// Describes a coordinate system with the keys [`RegistrationContext::crs`] reads.
    ///
    /// [`RegistrationContext::crs`]: super::RegistrationContext::crs
    pub fn insert_crs(&mut self, crs: &Crs) {
        if !crs.datum().is_wgs84() {
            self.insert("datum", crs.datum().name());
        }
        let projection = crs.projection_type();
        self.insert("projection", projection.name());
        for (key, value) in projection.parameters() {
            self.insert(key, value);
        }
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut metadata = Self::new();
        for (key, value) in iter {
            metadata.insert(key, value);
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn insert_replaces() {
        let metadata = Metadata::new()
            .with("filename", "a.png")
            .with("datum", "WGS 84")
            .with("filename", "b.png");
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("filename"), Some("b.png"));
        assert_eq!(
            metadata.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            ["filename", "datum"]
        );
    }

    #[test]
    fn parse_values() {
        let metadata = Metadata::from_iter([("width", "640"), ("height", "tall")]);
        assert_eq!(metadata.parse::<u32>("width").expect("valid"), Some(640));
        assert_eq!(metadata.parse::<u32>("depth").expect("valid"), None);
        assert_matches!(
            metadata.parse::<u32>("height"),
            Err(ProviderError::BadMetadata(_))
        );
        assert_matches!(metadata.require("depth"), Err(ProviderError::BadMetadata(_)));
    }
}
