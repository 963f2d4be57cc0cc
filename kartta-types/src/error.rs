//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum KarttaTypesError {
    /// Projection family is not known.
    #[error("unknown projection: {0}")]
    UnknownProjection(String),
    /// Projection is known, but cannot be constructed in this build or with these parameters.
    #[error("unsupported projection definition: {0}")]
    UnsupportedProjection(String),
    /// A projection parameter could not be parsed.
    #[error("invalid value for projection parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Value as given.
        value: String,
    },
}
