//! Error types for geoview.
//!
//! Engine computations never fail on incomplete data: invalid coordinates
//! and dangling categories are skipped or fall back silently. Errors are
//! reserved for configuration loading and serialization.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoViewError>;

#[derive(Debug, Error)]
pub enum GeoViewError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GeoViewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for GeoViewError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::ser::Error> for GeoViewError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
