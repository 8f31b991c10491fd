//! Error types used by the crate.

use thiserror::Error;
use webgis_types::WebGisTypesError;

/// Viewer error type.
#[derive(Debug, Error)]
pub enum WebGisError {
    /// I/O error (network or file).
    #[error("failed to load data")]
    IO,
    /// Server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Http {
        /// Requested url.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// Item not found.
    #[error("item not found")]
    NotFound,
    /// Error decoding data.
    #[error("failed to decode data: {0}")]
    Decoding(String),
    /// JSON parsing error.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// Geometry or CRS conversion error.
    #[error(transparent)]
    Types(#[from] WebGisTypesError),
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Error reading/writing data to the FS.
    #[error("failed to access file: {0}")]
    FsIo(#[from] std::io::Error),
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}

impl From<reqwest::Error> for WebGisError {
    fn from(value: reqwest::Error) -> Self {
        log::debug!("Request error: {value:?}");
        Self::IO
    }
}

impl From<geojson::Error> for WebGisError {
    fn from(value: geojson::Error) -> Self {
        Self::Decoding(value.to_string())
    }
}
