//! Errors for SnoopR
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnooprError {
    #[error("Malformed attribute blob: {0}")]
    BlobEncodingError(#[from] std::str::Utf8Error),

    #[error("Malformed attribute structure: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Attribute blob is not a JSON object")]
    BlobNotObject,

    #[error("Attribute blob is missing")]
    MissingBlob,

    #[error("Configuration error")]
    ConfigError(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("Invalid coordinates: lat={lat:?}, lon={lon:?}")]
    InvalidCoordinates { lat: Option<f64>, lon: Option<f64> },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("No .kismet capture found in {0}")]
    CaptureNotFound(PathBuf),

    #[error("Capture file does not exist: {0}")]
    CaptureMissing(PathBuf),

    #[error("No usable device or alert records in capture")]
    NoUsableInput,

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),
}
