//! Error types for vagas-plus

use crate::geo::{GeocodeError, GeolocationError};
use thiserror::Error;

/// Main error type for vagas-plus operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid availability: {0}")]
    InvalidAvailability(String),

    #[error("Invalid spot: {0}")]
    InvalidSpot(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geolocation failed: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("Geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),
}

/// Result type alias for vagas-plus operations
pub type Result<T> = std::result::Result<T, Error>;
