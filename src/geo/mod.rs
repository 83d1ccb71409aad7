//! Location resolution
//!
//! Provides geocoding (address to coordinates), IP geolocation standing in
//! for device location, and the `LocationResolver` seam the rest of the
//! crate consumes.

pub mod generation;
pub mod ip_location;
pub mod nominatim;
pub mod resolver;

use crate::coord::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use generation::{RequestGeneration, RequestTicket};
pub use resolver::{
    resolve_address, resolve_device, FallbackPolicy, LocationResolver, NetworkResolver,
    Resolution, ResolverFailure,
};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Why the current position could not be determined
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out")]
    Timeout,
}

/// Why an address could not be turned into coordinates
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeError {
    #[error("address not found")]
    AddressNotFound,
    #[error("geocoding error: {0}")]
    GeocodingError(String),
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Geocode a location string to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    fn geocode(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Option<GeoLocation>>> + Send;

    /// Reverse geocode coordinates to a location name
    fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> impl std::future::Future<Output = Result<Option<GeoLocation>>> + Send;
}
