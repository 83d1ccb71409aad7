//! Location resolver
//!
//! Turns "where am I" and "where is this address" into an optional
//! reference point. Failures never disappear: they travel next to the
//! reference in a `Resolution`, so callers can show a message and still
//! render a usable state.

use crate::coord::Coordinates;
use crate::error::Error;
use crate::geo::ip_location::IpLocator;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{GeoBackend, GeocodeError, GeolocationError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Default time allowed for one geolocation lookup
pub const DEFAULT_LOCATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of device position and address geocoding
pub trait LocationResolver: Send + Sync {
    /// Current position of the user
    fn locate(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;

    /// Best match for a free-text address
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinates, GeocodeError>> + Send;
}

/// Resolver backed by IP geolocation and Nominatim
#[derive(Debug)]
pub struct NetworkResolver {
    locator: IpLocator,
    geocoder: NominatimBackend,
    timeout: Duration,
}

impl NetworkResolver {
    pub fn new(locator: IpLocator, geocoder: NominatimBackend) -> Self {
        Self {
            locator,
            geocoder,
            timeout: DEFAULT_LOCATE_TIMEOUT,
        }
    }

    /// Resolver using the public services and the default cache
    pub fn with_defaults() -> crate::error::Result<Self> {
        Ok(Self::new(IpLocator::new(), NominatimBackend::new()?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl LocationResolver for NetworkResolver {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        match tokio::time::timeout(self.timeout, self.locator.locate()).await {
            Err(_) => Err(GeolocationError::Timeout),
            Ok(Ok(location)) => {
                info!("Located via IP: {}", location.display_name);
                Ok(location.coords())
            }
            Ok(Err(e)) => Err(e),
        }
    }

    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        match self.geocoder.geocode(address).await {
            Ok(Some(location)) => {
                info!("Geocoded '{}' to {}", address, location.display_name);
                Ok(location.coords())
            }
            Ok(None) => Err(GeocodeError::AddressNotFound),
            Err(Error::Geocode(e)) => Err(e),
            Err(e) => Err(GeocodeError::GeocodingError(e.to_string())),
        }
    }
}

/// A resolver failure, reported to the caller alongside the fallback state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ResolverFailure {
    Geolocation(GeolocationError),
    Geocode(GeocodeError),
}

impl std::fmt::Display for ResolverFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geolocation(e) => write!(f, "could not get your location: {}", e),
            Self::Geocode(e) => write!(f, "could not find address: {}", e),
        }
    }
}

/// Reference point plus any failure encountered while resolving it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub reference: Option<Coordinates>,
    pub failure: Option<ResolverFailure>,
}

impl Resolution {
    pub fn found(reference: Coordinates) -> Self {
        Self {
            reference: Some(reference),
            failure: None,
        }
    }

    pub fn failed(failure: ResolverFailure, fallback: Option<Coordinates>) -> Self {
        Self {
            reference: fallback,
            failure: Some(failure),
        }
    }
}

/// What to use as reference when geolocation fails
///
/// The default is no reference at all. A fixed location is only used when
/// the caller opts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    pub default_location: Option<Coordinates>,
}

impl FallbackPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn use_location(location: Coordinates) -> Self {
        Self {
            default_location: Some(location),
        }
    }
}

/// Resolve the user's position, applying `policy` on failure
pub async fn resolve_device<R: LocationResolver>(
    resolver: &R,
    policy: FallbackPolicy,
) -> Resolution {
    match resolver.locate().await {
        Ok(coords) => Resolution::found(coords),
        Err(e) => {
            warn!("Geolocation failed: {}", e);
            Resolution::failed(ResolverFailure::Geolocation(e), policy.default_location)
        }
    }
}

/// Resolve an address; failure always leaves the reference empty
pub async fn resolve_address<R: LocationResolver>(resolver: &R, address: &str) -> Resolution {
    match resolver.geocode(address).await {
        Ok(coords) => Resolution::found(coords),
        Err(e) => {
            warn!("Geocoding '{}' failed: {}", address, e);
            Resolution::failed(ResolverFailure::Geocode(e), None)
        }
    }
}
