//! Server shared state
//!
//! Holds configuration, the spot list and shared clients for the HTTP server.

use crate::api::BackendClient;
use crate::config::Config;
use crate::error::Result;
use crate::geo::ip_location::IpLocator;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::NetworkResolver;
use crate::map::osm::OsmMapProvider;
use crate::spot::Spot;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::info;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// Last spot list fetched from the backend
    spots: RwLock<Vec<Spot>>,

    /// Spot backend, absent when the server only serves a fixed list
    backend: Option<BackendClient>,

    /// Device location and address lookup
    resolver: NetworkResolver,

    geocoder: NominatimBackend,

    started: Instant,
}

impl AppState {
    /// Create application state talking to the configured backend
    pub fn new(config: Config) -> Result<Self> {
        let backend = BackendClient::new(&config.backend.url, config.backend.timeout_secs)?;
        let geocoder = NominatimBackend::new()?;
        let resolver = NetworkResolver::new(IpLocator::new(), geocoder.clone());

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            spots: RwLock::new(Vec::new()),
            backend: Some(backend),
            resolver,
            geocoder,
            started: Instant::now(),
        })
    }

    /// Create state over a fixed spot list with no backend
    ///
    /// Geocoding and IP lookups go to `geo_url`, which lets tests point
    /// them at a server that is not there.
    pub fn with_spots(config: Config, spots: Vec<Spot>, geo_url: &str) -> Result<Self> {
        let geocoder = NominatimBackend::with_base_url(geo_url)?;
        let locator = IpLocator::without_cache().with_url(&format!("{}/json", geo_url));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            spots: RwLock::new(spots),
            backend: None,
            resolver: NetworkResolver::new(locator, geocoder.clone()),
            geocoder,
            started: Instant::now(),
        })
    }

    /// Snapshot of the current spot list
    pub async fn spots(&self) -> Vec<Spot> {
        self.spots.read().await.clone()
    }

    /// Refetch spots (with latest reports) from the backend
    ///
    /// Returns the new spot count. Without a backend the list is kept.
    pub async fn refresh_spots(&self) -> Result<usize> {
        let Some(backend) = &self.backend else {
            return Ok(self.spots.read().await.len());
        };

        let fresh = backend.fetch_spots_with_reports().await?;
        let count = fresh.len();
        *self.spots.write().await = fresh;
        info!("Spot list refreshed ({} spots)", count);
        Ok(count)
    }

    pub fn backend(&self) -> Option<&BackendClient> {
        self.backend.as_ref()
    }

    pub fn resolver(&self) -> &NetworkResolver {
        &self.resolver
    }

    /// A map provider with an empty marker layer
    pub fn map_provider(&self) -> OsmMapProvider {
        OsmMapProvider::new(self.geocoder.clone())
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
