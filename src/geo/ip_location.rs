//! IP-based geolocation
//!
//! A CLI or server has no device GPS, so ip-api.com stands in for it.
//! The last position is kept on disk and reused while it is fresh.

use crate::constants::api::IP_API_URL;
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::geo::{GeoLocation, GeolocationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// ip-api.com response
///
/// On failure only `status` and `message` are present.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

impl IpApiResponse {
    fn into_location(self) -> Option<GeoLocation> {
        if self.status != "success" {
            warn!(
                "IP location lookup refused: {}",
                self.message.as_deref().unwrap_or("no reason given")
            );
            return None;
        }

        let (lat, lng) = (self.lat?, self.lon?);
        let place: Vec<String> = [self.city, self.region_name, self.country]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();

        Some(GeoLocation {
            lat,
            lng,
            display_name: if place.is_empty() {
                format!("{:.4}, {:.4}", lat, lng)
            } else {
                place.join(", ")
            },
        })
    }
}

/// Position written to the cache file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedPosition {
    position: GeoLocation,
    fetched_at: DateTime<Utc>,
}

impl CachedPosition {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age >= chrono::Duration::zero() && age.num_seconds() < IP_LOCATION_TTL_SECS as i64
    }
}

/// Approximate device position from the public IP address
#[derive(Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
    cache_path: Option<PathBuf>,
}

impl IpLocator {
    /// Locator caching under the user cache directory
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir().map(|dir| {
            dir.join(crate::config::defaults::APP_DIR_NAME)
                .join(IP_LOCATION_CACHE_FILE)
        });

        Self {
            client: reqwest::Client::new(),
            url: IP_API_URL.to_string(),
            cache_path,
        }
    }

    /// Locator caching at `cache_path`
    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self {
            cache_path: Some(cache_path),
            ..Self::new()
        }
    }

    /// Locator that always asks the service
    pub fn without_cache() -> Self {
        Self {
            cache_path: None,
            ..Self::new()
        }
    }

    /// Point the locator at another ip-api compatible endpoint
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    /// Current approximate position
    ///
    /// Any network or service failure is `PositionUnavailable`; the
    /// details go to the log.
    pub async fn locate(&self) -> Result<GeoLocation, GeolocationError> {
        if let Some(cached) = self.read_cache() {
            debug!("Using cached IP location: {}", cached.display_name);
            return Ok(cached);
        }

        let location = self
            .fetch()
            .await
            .ok_or(GeolocationError::PositionUnavailable)?;
        self.write_cache(&location);
        Ok(location)
    }

    async fn fetch(&self) -> Option<GeoLocation> {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("IP location request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("IP location API returned status: {}", response.status());
            return None;
        }

        match response.json::<IpApiResponse>().await {
            Ok(data) => data.into_location(),
            Err(e) => {
                warn!("Unreadable IP location response: {}", e);
                None
            }
        }
    }

    fn read_cache(&self) -> Option<GeoLocation> {
        let content = fs::read_to_string(self.cache_path.as_ref()?).ok()?;
        let cached: CachedPosition = serde_json::from_str(&content).ok()?;
        cached.is_fresh(Utc::now()).then_some(cached.position)
    }

    /// Best effort; a cache that cannot be written is skipped
    fn write_cache(&self, location: &GeoLocation) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };
        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let cached = CachedPosition {
            position: location.clone(),
            fetched_at: Utc::now(),
        };
        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            if let Err(e) = fs::write(cache_path, content) {
                debug!("Could not write IP location cache: {}", e);
            }
        }
    }

    /// Forget the cached position
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}
