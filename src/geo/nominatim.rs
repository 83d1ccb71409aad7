//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for address search.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::constants::api::NOMINATIM_URL;
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, GeoLocation, GeocodeError};
use serde::Deserialize;
use tracing::debug;

const USER_AGENT: &str = concat!("vagas-plus/", env!("CARGO_PKG_VERSION"));

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimBackend {
    /// Create a backend pointing at the public Nominatim instance
    pub fn new() -> Result<Self> {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Create a backend pointing at another Nominatim-compatible server
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let lat: f64 = lat.parse().map_err(|_| {
            GeocodeError::GeocodingError(format!("Invalid latitude: {}", lat))
        })?;
        let lng: f64 = lng.parse().map_err(|_| {
            GeocodeError::GeocodingError(format!("Invalid longitude: {}", lng))
        })?;
        Ok((lat, lng))
    }

    async fn get(&self, url: &str) -> Result<Option<reqwest::Response>> {
        debug!(url, "Nominatim request");

        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::Backend {
                status: response.status().as_u16(),
                message: "Nominatim request failed".to_string(),
            });
        }
        Ok(Some(response))
    }
}

impl GeoBackend for NominatimBackend {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let Some(response) = self.get(&url).await? else {
            return Ok(None);
        };
        let results: Vec<NominatimResult> = response.json().await?;

        match results.into_iter().next() {
            Some(result) => {
                let (lat, lng) = Self::parse_coords(&result.lat, &result.lon)?;
                Ok(Some(GeoLocation {
                    lat,
                    lng,
                    display_name: result.display_name,
                }))
            }
            None => Ok(None),
        }
    }

    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Option<GeoLocation>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json",
            self.base_url, lat, lng
        );

        let Some(response) = self.get(&url).await? else {
            return Ok(None);
        };
        let result: NominatimResult = response.json().await?;

        let (parsed_lat, parsed_lng) = Self::parse_coords(&result.lat, &result.lon)?;
        Ok(Some(GeoLocation {
            lat: parsed_lat,
            lng: parsed_lng,
            display_name: result.display_name,
        }))
    }
}
