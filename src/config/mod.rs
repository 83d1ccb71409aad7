//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/vagas-plus/config.toml

pub mod defaults;

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::FallbackPolicy;
use crate::navigation::NavApp;
use crate::proximity::SearchRadii;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Spot backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Proximity search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Location settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Navigation settings
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Output defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Spot backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the spot backend
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

/// Proximity search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Spots within this distance of the reference are listed
    #[serde(default = "default_search_radius")]
    pub search_radius_km: f64,

    /// Spots within this distance of the reference are emphasized
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius_km: f64,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Location settings
///
/// When geolocation fails the reference point stays empty unless both
/// fallback coordinates are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_lat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_lng: Option<f64>,
}

/// Navigation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// App opened by `navigate` when none is given
    #[serde(default = "default_nav_app")]
    pub default_app: String,
}

/// Output defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

// Default value functions for serde
fn default_backend_url() -> String {
    DEFAULT_BACKEND.to_string()
}
fn default_backend_timeout() -> u64 {
    DEFAULT_BACKEND_TIMEOUT_SECS
}
fn default_search_radius() -> f64 {
    DEFAULT_SEARCH_RADIUS_KM
}
fn default_nearby_radius() -> f64 {
    DEFAULT_NEARBY_RADIUS_KM
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_nav_app() -> String {
    DEFAULT_NAV_APP.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_radius_km: default_search_radius(),
            nearby_radius_km: default_nearby_radius(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_app: default_nav_app(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

fn parse_radius(key: &str, value: &str) -> Result<f64> {
    check_radius(key, parse(key, value)?)
}

fn check_radius(key: &str, radius: f64) -> Result<f64> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(Error::Config(format!(
            "{} must be a non-negative number, got {}",
            key, radius
        )));
    }
    Ok(radius)
}

fn parse_optional(key: &str, value: &str) -> Result<Option<f64>> {
    if value.is_empty() || value == "none" {
        Ok(None)
    } else {
        parse(key, value).map(Some)
    }
}

/// Range-check whichever fallback coordinates are set
fn check_fallback(lat: Option<f64>, lng: Option<f64>) -> Result<()> {
    Coordinates::new(lat.unwrap_or(0.0), lng.unwrap_or(0.0)).validate()
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            let config: Config = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["backend", "url"] => Some(self.backend.url.clone()),
            ["backend", "timeout_secs"] => Some(self.backend.timeout_secs.to_string()),

            ["search", "search_radius_km"] => Some(self.search.search_radius_km.to_string()),
            ["search", "nearby_radius_km"] => Some(self.search.nearby_radius_km.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["location", "fallback_lat"] => {
                Some(self.location.fallback_lat.map(|v| v.to_string()).unwrap_or_default())
            }
            ["location", "fallback_lng"] => {
                Some(self.location.fallback_lng.map(|v| v.to_string()).unwrap_or_default())
            }

            ["navigation", "default_app"] => Some(self.navigation.default_app.clone()),

            ["defaults", "format"] => Some(self.defaults.format.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["backend", "url"] => self.backend.url = value.to_string(),
            ["backend", "timeout_secs"] => self.backend.timeout_secs = parse(key, value)?,

            ["search", "search_radius_km"] => {
                self.search.search_radius_km = parse_radius(key, value)?
            }
            ["search", "nearby_radius_km"] => {
                self.search.nearby_radius_km = parse_radius(key, value)?
            }

            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "port"] => self.server.port = parse(key, value)?,

            ["location", "fallback_lat"] => {
                let lat = parse_optional(key, value)?;
                check_fallback(lat, None)?;
                self.location.fallback_lat = lat;
            }
            ["location", "fallback_lng"] => {
                let lng = parse_optional(key, value)?;
                check_fallback(None, lng)?;
                self.location.fallback_lng = lng;
            }

            ["navigation", "default_app"] => {
                value.parse::<NavApp>().map_err(Error::Config)?;
                self.navigation.default_app = value.to_string();
            }

            ["defaults", "format"] => self.defaults.format = value.to_string(),

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// Check values a hand-edited file could get wrong
    pub fn validate(&self) -> Result<()> {
        check_radius("search.search_radius_km", self.search.search_radius_km)?;
        check_radius("search.nearby_radius_km", self.search.nearby_radius_km)?;
        check_fallback(self.location.fallback_lat, self.location.fallback_lng)
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "backend.url",
            "backend.timeout_secs",
            "search.search_radius_km",
            "search.nearby_radius_km",
            "server.host",
            "server.port",
            "location.fallback_lat",
            "location.fallback_lng",
            "navigation.default_app",
            "defaults.format",
        ]
    }

    /// Radii for the proximity filter
    pub fn radii(&self) -> SearchRadii {
        SearchRadii {
            search_km: self.search.search_radius_km,
            near_km: self.search.nearby_radius_km,
        }
    }

    /// What to do when geolocation fails
    pub fn fallback_policy(&self) -> FallbackPolicy {
        match Coordinates::from_pair(self.location.fallback_lat, self.location.fallback_lng) {
            Some(location) if location.validate().is_ok() => {
                FallbackPolicy::use_location(location)
            }
            _ => FallbackPolicy::none(),
        }
    }

    /// Configured navigation app, or the default when the value is unknown
    pub fn nav_app(&self) -> NavApp {
        self.navigation.default_app.parse().unwrap_or_default()
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.backend.url, "http://localhost:8000");
        assert_eq!(config.search.search_radius_km, 3.0);
        assert_eq!(config.search.nearby_radius_km, 0.5);
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.fallback_policy(), FallbackPolicy::none());
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        config.set("backend.url", "https://api.vagas.example").unwrap();
        assert_eq!(
            config.get("backend.url"),
            Some("https://api.vagas.example".to_string())
        );

        config.set("search.search_radius_km", "5").unwrap();
        assert_eq!(config.radii().search_km, 5.0);
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("search.search_radius_km", "far").is_err());
        assert!(config.set("search.nearby_radius_km", "-1").is_err());
        assert!(config.set("navigation.default_app", "bing").is_err());
    }

    #[test]
    fn test_fallback_requires_both_coordinates() {
        let mut config = Config::default();
        config.set("location.fallback_lat", "-22.9068").unwrap();
        assert_eq!(config.fallback_policy(), FallbackPolicy::none());

        config.set("location.fallback_lng", "-43.1729").unwrap();
        assert_eq!(
            config.fallback_policy().default_location,
            Some(Coordinates::new(-22.9068, -43.1729))
        );

        config.set("location.fallback_lng", "none").unwrap();
        assert_eq!(config.fallback_policy(), FallbackPolicy::none());
    }

    #[test]
    fn test_fallback_out_of_range_rejected() {
        let mut config = Config::default();
        assert!(config.set("location.fallback_lat", "200").is_err());
        assert!(config.set("location.fallback_lng", "-181").is_err());
        assert_eq!(config.location.fallback_lat, None);

        // Values that bypassed `set` are not handed out
        config.location.fallback_lat = Some(200.0);
        config.location.fallback_lng = Some(0.0);
        assert_eq!(config.fallback_policy(), FallbackPolicy::none());
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let temp_dir = TempDir::new().unwrap();

        let radius = temp_dir.path().join("radius.toml");
        fs::write(&radius, "[search]\nnearby_radius_km = -0.5\n").unwrap();
        assert!(matches!(Config::load_from(&radius), Err(Error::Config(_))));

        let fallback = temp_dir.path().join("fallback.toml");
        fs::write(&fallback, "[location]\nfallback_lat = 95.0\nfallback_lng = 10.0\n").unwrap();
        assert!(matches!(
            Config::load_from(&fallback),
            Err(Error::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vagas-plus").join("config.toml");

        let mut config = Config::default();
        config.backend.url = "http://backend:9000".to_string();
        config.search.nearby_radius_km = 0.25;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.backend.url, "http://backend:9000");
        assert_eq!(loaded.search.nearby_radius_km, 0.25);
    }

    #[test]
    fn test_load_creates_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 7878);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[search]\nsearch_radius_km = 10.0\n").unwrap();
        assert_eq!(loaded.search.search_radius_km, 10.0);
        assert_eq!(loaded.search.nearby_radius_km, 0.5);
        assert_eq!(loaded.backend.url, "http://localhost:8000");
    }

    #[test]
    fn test_serialization_format() {
        let toml = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml.contains("[backend]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("[server]"));
    }

    #[test]
    fn test_nav_app() {
        let mut config = Config::default();
        assert_eq!(config.nav_app(), NavApp::GoogleMaps);

        config.set("navigation.default_app", "waze").unwrap();
        assert_eq!(config.nav_app(), NavApp::Waze);
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(Config::default().server_addr(), "127.0.0.1:7878");
    }

    #[test]
    fn test_available_keys() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "{} not readable", key);
        }
    }
}
