//! Centralized constants for the vagas-plus crate
//!
//! Values shared by more than one module live here.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Users further than this from a spot cannot report its status
    pub const REPORT_MAX_DISTANCE_METERS: f64 = 500.0;
}

/// Proximity search radii
pub mod search {
    /// List inclusion radius around the reference point
    pub const SEARCH_RADIUS_KM: f64 = 3.0;

    /// Marker emphasis radius around the reference point
    pub const NEARBY_RADIUS_KM: f64 = 0.5;
}

/// External API endpoints
pub mod api {
    /// Spot backend used when nothing is configured
    pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}

/// Violation report limits
pub mod report {
    /// Maximum number of media attachments per violation report
    pub const MAX_MEDIA: usize = 3;
}
