//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::Coordinates;
use crate::error::Error;
use crate::format::SearchResponse;
use crate::geo::{resolve_address, resolve_device, GeocodeError, Resolution, ResolverFailure};
use crate::map::{Directions, MapProvider, MarkerPlan, MarkerSpec};
use crate::navigation::{launch_plan, LaunchPlan, NavApp, Platform};
use crate::proximity::filter_spots;
use crate::server::state::AppState;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::warn;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Static front end next to the binary, or in the working directory
    let static_path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
        .unwrap_or_else(|| "static".into());

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/spots", get(spots_handler))
        .route("/api/spots/refresh", post(refresh_handler))
        .route("/api/markers", get(markers_handler))
        .route("/api/geocode", get(geocode_handler))
        .route("/api/location", get(location_handler))
        .route("/api/navigate", get(navigate_handler))
        .fallback_service(ServeDir::new(static_path).append_index_html_on_directories(true))
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "ADDRESS_NOT_FOUND" => StatusCode::NOT_FOUND,
            "BACKEND_ERROR" | "GEOCODING_ERROR" | "RATE_LIMITED" => StatusCode::BAD_GATEWAY,
            "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidReport(_) | Error::InvalidAvailability(_) | Error::InvalidSpot(_) => {
                "INVALID_REQUEST"
            }
            Error::Config(_) => "CONFIG_ERROR",
            Error::Http(_) | Error::Backend { .. } => "BACKEND_ERROR",
            Error::RateLimited(_) => "RATE_LIMITED",
            Error::Geocode(GeocodeError::AddressNotFound) => "ADDRESS_NOT_FOUND",
            Error::Geocode(_) => "GEOCODING_ERROR",
            Error::Geolocation(_) => "LOCATION_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

/// Parse an optional lat/lng pair from query parameters
///
/// Both or neither must be given.
fn coordinates_param(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Coordinates>, ApiError> {
    if lat.is_some() != lng.is_some() {
        return Err(ApiError::new(
            "INVALID_COORDINATES",
            "lat and lng must be given together",
        ));
    }
    match Coordinates::from_pair(lat, lng) {
        Some(coords) => {
            coords.validate()?;
            Ok(Some(coords))
        }
        None => Ok(None),
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Spot backend URL, if one is configured
    pub backend: Option<String>,
    /// Spots currently loaded
    pub spots: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.backend().map(|b| b.base_url().to_string()),
        spots: state.spots().await.len(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Spot search parameters
#[derive(Debug, Default, Deserialize)]
pub struct SpotsQuery {
    /// Free-text filter, ignored when a reference point is given
    #[serde(default)]
    pub q: String,
    /// Reference latitude
    pub lat: Option<f64>,
    /// Reference longitude
    pub lng: Option<f64>,
    /// Order by distance instead of listing order
    #[serde(default)]
    pub nearest: bool,
}

/// Filter the loaded spots
///
/// GET /api/spots?q=&lat=&lng=
async fn spots_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpotsQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let reference = coordinates_param(query.lat, query.lng)?;
    let radii = state.config.read().await.radii();
    let spots = state.spots().await;

    let result = filter_spots(&spots, &query.q, reference, radii);
    let mut response = SearchResponse::new(&query.q, reference, radii, result);
    if query.nearest {
        response.sort_nearest();
    }

    Ok(Json(response))
}

/// Refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub count: usize,
}

/// Refetch spots from the backend
///
/// POST /api/spots/refresh
async fn refresh_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let count = state.refresh_spots().await.map_err(|e| {
        warn!("Spot refresh failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(RefreshResponse { count }))
}

/// Marker parameters
#[derive(Debug, Default, Deserialize)]
pub struct MarkersQuery {
    #[serde(default)]
    pub q: String,
    /// Searched reference point
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Device position
    pub user_lat: Option<f64>,
    pub user_lng: Option<f64>,
}

/// Markers response
#[derive(Debug, Serialize, Deserialize)]
pub struct MarkersResponse {
    pub markers: Vec<MarkerSpec>,
    /// Number of emphasized spot markers
    pub nearby: usize,
}

/// Marker layer for the map
///
/// GET /api/markers?q=&lat=&lng=&user_lat=&user_lng=
async fn markers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarkersQuery>,
) -> Result<Json<MarkersResponse>, ApiError> {
    let search = coordinates_param(query.lat, query.lng)?;
    let user = coordinates_param(query.user_lat, query.user_lng)?;
    let radii = state.config.read().await.radii();
    let spots = state.spots().await;

    let result = filter_spots(&spots, &query.q, search, radii);
    let plan = MarkerPlan::build(&spots, &result, user, search);

    let mut map = state.map_provider();
    plan.render(&mut map);

    Ok(Json(MarkersResponse {
        nearby: plan.emphasized().count(),
        markers: map.take_layer(),
    }))
}

/// Geocode parameters
#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: String,
}

/// Resolve an address to a reference point
///
/// GET /api/geocode?address=
async fn geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<Resolution>, ApiError> {
    if query.address.trim().is_empty() {
        return Err(ApiError::new("INVALID_REQUEST", "address is required"));
    }

    let resolution = resolve_address(state.resolver(), &query.address).await;
    match resolution.failure {
        Some(ResolverFailure::Geocode(e)) => Err(ApiError::from(Error::Geocode(e))),
        _ => Ok(Json(resolution)),
    }
}

/// Resolve the caller's location
///
/// GET /api/location
///
/// Failure is part of the body, next to the fallback reference (if the
/// config provides one).
async fn location_handler(State(state): State<Arc<AppState>>) -> Json<Resolution> {
    let policy = state.config.read().await.fallback_policy();
    Json(resolve_device(state.resolver(), policy).await)
}

/// Navigation parameters
#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub app: Option<String>,
    /// Detected from User-Agent when absent
    pub platform: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub from_lat: Option<f64>,
    pub from_lng: Option<f64>,
}

/// Navigation response
#[derive(Debug, Serialize, Deserialize)]
pub struct NavigateResponse {
    pub plan: LaunchPlan,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub directions: Option<Directions>,
}

/// Deep-link chain for navigating to a spot
///
/// GET /api/navigate?app=&platform=&lat=&lng=&from_lat=&from_lng=
async fn navigate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<NavigateResponse>, ApiError> {
    let destination = Coordinates::new(query.lat, query.lng);
    destination.validate()?;
    let origin = coordinates_param(query.from_lat, query.from_lng)?;

    let app = match &query.app {
        Some(app) => app
            .parse::<NavApp>()
            .map_err(|e| ApiError::new("INVALID_REQUEST", e))?,
        None => state.config.read().await.nav_app(),
    };

    let platform = match &query.platform {
        Some(platform) => platform
            .parse::<Platform>()
            .map_err(|e| ApiError::new("INVALID_REQUEST", e))?,
        None => {
            let ua = headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            Platform::from_user_agent(ua)
        }
    };

    let directions = match origin {
        Some(origin) => Some(state.map_provider().directions(origin, destination).await?),
        None => None,
    };

    Ok(Json(NavigateResponse {
        plan: launch_plan(app, platform, origin, destination),
        directions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geo::GeolocationError;
    use crate::spot::{Availability, Spot};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Nothing listens here, so network lookups fail fast
    const DEAD_URL: &str = "http://127.0.0.1:1";

    fn test_spots() -> Vec<Spot> {
        vec![
            Spot::new(
                "centro",
                "Praça XV",
                "Centro",
                Coordinates::new(-22.9035, -43.1740),
                Availability::new(2, 4).unwrap(),
            ),
            Spot::new(
                "lapa",
                "Arcos da Lapa",
                "Lapa",
                Coordinates::new(-22.9130, -43.1800),
                Availability::new(0, 2).unwrap(),
            ),
            Spot::new(
                "barra",
                "Shopping Barra",
                "Barra da Tijuca",
                Coordinates::new(-23.0000, -43.3650),
                Availability::new(5, 10).unwrap(),
            ),
        ]
    }

    fn create_test_state(config: Config) -> Arc<AppState> {
        Arc::new(AppState::with_spots(config, test_spots(), DEAD_URL).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_router(create_test_state(Config::default()));

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();

        assert!(status.running);
        assert_eq!(status.spots, 3);
        assert!(status.backend.is_none());
    }

    #[tokio::test]
    async fn test_spots_text_mode() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) = get_json(app, "/api/spots?q=lapa").await;

        assert_eq!(status, StatusCode::OK);
        let spots = body["spots"].as_array().unwrap();
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0]["id"], "lapa");
        assert_eq!(spots[0]["nearby"], true);
        assert!(body["reference"].is_null());
    }

    #[tokio::test]
    async fn test_spots_reference_overrides_query() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) =
            get_json(app, "/api/spots?q=barra&lat=-22.9035&lng=-43.1740").await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["spots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["centro", "lapa"]);
        assert_eq!(body["spots"][0]["nearby"], true);
        assert_eq!(body["spots"][1]["nearby"], false);
    }

    #[tokio::test]
    async fn test_spots_nearest_order() {
        let app = create_router(create_test_state(Config::default()));
        let (_, body) =
            get_json(app, "/api/spots?lat=-22.9130&lng=-43.1800&nearest=true").await;

        assert_eq!(body["spots"][0]["id"], "lapa");
        assert_eq!(body["spots"][1]["id"], "centro");
    }

    #[tokio::test]
    async fn test_spots_uses_configured_radius() {
        let mut config = Config::default();
        config.search.search_radius_km = 30.0;
        let app = create_router(create_test_state(config));
        let (_, body) = get_json(app, "/api/spots?lat=-22.9035&lng=-43.1740").await;

        assert_eq!(body["spots"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_spots_half_coordinates_rejected() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) = get_json(app, "/api/spots?lat=-22.9").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_spots_out_of_range_rejected() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) = get_json(app, "/api/spots?lat=91&lng=0").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_refresh_without_backend_keeps_list() {
        let app = create_router(create_test_state(Config::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/spots/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let refresh: RefreshResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(refresh.count, 3);
    }

    #[tokio::test]
    async fn test_markers_endpoint() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) = get_json(
            app,
            "/api/markers?lat=-22.9035&lng=-43.1740&user_lat=-22.9040&user_lng=-43.1745",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        // three spots plus the user and the search pin
        assert_eq!(body["markers"].as_array().unwrap().len(), 5);
        assert_eq!(body["nearby"], 1);
    }

    #[tokio::test]
    async fn test_location_without_fallback() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) = get_json(app, "/api/location").await;

        assert_eq!(status, StatusCode::OK);
        let resolution: Resolution = serde_json::from_value(body).unwrap();
        assert!(resolution.reference.is_none());
        assert_eq!(
            resolution.failure,
            Some(ResolverFailure::Geolocation(GeolocationError::PositionUnavailable))
        );
    }

    #[tokio::test]
    async fn test_location_with_fallback() {
        let mut config = Config::default();
        config.location.fallback_lat = Some(-22.9068);
        config.location.fallback_lng = Some(-43.1729);
        let app = create_router(create_test_state(config));
        let (_, body) = get_json(app, "/api/location").await;

        let resolution: Resolution = serde_json::from_value(body).unwrap();
        assert_eq!(resolution.reference, Some(Coordinates::new(-22.9068, -43.1729)));
        assert!(resolution.failure.is_some());
    }

    #[tokio::test]
    async fn test_geocode_unreachable() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) = get_json(app, "/api/geocode?address=Rua%20X").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "GEOCODING_ERROR");
    }

    #[tokio::test]
    async fn test_geocode_requires_address() {
        let app = create_router(create_test_state(Config::default()));
        let (status, _) = get_json(app, "/api/geocode?address=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_navigate_desktop() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) = get_json(
            app,
            "/api/navigate?platform=desktop&lat=-22.9035&lng=-43.1740&from_lat=-22.9130&from_lng=-43.1800",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response: NavigateResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.plan.app, NavApp::GoogleMaps);
        assert_eq!(response.plan.steps.len(), 1);
        assert!(response.plan.steps[0].url.starts_with("https://www.google.com/maps"));
        assert!(response.directions.unwrap().distance_km > 1.0);
    }

    #[tokio::test]
    async fn test_navigate_platform_from_user_agent() {
        let app = create_router(create_test_state(Config::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/navigate?app=waze&lat=-22.9035&lng=-43.1740")
                    .header(
                        header::USER_AGENT,
                        "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36",
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let response: NavigateResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.plan.platform, Platform::Android);
        assert_eq!(response.plan.app, NavApp::Waze);
        assert!(response.directions.is_none());
    }

    #[tokio::test]
    async fn test_navigate_unknown_app() {
        let app = create_router(create_test_state(Config::default()));
        let (status, body) = get_json(app, "/api/navigate?app=bing&lat=0&lng=0").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }
}
