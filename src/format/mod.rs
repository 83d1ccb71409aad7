//! Output formatters
//!
//! Provides trait-based output formatting for search results.

pub mod gpx;
pub mod json;
pub mod text;

use crate::coord::{distance_km, Coordinates};
use crate::error::Result;
use crate::geo::ResolverFailure;
use crate::proximity::{ProximityResult, SearchRadii};
use crate::spot::Spot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// A listed spot with its distance from the reference point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotEntry {
    #[serde(flatten)]
    pub spot: Spot,
    /// Kilometers from the reference, absent in text mode
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance_km: Option<f64>,
    /// Emphasized on the map
    pub nearby: bool,
}

/// Everything a search produced, ready to print or serve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub reference: Option<Coordinates>,
    /// Why the reference could not be resolved, if it couldn't
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure: Option<ResolverFailure>,
    pub radii: SearchRadii,
    pub spots: Vec<SpotEntry>,
    pub timestamp: DateTime<Utc>,
}

impl SearchResponse {
    /// Attach distances and emphasis to a filter result
    pub fn new(
        query: &str,
        reference: Option<Coordinates>,
        radii: SearchRadii,
        result: ProximityResult,
    ) -> Self {
        let ProximityResult {
            displayed,
            highlighted,
        } = result;

        let spots = displayed
            .into_iter()
            .map(|spot| SpotEntry {
                distance_km: reference.map(|r| distance_km(r, spot.coords)),
                nearby: highlighted.contains(&spot.id),
                spot,
            })
            .collect();

        Self {
            query: query.to_string(),
            reference,
            failure: None,
            radii,
            spots,
            timestamp: Utc::now(),
        }
    }

    /// Record why the reference point is missing or a fallback
    pub fn with_failure(mut self, failure: Option<ResolverFailure>) -> Self {
        self.failure = failure;
        self
    }

    /// Reorder entries nearest first; no-op without a reference
    pub fn sort_nearest(&mut self) {
        if self.reference.is_some() {
            self.spots.sort_by(|a, b| {
                let a = a.distance_km.unwrap_or(f64::INFINITY);
                let b = b.distance_km.unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            });
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format the search response
    fn format(&self, response: &SearchResponse) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [
        &json::JsonFormatter as &dyn OutputFormatter,
        &text::TextFormatter,
        &gpx::GpxFormatter,
    ]
    .iter()
    .map(|f| FormatInfo {
        name: f.name().to_string(),
        description: f.description().to_string(),
    })
    .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::proximity::filter_spots;
    use crate::spot::{Audience, Availability};

    pub(crate) fn sample_spots() -> Vec<Spot> {
        vec![
            Spot::new(
                "a1",
                "Shopping Tijuca",
                "Av. Maracanã, 987",
                Coordinates::new(-22.9240, -43.2350),
                Availability::new(2, 4).unwrap(),
            )
            .with_audience(Audience {
                pregnant: true,
                elderly: false,
                disabled: true,
            }),
            Spot::new(
                "b2",
                "Hospital & Clínica",
                "Rua <Conde> de Bonfim, 10",
                Coordinates::new(-22.9300, -43.2400),
                Availability::new(0, 3).unwrap(),
            ),
        ]
    }

    /// Reference right on top of "a1"
    pub(crate) fn sample_response() -> SearchResponse {
        let spots = sample_spots();
        let reference = Coordinates::new(-22.9240, -43.2350);
        let radii = SearchRadii::default();
        let result = filter_spots(&spots, "", Some(reference), radii);
        SearchResponse::new("", Some(reference), radii, result)
    }

    #[test]
    fn test_response_distances_and_emphasis() {
        let response = sample_response();

        assert_eq!(response.spots.len(), 2);
        assert_eq!(response.spots[0].distance_km, Some(0.0));
        assert!(response.spots[0].nearby);
        assert!(!response.spots[1].nearby);
        assert!(response.spots[1].distance_km.unwrap() > 0.5);
    }

    #[test]
    fn test_text_mode_has_no_distances() {
        let spots = sample_spots();
        let radii = SearchRadii::default();
        let result = filter_spots(&spots, "hospital", None, radii);
        let response = SearchResponse::new("hospital", None, radii, result);

        assert_eq!(response.spots.len(), 1);
        assert_eq!(response.spots[0].spot.id, "b2");
        assert_eq!(response.spots[0].distance_km, None);
        assert!(response.spots[0].nearby);
    }

    #[test]
    fn test_sort_nearest() {
        let spots = sample_spots();
        let reference = Coordinates::new(-22.9300, -43.2400);
        let radii = SearchRadii::default();
        let result = filter_spots(&spots, "", Some(reference), radii);
        let mut response = SearchResponse::new("", Some(reference), radii, result);

        assert_eq!(response.spots[0].spot.id, "a1");
        response.sort_nearest();
        assert_eq!(response.spots[0].spot.id, "b2");
    }

    #[test]
    fn test_get_formatter() {
        assert!(get_formatter("json").is_some());
        assert!(get_formatter("text").is_some());
        assert!(get_formatter("gpx").is_some());
        assert!(get_formatter("url").is_none());
    }

    #[test]
    fn test_get_formatter_case_insensitive() {
        assert!(get_formatter("JSON").is_some());
        assert!(get_formatter("Text").is_some());
        assert!(get_formatter("GPX").is_some());
    }

    #[test]
    fn test_available_formats() {
        let formats = available_formats();
        assert_eq!(formats.len(), 3);
        assert!(formats.iter().any(|f| f.name == "json"));
        assert!(formats.iter().any(|f| f.name == "text"));
        assert!(formats.iter().any(|f| f.name == "gpx"));
    }
}
