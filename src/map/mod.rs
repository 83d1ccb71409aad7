//! Map provider seam
//!
//! The map SDK is an injected capability. The core computes a
//! `ProximityResult`; `markers::MarkerPlan` turns it into draw calls
//! against whatever `MapProvider` is plugged in.

pub mod markers;
pub mod osm;

use crate::coord::{distance_km, Coordinates};
use crate::error::Result;
use crate::geo::GeocodeError;
use serde::{Deserialize, Serialize};
use std::future::Future;

pub use markers::{MarkerKind, MarkerPlan, MarkerSpec};

/// Average urban driving speed used for route estimates
const URBAN_SPEED_KMH: f64 = 30.0;

/// Route summary between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directions {
    pub distance_km: f64,
    pub duration_min: f64,
    pub distance_text: String,
    pub duration_text: String,
}

impl Directions {
    /// Straight-line estimate at urban driving speed
    pub fn estimate(origin: Coordinates, destination: Coordinates) -> Self {
        let distance = distance_km(origin, destination);
        let minutes = distance / URBAN_SPEED_KMH * 60.0;
        Self::from_parts(distance, minutes)
    }

    pub fn from_parts(distance_km: f64, duration_min: f64) -> Self {
        let distance_text = if distance_km < 1.0 {
            format!("{} m", (distance_km * 1000.0).round() as u64)
        } else {
            format!("{:.1} km", distance_km)
        };
        let duration_text = format!("{} min", duration_min.ceil().max(1.0) as u64);

        Self {
            distance_km,
            duration_min,
            distance_text,
            duration_text,
        }
    }
}

/// Geocoding, routing and marker drawing provided by a map SDK
pub trait MapProvider: Send {
    /// Best match for a free-text address
    fn geocode(
        &self,
        address: &str,
    ) -> impl Future<Output = std::result::Result<Coordinates, GeocodeError>> + Send;

    /// Driving route summary from `origin` to `destination`
    fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> impl Future<Output = Result<Directions>> + Send;

    /// Draw one marker
    fn place_marker(&mut self, marker: &MarkerSpec);

    /// Remove every marker placed so far
    fn clear_markers(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_text() {
        let short = Directions::from_parts(0.4321, 0.9);
        assert_eq!(short.distance_text, "432 m");
        assert_eq!(short.duration_text, "1 min");

        let long = Directions::from_parts(12.34, 24.2);
        assert_eq!(long.distance_text, "12.3 km");
        assert_eq!(long.duration_text, "25 min");
    }

    #[test]
    fn test_estimate() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 0.0);
        let d = Directions::estimate(a, b);
        assert_eq!(d.distance_km, 0.0);
        assert_eq!(d.duration_text, "1 min");
    }
}
