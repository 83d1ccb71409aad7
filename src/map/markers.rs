//! Marker planning
//!
//! Converts a proximity result into the list of markers a map should show.
//! Every known spot gets a marker; highlighted ones are drawn larger, with
//! a yellow border, on top of the rest.

use crate::coord::Coordinates;
use crate::map::MapProvider;
use crate::proximity::ProximityResult;
use crate::spot::Spot;
use serde::{Deserialize, Serialize};

const COLOR_AVAILABLE: &str = "#10b981";
const COLOR_FULL: &str = "#ef4444";
const COLOR_USER: &str = "#4285F4";
const COLOR_SEARCH: &str = "#3b82f6";
const STROKE_DEFAULT: &str = "#ffffff";
const STROKE_NEARBY: &str = "#facc15";

/// What a marker stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Spot,
    NearbySpot,
    User,
    SearchPin,
}

/// One marker draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_id: Option<String>,
    pub kind: MarkerKind,
    pub position: Coordinates,
    pub title: String,
    pub scale: u8,
    pub fill_color: String,
    pub stroke_color: String,
    pub z_index: u32,
}

impl MarkerSpec {
    fn for_spot(spot: &Spot, nearby: bool) -> Self {
        Self {
            spot_id: Some(spot.id.clone()),
            kind: if nearby {
                MarkerKind::NearbySpot
            } else {
                MarkerKind::Spot
            },
            position: spot.coords,
            title: spot.name.clone(),
            scale: if nearby { 12 } else { 10 },
            fill_color: if spot.availability.is_full() {
                COLOR_FULL
            } else {
                COLOR_AVAILABLE
            }
            .to_string(),
            stroke_color: if nearby { STROKE_NEARBY } else { STROKE_DEFAULT }.to_string(),
            z_index: if nearby { 1000 } else { 1 },
        }
    }

    fn user(position: Coordinates) -> Self {
        Self {
            spot_id: None,
            kind: MarkerKind::User,
            position,
            title: "Your location".to_string(),
            scale: 8,
            fill_color: COLOR_USER.to_string(),
            stroke_color: STROKE_DEFAULT.to_string(),
            z_index: 500,
        }
    }

    fn search_pin(position: Coordinates) -> Self {
        Self {
            spot_id: None,
            kind: MarkerKind::SearchPin,
            position,
            title: "Searched location".to_string(),
            scale: 12,
            fill_color: COLOR_SEARCH.to_string(),
            stroke_color: STROKE_DEFAULT.to_string(),
            z_index: 1001,
        }
    }
}

/// Ordered marker draw list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerPlan {
    pub markers: Vec<MarkerSpec>,
}

impl MarkerPlan {
    /// Plan markers for all spots
    ///
    /// # Arguments
    /// * `spots` - Every known spot, not only the listed ones
    /// * `result` - Filter output deciding emphasis
    /// * `user` - Device position, if known
    /// * `search` - Searched reference point, if any
    pub fn build(
        spots: &[Spot],
        result: &ProximityResult,
        user: Option<Coordinates>,
        search: Option<Coordinates>,
    ) -> Self {
        let mut markers: Vec<MarkerSpec> = spots
            .iter()
            .map(|spot| MarkerSpec::for_spot(spot, result.is_highlighted(&spot.id)))
            .collect();

        if let Some(user) = user {
            markers.push(MarkerSpec::user(user));
        }
        if let Some(search) = search {
            markers.push(MarkerSpec::search_pin(search));
        }

        Self { markers }
    }

    /// Markers for spots drawn with emphasis
    pub fn emphasized(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.markers
            .iter()
            .filter(|m| m.kind == MarkerKind::NearbySpot)
    }

    /// Replace whatever the provider shows with this plan
    pub fn render<M: MapProvider>(&self, provider: &mut M) {
        provider.clear_markers();
        for marker in &self.markers {
            provider.place_marker(marker);
        }
    }
}
