//! Spot proximity filtering
//!
//! Decides which spots are listed and which are emphasized on the map.
//! Everything here is a pure function of (spots, query, reference, radii);
//! nothing is cached between calls.

pub mod state;

use crate::constants::geo::REPORT_MAX_DISTANCE_METERS;
use crate::constants::search::{NEARBY_RADIUS_KM, SEARCH_RADIUS_KM};
use crate::coord::{distance_km, distance_m, Coordinates};
use crate::spot::Spot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use state::SearchState;

/// Distance thresholds used by `filter_spots`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRadii {
    /// Spots within this distance of the reference are listed
    pub search_km: f64,
    /// Spots within this distance of the reference are emphasized
    pub near_km: f64,
}

impl Default for SearchRadii {
    fn default() -> Self {
        Self {
            search_km: SEARCH_RADIUS_KM,
            near_km: NEARBY_RADIUS_KM,
        }
    }
}

/// Output of `filter_spots`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    /// Spots to list, in input order
    pub displayed: Vec<Spot>,
    /// Ids of spots to emphasize on the map
    pub highlighted: BTreeSet<String>,
}

impl ProximityResult {
    /// True when nothing is listed (a valid "0 results" outcome)
    pub fn is_empty(&self) -> bool {
        self.displayed.is_empty()
    }

    /// Whether a spot id is emphasized
    pub fn is_highlighted(&self, id: &str) -> bool {
        self.highlighted.contains(id)
    }
}

/// Filter spots by text or by distance to a reference point
///
/// Without a reference, spots whose name or address contains `query`
/// (case-insensitive, empty matches all) are listed and all of them are
/// highlighted.
///
/// With a reference the query is ignored. Spots within
/// `radii.search_km` are listed, and every spot within `radii.near_km`
/// is highlighted, whether or not it is listed. Both comparisons are
/// inclusive.
pub fn filter_spots(
    spots: &[Spot],
    query: &str,
    reference: Option<Coordinates>,
    radii: SearchRadii,
) -> ProximityResult {
    match reference {
        None => {
            let displayed: Vec<Spot> = spots
                .iter()
                .filter(|spot| spot.matches_text(query))
                .cloned()
                .collect();
            let highlighted = displayed.iter().map(|spot| spot.id.clone()).collect();
            ProximityResult {
                displayed,
                highlighted,
            }
        }
        Some(reference) => {
            let mut displayed = Vec::new();
            let mut highlighted = BTreeSet::new();

            for spot in spots {
                let distance = distance_km(reference, spot.coords);
                if distance <= radii.search_km {
                    displayed.push(spot.clone());
                }
                if distance <= radii.near_km {
                    highlighted.insert(spot.id.clone());
                }
            }

            ProximityResult {
                displayed,
                highlighted,
            }
        }
    }
}

/// Pair each listed spot with its distance from `origin`, nearest first
///
/// Ties keep their listing order.
pub fn sort_by_distance(spots: &[Spot], origin: Coordinates) -> Vec<(Spot, f64)> {
    let mut ranked: Vec<(Spot, f64)> = spots
        .iter()
        .map(|spot| (spot.clone(), distance_km(origin, spot.coords)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

/// Whether a user standing at `user` may report this spot's status
pub fn can_report(user: Coordinates, spot: &Spot) -> bool {
    distance_m(user, spot.coords) <= REPORT_MAX_DISTANCE_METERS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::Availability;

    /// Kilometers per degree of latitude for a 6371 km sphere
    const KM_PER_DEG_LAT: f64 = 111.194_926_644_558_74;

    fn spot(id: &str, name: &str, coords: Coordinates) -> Spot {
        Spot::new(id, name, "", coords, Availability::new(1, 2).unwrap())
    }

    /// A spot `km` kilometers due north of `origin`
    fn spot_north(id: &str, origin: Coordinates, km: f64) -> Spot {
        spot(
            id,
            id,
            Coordinates::new(origin.lat + km / KM_PER_DEG_LAT, origin.lng),
        )
    }

    fn ids(spots: &[Spot]) -> Vec<&str> {
        spots.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_empty_list() {
        let result = filter_spots(&[], "", None, SearchRadii::default());
        assert!(result.displayed.is_empty());
        assert!(result.highlighted.is_empty());
        assert!(result.is_empty());
    }

    #[test]
    fn test_default_radii() {
        let radii = SearchRadii::default();
        assert_eq!(radii.search_km, 3.0);
        assert_eq!(radii.near_km, 0.5);
    }

    #[test]
    fn test_reference_mode_partitions() {
        let origin = Coordinates::new(0.0, 0.0);
        let spots = vec![
            spot_north("A", origin, 0.2),
            spot_north("B", origin, 0.5),
            spot_north("C", origin, 2.0),
            spot_north("D", origin, 5.0),
        ];

        // B sits on the nearby radius
        let b_km = distance_km(origin, spots[1].coords);
        assert!((b_km - 0.5).abs() < 1e-9);
        let radii = SearchRadii {
            near_km: b_km,
            ..SearchRadii::default()
        };

        let result = filter_spots(&spots, "", Some(origin), radii);

        assert_eq!(ids(&result.displayed), vec!["A", "B", "C"]);
        assert_eq!(
            result.highlighted,
            ["A", "B"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn test_boundary_inclusive() {
        let origin = Coordinates::new(-22.9, -43.2);
        let edge = spot("edge", "edge", Coordinates::new(-22.9 + 0.01, -43.2));
        let exact = distance_km(origin, edge.coords);

        let radii = SearchRadii {
            search_km: exact,
            near_km: exact,
        };
        let result = filter_spots(&[edge], "", Some(origin), radii);

        assert_eq!(ids(&result.displayed), vec!["edge"]);
        assert!(result.is_highlighted("edge"));
    }

    #[test]
    fn test_highlight_independent_of_listing() {
        let origin = Coordinates::new(0.0, 0.0);
        let spots = vec![spot_north("near", origin, 0.3)];

        // Search radius smaller than near radius: highlighted but not listed
        let radii = SearchRadii {
            search_km: 0.1,
            near_km: 0.5,
        };
        let result = filter_spots(&spots, "", Some(origin), radii);

        assert!(result.displayed.is_empty());
        assert!(result.is_highlighted("near"));
    }

    #[test]
    fn test_reference_with_nothing_in_range() {
        let origin = Coordinates::new(0.0, 0.0);
        let spots = vec![spot_north("far", origin, 10.0)];
        let result = filter_spots(&spots, "", Some(origin), SearchRadii::default());
        assert!(result.is_empty());
        assert!(result.highlighted.is_empty());
    }

    #[test]
    fn test_text_mode() {
        let spots = vec![
            spot("1", "Shopping Center", Coordinates::new(0.0, 0.0)),
            spot("2", "Hospital", Coordinates::new(0.0, 0.0)),
        ];

        for query in ["shop", "SHOP", "Shop"] {
            let result = filter_spots(&spots, query, None, SearchRadii::default());
            assert_eq!(ids(&result.displayed), vec!["1"]);
            assert_eq!(result.highlighted.len(), 1);
            assert!(result.is_highlighted("1"));
        }

        let all = filter_spots(&spots, "", None, SearchRadii::default());
        assert_eq!(all.displayed.len(), 2);
        assert_eq!(all.highlighted.len(), 2);
    }

    #[test]
    fn test_reference_ignores_query() {
        let origin = Coordinates::new(0.0, 0.0);
        let spots = vec![spot_north("Hospital", origin, 1.0)];

        let text_only = filter_spots(&spots, "shop", None, SearchRadii::default());
        assert!(text_only.is_empty());

        let anchored = filter_spots(&spots, "shop", Some(origin), SearchRadii::default());
        assert_eq!(ids(&anchored.displayed), vec!["Hospital"]);
    }

    #[test]
    fn test_deterministic() {
        let origin = Coordinates::new(0.0, 0.0);
        let spots: Vec<Spot> = (0..20)
            .map(|i| spot_north(&format!("s{}", i), origin, i as f64 * 0.25))
            .collect();

        let first = filter_spots(&spots, "", Some(origin), SearchRadii::default());
        let second = filter_spots(&spots, "", Some(origin), SearchRadii::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_sort_by_distance() {
        let origin = Coordinates::new(0.0, 0.0);
        let spots = vec![
            spot_north("far", origin, 2.0),
            spot_north("near", origin, 0.1),
            spot_north("mid", origin, 1.0),
        ];
        let ranked = sort_by_distance(&spots, origin);
        let order: Vec<&str> = ranked.iter().map(|(s, _)| s.id.as_str()).collect();
        assert_eq!(order, vec!["near", "mid", "far"]);
        assert!((ranked[0].1 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_can_report() {
        let user = Coordinates::new(0.0, 0.0);
        assert!(can_report(user, &spot_north("close", user, 0.4)));
        assert!(!can_report(user, &spot_north("far", user, 0.6)));
    }
}
