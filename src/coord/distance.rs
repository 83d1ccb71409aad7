//! Great-circle distance (Haversine formula)
//!
//! Inputs are not validated. Out-of-range latitudes or longitudes produce
//! a number, but not a meaningful one; callers that accept user input
//! should run `Coordinates::validate` first.

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinates;

/// Calculate the distance between two points in kilometers
///
/// # Arguments
/// * `a` - First point
/// * `b` - Second point
///
/// # Returns
/// Non-negative distance in kilometers, 0 when `a == b`
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two points in meters
pub fn distance_m(a: Coordinates, b: Coordinates) -> f64 {
    distance_km(a, b) * 1000.0
}

/// Check whether `point` lies within `radius_km` of `center`
///
/// The boundary is inclusive.
pub fn is_within(point: Coordinates, center: Coordinates, radius_km: f64) -> bool {
    distance_km(center, point) <= radius_km
}
