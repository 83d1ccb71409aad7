//! OpenStreetMap-backed map provider
//!
//! Geocodes with Nominatim and estimates routes from straight-line
//! distance. Markers are collected into a layer that the HTTP API hands
//! to the browser, which owns the actual tile rendering.

use crate::coord::Coordinates;
use crate::error::Result;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{GeoBackend, GeocodeError};
use crate::map::{Directions, MapProvider, MarkerSpec};

/// Map provider that records markers instead of drawing them
#[derive(Debug, Clone)]
pub struct OsmMapProvider {
    geocoder: NominatimBackend,
    layer: Vec<MarkerSpec>,
}

impl OsmMapProvider {
    pub fn new(geocoder: NominatimBackend) -> Self {
        Self {
            geocoder,
            layer: Vec::new(),
        }
    }

    /// Markers currently on the layer
    pub fn layer(&self) -> &[MarkerSpec] {
        &self.layer
    }

    /// Take the layer, leaving it empty
    pub fn take_layer(&mut self) -> Vec<MarkerSpec> {
        std::mem::take(&mut self.layer)
    }
}

impl MapProvider for OsmMapProvider {
    async fn geocode(&self, address: &str) -> std::result::Result<Coordinates, GeocodeError> {
        match self.geocoder.geocode(address).await {
            Ok(Some(location)) => Ok(location.coords()),
            Ok(None) => Err(GeocodeError::AddressNotFound),
            Err(e) => Err(GeocodeError::GeocodingError(e.to_string())),
        }
    }

    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Directions> {
        Ok(Directions::estimate(origin, destination))
    }

    fn place_marker(&mut self, marker: &MarkerSpec) {
        self.layer.push(marker.clone());
    }

    fn clear_markers(&mut self) {
        self.layer.clear();
    }
}
