//! Search state
//!
//! Owns the text query and the reference point. Both change only through
//! these methods, so a clear always resets them together and a stale
//! resolver result can never overwrite a newer choice.

use crate::coord::Coordinates;
use crate::geo::{RequestGeneration, RequestTicket, Resolution};
use crate::proximity::{filter_spots, ProximityResult, SearchRadii};
use crate::spot::Spot;
use tracing::debug;

/// Current query and reference point
#[derive(Debug, Default)]
pub struct SearchState {
    query: String,
    reference: Option<Coordinates>,
    requests: RequestGeneration,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn reference(&self) -> Option<Coordinates> {
        self.reference
    }

    /// Update the free-text query
    ///
    /// While a reference is set the query has no effect on the result.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Anchor the search at `reference`, superseding in-flight lookups
    pub fn select_reference(&mut self, reference: Coordinates) {
        self.requests.invalidate();
        self.reference = Some(reference);
    }

    /// Start a resolver request whose result may later be applied
    pub fn begin_request(&self) -> RequestTicket {
        self.requests.begin()
    }

    /// Apply a resolver result if `ticket` is still the newest request
    ///
    /// Returns false when the result is stale and was discarded.
    pub fn apply_resolution(&mut self, ticket: RequestTicket, resolution: &Resolution) -> bool {
        if !self.requests.is_current(ticket) {
            debug!("Discarding stale resolver result");
            return false;
        }
        self.reference = resolution.reference;
        true
    }

    /// Reset query and reference together and drop in-flight lookups
    pub fn clear(&mut self) {
        self.requests.invalidate();
        self.query.clear();
        self.reference = None;
    }

    /// Run the filter against the current state
    pub fn apply(&self, spots: &[Spot], radii: SearchRadii) -> ProximityResult {
        filter_spots(spots, &self.query, self.reference, radii)
    }
}
