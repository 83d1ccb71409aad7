//! vagas-plus: Accessible parking spot finder
//!
//! A library and CLI tool for finding reserved parking spots (pregnant,
//! elderly and disabled drivers) near a location, and for the reports
//! that keep their availability current.
//!
//! ## Features
//!
//! - Haversine distance and a pure proximity filter
//! - Location resolution with typed failures and last-request-wins
//! - Marker planning against a pluggable map provider
//! - Google Maps / Waze deep-link chains
//! - Spot backend client, HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use vagas_plus::coord::Coordinates;
//! use vagas_plus::proximity::{filter_spots, SearchRadii};
//! use vagas_plus::spot::{Availability, Spot};
//!
//! let spots = vec![Spot::new(
//!     "1",
//!     "Praça XV",
//!     "Centro, Rio de Janeiro",
//!     Coordinates::new(-22.9035, -43.1740),
//!     Availability::new(2, 4).unwrap(),
//! )];
//!
//! // Text mode: the query matches name or address
//! let result = filter_spots(&spots, "centro", None, SearchRadii::default());
//! assert_eq!(result.displayed.len(), 1);
//!
//! // Reference mode: the query is ignored, distance decides
//! let here = Coordinates::new(-22.9040, -43.1745);
//! let result = filter_spots(&spots, "anything", Some(here), SearchRadii::default());
//! assert!(result.is_highlighted("1"));
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod map;
pub mod navigation;
pub mod proximity;
pub mod server;
pub mod spot;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use proximity::{filter_spots, ProximityResult, SearchRadii};
pub use spot::Spot;
