//! Parking spots
//!
//! The in-memory spot model plus the wire record the backend serves.
//! The backend uses Portuguese field names; everything past `SpotRecord`
//! uses the English model.

pub mod report;

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Available/total counts for a spot, with `available <= total`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AvailabilityCounts")]
pub struct Availability {
    available: u32,
    total: u32,
}

/// Unchecked counts, validated into `Availability` on deserialize
#[derive(Deserialize)]
struct AvailabilityCounts {
    available: u32,
    total: u32,
}

impl TryFrom<AvailabilityCounts> for Availability {
    type Error = Error;

    fn try_from(counts: AvailabilityCounts) -> Result<Self> {
        Self::new(counts.available, counts.total)
    }
}

impl Availability {
    /// Create availability counts, rejecting `available > total`
    pub fn new(available: u32, total: u32) -> Result<Self> {
        if available > total {
            return Err(Error::InvalidAvailability(format!(
                "{} available exceeds {} total",
                available, total
            )));
        }
        Ok(Self { available, total })
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// True when no space is free
    pub fn is_full(&self) -> bool {
        self.available == 0
    }
}

/// Which drivers a spot is reserved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Audience {
    pub pregnant: bool,
    pub elderly: bool,
    pub disabled: bool,
}

/// Most recent crowd-sourced availability for a spot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestReport {
    #[serde(rename = "vagas_disponiveis")]
    pub available: u32,
    pub minutes_ago: i64,
}

/// A parking location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub address: String,
    pub coords: Coordinates,
    pub availability: Availability,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latest_report: Option<LatestReport>,
}

impl Spot {
    /// Create a spot with no audience flags and no report
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        coords: Coordinates,
        availability: Availability,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            coords,
            availability,
            audience: Audience::default(),
            accessible: false,
            latest_report: None,
        }
    }

    /// Set audience flags
    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.audience = audience;
        self
    }

    /// Case-insensitive substring match on name or address
    ///
    /// An empty query matches every spot.
    pub fn matches_text(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.address.to_lowercase().contains(&needle)
    }
}

/// Spot as served by `GET /vagas`
///
/// Stored records carry the database `_id` next to a usually null `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotRecord {
    #[serde(rename = "_id", default)]
    pub mongo_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    pub nome: String,
    pub endereco: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_vagas: u32,
    pub vagas_disponiveis: u32,
    #[serde(default)]
    pub acessivel: bool,
    #[serde(default)]
    pub vaga_gestante: bool,
    #[serde(default)]
    pub vaga_idoso: bool,
    #[serde(default)]
    pub vaga_pcd: bool,
}

impl TryFrom<SpotRecord> for Spot {
    type Error = Error;

    fn try_from(record: SpotRecord) -> Result<Self> {
        let id = record
            .mongo_id
            .or(record.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::InvalidSpot(format!("'{}' has no id", record.nome)))?;
        let availability = Availability::new(record.vagas_disponiveis, record.total_vagas)?;

        Ok(Spot {
            id,
            name: record.nome,
            address: record.endereco,
            coords: Coordinates::new(record.latitude, record.longitude),
            availability,
            audience: Audience {
                pregnant: record.vaga_gestante,
                elderly: record.vaga_idoso,
                disabled: record.vaga_pcd,
            },
            accessible: record.acessivel,
            latest_report: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> serde_json::Value {
        serde_json::json!({
            "_id": "665f1a",
            "nome": "Shopping Center",
            "endereco": "Av. das Américas, 4666",
            "latitude": -23.0003,
            "longitude": -43.3655,
            "total_vagas": 12,
            "vagas_disponiveis": 4,
            "acessivel": true,
            "vaga_gestante": true,
            "vaga_idoso": false,
            "vaga_pcd": true
        })
    }

    #[test]
    fn test_availability_invariant() {
        assert!(Availability::new(0, 0).is_ok());
        assert!(Availability::new(5, 5).is_ok());
        assert!(Availability::new(6, 5).is_err());
        assert!(Availability::new(0, 3).unwrap().is_full());
    }

    #[test]
    fn test_record_to_spot() {
        let record: SpotRecord = serde_json::from_value(sample_record()).unwrap();
        let spot = Spot::try_from(record).unwrap();

        assert_eq!(spot.id, "665f1a");
        assert_eq!(spot.name, "Shopping Center");
        assert_eq!(spot.availability.available(), 4);
        assert_eq!(spot.availability.total(), 12);
        assert!(spot.accessible);
        assert!(spot.audience.pregnant);
        assert!(!spot.audience.elderly);
        assert!(spot.audience.disabled);
    }

    #[test]
    fn test_record_accepts_plain_id() {
        let mut value = sample_record();
        let obj = value.as_object_mut().unwrap();
        obj.remove("_id");
        obj.insert("id".to_string(), serde_json::json!("abc"));

        let record: SpotRecord = serde_json::from_value(value).unwrap();
        assert_eq!(Spot::try_from(record).unwrap().id, "abc");
    }

    #[test]
    fn test_record_with_stored_null_id() {
        let mut value = sample_record();
        value["id"] = serde_json::Value::Null;

        let record: SpotRecord = serde_json::from_value(value).unwrap();
        assert_eq!(Spot::try_from(record).unwrap().id, "665f1a");
    }

    #[test]
    fn test_record_prefers_database_id() {
        let mut value = sample_record();
        value["id"] = serde_json::json!("client-side");

        let record: SpotRecord = serde_json::from_value(value).unwrap();
        assert_eq!(Spot::try_from(record).unwrap().id, "665f1a");
    }

    #[test]
    fn test_record_without_id_rejected() {
        let mut value = sample_record();
        value.as_object_mut().unwrap().remove("_id");
        value["id"] = serde_json::Value::Null;
        let record: SpotRecord = serde_json::from_value(value).unwrap();
        assert!(matches!(Spot::try_from(record), Err(Error::InvalidSpot(_))));
    }

    #[test]
    fn test_availability_deserialize_checks_counts() {
        let ok: Availability = serde_json::from_str(r#"{"available":2,"total":4}"#).unwrap();
        assert_eq!(ok, Availability::new(2, 4).unwrap());

        let overfull = serde_json::from_str::<Availability>(r#"{"available":9,"total":1}"#);
        assert!(overfull.unwrap_err().to_string().contains("exceeds"));
    }

    #[test]
    fn test_spot_deserialize_rejects_overfull() {
        let spot = Spot::new(
            "1",
            "Praça",
            "",
            Coordinates::new(0.0, 0.0),
            Availability::new(1, 2).unwrap(),
        );
        let mut value = serde_json::to_value(&spot).unwrap();
        value["availability"]["available"] = serde_json::json!(3);
        assert!(serde_json::from_value::<Spot>(value).is_err());
    }

    #[test]
    fn test_record_with_bad_counts_rejected() {
        let mut value = sample_record();
        value["vagas_disponiveis"] = serde_json::json!(20);
        let record: SpotRecord = serde_json::from_value(value).unwrap();
        assert!(matches!(
            Spot::try_from(record),
            Err(Error::InvalidAvailability(_))
        ));
    }

    #[test]
    fn test_matches_text() {
        let spot = Spot::new(
            "1",
            "Shopping Center",
            "Rua Augusta 100",
            Coordinates::new(0.0, 0.0),
            Availability::new(1, 2).unwrap(),
        );
        assert!(spot.matches_text(""));
        assert!(spot.matches_text("shop"));
        assert!(spot.matches_text("SHOP"));
        assert!(spot.matches_text("augusta"));
        assert!(!spot.matches_text("hospital"));
    }
}
