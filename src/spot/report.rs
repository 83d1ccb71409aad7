//! Crowd-sourced reports
//!
//! Status reports update a spot's availability. Violation reports flag
//! misuse of a reserved spot. Field names follow the backend's wire format.

use crate::constants::report::MAX_MEDIA;
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Availability seen on site, submitted for one spot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub vagas_disponiveis: u32,
    pub total_vagas: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub observacoes: Option<String>,
}

impl StatusReport {
    /// Build a status report, rejecting `available > total`
    pub fn new(available: u32, total: u32, notes: Option<String>) -> Result<Self> {
        if available > total {
            return Err(Error::InvalidReport(format!(
                "{} available exceeds {} total",
                available, total
            )));
        }
        Ok(Self {
            vagas_disponiveis: available,
            total_vagas: total,
            observacoes: notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Backend acknowledgement for a status report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReportReceipt {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub vaga_id: Option<String>,
}

/// Kind of reserved spot involved in a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotType {
    Pregnant,
    Elderly,
    Disabled,
}

impl std::str::FromStr for SpotType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pregnant" | "gestante" => Ok(Self::Pregnant),
            "elderly" | "idoso" => Ok(Self::Elderly),
            "disabled" | "pcd" => Ok(Self::Disabled),
            _ => Err(format!("Unknown spot type: {}", s)),
        }
    }
}

/// What the offender did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    NoCredential,
    BlockingAccess,
    Misuse,
    Other,
}

impl std::str::FromStr for ViolationType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "no_credential" => Ok(Self::NoCredential),
            "blocking_access" => Ok(Self::BlockingAccess),
            "misuse" => Ok(Self::Misuse),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown violation type: {}", s)),
        }
    }
}

/// Review state of a violation report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStatus {
    Pendente,
    EmAnalise,
    Resolvida,
    Arquivada,
}

impl ViolationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::EmAnalise => "em_analise",
            Self::Resolvida => "resolvida",
            Self::Arquivada => "arquivada",
        }
    }
}

impl std::fmt::Display for ViolationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ViolationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pendente" => Ok(Self::Pendente),
            "em_analise" => Ok(Self::EmAnalise),
            "resolvida" => Ok(Self::Resolvida),
            "arquivada" => Ok(Self::Arquivada),
            _ => Err(format!(
                "Unknown status: {} (use pendente, em_analise, resolvida, arquivada)",
                s
            )),
        }
    }
}

/// A new violation report
///
/// `midias` carries already-encoded attachments (data URLs or links);
/// this crate does not encode files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationReport {
    pub endereco: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tipo_vaga: SpotType,
    pub tipo_infracao: ViolationType,
    pub descricao: String,
    #[serde(default)]
    pub midias: Vec<String>,
}

impl ViolationReport {
    /// Check required fields and attachment count
    pub fn validate(&self) -> Result<()> {
        if self.endereco.trim().is_empty() {
            return Err(Error::InvalidReport("Address is required".to_string()));
        }
        if self.descricao.trim().is_empty() {
            return Err(Error::InvalidReport("Description is required".to_string()));
        }
        if self.latitude.is_some() != self.longitude.is_some() {
            return Err(Error::InvalidReport(
                "Latitude and longitude must be given together".to_string(),
            ));
        }
        if self.midias.len() > MAX_MEDIA {
            return Err(Error::InvalidReport(format!(
                "At most {} attachments allowed, got {}",
                MAX_MEDIA,
                self.midias.len()
            )));
        }
        Ok(())
    }
}

/// A stored violation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub id: String,
    #[serde(flatten)]
    pub report: ViolationReport,
    /// Naive UTC timestamp as written by the backend
    pub data_criacao: Option<NaiveDateTime>,
    pub status: ViolationStatus,
}
