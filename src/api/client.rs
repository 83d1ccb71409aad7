//! HTTP client for the spot backend

use crate::error::{Error, Result};
use crate::spot::report::{
    StatusReport, StatusReportReceipt, Violation, ViolationReport, ViolationStatus,
};
use crate::spot::{LatestReport, Spot, SpotRecord};
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("vagas-plus/", env!("CARGO_PKG_VERSION"));

/// Latest-report lookups in flight at once
const REPORT_CONCURRENCY: usize = 8;

/// Error body returned by the backend (`{"detail": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Plain acknowledgement body (`{"message": "..."}`)
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// Client for the Vagas+ backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into `Error::Backend` (or `RateLimited`)
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.detail)
            .unwrap_or(text);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited(message));
        }
        Err(Error::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = Self::check(self.client.get(&url).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Fetch every spot (`GET /vagas`)
    ///
    /// Records that fail validation are skipped with a warning rather than
    /// failing the whole list.
    pub async fn fetch_spots(&self) -> Result<Vec<Spot>> {
        let records: Vec<SpotRecord> = self.get_json("/vagas").await?;
        let total = records.len();

        let spots: Vec<Spot> = records
            .into_iter()
            .filter_map(|record| match Spot::try_from(record) {
                Ok(spot) => Some(spot),
                Err(e) => {
                    warn!("Skipping spot record: {}", e);
                    None
                }
            })
            .collect();

        info!("Fetched {} spots ({} skipped)", spots.len(), total - spots.len());
        Ok(spots)
    }

    /// Latest status report for a spot, if one is recent enough
    pub async fn latest_report(&self, spot_id: &str) -> Result<Option<LatestReport>> {
        let path = format!("/vagas/{}/status/latest", urlencoding::encode(spot_id));
        self.get_json(&path).await
    }

    /// Fetch spots and attach each one's latest report
    ///
    /// A failed report lookup leaves that spot without a report.
    pub async fn fetch_spots_with_reports(&self) -> Result<Vec<Spot>> {
        let spots = self.fetch_spots().await?;

        let lookups: Vec<_> = spots.iter().map(|spot| self.latest_report(&spot.id)).collect();
        let reports: Vec<Result<Option<LatestReport>>> =
            stream::iter(lookups)
                .buffered(REPORT_CONCURRENCY)
                .collect()
                .await;

        Ok(spots
            .into_iter()
            .zip(reports)
            .map(|(mut spot, report)| {
                spot.latest_report = match report {
                    Ok(report) => report,
                    Err(e) => {
                        warn!("Failed to fetch report for spot {}: {}", spot.id, e);
                        None
                    }
                };
                spot
            })
            .collect())
    }

    /// Submit what the user sees at a spot (`POST /vagas/{id}/status`)
    pub async fn submit_status_report(
        &self,
        spot_id: &str,
        report: &StatusReport,
    ) -> Result<StatusReportReceipt> {
        let url = self.url(&format!("/vagas/{}/status", urlencoding::encode(spot_id)));
        let response = self.client.post(&url).json(report).send().await?;
        let receipt: StatusReportReceipt = Self::check(response).await?.json().await?;
        info!("Status report {} submitted for spot {}", receipt.id, spot_id);
        Ok(receipt)
    }

    /// File a violation report (`POST /denuncias`)
    pub async fn submit_violation(&self, report: &ViolationReport) -> Result<Violation> {
        report.validate()?;
        let response = self
            .client
            .post(self.url("/denuncias"))
            .json(report)
            .send()
            .await?;
        let violation: Violation = Self::check(response).await?.json().await?;
        info!("Violation report {} created", violation.id);
        Ok(violation)
    }

    /// List violation reports, newest first, optionally by status
    pub async fn list_violations(&self, status: Option<ViolationStatus>) -> Result<Vec<Violation>> {
        let path = match status {
            Some(status) => format!("/denuncias?status={}", status),
            None => "/denuncias".to_string(),
        };
        self.get_json(&path).await
    }

    /// Fetch one violation report
    pub async fn get_violation(&self, id: &str) -> Result<Violation> {
        self.get_json(&format!("/denuncias/{}", urlencoding::encode(id)))
            .await
    }

    /// Move a violation report to a new review status
    pub async fn update_violation_status(
        &self,
        id: &str,
        status: ViolationStatus,
    ) -> Result<String> {
        let url = self.url(&format!(
            "/denuncias/{}/status?status={}",
            urlencoding::encode(id),
            status
        ));
        let response = self.client.patch(&url).send().await?;
        let body: MessageBody = Self::check(response).await?.json().await?;
        Ok(body.message)
    }

    /// Delete a violation report
    pub async fn delete_violation(&self, id: &str) -> Result<String> {
        let url = self.url(&format!("/denuncias/{}", urlencoding::encode(id)));
        let response = self.client.delete(&url).send().await?;
        let body: MessageBody = Self::check(response).await?.json().await?;
        Ok(body.message)
    }
}
