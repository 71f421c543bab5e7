//! VirusTotal public API (v2) client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use logsentry_core::ClientError;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::client::{ReportStatus, ScanClient, ScanReport, ScanTicket};

const DEFAULT_BASE_URL: &str = "https://www.virustotal.com/vtapi/v2";

/// `response_code` values used by the v2 API.
const CODE_PRESENT: i64 = 1;
const CODE_NOT_PRESENT: i64 = 0;
const CODE_QUEUED: i64 = -2;

/// HTTP client for VirusTotal file scans.
pub struct VirusTotalClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    response_code: i64,
    #[serde(default)]
    scan_id: Option<String>,
    #[serde(default)]
    verbose_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportResponse {
    response_code: i64,
    #[serde(default)]
    positives: u32,
    #[serde(default)]
    scans: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    verbose_msg: Option<String>,
}

impl VirusTotalClient {
    /// Create a client for the given API key. Blank keys are refused.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClientError::Rejected(
                "VirusTotal API key cannot be null or empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .https_only(true)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http(format!("HTTP {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn report_status(code: i64) -> Result<ReportStatus, ClientError> {
    match code {
        CODE_PRESENT => Ok(ReportStatus::Present),
        CODE_NOT_PRESENT => Ok(ReportStatus::NotPresent),
        CODE_QUEUED => Ok(ReportStatus::Queued),
        other => Err(ClientError::Decode(format!("unknown response_code {other}"))),
    }
}

#[async_trait]
impl ScanClient for VirusTotalClient {
    async fn submit(&self, bytes: &[u8], filename: &str) -> Result<ScanTicket, ClientError> {
        let part = Part::bytes(bytes.to_vec()).file_name(filename.to_string());
        let form = Form::new()
            .text("apikey", self.api_key.clone())
            .part("file", part);

        let response = self
            .http
            .post(format!("{}/file/scan", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let body: ScanResponse = Self::decode(response).await?;

        debug!(response_code = body.response_code, "scan submitted");
        match body.scan_id {
            Some(id) if body.response_code == CODE_PRESENT => Ok(ScanTicket::new(id)),
            _ => Err(ClientError::Rejected(
                body.verbose_msg
                    .unwrap_or_else(|| "scan request was not accepted".to_string()),
            )),
        }
    }

    async fn report(&self, ticket: &ScanTicket) -> Result<ScanReport, ClientError> {
        let response = self
            .http
            .get(format!("{}/file/report", self.base_url))
            .query(&[("apikey", self.api_key.as_str()), ("resource", ticket.id.as_str())])
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let body: ReportResponse = Self::decode(response).await?;

        Ok(ScanReport {
            status: report_status(body.response_code)?,
            positives: body.positives,
            engines: body.scans.into_keys().collect(),
            verbose_message: body.verbose_msg,
        })
    }
}
