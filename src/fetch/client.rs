//! HTTP client for the dashboard API.

use std::time::Duration;

use reqwest::Url;
use serde_json::{json, Value};

use crate::config::{ClientConfig, PolicyConfig};
use crate::models::{ApprovalAction, ApprovalQueue, NormalizedPrediction, RawRecord, ReportBundle, ReportKind};
use crate::normalize::{normalize_collection, normalize_prediction_with, normalize_queue};

use super::coordinator::{fetch_bundle, BundleSource};
use super::error::SourceError;

pub struct ReportsClient {
    base_url: String,
    token: Option<String>,
    deadline: Duration,
    client: reqwest::Client,
}

impl ReportsClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.deadline)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            deadline: config.deadline,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL. Each segment is percent-encoded, so ids
    /// cannot escape their path position.
    fn url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SourceError::Transport(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Transport(format!("base URL cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.url(&segments)
    }

    fn map_send_error(&self, e: reqwest::Error) -> SourceError {
        if e.is_connect() {
            SourceError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Transport(e.to_string())
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, SourceError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json(&self, url: Url) -> Result<Value, SourceError> {
        let response = self.send(self.client.get(url)).await?;
        response
            .json()
            .await
            .map_err(|e| SourceError::MalformedPayload(e.to_string()))
    }

    /// GET `path` (relative to the base URL) and parse the body as JSON.
    pub async fn fetch_json(&self, path: &str) -> Result<Value, SourceError> {
        let url = self.endpoint(path)?;
        self.get_json(url).await
    }

    /// Fetch every requested report concurrently under the configured
    /// deadline. Never fails; see [`fetch_bundle`].
    pub async fn fetch_reports(&self, kinds: &[ReportKind]) -> ReportBundle {
        self.fetch_reports_within(kinds, Some(self.deadline)).await
    }

    pub async fn fetch_reports_within(&self, kinds: &[ReportKind], deadline: Option<Duration>) -> ReportBundle {
        fetch_bundle(self.report_sources(kinds), deadline).await
    }

    /// One source per kind, for driving a [`BundleStore`](super::BundleStore)
    /// refresh directly.
    pub fn report_sources(&self, kinds: &[ReportKind]) -> Vec<BundleSource<'_>> {
        kinds
            .iter()
            .map(|&kind| BundleSource::new(kind, self.fetch_json(kind.endpoint())))
            .collect()
    }

    /// The pending approval queue, in server order.
    pub async fn fetch_approval_queue(&self, policy: &PolicyConfig) -> Result<ApprovalQueue, SourceError> {
        let payload = self.fetch_json("/api/approvals/queue").await?;
        Ok(normalize_queue(&RawRecord::new(payload), policy))
    }

    /// The prediction feed in server order (newest first). Sort with
    /// [`sort_by_score_desc`](crate::normalize::sort_by_score_desc) for a
    /// confidence ranking.
    pub async fn fetch_alerts_feed(&self, policy: &PolicyConfig) -> Result<Vec<NormalizedPrediction>, SourceError> {
        let payload = RawRecord::new(self.fetch_json("/api/alerts/feed").await?);
        Ok(normalize_collection(&payload, |r| normalize_prediction_with(r, policy)))
    }

    /// Raw detail record for one prediction; merge it with
    /// [`merge_prediction`](crate::normalize::merge_prediction).
    pub async fn fetch_alert_detail(&self, id: &str) -> Result<RawRecord, SourceError> {
        let url = self.url(&["api", "alerts", id])?;
        let payload = self.get_json(url).await?;
        if !payload.is_object() {
            return Err(SourceError::MalformedPayload("alert detail is not an object".into()));
        }
        Ok(RawRecord::new(payload))
    }

    /// Facility names offered by the report filter dropdown.
    pub async fn fetch_report_filters(&self) -> Result<Vec<String>, SourceError> {
        let payload = self.fetch_json("/api/reports/filters").await?;
        let phcs = payload
            .get("phcs")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        Ok(phcs)
    }

    /// Approve or reject a queued request.
    pub async fn submit_approval_action(&self, id: &str, action: ApprovalAction) -> Result<(), SourceError> {
        let url = self.url(&["api", "approvals", id, "action"])?;
        let request = self.client.post(url).json(&json!({ "action": action.as_str() }));
        self.send(request).await?;
        tracing::info!(id, action = %action, "Approval action submitted");
        Ok(())
    }
}
