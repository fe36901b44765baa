//! HTTP client for the verification service.

use crate::traits::VerificationService;
use crate::types::{ClaimPayload, RawVerdict, ServiceHealth};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Errors at the service boundary. All variants are transport-level from
/// the session's point of view; the variants exist so logs can say what
/// actually went wrong.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid service URL: {0}")]
    Url(String),

    #[error("client build failed: {0}")]
    Build(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("service answered {status}: {body_snippet}")]
    Status {
        status: StatusCode,
        body_snippet: String,
    },

    #[error("undecodable response body: {0}")]
    Decode(String),
}

/// Client for the verification service's prediction endpoint.
///
/// Holds a pooled `reqwest` client anchored to a base address; cloning is
/// cheap and shares the pool.
#[derive(Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
}

impl PredictionClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build a client anchored to `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    /// Build a client with an explicit overall per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiError::Url("empty base URL".to_string()));
        }
        reqwest::Url::parse(trimmed).map_err(|e| ApiError::Url(e.to_string()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode_response(resp).await
    }
}

#[async_trait]
impl VerificationService for PredictionClient {
    async fn predict(&self, claim: &ClaimPayload) -> Result<RawVerdict, ApiError> {
        let url = format!("{}/prediction", self.base_url);
        let started = std::time::Instant::now();
        tracing::debug!(
            title_len = claim.title.len(),
            text_len = claim.text.len(),
            "prediction.request.start"
        );

        let resp = self
            .client
            .post(&url)
            .json(claim)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "prediction.request.network_error");
                ApiError::Network(e.to_string())
            })?;

        let status = resp.status();
        let raw: RawVerdict = decode_response(resp).await?;
        tracing::debug!(
            %status,
            duration_ms = started.elapsed().as_millis() as u64,
            verdict = raw.verdict.as_deref().or(raw.prediction.as_deref()),
            service_error = raw.error.is_some(),
            "prediction.request.done"
        );
        Ok(raw)
    }

    async fn health_check(&self) -> Result<ServiceHealth, ApiError> {
        self.get_json("/").await
    }
}

/// Decode a 2xx JSON body; anything else is a transport-level failure.
async fn decode_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            body_snippet: snip_body(&bytes),
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::warn!(
            serde_err = %e,
            body_snippet = %snip_body(&bytes),
            "response.decode_error"
        );
        ApiError::Decode(e.to_string())
    })
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(500);
        snip.push_str("...");
    }
    snip
}
