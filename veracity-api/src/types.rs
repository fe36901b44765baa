//! Wire types exchanged with the verification service.

use serde::{Deserialize, Serialize};

/// Body of `POST /prediction`.
///
/// `title` carries either a URL or a headline depending on the session's
/// input mode; the service decides which by sniffing the value itself, so
/// the mode is never sent over the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimPayload {
    pub title: String,
    pub text: String,
}

/// The verification service's response, exactly as it arrives.
///
/// Every field is optional because the service is field-variant: older
/// deployments answer with `prediction` where newer ones use `verdict`,
/// `sources` may be absent entirely, and a processing problem is reported
/// in-band as `{"error": ...}` with a 2xx status. `method` and
/// `api_remaining` are service-side bookkeeping we tolerate but never act
/// on. See [`crate::report::VerificationReport::from_raw`] for the
/// translation into something the rest of the system is allowed to hold.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVerdict {
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub style_analysis: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub api_remaining: Option<String>,
}

/// Response of the service's `GET /` health probe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ai: String,
    #[serde(default)]
    pub tokens_active: u32,
    #[serde(default)]
    pub requests_processed: u64,
}

impl ServiceHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
