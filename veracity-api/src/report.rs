//! Canonical display model and the normalization step that produces it.
//!
//! Normalization is the only path from [`RawVerdict`] into the rest of the
//! system. It resolves the `prediction`/`verdict` field split, clamps
//! confidence into a percentage, maps the style marker onto
//! [`StyleAssessment`], and drops source entries that do not parse as
//! absolute URLs (a downstream hostname-extraction step requires
//! well-formed ones).

use crate::types::RawVerdict;
use serde::Serialize;
use std::fmt;
use url::Url;

/// The service's classification of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Real,
    Fake,
    Uncertain,
}

impl Verdict {
    /// Anything the service sends that is not a recognised marker is
    /// treated as uncertain rather than rejected.
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("REAL") => Self::Real,
            Some(s) if s.eq_ignore_ascii_case("FAKE") => Self::Fake,
            _ => Self::Uncertain,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Real => "REAL",
            Self::Fake => "FAKE",
            Self::Uncertain => "UNCERTAIN",
        };
        f.write_str(s)
    }
}

/// Writing-style classification derived from the service's `style_analysis`
/// marker: `"REAL"` means the prose reads like straight reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StyleAssessment {
    Reliable,
    Sensationalist,
    Unknown,
}

impl fmt::Display for StyleAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reliable => "RELIABLE",
            Self::Sensationalist => "SENSATIONALIST",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A failure the service reported in-band as a decodable `{error}` payload.
///
/// Distinct from a transport failure: the message is meant for the user and
/// is surfaced verbatim.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ServiceReported(pub String);

/// Canonical verification result, post-normalization.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub verdict: Verdict,
    /// Always within 0..=100.
    pub confidence: u8,
    pub explanation: String,
    pub style: StyleAssessment,
    /// Syntactically valid absolute URLs only, original order preserved.
    pub sources: Vec<Url>,
}

impl VerificationReport {
    /// Translate a raw service payload into the canonical report.
    ///
    /// An `{error}` payload short-circuits into [`ServiceReported`] before
    /// any field interpretation happens.
    pub fn from_raw(raw: RawVerdict) -> Result<Self, ServiceReported> {
        if let Some(message) = raw.error {
            return Err(ServiceReported(message));
        }

        let verdict = Verdict::parse(raw.verdict.as_deref().or(raw.prediction.as_deref()));

        let confidence = raw
            .confidence
            .map(|c| c.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);

        let style = match raw.style_analysis.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("REAL") => StyleAssessment::Reliable,
            Some(_) => StyleAssessment::Sensationalist,
            None => StyleAssessment::Unknown,
        };

        let sources = raw
            .sources
            .unwrap_or_default()
            .iter()
            .filter_map(|s| match Url::parse(s) {
                Ok(url) => Some(url),
                Err(err) => {
                    tracing::debug!(source = %s, %err, "dropping malformed source URL");
                    None
                }
            })
            .collect();

        Ok(Self {
            verdict,
            confidence,
            explanation: raw.explanation.unwrap_or_default(),
            style,
            sources,
        })
    }
}
