//! Common types and utilities shared across Veracity crates.
//!
//! This crate defines configuration, observability helpers, and shared error
//! types used throughout the Veracity workspace. It is intentionally
//! lightweight and dependency‑minimal so that all crates can depend on it
//! without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`VeracityConfig`]: Top‑level runtime configuration
//! - [`InputMode`]: Which shape of claim the user is submitting
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`VeracityError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! Constructing a default configuration:
//!
//! ```rust
//! use veracity_common::{InputMode, VeracityConfig};
//!
//! let mut cfg = VeracityConfig::default();
//! cfg.default_mode = InputMode::Article;
//! assert_eq!(cfg.api_url, "http://localhost:5001");
//! ```
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod observability;

/// Which shape of claim the user is submitting.
///
/// `Url` means the title field carries a link to an article; `Article`
/// means the title field carries a headline and the body field carries the
/// article text. The mode only governs which fields collaborators require
/// and label — it never blocks a submission on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Url,
    Article,
}

impl FromStr for InputMode {
    type Err = VeracityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "url" => Ok(Self::Url),
            "article" | "text" => Ok(Self::Article),
            other => Err(VeracityError::Config(format!(
                "unknown input mode: {other:?} (expected \"url\" or \"article\")"
            ))),
        }
    }
}

/// Configuration for the Veracity client.
///
/// This structure is passed to the session and UI entrypoints to configure
/// runtime behavior. Values can be overridden from the environment via
/// [`VeracityConfig::from_env`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeracityConfig {
    /// Base address of the verification service.
    pub api_url: String,
    /// Input mode a fresh session starts in.
    pub default_mode: InputMode,
    /// Interval between cosmetic progress-stage advances, in milliseconds.
    pub stage_interval_ms: u64,
    /// Overall per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for VeracityConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5001".to_string(),
            default_mode: InputMode::default(),
            stage_interval_ms: 1_000,
            request_timeout_secs: 30,
        }
    }
}

impl VeracityConfig {
    /// Build a configuration from defaults overlaid with environment
    /// variables (`VERACITY_API_URL`, `VERACITY_DEFAULT_MODE`,
    /// `VERACITY_STAGE_INTERVAL_MS`, `VERACITY_REQUEST_TIMEOUT_SECS`).
    ///
    /// Unparseable values are logged and skipped rather than treated as
    /// fatal; the default stands in.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(url) = std::env::var("VERACITY_API_URL") {
            let trimmed = url.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                cfg.api_url = trimmed.to_string();
            }
        }
        if let Ok(raw) = std::env::var("VERACITY_DEFAULT_MODE") {
            match raw.parse::<InputMode>() {
                Ok(mode) => cfg.default_mode = mode,
                Err(err) => tracing::warn!(%err, "ignoring VERACITY_DEFAULT_MODE"),
            }
        }
        if let Ok(raw) = std::env::var("VERACITY_STAGE_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => cfg.stage_interval_ms = ms,
                _ => tracing::warn!(value = %raw, "ignoring VERACITY_STAGE_INTERVAL_MS"),
            }
        }
        if let Ok(raw) = std::env::var("VERACITY_REQUEST_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => cfg.request_timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "ignoring VERACITY_REQUEST_TIMEOUT_SECS"),
            }
        }

        cfg
    }
}

/// Error types used across the Veracity system.
#[derive(thiserror::Error, Debug)]
pub enum VeracityError {
    /// The verification service could not be reached or answered badly.
    #[error("Service error: {0}")]
    Service(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`VeracityError`].
pub type Result<T> = std::result::Result<T, VeracityError>;
