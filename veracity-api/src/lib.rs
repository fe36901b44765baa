//! Client-side boundary for the claim verification service.
//!
//! This crate owns everything that touches the wire: the request payload,
//! the loosely-structured response shape the service actually sends, the
//! [`traits::VerificationService`] seam that the session layer is written
//! against, and the normalization step that turns a raw payload into a
//! canonical [`report::VerificationReport`].
//!
//! The raw payload never leaves this crate; callers only ever see the
//! canonical report or a typed error.
pub mod client;
pub mod report;
pub mod traits;
pub mod types;

pub use client::{ApiError, PredictionClient};
pub use report::{ServiceReported, StyleAssessment, Verdict, VerificationReport};
pub use traits::VerificationService;
pub use types::{ClaimPayload, RawVerdict, ServiceHealth};
