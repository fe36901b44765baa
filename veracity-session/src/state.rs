//! Session state: what the user typed and where the request stands.

use std::time::Instant;
use veracity_api::VerificationReport;

pub use veracity_common::InputMode;

/// The claim as the user entered it.
///
/// `title` holds either the URL or the headline depending on the session's
/// input mode; `body` holds article text and is only meaningful in
/// [`InputMode::Article`]. Switching modes never clears either field.
#[derive(Debug, Clone, Default)]
pub struct ClaimInput {
    pub title: String,
    pub body: String,
}

impl ClaimInput {
    /// True when there is nothing worth submitting. Blank submissions are
    /// soft-ignored rather than surfaced as an error.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.body.trim().is_empty()
    }
}

/// Progress narrative shown while a request is outstanding. Purely
/// cosmetic; the request settles whenever the service answers, regardless
/// of which message is up.
pub const STAGE_MESSAGES: [&str; 4] = [
    "Searching databases...",
    "Analyzing content...",
    "Verifying sources...",
    "Finalizing report...",
];

/// Index of the stage the narrative holds at until the request settles.
pub const MAX_STAGE: usize = STAGE_MESSAGES.len() - 1;

/// Message for a given stage index, saturating at the last one.
pub fn stage_message(stage: usize) -> &'static str {
    STAGE_MESSAGES[stage.min(MAX_STAGE)]
}

/// Lifecycle of the single in-flight verification request.
#[derive(Debug, Clone)]
pub enum RequestState {
    Idle,
    Loading { stage: usize, started_at: Instant },
    Succeeded { report: VerificationReport },
    Failed { message: String },
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// A settled request has either a report or a user-facing message.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}
