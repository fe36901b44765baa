//! Verification request orchestrator.
//!
//! [`VerifySession`] owns the input state, the single-request lifecycle,
//! and the cosmetic progress narrative shown while a verification request
//! is outstanding. The presentation layer reads state through snapshot
//! accessors or a `watch` subscription and mutates it only through the
//! operations the session exposes.
mod session;
mod state;

pub use session::{VerifySession, TRANSPORT_FAILURE_MESSAGE};
pub use state::{stage_message, ClaimInput, InputMode, RequestState, MAX_STAGE, STAGE_MESSAGES};
