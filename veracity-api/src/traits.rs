use crate::client::ApiError;
use crate::types::{ClaimPayload, RawVerdict, ServiceHealth};
use async_trait::async_trait;

/// Seam between the session layer and the verification service.
///
/// The session is written against this trait so its lifecycle logic can be
/// exercised with an in-process fake; [`crate::PredictionClient`] is the
/// real HTTP implementation.
#[async_trait]
pub trait VerificationService: Send + Sync {
    /// Submit a claim for verification. Exactly one attempt, no retry.
    ///
    /// `Ok` means the service produced a decodable payload — which may
    /// still carry an in-band `{error}`; callers distinguish that during
    /// normalization. `Err` means transport failed: the connection, the
    /// status code, or the body encoding.
    async fn predict(&self, claim: &ClaimPayload) -> Result<RawVerdict, ApiError>;

    /// Probe the service's health endpoint.
    async fn health_check(&self) -> Result<ServiceHealth, ApiError>;
}
