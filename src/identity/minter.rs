use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::token::{IdToken, SessionArtifact};

/// Why the identity provider did not hand back a session artifact.
#[derive(Debug, Error)]
pub enum MintError {
    /// The provider answered but refused the token (expired, revoked, malformed, wrong project).
    #[error("provider rejected token (status {status}): {reason}")]
    Rejected { status: u16, reason: String },
    /// The provider could not be reached or the exchange was cut short.
    #[error("provider transport failure: {0}")]
    Transport(String),
    /// The provider answered 2xx with a body we could not use.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Capability to exchange an identity token for a session artifact.
///
/// Implementations make exactly one outbound call per `mint` and never retry.
#[async_trait]
pub trait TokenMinter: Send + Sync + 'static {
    async fn mint(&self, token: &IdToken, ttl: Duration) -> Result<SessionArtifact, MintError>;
}
