//! Identity verification interface used by the gate.
use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;

use crate::gate::credential::Credential;

/// Outcome of a successful verification call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Verification {
    /// The gate treats `false` as a failed verification, whatever the role.
    pub authenticated: bool,
    pub role: Option<String>,
}

impl Verification {
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            role: Some(role.into()),
        }
    }
}

/// Every variant means "invalid token" to the gate (fail-closed).
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("identity service rejected token: {0}")]
    Rejected(StatusCode),
    #[error("identity service reported unauthenticated")]
    Unauthenticated,
    #[error("identity service timed out")]
    Timeout,
    #[error("identity service unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid verification response: {0}")]
    Decode(String),
}

/// Validates a bearer credential against an identity backend.
///
/// Implementations must not cache results: a revoked token has to fail on
/// the very next request.
#[async_trait]
pub trait AuthVerifier: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn verify(&self, credential: &Credential) -> Result<Verification, VerifyError>;
}
