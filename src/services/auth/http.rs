//! Remote identity service client (`GET {BACKEND_URL}/api/auth/verify`).
use std::time::Duration;

use async_trait::async_trait;
use axum::http::header;
use serde::Deserialize;
use url::Url;

use crate::gate::credential::Credential;
use crate::services::auth::verifier::{AuthVerifier, Verification, VerifyError};

pub const VERIFY_PATH: &str = "/api/auth/verify";

/// Body returned by the identity service.
///
/// `{ authenticated?: bool, role?: string, user?: { role?: string } }`
#[derive(Debug, Default, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    authenticated: Option<bool>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    user: Option<VerifyUser>,
}

#[derive(Debug, Default, Deserialize)]
struct VerifyUser {
    #[serde(default)]
    role: Option<String>,
}

impl VerifyResponse {
    fn into_verification(self) -> Result<Verification, VerifyError> {
        // absent means the 2xx status already vouches for the token
        if self.authenticated == Some(false) {
            return Err(VerifyError::Unauthenticated);
        }

        let role = self
            .role
            .filter(|r| !r.is_empty())
            .or_else(|| self.user.and_then(|u| u.role).filter(|r| !r.is_empty()));

        Ok(Verification {
            authenticated: true,
            role,
        })
    }
}

#[derive(Clone, Debug)]
pub struct HttpAuthVerifier {
    client: reqwest::Client,
    verify_url: Url,
}

impl HttpAuthVerifier {
    /// `backend_url` is the service base; the verify path is appended to it.
    pub fn new(backend_url: &Url, timeout: Duration) -> Result<Self, VerifyError> {
        let verify_url = verify_url(backend_url)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(VerifyError::Transport)?;

        Ok(Self { client, verify_url })
    }

    pub fn verify_url(&self) -> &Url {
        &self.verify_url
    }
}

/// Appends [`VERIFY_PATH`] to the base, keeping any path prefix it has.
pub fn verify_url(backend_url: &Url) -> Result<Url, VerifyError> {
    let base = backend_url.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}{VERIFY_PATH}")).map_err(|e| VerifyError::Decode(e.to_string()))
}

#[async_trait]
impl AuthVerifier for HttpAuthVerifier {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn verify(&self, credential: &Credential) -> Result<Verification, VerifyError> {
        let res = self
            .client
            .get(self.verify_url.clone())
            .bearer_auth(credential.expose())
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(map_transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(VerifyError::Rejected(status));
        }

        let body = res.bytes().await.map_err(map_transport)?;
        let parsed: VerifyResponse =
            serde_json::from_slice(&body).map_err(|e| VerifyError::Decode(e.to_string()))?;

        parsed.into_verification()
    }
}

fn map_transport(e: reqwest::Error) -> VerifyError {
    if e.is_timeout() {
        VerifyError::Timeout
    } else {
        VerifyError::Transport(e)
    }
}
