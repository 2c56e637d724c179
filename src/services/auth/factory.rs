/// Factory: build the identity verifier from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::{AuthVerifier, HttpAuthVerifier};

pub fn build_auth_verifier(config: &Config) -> Result<Arc<dyn AuthVerifier>, AppError> {
    let verifier =
        HttpAuthVerifier::new(&config.backend_url, config.verify_timeout).map_err(|err| {
            tracing::error!(error = %err, "failed to build identity service client");
            AppError::Internal
        })?;

    tracing::info!(url = %verifier.verify_url(), "identity verification endpoint");

    Ok(Arc::new(verifier))
}
