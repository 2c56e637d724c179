//! Decision engine: canonical path → locale negotiation → classification → credential → verification → role.
//!
//! Every failure resolves to a redirect. Nothing here grants access on error.
use std::sync::Arc;

use crate::gate::credential::extract_credential;
use crate::gate::path::canonicalize;
use crate::gate::request::GateRequest;
use crate::gate::routes::{RouteClass, RouteTable};
use crate::services::auth::AuthVerifier;
use crate::services::locale::LocaleNegotiator;

pub const LOGIN_PAGE: &str = "login";
pub const FORBIDDEN_PAGE: &str = "forbidden";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Path is not in canonical form (`//`, dot segments, escaped letters).
    CanonicalRedirect { location: String },
    /// Locale missing from the URL; `location` is the localized URL.
    LocaleRedirect { location: String },
    /// Ignored or public path; no auth action.
    PassThrough,
    /// Credential verified. `role` is whatever the identity service reported.
    Allow { role: Option<String> },
    RedirectToLogin { location: String },
    RedirectToForbidden { location: String },
}

impl Decision {
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::CanonicalRedirect { location }
            | Self::LocaleRedirect { location }
            | Self::RedirectToLogin { location }
            | Self::RedirectToForbidden { location } => Some(location),
            Self::PassThrough | Self::Allow { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CanonicalRedirect { .. } => "canonical_redirect",
            Self::LocaleRedirect { .. } => "locale_redirect",
            Self::PassThrough => "pass_through",
            Self::Allow { .. } => "allow",
            Self::RedirectToLogin { .. } => "login_redirect",
            Self::RedirectToForbidden { .. } => "forbidden_redirect",
        }
    }
}

pub struct Gate {
    routes: RouteTable,
    negotiator: Arc<dyn LocaleNegotiator>,
    verifier: Arc<dyn AuthVerifier>,
    admin_role: String,
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("routes", &self.routes)
            .field("verifier", &self.verifier.backend_name())
            .field("admin_role", &self.admin_role)
            .finish()
    }
}

impl Gate {
    pub fn new(
        routes: RouteTable,
        negotiator: Arc<dyn LocaleNegotiator>,
        verifier: Arc<dyn AuthVerifier>,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            routes,
            negotiator,
            verifier,
            admin_role: admin_role.into(),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn evaluate(&self, req: &GateRequest<'_>) -> Decision {
        // rules are only ever matched against the canonical spelling
        let canonical = canonicalize(req.path);
        if canonical != req.path {
            let target = match req.query {
                Some(q) => format!("{canonical}?{q}"),
                None => canonical.into_owned(),
            };
            return Decision::CanonicalRedirect {
                location: req.absolute(&target),
            };
        }

        if let Some(location) = self.negotiator.negotiate(req) {
            return Decision::LocaleRedirect { location };
        }

        let class = self.routes.classify(req.path);
        if !class.requires_auth() {
            return Decision::PassThrough;
        }

        let locale = self.routes.locales().resolve(req.path);
        let login = || Decision::RedirectToLogin {
            location: req.absolute(&format!("/{locale}/{LOGIN_PAGE}")),
        };

        let Some(credential) = extract_credential(req.headers) else {
            tracing::debug!(path = req.path, "no credential cookie");
            return login();
        };

        let verification = match self.verifier.verify(&credential).await {
            Ok(v) if v.authenticated => v,
            Ok(_) => {
                tracing::warn!(
                    backend = self.verifier.backend_name(),
                    path = req.path,
                    "identity service reported unauthenticated"
                );
                return login();
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    backend = self.verifier.backend_name(),
                    path = req.path,
                    "credential verification failed"
                );
                return login();
            }
        };

        if class == RouteClass::AdminOnly
            && verification.role.as_deref() != Some(self.admin_role.as_str())
        {
            tracing::info!(
                path = req.path,
                role = verification.role.as_deref().unwrap_or("-"),
                "admin-only route denied"
            );
            return Decision::RedirectToForbidden {
                location: req.absolute(&format!("/{locale}/{FORBIDDEN_PAGE}")),
            };
        }

        Decision::Allow {
            role: verification.role,
        }
    }
}
