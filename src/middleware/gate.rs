//! Request gate middleware: runs `Gate::evaluate` for every matched request.
//!
//! - redirects (canonical path / locale / login / forbidden) end the request here (307)
//! - `Allow` puts the verified [`Identity`] into request extensions
//! - everything else continues to the inner service untouched

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};

use crate::gate::path::is_canonical;
use crate::gate::{Decision, GateRequest};
use crate::state::AppState;

/// Paths the gate never sees (build assets, image optimizer, favicon).
/// Only canonical paths qualify; `/_next/static/../admin` still goes through the gate.
pub const MATCHER_EXCLUDES: [&str; 3] = ["/_next/static", "/_next/image", "/favicon.ico"];

/// Verified caller, as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: Option<String>,
}

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, gate_middleware))
}

pub fn is_matcher_excluded(path: &str) -> bool {
    MATCHER_EXCLUDES.iter().any(|p| path.starts_with(p))
}

async fn gate_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if is_canonical(path) && is_matcher_excluded(path) {
        return next.run(req).await;
    }

    let decision = {
        let view = GateRequest::from_request(&req);
        state.gate.evaluate(&view).await
    };

    tracing::debug!(
        path = req.uri().path(),
        decision = decision.label(),
        "gate decision"
    );

    match decision {
        Decision::PassThrough => next.run(req).await,
        Decision::Allow { role } => {
            req.extensions_mut().insert(Identity { role });
            next.run(req).await
        }
        Decision::CanonicalRedirect { location }
        | Decision::LocaleRedirect { location }
        | Decision::RedirectToLogin { location }
        | Decision::RedirectToForbidden { location } => redirect(&location),
    }
}

fn redirect(location: &str) -> Response {
    (
        [(header::CACHE_CONTROL, "no-store")],
        Redirect::temporary(location),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_excludes_static_assets() {
        assert!(is_matcher_excluded("/_next/static/chunks/main.js"));
        assert!(is_matcher_excluded("/_next/image?url=%2Flogo.png"));
        assert!(is_matcher_excluded("/favicon.ico"));
        assert!(!is_matcher_excluded("/_next/data/build/en.json"));
        assert!(!is_matcher_excluded("/en/dashboard"));
    }

    #[test]
    fn redirect_is_temporary_and_uncached() {
        let res = redirect("/ar/login");
        assert_eq!(res.status(), axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/ar/login");
        assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");
    }
}
