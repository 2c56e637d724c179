//! Reverse proxy to the front-end origin.
//!
//! Only requests the gate let through reach this point. Request bodies are
//! buffered (bounded by the body limit); response bodies are streamed back.
use std::net::{IpAddr, SocketAddr};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderName, HeaderValue, Request, Response, header},
};
use url::Url;

use crate::error::AppError;

/// Set from the verified role; any client supplied value is dropped.
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

#[derive(Clone, Debug)]
pub struct Upstream {
    client: reqwest::Client,
    base: Url,
    body_limit: usize,
}

impl Upstream {
    pub fn new(base: Url, body_limit: usize) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            // redirects from the front-end go back to the browser untouched
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| {
                tracing::error!(error = %err, "failed to build upstream client");
                AppError::Internal
            })?;

        Ok(Self {
            client,
            base,
            body_limit,
        })
    }

    pub fn target(&self, path: &str, query: Option<&str>) -> String {
        let base = self.base.as_str().trim_end_matches('/');
        match query {
            Some(q) => format!("{base}{path}?{q}"),
            None => format!("{base}{path}"),
        }
    }

    /// Forward `req`, tagging it with `role` when the gate verified one.
    pub async fn forward(
        &self,
        req: Request<Body>,
        role: Option<&str>,
    ) -> Result<Response<Body>, AppError> {
        let (parts, body) = req.into_parts();
        let url = self.target(parts.uri.path(), parts.uri.query());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let body = axum::body::to_bytes(body, self.body_limit)
            .await
            .map_err(|_| AppError::PayloadTooLarge)?;

        let mut headers = strip_hop_by_hop(parts.headers);
        set_forwarded(&mut headers, peer);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(&USER_ROLE_HEADER);
        if let Some(role) = role.and_then(role_header) {
            headers.insert(USER_ROLE_HEADER, role);
        }

        let res = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "upstream request failed");
                AppError::BadGateway
            })?;

        let status = res.status();
        let mut headers = strip_hop_by_hop(res.headers().clone());
        // hyper re-frames the streamed body; a stale length would conflict
        headers.remove(header::CONTENT_LENGTH);

        let mut out = Response::new(Body::from_stream(res.bytes_stream()));
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

/// Role as a header value. Roles that cannot be sent as a header are dropped.
fn role_header(role: &str) -> Option<HeaderValue> {
    match HeaderValue::from_str(role) {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(
                role = %role.escape_debug(),
                "verified role is not a valid header value; not forwarded"
            );
            None
        }
    }
}

/// X-Forwarded-Host / -Proto from the inbound request, client address appended
/// to X-Forwarded-For. Must run before `Host` is removed.
fn set_forwarded(headers: &mut HeaderMap, peer: Option<IpAddr>) {
    match headers.get(header::HOST).cloned() {
        Some(host) => {
            headers.insert(X_FORWARDED_HOST, host);
        }
        None => {
            headers.remove(X_FORWARDED_HOST);
        }
    }

    let https = headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|p| p.trim() == "https");
    let proto = if https { "https" } else { "http" };
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static(proto));

    let Some(peer) = peer else {
        return;
    };
    let chain = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) if !prior.trim().is_empty() => format!("{}, {peer}", prior.trim()),
        _ => peer.to_string(),
    };
    if let Ok(v) = HeaderValue::from_str(&chain) {
        headers.insert(X_FORWARDED_FOR, v);
    }
}

/// Removes the fixed hop-by-hop set plus every header named in `Connection`.
fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers
}
