use axum::http::{HeaderMap, Request, header};

/// Borrowed view of the inbound request that the gate decides on.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub headers: &'a HeaderMap,
}

impl<'a> GateRequest<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            headers: req.headers(),
        }
    }

    /// `{proto}://{host}` from `Host` and `X-Forwarded-Proto` (default `http`).
    pub fn origin(&self) -> Option<String> {
        let host = self
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|h| !h.is_empty())?;

        let proto = self
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|p| matches!(*p, "http" | "https"))
            .unwrap_or("http");

        Some(format!("{proto}://{host}"))
    }

    /// Redirect location for `target` (a path): absolute when the origin is known.
    pub fn absolute(&self, target: &str) -> String {
        match self.origin() {
            Some(origin) => format!("{origin}{target}"),
            None => target.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn borrows_path_and_query() {
        let req = Request::builder()
            .uri("/en/dashboard?tab=2")
            .body(Body::empty())
            .unwrap();
        let g = GateRequest::from_request(&req);
        assert_eq!(g.path, "/en/dashboard");
        assert_eq!(g.query, Some("tab=2"));
        assert_eq!(g.absolute("/en/login"), "/en/login");
    }

    #[test]
    fn builds_origin_from_headers() {
        let req = Request::builder()
            .uri("/")
            .header(header::HOST, "app.local:8080")
            .header("x-forwarded-proto", "https, http")
            .body(Body::empty())
            .unwrap();
        let g = GateRequest::from_request(&req);
        assert_eq!(g.origin().as_deref(), Some("https://app.local:8080"));
    }

    #[test]
    fn unknown_proto_falls_back_to_http() {
        let req = Request::builder()
            .uri("/")
            .header(header::HOST, "app.local")
            .header("x-forwarded-proto", "gopher")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            GateRequest::from_request(&req).absolute("/ar/forbidden"),
            "http://app.local/ar/forbidden"
        );
    }
}
