//! Locale negotiation: send requests without a locale prefix to a localized URL.
//!
//! Preference order for the redirect target:
//! 1. `NEXT_LOCALE` cookie (when supported)
//! 2. `Accept-Language` (q-weighted, primary subtag)
//! 3. default locale
use axum::http::{HeaderMap, header};

use crate::gate::credential::cookie_value;
use crate::gate::locale::{Locales, first_segment};
use crate::gate::request::GateRequest;

pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

/// Decides whether a request must be redirected to a localized URL.
///
/// `Some(location)` ends request processing with a redirect.
pub trait LocaleNegotiator: Send + Sync + 'static {
    fn negotiate(&self, req: &GateRequest<'_>) -> Option<String>;
}

/// Always-prefixed locale routing: every page URL starts with `/{locale}`.
#[derive(Debug, Clone)]
pub struct PrefixNegotiator {
    locales: Locales,
    bypass: Vec<String>,
}

impl PrefixNegotiator {
    /// Paths under `bypass` are never redirected.
    pub fn new(locales: Locales, bypass: Vec<String>) -> Self {
        Self { locales, bypass }
    }

    fn preferred_locale(&self, headers: &HeaderMap) -> String {
        if let Some(cookie) = cookie_value(headers, LOCALE_COOKIE)
            && self.locales.is_supported(cookie)
        {
            return cookie.to_string();
        }

        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| best_accept_language(v, &self.locales))
            .unwrap_or_else(|| self.locales.default_locale().to_string())
    }
}

impl LocaleNegotiator for PrefixNegotiator {
    fn negotiate(&self, req: &GateRequest<'_>) -> Option<String> {
        if self.bypass.iter().any(|p| req.path.starts_with(p.as_str())) {
            return None;
        }
        if first_segment(req.path).is_some_and(|seg| self.locales.is_supported(seg)) {
            return None;
        }

        let locale = self.preferred_locale(req.headers);
        let path = if req.path == "/" || req.path.is_empty() {
            String::new()
        } else {
            req.path.to_string()
        };
        let target = match req.query {
            Some(q) if !q.is_empty() => format!("/{locale}{path}?{q}"),
            _ => format!("/{locale}{path}"),
        };

        Some(req.absolute(&target))
    }
}

/// Highest-weighted supported language in an `Accept-Language` value.
fn best_accept_language(value: &str, locales: &Locales) -> Option<String> {
    let mut ranked: Vec<(f32, &str)> = value
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            let q = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                .unwrap_or(1.0);
            (!tag.is_empty() && q > 0.0).then_some((q, tag))
        })
        .collect();

    // stable: equal weights keep header order
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    ranked.into_iter().find_map(|(_, tag)| {
        let primary = tag.split('-').next().unwrap_or(tag).to_ascii_lowercase();
        locales
            .supported()
            .iter()
            .find(|l| l.to_ascii_lowercase() == primary)
            .cloned()
    })
}
