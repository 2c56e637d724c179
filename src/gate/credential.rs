/*
 * Responsibility
 * - Cookie ヘッダから bearer credential を取り出す
 * - 形式の検証はしない (検証は identity service 側)
 */
use std::fmt;

use axum::http::{HeaderMap, header};

/// Cookie names checked in priority order. `token` is the legacy name.
pub const CREDENTIAL_COOKIES: [&str; 2] = ["auth-token", "token"];

/// Opaque bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// First non-empty value among [`CREDENTIAL_COOKIES`].
pub fn extract_credential(headers: &HeaderMap) -> Option<Credential> {
    CREDENTIAL_COOKIES
        .iter()
        .find_map(|name| cookie_value(headers, name).filter(|v| !v.is_empty()))
        .map(Credential::new)
}

/// Value of cookie `name`, searching every `Cookie` header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| unquote(v.trim()))
}

fn unquote(v: &str) -> &str {
    v.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for c in cookies {
            h.append(header::COOKIE, HeaderValue::from_str(c).unwrap());
        }
        h
    }

    #[test]
    fn prefers_auth_token() {
        let h = headers(&["token=legacy; auth-token=primary"]);
        assert_eq!(extract_credential(&h).unwrap().expose(), "primary");
    }

    #[test]
    fn falls_back_to_legacy_name() {
        let h = headers(&["theme=dark; token=legacy"]);
        assert_eq!(extract_credential(&h).unwrap().expose(), "legacy");
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let h = headers(&["auth-token=; token=legacy"]);
        assert_eq!(extract_credential(&h).unwrap().expose(), "legacy");

        let h = headers(&["auth-token="]);
        assert!(extract_credential(&h).is_none());
    }

    #[test]
    fn absent_without_cookies() {
        assert!(extract_credential(&HeaderMap::new()).is_none());
        assert!(extract_credential(&headers(&["my-token=x; tokens=y"])).is_none());
    }

    #[test]
    fn searches_all_cookie_headers() {
        let h = headers(&["theme=dark", "auth-token=\"abc.def\""]);
        assert_eq!(extract_credential(&h).unwrap().expose(), "abc.def");
    }

    #[test]
    fn debug_is_redacted() {
        let c = Credential::new("secret");
        assert!(!format!("{c:?}").contains("secret"));
    }
}
