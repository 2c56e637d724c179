//! Route classification.
//!
//! Paths are classified against static rule lists built once at startup:
//! - ignored prefixes (checked on the raw path)
//! - admin-only rules, then protected rules (checked on the locale-relative path)
//!
//! Both run on the canonical form of the path (see [`super::path`]).
//!
//! A rule is either a plain path (`/dashboard`, matches itself and anything
//! below it) or a wildcard (`/admin/*`).

use std::str::FromStr;

use super::locale::Locales;
use super::path::canonicalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Ignored,
    AdminOnly,
    Protected,
    Public,
}

impl RouteClass {
    /// AdminOnly paths need a credential too.
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::AdminOnly | Self::Protected)
    }
}

/// How a wildcard rule `base/*` compares against a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// `path.starts_with(base)`: `/admin/*` also covers `/admin-panel`.
    #[default]
    Prefix,
    /// `path == base` or `path.starts_with(base + "/")`.
    Segment,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteConfigError {
    #[error("route rule must start with '/': {0:?}")]
    InvalidRule(String),
    #[error("unknown route match mode: {0:?} (expected `prefix` or `segment`)")]
    UnknownMatchMode(String),
}

impl FromStr for MatchMode {
    type Err = RouteConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "segment" => Ok(Self::Segment),
            _ => Err(RouteConfigError::UnknownMatchMode(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRule {
    Exact(String),
    Wildcard(String),
}

impl RouteRule {
    pub fn parse(raw: &str) -> Result<Self, RouteConfigError> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(RouteConfigError::InvalidRule(raw.to_string()));
        }

        Ok(match raw.strip_suffix("/*") {
            Some(base) => Self::Wildcard(base.to_string()),
            None => Self::Exact(raw.to_string()),
        })
    }

    pub fn matches(&self, path: &str, mode: MatchMode) -> bool {
        match self {
            Self::Exact(rule) => path_is_under(path, rule),
            Self::Wildcard(base) => match mode {
                MatchMode::Prefix => path.starts_with(base.as_str()),
                MatchMode::Segment => path_is_under(path, base),
            },
        }
    }
}

fn path_is_under(path: &str, rule: &str) -> bool {
    path == rule
        || path
            .strip_prefix(rule)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Static rule set injected into the gate.
#[derive(Debug, Clone)]
pub struct RouteTable {
    locales: Locales,
    ignored: Vec<String>,
    protected: Vec<RouteRule>,
    admin_only: Vec<RouteRule>,
    mode: MatchMode,
}

impl RouteTable {
    pub fn new(
        locales: Locales,
        ignored: Vec<String>,
        protected: Vec<RouteRule>,
        admin_only: Vec<RouteRule>,
        mode: MatchMode,
    ) -> Self {
        Self {
            locales,
            ignored,
            protected,
            admin_only,
            mode,
        }
    }

    pub fn locales(&self) -> &Locales {
        &self.locales
    }

    pub fn ignored_prefixes(&self) -> &[String] {
        &self.ignored
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        let path = canonicalize(path);
        if self.is_ignored(&path) {
            return RouteClass::Ignored;
        }

        let relative = self.locales.strip(&path);

        if self.admin_only.iter().any(|r| r.matches(relative, self.mode)) {
            RouteClass::AdminOnly
        } else if self.protected.iter().any(|r| r.matches(relative, self.mode)) {
            RouteClass::Protected
        } else {
            RouteClass::Public
        }
    }

    /// First `/{locale}/{page}` that would itself require auth, if any.
    ///
    /// Redirect targets must stay reachable without a credential.
    pub fn gated_landing_page(&self, pages: &[&str]) -> Option<String> {
        self.locales
            .supported()
            .iter()
            .flat_map(|l| pages.iter().map(move |p| format!("/{l}/{p}")))
            .find(|path| self.classify(path).requires_auth())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(raw: &[&str]) -> Vec<RouteRule> {
        raw.iter().map(|r| RouteRule::parse(r).unwrap()).collect()
    }

    fn table(mode: MatchMode) -> RouteTable {
        RouteTable::new(
            Locales::new(vec!["en".into(), "ar".into()], "ar").unwrap(),
            vec![
                "/_next/".into(),
                "/favicon.ico".into(),
                "/api/public".into(),
                "/public/".into(),
            ],
            rules(&["/dashboard", "/admin", "/teachers", "/supervisors"]),
            rules(&["/admin/supervisors", "/admin/*"]),
            mode,
        )
    }

    #[test]
    fn parses_rules() {
        assert_eq!(
            RouteRule::parse("/admin/*").unwrap(),
            RouteRule::Wildcard("/admin".into())
        );
        assert_eq!(
            RouteRule::parse(" /dashboard ").unwrap(),
            RouteRule::Exact("/dashboard".into())
        );
        assert!(RouteRule::parse("dashboard").is_err());
    }

    #[test]
    fn ignored_prefixes_win() {
        let t = table(MatchMode::Prefix);
        assert_eq!(t.classify("/_next/static/chunk.js"), RouteClass::Ignored);
        assert_eq!(t.classify("/favicon.ico"), RouteClass::Ignored);
        assert_eq!(t.classify("/api/public/items"), RouteClass::Ignored);
        assert_eq!(t.classify("/public/logo.png"), RouteClass::Ignored);
    }

    #[test]
    fn protected_and_admin_only() {
        let t = table(MatchMode::Prefix);
        assert_eq!(t.classify("/ar/dashboard"), RouteClass::Protected);
        assert_eq!(t.classify("/en/dashboard/stats"), RouteClass::Protected);
        assert_eq!(t.classify("/dashboard"), RouteClass::Protected);
        assert_eq!(t.classify("/en/teachers"), RouteClass::Protected);
        assert_eq!(t.classify("/ar/admin/supervisors"), RouteClass::AdminOnly);
        assert_eq!(t.classify("/admin/supervisors"), RouteClass::AdminOnly);
        assert_eq!(t.classify("/en/admin"), RouteClass::AdminOnly);
        assert_eq!(t.classify("/en/admin/reports"), RouteClass::AdminOnly);
    }

    #[test]
    fn exact_rules_respect_segment_boundary() {
        let t = table(MatchMode::Prefix);
        assert_eq!(t.classify("/en/dashboards"), RouteClass::Public);
        assert_eq!(t.classify("/en/teachers-list"), RouteClass::Public);
    }

    #[test]
    fn wildcard_mode_decides_admin_panel() {
        assert_eq!(
            table(MatchMode::Prefix).classify("/en/admin-panel"),
            RouteClass::AdminOnly
        );
        assert_eq!(
            table(MatchMode::Segment).classify("/en/admin-panel"),
            RouteClass::Public
        );
        assert_eq!(
            table(MatchMode::Segment).classify("/en/admin/x"),
            RouteClass::AdminOnly
        );
    }

    #[test]
    fn non_canonical_spellings_classify_like_canonical() {
        let t = table(MatchMode::Prefix);
        assert_eq!(t.classify("/ar//admin/supervisors"), RouteClass::AdminOnly);
        assert_eq!(t.classify("/ar/%61dmin"), RouteClass::AdminOnly);
        assert_eq!(t.classify("/en/./dashboard"), RouteClass::Protected);
        assert_eq!(t.classify("/_next/static/../../ar/admin"), RouteClass::AdminOnly);
        assert_eq!(t.classify("//en//teachers//"), RouteClass::Protected);
    }

    #[test]
    fn public_paths() {
        let t = table(MatchMode::Prefix);
        assert_eq!(t.classify("/"), RouteClass::Public);
        assert_eq!(t.classify("/ar"), RouteClass::Public);
        assert_eq!(t.classify("/en/about"), RouteClass::Public);
    }

    #[test]
    fn landing_pages_never_gated() {
        let t = table(MatchMode::Prefix);
        for locale in ["en", "ar"] {
            assert_eq!(t.classify(&format!("/{locale}/login")), RouteClass::Public);
            assert_eq!(
                t.classify(&format!("/{locale}/forbidden")),
                RouteClass::Public
            );
        }
        assert_eq!(t.gated_landing_page(&["login", "forbidden"]), None);
    }

    #[test]
    fn detects_gated_landing_page() {
        let t = RouteTable::new(
            Locales::new(vec!["en".into()], "en").unwrap(),
            vec![],
            rules(&["/login"]),
            vec![],
            MatchMode::Prefix,
        );
        assert_eq!(
            t.gated_landing_page(&["login", "forbidden"]).as_deref(),
            Some("/en/login")
        );
    }

    #[test]
    fn match_mode_from_str() {
        assert_eq!("Segment".parse::<MatchMode>(), Ok(MatchMode::Segment));
        assert_eq!("prefix".parse::<MatchMode>(), Ok(MatchMode::Prefix));
        assert_eq!(
            " glob ".parse::<MatchMode>(),
            Err(RouteConfigError::UnknownMatchMode("glob".into()))
        );
    }

    #[test]
    fn route_errors_describe_the_input() {
        assert_eq!(
            RouteRule::parse("dashboard").unwrap_err().to_string(),
            r#"route rule must start with '/': "dashboard""#
        );
        assert_eq!(
            "glob".parse::<MatchMode>().unwrap_err().to_string(),
            r#"unknown route match mode: "glob" (expected `prefix` or `segment`)"#
        );
    }
}
