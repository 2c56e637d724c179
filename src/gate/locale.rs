/*
 * Responsibility
 * - 対応ロケールの集合と既定ロケール
 * - path の先頭セグメントからロケールを決める / 取り除く
 */

/// Supported locales plus the one used when the path carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locales {
    supported: Vec<String>,
    default: String,
}

impl Locales {
    /// Returns `None` when `default` is not part of `supported`.
    pub fn new(supported: Vec<String>, default: impl Into<String>) -> Option<Self> {
        let default = default.into();
        if !supported.iter().any(|l| *l == default) {
            return None;
        }
        Some(Self { supported, default })
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn is_supported(&self, candidate: &str) -> bool {
        self.supported.iter().any(|l| l == candidate)
    }

    /// Locale named by the first path segment, else the default.
    ///
    /// `/en/dashboard` -> `en`, `/fr/dashboard` -> default, `/` -> default.
    pub fn resolve<'a>(&'a self, path: &'a str) -> &'a str {
        match first_segment(path) {
            Some(seg) if self.is_supported(seg) => seg,
            _ => &self.default,
        }
    }

    /// Path with a leading supported-locale segment removed.
    ///
    /// `/ar/admin/x` -> `/admin/x`, `/ar` -> `/`, `/admin` -> `/admin`.
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        let Some(seg) = first_segment(path) else {
            return path;
        };
        if !self.is_supported(seg) {
            return path;
        }

        let trimmed = path.trim_start_matches('/');
        let rest = &trimmed[seg.len()..];
        if rest.is_empty() { "/" } else { rest }
    }
}

/// First non-empty `/`-separated segment.
pub(crate) fn first_segment(path: &str) -> Option<&str> {
    path.split('/').find(|s| !s.is_empty())
}
