/*
 * Responsibility
 * - 環境変数の読み込み (BACKEND_URL, UPSTREAM_URL, locale, route rules など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::gate::locale::Locales;
use crate::gate::routes::{MatchMode, RouteRule, RouteTable};
use crate::gate::{FORBIDDEN_PAGE, LOGIN_PAGE};

pub const DEFAULT_BACKEND_URL: &str = "https://your-backend.example.com";
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:3001";

const DEFAULT_LOCALES: &str = "en,ar";
const DEFAULT_LOCALE: &str = "ar";
const DEFAULT_PROTECTED_ROUTES: &str = "/dashboard,/admin,/teachers,/supervisors";
const DEFAULT_ADMIN_ONLY_ROUTES: &str = "/admin/supervisors,/admin/*";
const DEFAULT_IGNORED_PREFIXES: &str = "/_next/,/favicon.ico,/api/public,/public/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub backend_url: Url,
    pub upstream_url: Url,

    pub routes: RouteTable,
    pub admin_role: String,

    pub verify_timeout: Duration,
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, test maps).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(p) => p.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV"));

        let backend_url = parse_url(var("BACKEND_URL"), DEFAULT_BACKEND_URL, "BACKEND_URL")?;
        let upstream_url = parse_url(var("UPSTREAM_URL"), DEFAULT_UPSTREAM_URL, "UPSTREAM_URL")?;

        let supported = split_list(&var("SUPPORTED_LOCALES").unwrap_or(DEFAULT_LOCALES.into()));
        let default_locale = var("DEFAULT_LOCALE").unwrap_or(DEFAULT_LOCALE.into());
        let locales = Locales::new(supported, default_locale.trim())
            .ok_or(ConfigError::Invalid("DEFAULT_LOCALE"))?;

        let protected = parse_rules(
            var("PROTECTED_ROUTES"),
            DEFAULT_PROTECTED_ROUTES,
            "PROTECTED_ROUTES",
        )?;
        let admin_only = parse_rules(
            var("ADMIN_ONLY_ROUTES"),
            DEFAULT_ADMIN_ONLY_ROUTES,
            "ADMIN_ONLY_ROUTES",
        )?;

        let ignored =
            split_list(&var("IGNORED_PREFIXES").unwrap_or(DEFAULT_IGNORED_PREFIXES.into()));
        if ignored.iter().any(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid("IGNORED_PREFIXES"));
        }

        let mode = match var("ROUTE_MATCH_MODE") {
            Some(m) => m
                .parse::<MatchMode>()
                .map_err(|_| ConfigError::Invalid("ROUTE_MATCH_MODE"))?,
            None => MatchMode::default(),
        };

        let routes = RouteTable::new(locales, ignored, protected, admin_only, mode);

        // login / forbidden must stay reachable or every denial loops
        if routes
            .gated_landing_page(&[LOGIN_PAGE, FORBIDDEN_PAGE])
            .is_some()
        {
            return Err(ConfigError::Invalid("PROTECTED_ROUTES"));
        }

        let admin_role = var("ADMIN_ROLE")
            .map(|r| r.trim().to_string())
            .unwrap_or_else(|| "admin".to_string());

        let verify_timeout = Duration::from_millis(parse_num(
            var("VERIFY_TIMEOUT_MS"),
            3000,
            "VERIFY_TIMEOUT_MS",
        )?);
        let request_timeout = Duration::from_secs(parse_num(
            var("REQUEST_TIMEOUT_SECS"),
            30,
            "REQUEST_TIMEOUT_SECS",
        )?);
        let body_limit_bytes =
            parse_num(var("BODY_LIMIT_BYTES"), 1024 * 1024, "BODY_LIMIT_BYTES")? as usize;

        if verify_timeout.is_zero() {
            return Err(ConfigError::Invalid("VERIFY_TIMEOUT_MS"));
        }

        Ok(Self {
            addr,
            app_env,
            backend_url,
            upstream_url,
            routes,
            admin_role,
            verify_timeout,
            request_timeout,
            body_limit_bytes,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_url(raw: Option<String>, default: &str, key: &'static str) -> Result<Url, ConfigError> {
    let raw = raw.unwrap_or_else(|| default.to_string());
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid(key))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::Invalid(key)),
    }
}

fn parse_rules(
    raw: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<Vec<RouteRule>, ConfigError> {
    split_list(raw.as_deref().unwrap_or(default))
        .iter()
        .map(|r| RouteRule::parse(r).map_err(|_| ConfigError::Invalid(key)))
        .collect()
}

fn parse_num(raw: Option<String>, default: u64, key: &'static str) -> Result<u64, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::gate::routes::RouteClass;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = load(&[]).unwrap();
        assert_eq!(c.addr.port(), 3000);
        assert_eq!(c.app_env, AppEnv::Development);
        assert_eq!(c.backend_url.as_str(), "https://your-backend.example.com/");
        assert_eq!(c.routes.locales().default_locale(), "ar");
        assert_eq!(c.admin_role, "admin");
        assert_eq!(c.verify_timeout, Duration::from_secs(3));
        assert_eq!(c.routes.classify("/ar/admin/supervisors"), RouteClass::AdminOnly);
        assert_eq!(c.routes.classify("/en/dashboard"), RouteClass::Protected);
        assert_eq!(c.routes.classify("/_next/static/x.js"), RouteClass::Ignored);
    }

    #[test]
    fn overrides() {
        let c = load(&[
            ("PORT", "8080"),
            ("APP_ENV", "prod"),
            ("BACKEND_URL", "http://identity.internal:9000"),
            ("SUPPORTED_LOCALES", "en, fr"),
            ("DEFAULT_LOCALE", "fr"),
            ("PROTECTED_ROUTES", "/account"),
            ("ADMIN_ONLY_ROUTES", "/account/admin/*"),
            ("ROUTE_MATCH_MODE", "segment"),
            ("ADMIN_ROLE", "superuser"),
            ("VERIFY_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(c.addr.port(), 8080);
        assert!(c.app_env.is_production());
        assert_eq!(c.routes.locales().resolve("/x"), "fr");
        assert_eq!(c.routes.classify("/fr/account"), RouteClass::Protected);
        assert_eq!(c.routes.classify("/fr/account/admin"), RouteClass::AdminOnly);
        assert_eq!(c.routes.classify("/fr/account/administer"), RouteClass::Protected);
        assert_eq!(c.routes.classify("/fr/dashboard"), RouteClass::Public);
        assert_eq!(c.admin_role, "superuser");
        assert_eq!(c.verify_timeout, Duration::from_millis(250));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            load(&[("DEFAULT_LOCALE", "de")]).unwrap_err(),
            ConfigError::Invalid("DEFAULT_LOCALE")
        );
        assert_eq!(
            load(&[("BACKEND_URL", "not a url")]).unwrap_err(),
            ConfigError::Invalid("BACKEND_URL")
        );
        assert_eq!(
            load(&[("UPSTREAM_URL", "ftp://files")]).unwrap_err(),
            ConfigError::Invalid("UPSTREAM_URL")
        );
        assert_eq!(
            load(&[("PROTECTED_ROUTES", "dashboard")]).unwrap_err(),
            ConfigError::Invalid("PROTECTED_ROUTES")
        );
        assert_eq!(
            load(&[("ROUTE_MATCH_MODE", "regex")]).unwrap_err(),
            ConfigError::Invalid("ROUTE_MATCH_MODE")
        );
        assert_eq!(
            load(&[("PORT", "http")]).unwrap_err(),
            ConfigError::Invalid("PORT")
        );
        assert_eq!(
            load(&[("BODY_LIMIT_BYTES", "1MB")]).unwrap_err(),
            ConfigError::Invalid("BODY_LIMIT_BYTES")
        );
        assert_eq!(
            load(&[("VERIFY_TIMEOUT_MS", "0")]).unwrap_err(),
            ConfigError::Invalid("VERIFY_TIMEOUT_MS")
        );
    }

    #[test]
    fn rejects_gated_login_page() {
        assert_eq!(
            load(&[("PROTECTED_ROUTES", "/dashboard,/login")]).unwrap_err(),
            ConfigError::Invalid("PROTECTED_ROUTES")
        );
    }
}
