//! Environment-driven configuration.

use thiserror::Error;

pub const DEFAULT_JWT_SECRET: &str = "secret";
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// HMAC secret used to sign and verify credentials.
    pub jwt_secret: String,
    pub http_host: String,
    pub http_port: u16,
    /// Public base URL embedded into HTML pages (for API calls from the browser).
    pub public_url: String,
    /// When set, Postgres repositories are used; otherwise in-memory.
    pub database_url: Option<String>,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            public_url: String::new(),
            database_url: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let http_port = match get("HTTP_PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "HTTP_PORT",
                value: v.clone(),
            })?,
            None => defaults.http_port,
        };

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "MAX_BODY_BYTES",
                value: v.clone(),
            })?,
            None => defaults.max_body_bytes,
        };

        Ok(Self {
            jwt_secret,
            http_host: get("HTTP_HOST").unwrap_or(defaults.http_host),
            http_port,
            public_url: get("URL").unwrap_or(defaults.public_url),
            database_url: get("DATABASE_URL"),
            max_body_bytes,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("http_host", &self.http_host)
            .field("http_port", &self.http_port)
            .field("public_url", &self.public_url)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_every_variable() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("HTTP_HOST", "127.0.0.1"),
            ("HTTP_PORT", "9000"),
            ("URL", "http://remi.local"),
            ("DATABASE_URL", "postgres://localhost/remi"),
            ("MAX_BODY_BYTES", "2048"),
        ]))
        .unwrap();

        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert_eq!(cfg.public_url, "http://remi.local");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/remi"));
        assert_eq!(cfg.max_body_bytes, 2048);
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[("DATABASE_URL", ""), ("HTTP_PORT", " ")])).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.http_port, DEFAULT_HTTP_PORT);
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("HTTP_PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: "HTTP_PORT",
                value: "eighty".into()
            }
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = AppConfig {
            jwt_secret: "hunter2".into(),
            database_url: Some("postgres://user:pw@db/remi".into()),
            ..AppConfig::default()
        };
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("pw@db"));
    }
}
