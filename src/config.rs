/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, TOKEN_SECRET, redirect 先、必要ロールなど)
 * - 設定値のバリデーション (不正なら起動失敗)
 * - TOKEN_SECRET の欠落は起動失敗にしない (fail closed: 全リクエストを拒否)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;

use crate::services::auth::authorizer::{DEFAULT_REQUIRED_ROLE, DEFAULT_ROLE_CLAIM};
use crate::services::auth::{SecretEncoding, SigningSecret};

pub const DEFAULT_COOKIE_NAME: &str = "jwtToken";
pub const DEFAULT_LOGIN_REDIRECT: &str = "/manager-service/admin/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
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

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Empty when unset/undecodable; the authorizer then denies everything.
    pub token_secret: SigningSecret,
    pub required_role: String,
    pub role_claim: String,

    pub cookie_name: String,
    pub login_redirect: HeaderValue,

    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (env vars in production, a map in tests).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = get("PORT").and_then(|s| s.parse().ok()).unwrap_or(8000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let secret_encoding = match get("TOKEN_SECRET_ENCODING") {
            Some(v) => v
                .parse::<SecretEncoding>()
                .map_err(|_| ConfigError::Invalid("TOKEN_SECRET_ENCODING"))?,
            None => SecretEncoding::default(),
        };

        let token_secret = get("TOKEN_SECRET")
            .filter(|s| !s.is_empty())
            .map(|s| SigningSecret::decode(&s, secret_encoding))
            .unwrap_or_default();

        let required_role = non_empty(get("REQUIRED_ROLE"), DEFAULT_REQUIRED_ROLE);
        let role_claim = non_empty(get("ROLE_CLAIM"), DEFAULT_ROLE_CLAIM);
        let cookie_name = non_empty(get("TOKEN_COOKIE_NAME"), DEFAULT_COOKIE_NAME);

        let login_redirect = HeaderValue::from_str(&non_empty(
            get("LOGIN_REDIRECT"),
            DEFAULT_LOGIN_REDIRECT,
        ))
        .map_err(|_| ConfigError::Invalid("LOGIN_REDIRECT"))?;

        let request_timeout = get("REQUEST_TIMEOUT_SECONDS")
            .map(|s| s.parse::<u64>())
            .transpose()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            addr,
            app_env,
            token_secret,
            required_role,
            role_claim,
            cookie_name,
            login_redirect,
            request_timeout,
        })
    }
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();

        assert_eq!(config.addr.port(), 8000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.token_secret.is_empty());
        assert_eq!(config.required_role, "ADMIN");
        assert_eq!(config.role_claim, "status");
        assert_eq!(config.cookie_name, "jwtToken");
        assert_eq!(config.login_redirect, "/manager-service/admin/login");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn secret_defaults_to_base64() {
        let config = load(&[("TOKEN_SECRET", "YWRtaW4tc2VjcmV0")]).unwrap();
        assert_eq!(config.token_secret, SigningSecret::new("admin-secret"));

        let config = load(&[
            ("TOKEN_SECRET", "admin-secret"),
            ("TOKEN_SECRET_ENCODING", "RAW"),
        ])
        .unwrap();
        assert_eq!(config.token_secret, SigningSecret::new("admin-secret"));
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = load(&[("TOKEN_SECRET_ENCODING", "hex")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("TOKEN_SECRET_ENCODING"));
    }

    #[test]
    fn invalid_redirect_and_timeout_are_rejected() {
        let err = load(&[("LOGIN_REDIRECT", "/login\nx")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("LOGIN_REDIRECT"));

        let err = load(&[("REQUEST_TIMEOUT_SECONDS", "soon")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
    }

    #[test]
    fn production_env_is_recognised() {
        let config = load(&[("APP_ENV", "PROD"), ("PORT", "9100")]).unwrap();
        assert!(config.app_env.is_production());
        assert_eq!(config.addr.port(), 9100);
    }
}
