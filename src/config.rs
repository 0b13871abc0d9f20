/*
 * Responsibility
 * - Load settings from the environment (.env supported via dotenvy)
 * - Validate values up front (missing / malformed => startup failure)
 * - Everything the demo server needs: bind address, DB, CORS, auth plugin options
 */
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::plugins::auth::AuthOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    // Optional: without it the health check reports the database as not configured.
    pub database_url: Option<String>,
    pub database_variant: String,

    pub auth: AuthOptions,
    // api key -> user id, served by the static lookup
    pub static_api_keys: HashMap<String, String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins =
            split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw)
                .ok_or(ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT,
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let database_variant =
            std::env::var("DATABASE_VARIANT").unwrap_or_else(|_| "app".to_string());

        let defaults = AuthOptions::default();
        let auth = AuthOptions {
            jwt_cookie_name: non_empty_var("AUTH_JWT_COOKIE_NAME")?
                .unwrap_or(defaults.jwt_cookie_name),
            email_field: non_empty_var("AUTH_EMAIL_FIELD")?.unwrap_or(defaults.email_field),
            password_field: non_empty_var("AUTH_PASSWORD_FIELD")?
                .unwrap_or(defaults.password_field),
        };

        let static_api_keys = match std::env::var("AUTH_STATIC_API_KEYS") {
            Ok(raw) => parse_api_keys(&raw).ok_or(ConfigError::Invalid("AUTH_STATIC_API_KEYS"))?,
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            database_url,
            database_variant,
            auth,
            static_api_keys,
        })
    }
}

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole seconds, at least 1.
fn parse_timeout_secs(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_var(key: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(v) if v.trim().is_empty() => Err(ConfigError::Invalid(key)),
        Ok(v) => Ok(Some(v.trim().to_string())),
        Err(_) => Ok(None),
    }
}

/// `key1=user1,key2=user2` -> map. `None` on any malformed pair.
fn parse_api_keys(raw: &str) -> Option<HashMap<String, String>> {
    split_list(raw)
        .into_iter()
        .map(|pair| {
            let (key, user_id) = pair.split_once('=')?;
            let (key, user_id) = (key.trim(), user_id.trim());
            if key.is_empty() || user_id.is_empty() {
                return None;
            }
            Some((key.to_string(), user_id.to_string()))
        })
        .collect()
}
