use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "todos.db";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TOKEN_TTL_DAYS: i64 = 60;
const MIN_COOKIE_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Test,
    Production,
}

impl AppEnv {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub addr: SocketAddr,
    pub database_path: String,
    pub api_prefix: String,
    pub jwt_secret: String,
    pub cookie_secret: String,
    pub token_ttl: time::Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Reads the process environment (after loading `.env`, if any).
    ///
    /// Missing secrets are fatal: the server must not start without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let app_env = AppEnv::parse(&std::env::var("APP_ENV").unwrap_or_default());

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => DEFAULT_PORT,
        };

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());

        let api_prefix = std::env::var("API_PREFIX")
            .map(|raw| normalize_prefix(&raw))
            .unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string());

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cookie_secret = std::env::var("COOKIE_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("COOKIE_SECRET"))?;
        if cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(ConfigError::Invalid("COOKIE_SECRET"));
        }

        let token_ttl_days = match std::env::var("TOKEN_TTL_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or(ConfigError::Invalid("TOKEN_TTL_DAYS"))?,
            Err(_) => DEFAULT_TOKEN_TTL_DAYS,
        };

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            app_env,
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            database_path,
            api_prefix,
            jwt_secret,
            cookie_secret,
            token_ttl: time::Duration::days(token_ttl_days),
            cors_allowed_origins,
        })
    }
}

/// Leading slash, no trailing slash. An empty or `/` prefix mounts the API at the root.
pub fn normalize_prefix(raw: &str) -> String {
    let path = raw.trim().trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
