use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub marketplace: MarketplaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_connections: usize,
    // Keep-alive duration in seconds
    pub keep_alive_seconds: u64,
    // Client timeout for reading payload/body in seconds
    pub client_timeout_seconds: u64,
    pub client_shutdown_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
    pub wait_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window_seconds: u64,
    pub max_request_size_bytes: usize,
    /// Shared key required on /api/v1/admin routes; admin routes are closed when unset
    pub admin_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Applied to payments that don't name a currency
    pub default_currency: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} must be a valid number, got '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be a 3-letter currency code, got '{value}'")]
    InvalidCurrency { key: &'static str, value: String },
}

fn var_or(key: &'static str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(key, default);
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

/// ISO 4217 style code, normalized to upper case
fn currency_var(key: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = var_or(key, default);
    let code = value.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::InvalidCurrency { key, value });
    }
    Ok(code.to_ascii_uppercase())
}

fn list_var(key: &'static str, default: &str) -> Vec<String> {
    var_or(key, default)
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl DatabaseConfig {
    /// Database settings alone, for the command-line scripts
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            max_connections: parse_var("DB_MAX_CONNECTIONS", "10")?,
            connect_timeout_seconds: parse_var("DB_CONNECT_TIMEOUT", "10")?,
            wait_timeout_seconds: parse_var("DB_WAIT_TIMEOUT", "5")?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig {
                host: var_or("HOST", "127.0.0.1"),
                port: parse_var("PORT", "8080")?,
                workers: parse_var("WORKERS", "4")?,
                max_connections: parse_var("MAX_CONNECTIONS", "1000")?,
                keep_alive_seconds: parse_var("KEEP_ALIVE_SECONDS", "75")?,
                client_timeout_seconds: parse_var("CLIENT_TIMEOUT_SECONDS", "30")?,
                client_shutdown_seconds: parse_var("CLIENT_SHUTDOWN_SECONDS", "5")?,
            },
            database: DatabaseConfig::from_env()?,
            security: SecurityConfig {
                cors_allowed_origins: list_var(
                    "CORS_ALLOWED_ORIGINS",
                    "http://localhost:3000,http://127.0.0.1:3000",
                ),
                rate_limit_requests: parse_var("RATE_LIMIT_REQUESTS", "100")?,
                rate_limit_window_seconds: parse_var("RATE_LIMIT_WINDOW_SECONDS", "60")?,
                max_request_size_bytes: parse_var("MAX_REQUEST_SIZE_BYTES", "1048576")?, // 1MB
                admin_api_key: env::var("ADMIN_API_KEY").ok().filter(|k| !k.is_empty()),
            },
            logging: LoggingConfig {
                level: var_or("LOG_LEVEL", "info"),
                directory: var_or("LOG_DIR", "logs"),
            },
            marketplace: MarketplaceConfig {
                default_currency: currency_var(
                    "DEFAULT_CURRENCY",
                    crate::constants::vendor_defaults::CURRENCY,
                )?,
            },
        })
    }
}
