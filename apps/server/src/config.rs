use chrono::FixedOffset;
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DB_NAME: &str = "gramy";
const DEFAULT_REPORTS_DIR: &str = "reports";
/// Lima, UTC-5.
const DEFAULT_TIMEZONE_OFFSET_HOURS: i32 = -5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub reports: ReportsConfig,
    pub cors: CorsConfig,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    /// In-process store, optionally seeded from a JSON array of orders.
    Memory { seed_file: Option<PathBuf> },
    Mongo(MongoConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportsConfig {
    pub output_dir: PathBuf,
    pub timezone: FixedOffset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("PORT", value))?,
            None => DEFAULT_PORT,
        };

        let store = match lookup("ORDER_STORE")
            .unwrap_or_else(|| "memory".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => StoreConfig::Memory {
                seed_file: lookup("ORDERS_FILE")
                    .filter(|path| !path.trim().is_empty())
                    .map(PathBuf::from),
            },
            "mongo" | "mongodb" => StoreConfig::Mongo(MongoConfig {
                uri: lookup("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
                database: lookup("MONGODB_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            }),
            other => return Err(ConfigError::Invalid("ORDER_STORE", other.to_string())),
        };

        let output_dir = lookup("REPORTS_DIR")
            .unwrap_or_else(|| DEFAULT_REPORTS_DIR.to_string())
            .into();
        let offset_hours = match lookup("REPORT_TIMEZONE_OFFSET_HOURS") {
            Some(value) => value
                .parse::<i32>()
                .map_err(|_| ConfigError::Invalid("REPORT_TIMEZONE_OFFSET_HOURS", value))?,
            None => DEFAULT_TIMEZONE_OFFSET_HOURS,
        };
        let timezone = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Invalid("REPORT_TIMEZONE_OFFSET_HOURS", offset_hours.to_string())
            })?;

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string())
            .split(',')
            .filter(|origin| !origin.trim().is_empty())
            .map(|origin| origin.trim().to_string())
            .collect::<Vec<_>>();

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECS", value)),
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            host,
            port,
            store,
            reports: ReportsConfig {
                output_dir,
                timezone,
            },
            cors: CorsConfig { allowed_origins },
            request_timeout,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
