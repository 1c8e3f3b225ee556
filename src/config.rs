use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_TOKEN: &str = "";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown data mode '{0}' (expected 'dummy' or 'live')")]
    InvalidDataMode(String),

    #[error("Invalid request timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Which backing the data-access layer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataMode {
    /// In-process fixtures, no network.
    #[default]
    Dummy,
    /// The real training backend over HTTP.
    Live,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::Dummy => "dummy",
            DataMode::Live => "live",
        }
    }
}

impl FromStr for DataMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dummy" | "mock" | "fixtures" => Ok(DataMode::Dummy),
            "live" | "real" | "http" => Ok(DataMode::Live),
            other => Err(ConfigError::InvalidDataMode(other.to_string())),
        }
    }
}

/// Resolved application configuration. Built once and handed to the
/// backend at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub data_mode: DataMode,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_token: DEFAULT_API_TOKEN.to_string(),
            data_mode: DataMode::Dummy,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: get_api_base_url(),
            api_token: get_api_token(),
            data_mode: get_data_mode()?,
            request_timeout: get_request_timeout()?,
        })
    }

    pub fn with_data_mode(mut self, mode: DataMode) -> Self {
        self.data_mode = mode;
        self
    }
}

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_api_base_url() -> String {
    sanitize_base_url(&env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()))
}

pub fn get_api_token() -> String {
    env::var("API_TOKEN")
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|_| DEFAULT_API_TOKEN.to_string())
}

pub fn get_data_mode() -> Result<DataMode, ConfigError> {
    match env::var("DATA_MODE") {
        Ok(raw) if !raw.trim().is_empty() => raw.parse(),
        _ => Ok(DataMode::default()),
    }
}

pub fn get_request_timeout() -> Result<Duration, ConfigError> {
    let raw = match env::var("REQUEST_TIMEOUT_SECS") {
        Ok(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw)),
    }
}

pub fn get_host() -> String {
    env::var("HOST")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string())
}

pub fn get_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
