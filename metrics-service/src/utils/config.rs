use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BOOKS_API_URL: &str = "https://6781684b85151f714b0aa5db.mockapi.io/api/v1/books";
pub const DEFAULT_BOOKS_API_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("unknown book source {0:?}, expected \"external\" or \"memory\"")]
    UnknownSource(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    External,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub books_api_url: String,
    pub books_api_timeout: Duration,
    pub request_timeout: Duration,
    pub source: SourceKind,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let books_api_url =
            lookup("BOOKS_API_URL").unwrap_or_else(|| DEFAULT_BOOKS_API_URL.to_string());
        let books_api_timeout = parse_timeout(
            &lookup,
            "BOOKS_API_TIMEOUT_SECS",
            DEFAULT_BOOKS_API_TIMEOUT_SECS,
        )?;
        let request_timeout =
            parse_timeout(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        let source = match lookup("BOOK_SOURCE")
            .unwrap_or_else(|| "external".to_string())
            .to_lowercase()
            .as_str()
        {
            "external" => SourceKind::External,
            "memory" => SourceKind::Memory,
            other => return Err(ConfigError::UnknownSource(other.to_string())),
        };

        Ok(Self {
            port,
            books_api_url,
            books_api_timeout,
            request_timeout,
            source,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => Err(ConfigError::InvalidValue { name, value }),
        },
        None => Ok(default),
    }
}

/// Timeouts are whole seconds in `1..=MAX_TIMEOUT_SECS`.
fn parse_timeout<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = parse_or(lookup, name, default)?;
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::InvalidValue {
            name,
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
