use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_NEWS_API_URL: &str = "https://gnews.io/api/v4";
pub const DEFAULT_SUMMARY_API_URL: &str = "http://127.0.0.1:5000";

/// Settings for the summarization service binary.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub openrouter_api_key: String,
    pub model_name: String,
    pub cache_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openrouter_api_key = lookup("OPENROUTER_API_KEY")
            .ok_or_else(|| AppError::ConfigError("OPENROUTER_API_KEY is required but not set".to_string()))?;

        let model_name = lookup("MODEL_NAME")
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::ConfigError("MODEL_NAME is required but not set".to_string()))?;

        // Load server configuration with defaults
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "5000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let cache_timeout = lookup("CACHE_TIMEOUT").unwrap_or_else(|| "300".to_string());
        let cache_timeout = cache_timeout
            .parse::<u64>()
            .map_err(|e| AppError::ConfigError(format!("Invalid cache timeout: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            openrouter_api_key,
            model_name,
            cache_timeout: Duration::from_secs(cache_timeout),
        })
    }
}

/// Settings for the client-side feeds.
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub summary_api_url: String,
    pub breaking_country: String,
    pub page_size: usize,
}

impl ReaderConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // A missing news key is not an error here; each fetch reports it instead.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_size = match lookup("PAGE_SIZE") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => return Err(AppError::ConfigError("PAGE_SIZE must be at least 1".to_string())),
                Ok(size) => size,
                Err(e) => return Err(AppError::ConfigError(format!("Invalid page size: {}", e))),
            },
            None => crate::pagination::DEFAULT_PAGE_SIZE,
        };

        Ok(ReaderConfig {
            news_api_key: lookup("NEWS_API_KEY").filter(|key| !key.is_empty()),
            news_api_url: lookup("NEWS_API_URL").unwrap_or_else(|| DEFAULT_NEWS_API_URL.to_string()),
            summary_api_url: lookup("SUMMARY_API_URL").unwrap_or_else(|| DEFAULT_SUMMARY_API_URL.to_string()),
            breaking_country: lookup("BREAKING_COUNTRY").unwrap_or_else(|| "in".to_string()),
            page_size,
        })
    }
}
