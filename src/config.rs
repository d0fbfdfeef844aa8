use anyhow::{Context, Result};
use reqwest::Url;

pub const API_URL_ENV: &str = "DEPIN_API_URL";
pub const CHAT_URL_ENV: &str = "DEPIN_CHAT_URL";

pub const DEFAULT_API_URL: &str = "https://dev-api-depin.bitscrunch.com";
pub const DEFAULT_CHAT_URL: &str = "https://localhost:8080";

/// Endpoints the app talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the cluster and model services.
    pub api_base_url: String,
    /// Chat endpoint used when a cluster does not report its own `promptUrl`.
    pub default_chat_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            default_chat_url: DEFAULT_CHAT_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; unset or blank keys fall back
    /// to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base_url = resolve(&lookup, API_URL_ENV, DEFAULT_API_URL)?;
        let default_chat_url = resolve(&lookup, CHAT_URL_ENV, DEFAULT_CHAT_URL)?;
        Ok(Self { api_base_url, default_chat_url })
    }
}

fn resolve(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<String> {
    let value = lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let Some(value) = value else {
        return Ok(default.to_string());
    };
    log::debug!("Using {} from environment: {}", key, value);
    Url::parse(&value).context(format!("Environment variable '{}' is not a valid URL: {}", key, value))?;
    Ok(value.trim_end_matches('/').to_string())
}
