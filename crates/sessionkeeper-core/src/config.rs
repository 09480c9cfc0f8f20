//! Application configuration.
//!
//! Configuration comes from the environment (a `.env` file is loaded by the
//! CLI before this runs). Nothing here is written back: session state is
//! rebuilt from a fresh identity check on every start.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

/// Login surface; every authentication failure ends up here
pub const LOGIN_PATH: &str = "/login";

pub const DASHBOARD_PATH: &str = "/";

/// Env var holding the API base URL
const API_BASE_URL_VAR: &str = "API_BASE_URL";

/// Env var holding the validation TTL in milliseconds
const RECHECK_INTERVAL_VAR: &str = "AUTH_RECHECK_INTERVAL_MS";

/// Env var overriding the cross-tab channel name
const CHANNEL_NAME_VAR: &str = "AUTH_CHANNEL_NAME";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Fallback TTL when the setting is absent or not a number (5 minutes)
pub const DEFAULT_RECHECK_INTERVAL_MS: u64 = 300_000;

pub const DEFAULT_CHANNEL_NAME: &str = "sessionkeeper-auth";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub auth_recheck_interval: Duration,
    pub channel_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_recheck_interval: Duration::from_millis(DEFAULT_RECHECK_INTERVAL_MS),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the environment, or a map in tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base_url = lookup(API_BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Url::parse(&api_base_url)
            .with_context(|| format!("Invalid {}: {}", API_BASE_URL_VAR, api_base_url))?;

        let auth_recheck_interval =
            Self::parse_recheck_interval(lookup(RECHECK_INTERVAL_VAR).as_deref());

        let channel_name = lookup(CHANNEL_NAME_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string());

        Ok(Self {
            api_base_url,
            auth_recheck_interval,
            channel_name,
        })
    }

    /// Parse the TTL setting. Absent, empty or non-numeric input falls back
    /// to the default. Negative values mean "always recheck", infinity means
    /// "never recheck"; fractional milliseconds are truncated.
    pub fn parse_recheck_interval(raw: Option<&str>) -> Duration {
        let default = Duration::from_millis(DEFAULT_RECHECK_INTERVAL_MS);
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return default;
        };
        match raw.parse::<f64>() {
            Ok(ms) if ms.is_nan() => default,
            Ok(ms) if ms <= 0.0 => Duration::ZERO,
            Ok(ms) if ms.is_infinite() => Duration::MAX,
            Ok(ms) => Duration::from_millis(ms as u64),
            Err(_) => default,
        }
    }
}
