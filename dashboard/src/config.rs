//! # Dashboard Configuration
//!
//! Runtime configuration loaded from environment variables (and a `.env` file
//! when present). Values are validated on startup to fail fast if misconfigured.

use crate::core::error::{AppError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3001/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DEMO_LATENCY_MS: u64 = 800;

/// Dashboard configuration.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Base URL of the analytics API, without trailing slash
    pub api_url: String,

    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,

    /// JSON file backing the session store. `None` keeps flags in memory only.
    pub session_file: Option<PathBuf>,

    /// Simulated latency of a demo-mode journal submission
    pub demo_latency_ms: u64,

    /// Wallet the binary connects with. `None` runs in demo mode.
    pub wallet: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_file: None,
            demo_latency_ms: DEFAULT_DEMO_LATENCY_MS,
            wallet: None,
        }
    }
}

impl DashboardConfig {
    /// Load `.env` (if any) and read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = read("DASHBOARD_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout_secs = match read("DASHBOARD_REQUEST_TIMEOUT_SECS") {
            Some(v) => v.parse().map_err(|e| {
                AppError::Config(format!("DASHBOARD_REQUEST_TIMEOUT_SECS must be a valid number: {}", e))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let demo_latency_ms = match read("DASHBOARD_DEMO_LATENCY_MS") {
            Some(v) => v.parse().map_err(|e| {
                AppError::Config(format!("DASHBOARD_DEMO_LATENCY_MS must be a valid number: {}", e))
            })?,
            None => DEFAULT_DEMO_LATENCY_MS,
        };

        Ok(Self {
            api_url,
            request_timeout_secs,
            session_file: read("DASHBOARD_SESSION_FILE").map(PathBuf::from),
            demo_latency_ms,
            wallet: read("DASHBOARD_WALLET"),
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "DASHBOARD_API_URL must be an http(s) URL, got {}",
                self.api_url
            )));
        }

        if self.request_timeout_secs < 1 || self.request_timeout_secs > 300 {
            return Err(AppError::Config(
                "DASHBOARD_REQUEST_TIMEOUT_SECS must be between 1 and 300".to_string(),
            ));
        }

        if self.demo_latency_ms > 60_000 {
            return Err(AppError::Config(
                "DASHBOARD_DEMO_LATENCY_MS must be at most 60000".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn demo_latency(&self) -> Duration {
        Duration::from_millis(self.demo_latency_ms)
    }
}
