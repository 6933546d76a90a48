//! # Common Error Types
//!
//! Consolidated error handling for the dashboard core.
//!
//! This module provides a centralized error type [`AppError`] covering every
//! failure the sync/cache layer can observe.
//!
//! ## Error Categories
//!
//! - **Validation**: Local schema failure (journal payloads). Blocks the network call.
//! - **Network**: Transport failure or timeout talking to the analytics API.
//! - **Api**: The API answered with a non-2xx status or `success = false`.
//! - **StaleResponse**: A response arrived for a wallet that is no longer active.
//!   Always discarded, never shown to consumers.
//! - **Wallet / Config / Storage**: Wallet provider, startup configuration and
//!   session storage failures.
//!
//! ## Propagation
//!
//! Validation errors are handled locally and never reach the network. Network and
//! API errors are recorded per resource (`QueryResult::error`), so one failing
//! resource never clears another.
//!
//! ```rust
//! use dashboard::core::error::AppError;
//!
//! let err = AppError::validation("rating", "Rating must be between 1 and 5");
//! assert_eq!(err.to_string(), "Validation error on rating: Rating must be between 1 and 5");
//! assert!(err.is_validation());
//! ```

use thiserror::Error;

/// Application-wide error type for the dashboard core.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AppError {
    /// Local validation failure for a single field.
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// Transport-level failure (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The API rejected the request, either with a non-2xx status or with an
    /// envelope carrying `success = false`.
    #[error("API error{}: {message}", status_suffix(.status))]
    Api { status: Option<u16>, message: String },

    /// A response resolved after its wallet stopped being the active session.
    #[error("Stale response for wallet {wallet}")]
    StaleResponse { wallet: String },

    /// Wallet provider failure (connect/disconnect rejected, no public key).
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Invalid startup configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session storage read/write failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        AppError::Api {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation { .. })
    }

    /// Stale responses are dropped silently; everything else may reach the UI.
    pub fn is_surfaced_to_consumers(&self) -> bool {
        !matches!(self, AppError::StaleResponse { .. })
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::api(format!("Failed to parse response: {}", err))
        } else if let Some(status) = err.status() {
            AppError::Api {
                status: Some(status.as_u16()),
                message: err.to_string(),
            }
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::api(format!("Failed to parse response: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status_when_known() {
        let with_status = AppError::Api {
            status: Some(502),
            message: "Bad gateway".to_string(),
        };
        assert_eq!(with_status.to_string(), "API error (502): Bad gateway");
        assert_eq!(AppError::api("wallet not indexed").to_string(), "API error: wallet not indexed");
    }

    #[test]
    fn test_stale_responses_are_not_surfaced() {
        let stale = AppError::StaleResponse {
            wallet: "A".to_string(),
        };
        assert!(!stale.is_surfaced_to_consumers());
        assert!(AppError::Network("timeout".to_string()).is_surfaced_to_consumers());
    }

    #[test]
    fn test_json_errors_map_to_api() {
        let err: AppError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, AppError::Api { status: None, .. }));
    }
}
