//! # Core Abstractions
//!
//! Core traits and error types for dependency injection and better testability.
//!
//! ## Modules
//!
//! - **[`error`]**: Application error types (`AppError`, `Result<T>`)
//! - **[`service`]**: Service traits for dependency injection
//!   (`ApiService`, `WalletProvider`, `SessionStore`)
//!
//! ## Dependency Injection
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dashboard::core::service::ApiService;
//! use dashboard::services::api::ApiClient;
//!
//! // In production: the HTTP client
//! let api: Arc<dyn ApiService> = Arc::new(ApiClient::new("http://127.0.0.1:3001/api"));
//! // In tests: a counting fake implementing the same trait
//! ```

pub mod error;
pub mod service;

pub use error::{AppError, Result};
pub use service::{ApiService, SessionStore, WalletProvider};
