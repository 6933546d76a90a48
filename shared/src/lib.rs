//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the dashboard client and the
//! analytics API. All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for API communication
//!   - **[`dto::envelope`]**: The `{success, data, error}` wrapper every endpoint returns
//!   - **[`dto::portfolio`]**: Positions, trades and pagination
//!   - **[`dto::analytics`]**: Summary, PnL series, heatmap, composition, leaderboard
//!   - **[`dto::journal`]**: Trade journal payloads and AI analysis
//!   - **[`dto::sync`]**: Wallet indexing (sync) request/response
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::short_wallet`]**: Shorten wallet addresses for logs and display
//!
//! ## Wire Format
//!
//! The API is consumed by a browser client as well, so field names are
//! **camelCase** on the wire (`#[serde(rename_all = "camelCase")]`) while staying
//! snake_case in Rust. Optional fields are omitted when `None`.
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::envelope::ApiResponse;
//! use shared::dto::portfolio::Position;
//!
//! let body = r#"{"success":true,"data":[]}"#;
//! let envelope: ApiResponse<Vec<Position>> = serde_json::from_str(body).unwrap();
//! assert!(envelope.into_result().unwrap().is_empty());
//! ```

pub mod dto;
pub mod utils;

// Re-export commonly used types for convenience
pub use dto::*;
pub use utils::*;
