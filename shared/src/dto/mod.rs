//! # Data Transfer Objects (DTOs)
//!
//! Data structures exchanged with the analytics REST API.
//!
//! ## Module Organization
//!
//! - [`envelope`] - `ApiResponse<T>` wrapper (`{success, data, error?}`)
//! - [`portfolio`] - Positions, trades, trade queries
//! - [`analytics`] - Analytics summary and the derived series endpoints
//! - [`journal`] - Journal annotations (`PATCH /journal/{positionId}`)
//! - [`sync`] - Wallet sync (`POST /sync`)
//!
//! ## Example JSON Communication
//!
//! ```text
//! POST /sync
//! Content-Type: application/json
//!
//! { "walletAddress": "8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL" }
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//!
//! {
//!   "success": true,
//!   "data": { "positionsUpdated": 12, "fillsProcessed": 348 }
//! }
//! ```

pub mod analytics;
pub mod envelope;
pub mod journal;
pub mod portfolio;
pub mod sync;

pub use analytics::*;
pub use envelope::*;
pub use journal::*;
pub use portfolio::*;
pub use sync::*;
