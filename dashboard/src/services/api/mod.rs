//! # Analytics API Client Module
//!
//! HTTP client for the remote analytics API. Every endpoint returns the
//! `{success, data, error}` envelope, unwrapped in [`client::decode_envelope`].
//!
//! ## Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs       - Module exports and documentation
//! ├── client.rs    - ApiClient struct, envelope decoding, ApiService impl
//! ├── sync.rs      - POST /sync
//! ├── portfolio.rs - GET /dashboard/{wallet}, GET /trades/{wallet}
//! ├── analytics.rs - GET /analytics/... (summary, series, leaderboard)
//! └── journal.rs   - GET/PATCH /journal/{positionId}
//! ```

pub mod analytics;
pub mod client;
pub mod journal;
pub mod portfolio;
pub mod sync;

pub use client::{decode_envelope, ApiClient};
