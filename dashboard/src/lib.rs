//! # Wallet Analytics Dashboard - Library Root
//!
//! Client-side data synchronization and caching layer of a trading-analytics
//! dashboard. The renderer is out of scope; this crate decides **what data a
//! consumer sees and when it is fetched**.
//!
//! ## Features
//!
//! - **Demo mode**: with no wallet connected every resource is served from
//!   deterministic fixtures, with zero network calls
//! - **Sync gating**: a connected wallet is indexed once per session
//!   (`POST /sync`) before any of its live resources may be fetched
//! - **Resource cache**: per-resource stale time, polling and bounded retry,
//!   with in-flight de-duplication
//! - **Coordinated invalidation**: positions, analytics, historical PnL and
//!   drawdown refetch together after sync or an explicit refresh
//! - **Wallet isolation**: wallet-scoped entries are purged on disconnect or
//!   switch, and late responses for a departed wallet are discarded
//! - **Trade journal**: validated annotations, simulated AI review in demo mode
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              dashboard (this crate)                    │
//! ├────────────────────────────────────────────────────────┤
//! │  Tokio         - Async runtime, timers, task spawning  │
//! │  Reqwest       - HTTP client                           │
//! │  parking_lot   - Shared session/cache state            │
//! │  async-channel - Event stream to consumers             │
//! │  tracing       - Structured logging                    │
//! └────────────────────────────────────────────────────────┘
//!          │ HTTP (JSON envelope)
//!          ▼
//! ┌─────────────────┐
//! │  Analytics API  │
//! └─────────────────┘
//! ```
//!
//! ### Module Dependency Graph
//!
//! ```text
//! main.rs
//!   │
//!   └── app::DashboardContext
//!       ├── session (ConnectionStateTracker, SyncCoordinator)
//!       ├── cache (ResourceCache, policies, pollers)
//!       ├── invalidation (InvalidationBus)
//!       ├── journal (JournalSubmissionPipeline)
//!       ├── demo (DemoDataProvider)
//!       └── services (ApiClient, session stores, wallet provider)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dashboard::app::{DashboardContext, EventSink};
//! use dashboard::services::{ApiClient, MemorySessionStore};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let ctx = DashboardContext::new(
//!     Arc::new(ApiClient::new("http://127.0.0.1:3001/api")),
//!     Arc::new(MemorySessionStore::new()),
//!     Duration::from_millis(800),
//!     EventSink::disabled(),
//! );
//!
//! // No wallet connected: fixtures, no network.
//! let positions = ctx.positions();
//! assert!(positions.data.is_some());
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test -p dashboard
//! ```
//!
//! Scenario tests in `tests/` drive the context against a counting fake API
//! with a paused Tokio clock.

pub mod app;
pub mod cache;
pub mod config;
pub mod core;
pub mod debug;
pub mod demo;
pub mod invalidation;
pub mod journal;
pub mod services;
pub mod session;
pub mod utils;

// Re-export commonly used types for convenience
pub use app::{DashboardContext, DashboardEvent, EventSink};
pub use cache::{QueryResult, QueryStatus, ResourceCache, ResourceKey, ResourceKind, Source};
pub use config::DashboardConfig;
pub use core::{AppError, Result};
pub use session::{SessionTransition, SyncStatus, WalletSession};
