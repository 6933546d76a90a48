//! # Dashboard Orchestration
//!
//! Wires the session, sync, cache and journal components into one context
//! object and reports what happens to the consumer over an event channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Consumer (renderer, CLI, tests)                             │
//! │  - ctx.positions(), ctx.analytics(..), ...                   │
//! │  - ctx.handle_wallet_change(provider)                        │
//! │  - event_rx.recv().await                                     │
//! └───────────────┬──────────────────────────────▲───────────────┘
//!                 │                              │ async_channel
//! ┌───────────────▼──────────────────────────────┴───────────────┐
//! │  DashboardContext                                            │
//! │  ConnectionStateTracker → SyncCoordinator → InvalidationBus  │
//! │                                 │                 │          │
//! │                                 ▼                 ▼          │
//! │                 ResourceCache (gates, pollers, retry)        │
//! │                                 │                            │
//! │               DemoDataProvider ◄┴► ApiService (Tokio tasks)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! Shared state lives behind `parking_lot` locks held only for the duration
//! of a check-and-set; no lock is held across an `.await`. Fetches and sync
//! runs are spawned on the Tokio runtime and report back through
//! [`EventSink`].

mod context;
pub mod events;

pub use context::DashboardContext;
pub use events::{DashboardEvent, EventSink, InvalidationReason, EVENT_CHANNEL_CAPACITY};
