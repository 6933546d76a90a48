//! # Wallet Session
//!
//! - [`tracker`]: `ConnectionStateTracker`, projection of the wallet provider
//! - [`sync`]: `SyncCoordinator`, the per-wallet one-shot sync state machine

pub mod sync;
pub mod tracker;

pub use sync::{SyncCoordinator, SyncRecord, SyncStatus, SyncTicket};
pub use tracker::{ConnectionStateTracker, SessionTransition, WalletSession};
