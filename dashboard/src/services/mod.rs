//! # External Service Integrations
//!
//! - [`api`]: HTTP client for the analytics API (`ApiService`)
//! - [`wallet`]: In-process wallet provider (`WalletProvider`)
//! - [`session_store`]: Session-scoped storage backends (`SessionStore`)

pub mod api;
pub mod session_store;
pub mod wallet;

pub use api::ApiClient;
pub use session_store::{sync_flag_key, FileSessionStore, MemorySessionStore};
pub use wallet::{LocalWalletProvider, WalletStatus};
