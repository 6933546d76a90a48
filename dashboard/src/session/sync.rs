//! # Sync Coordinator
//!
//! Per-wallet one-shot state machine gating live resource queries.
//!
//! ```text
//! NotSynced ──begin──▶ Syncing ──ok──▶ Synced
//!                        │  ▲
//!                    err │  │ retry
//!                        ▼  │
//!                       Failed
//! ```
//!
//! A record exists only while its wallet is connected. `begin` and `retry`
//! are check-and-set operations under one write lock, so concurrent callers
//! get at most one [`SyncTicket`] per wallet.

use crate::core::error::{AppError, Result};
use crate::core::service::{ApiService, SessionStore};
use crate::services::session_store::sync_flag_key;
use parking_lot::RwLock;
use shared::dto::SyncResult;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

const SYNCED_FLAG: &str = "true";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    NotSynced,
    Syncing,
    Synced,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::NotSynced => "not_synced",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
        }
    }

    /// Terminal for the current attempt (no sync in flight).
    pub fn is_settled(&self) -> bool {
        !matches!(self, SyncStatus::Syncing)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory state of one wallet's sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRecord {
    pub wallet_id: String,
    pub status: SyncStatus,
    pub last_error: Option<AppError>,
    pub last_result: Option<SyncResult>,
    generation: u64,
}

/// Permission to run exactly one sync call for a wallet.
///
/// Completing a ticket whose record has since been reset (disconnect, account
/// switch) is a no-op.
#[derive(Debug)]
pub struct SyncTicket {
    wallet_id: String,
    generation: u64,
}

impl SyncTicket {
    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }
}

pub struct SyncCoordinator {
    records: RwLock<HashMap<String, SyncRecord>>,
    store: Arc<dyn SessionStore>,
    next_generation: AtomicU64,
    changes: watch::Sender<u64>,
}

impl SyncCoordinator {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            records: RwLock::new(HashMap::new()),
            store,
            next_generation: AtomicU64::new(1),
            changes,
        }
    }

    /// Create the record for a freshly connected wallet.
    ///
    /// Starts at `Synced` when the session already holds the persisted flag.
    pub fn on_connect(&self, wallet: &str) -> SyncStatus {
        let persisted = self.store.get(&sync_flag_key(wallet)).as_deref() == Some(SYNCED_FLAG);
        let status = if persisted {
            SyncStatus::Synced
        } else {
            SyncStatus::NotSynced
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        self.records.write().insert(
            wallet.to_string(),
            SyncRecord {
                wallet_id: wallet.to_string(),
                status,
                last_error: None,
                last_result: None,
                generation,
            },
        );

        tracing::info!(
            wallet = %shared::short_wallet(wallet),
            status = %status,
            persisted,
            "Sync record created"
        );
        self.notify();
        status
    }

    /// Drop the wallet's record. The persisted flag is kept.
    pub fn reset(&self, wallet: &str) {
        if self.records.write().remove(wallet).is_some() {
            tracing::debug!(wallet = %shared::short_wallet(wallet), "Sync record reset");
            self.notify();
        }
    }

    /// Status of `wallet`; `NotSynced` when no record exists.
    pub fn status(&self, wallet: &str) -> SyncStatus {
        self.records
            .read()
            .get(wallet)
            .map(|r| r.status)
            .unwrap_or(SyncStatus::NotSynced)
    }

    pub fn record(&self, wallet: &str) -> Option<SyncRecord> {
        self.records.read().get(wallet).cloned()
    }

    /// `NotSynced → Syncing`. Returns `None` if the wallet has no record or
    /// is in any other state.
    pub fn begin(&self, wallet: &str) -> Option<SyncTicket> {
        self.transition_to_syncing(wallet, SyncStatus::NotSynced)
    }

    /// `Failed → Syncing`.
    pub fn retry(&self, wallet: &str) -> Option<SyncTicket> {
        self.transition_to_syncing(wallet, SyncStatus::Failed)
    }

    fn transition_to_syncing(&self, wallet: &str, from: SyncStatus) -> Option<SyncTicket> {
        let ticket = {
            let mut records = self.records.write();
            let record = records.get_mut(wallet)?;
            if record.status != from {
                return None;
            }
            record.status = SyncStatus::Syncing;
            record.last_error = None;
            SyncTicket {
                wallet_id: wallet.to_string(),
                generation: record.generation,
            }
        };

        tracing::info!(wallet = %shared::short_wallet(wallet), from = %from, "Sync started");
        self.notify();
        Some(ticket)
    }

    /// Apply the outcome of a sync call.
    ///
    /// Returns the new status, or `None` when the ticket's record is gone.
    pub fn complete(&self, ticket: SyncTicket, outcome: Result<SyncResult>) -> Option<SyncStatus> {
        let status = {
            let mut records = self.records.write();
            let record = match records.get_mut(&ticket.wallet_id) {
                Some(r) if r.generation == ticket.generation && r.status == SyncStatus::Syncing => r,
                _ => {
                    tracing::debug!(
                        wallet = %shared::short_wallet(&ticket.wallet_id),
                        "Ignoring sync completion for reset record"
                    );
                    return None;
                }
            };

            match outcome {
                Ok(result) => {
                    record.status = SyncStatus::Synced;
                    record.last_result = Some(result);
                }
                Err(e) => {
                    record.status = SyncStatus::Failed;
                    record.last_error = Some(e);
                }
            }
            record.status
        };

        if status == SyncStatus::Synced {
            if let Err(e) = self.store.set(&sync_flag_key(&ticket.wallet_id), SYNCED_FLAG) {
                tracing::warn!(
                    wallet = %shared::short_wallet(&ticket.wallet_id),
                    error = %e,
                    "Failed to persist sync flag"
                );
            }
        }

        self.notify();
        Some(status)
    }

    /// Run the sync call for `ticket` and record its outcome.
    pub async fn run(&self, api: &dyn ApiService, ticket: SyncTicket) -> Option<SyncStatus> {
        let wallet = ticket.wallet_id.clone();
        let start = Instant::now();
        let outcome = api.sync_wallet(&wallet).await;

        match &outcome {
            Ok(result) => crate::trace_info!(
                wallet = %shared::short_wallet(&wallet),
                positions_updated = result.positions_updated,
                fills_processed = result.fills_processed,
                duration_ms = start.elapsed().as_millis() as u64,
                "Sync completed"
            ),
            Err(e) => crate::trace_warn!(
                wallet = %shared::short_wallet(&wallet),
                error = %e,
                duration_ms = start.elapsed().as_millis() as u64,
                "Sync failed"
            ),
        }

        self.complete(ticket, outcome)
    }

    /// Wait until `wallet` has no sync in flight and return its status.
    pub async fn wait_until_settled(&self, wallet: &str) -> SyncStatus {
        let mut rx = self.changes.subscribe();
        loop {
            let status = self.status(wallet);
            if status.is_settled() {
                return status;
            }
            if rx.changed().await.is_err() {
                return self.status(wallet);
            }
        }
    }

    fn notify(&self) {
        self.changes.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}
