//! # Dashboard Events
//!
//! Notifications from the sync/cache layer to its consumer (a renderer in the
//! full app, assertions in tests).

use crate::cache::{ResourceKey, Source};
use crate::core::error::AppError;
use crate::session::{SessionTransition, SyncStatus};
use async_channel::{Receiver, Sender, TrySendError};

/// Default capacity of the event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Why a set of resources was invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    SyncCompleted,
    Refresh,
    JournalUpdated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Wallet session changed
    SessionChanged(SessionTransition),
    /// Sync record of `wallet` moved to `status`
    SyncStatusChanged { wallet: String, status: SyncStatus },
    /// A fetch resolved and was written to the cache
    ResourceUpdated { key: ResourceKey, source: Source },
    /// A fetch failed; prior data for the key is kept
    ResourceFailed { key: ResourceKey, error: AppError },
    /// A fetch resolved for a wallet or cache generation that is gone
    ResourceDiscarded { key: ResourceKey, reason: AppError },
    /// Resources were invalidated; `refetched` fetches were started
    Invalidated {
        wallet: Option<String>,
        reason: InvalidationReason,
        matched: usize,
        refetched: usize,
    },
    /// Wallet-scoped entries were dropped
    CachePurged { removed: usize, epoch: u64 },
    /// A journal submission succeeded
    JournalSubmitted { position_id: String, demo: bool },
}

/// Non-blocking event producer.
///
/// A full channel drops the event with a warning rather than stalling the
/// cache; a sink without a channel drops everything.
#[derive(Clone, Default)]
pub struct EventSink {
    tx: Option<Sender<DashboardEvent>>,
}

impl EventSink {
    /// Bounded channel with the given capacity.
    pub fn channel(capacity: usize) -> (Self, Receiver<DashboardEvent>) {
        let (tx, rx) = async_channel::bounded(capacity);
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: DashboardEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(event = ?event, "Event channel full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::trace!("Event receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResourceKind;

    #[test]
    fn test_emit_delivers_in_order() {
        let (sink, rx) = EventSink::channel(4);
        sink.emit(DashboardEvent::CachePurged { removed: 2, epoch: 1 });
        sink.emit(DashboardEvent::ResourceUpdated {
            key: ResourceKey::global(ResourceKind::Leaderboard),
            source: Source::Remote,
        });

        assert_eq!(rx.try_recv().unwrap(), DashboardEvent::CachePurged { removed: 2, epoch: 1 });
        assert!(matches!(rx.try_recv().unwrap(), DashboardEvent::ResourceUpdated { .. }));
    }

    #[test]
    fn test_full_or_closed_channel_does_not_panic() {
        let (sink, rx) = EventSink::channel(1);
        sink.emit(DashboardEvent::CachePurged { removed: 0, epoch: 1 });
        sink.emit(DashboardEvent::CachePurged { removed: 0, epoch: 2 });
        assert_eq!(rx.len(), 1);

        drop(rx);
        sink.emit(DashboardEvent::CachePurged { removed: 0, epoch: 3 });
        EventSink::disabled().emit(DashboardEvent::CachePurged { removed: 0, epoch: 4 });
    }
}
