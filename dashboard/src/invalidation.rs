//! # Invalidation Bus
//!
//! Coordinated invalidation of the live resource set of one wallet. Fired when
//! a sync completes and when the user asks for a refresh. Resources outside
//! the set (heatmap, composition, trades, leaderboard) expire through their
//! own stale time.

use crate::app::events::{DashboardEvent, EventSink, InvalidationReason};
use crate::cache::{FetchWatermark, InvalidationOutcome, ResourceCache, ResourceKind, ResourceScope};
use shared::short_wallet;

/// Kinds refreshed together after a sync or an explicit refresh.
pub const SYNC_DEPENDENT_KINDS: [ResourceKind; 4] = [
    ResourceKind::Positions,
    ResourceKind::Analytics,
    ResourceKind::HistoricalPnl,
    ResourceKind::Drawdown,
];

#[derive(Clone)]
pub struct InvalidationBus {
    cache: ResourceCache,
    events: EventSink,
}

impl InvalidationBus {
    pub fn new(cache: ResourceCache, events: EventSink) -> Self {
        Self { cache, events }
    }

    /// Scopes covering every parameter variant of the sync-dependent kinds.
    pub fn scopes_for(wallet: &str) -> Vec<ResourceScope> {
        SYNC_DEPENDENT_KINDS
            .iter()
            .map(|kind| ResourceScope::new(*kind, Some(wallet)))
            .collect()
    }

    /// `mark` is the cache watermark taken while the wallet was still gated.
    /// Entries that started fetching once the gate opened already hold
    /// post-sync data and are not fetched again.
    pub fn sync_completed(&self, wallet: &str, mark: FetchWatermark) -> InvalidationOutcome {
        self.invalidate(wallet, InvalidationReason::SyncCompleted, Some(mark))
    }

    /// Same set as [`sync_completed`](Self::sync_completed), without re-running sync.
    pub fn refresh(&self, wallet: &str) -> InvalidationOutcome {
        self.invalidate(wallet, InvalidationReason::Refresh, None)
    }

    fn invalidate(&self, wallet: &str, reason: InvalidationReason, mark: Option<FetchWatermark>) -> InvalidationOutcome {
        let scopes = Self::scopes_for(wallet);
        let outcome = match mark {
            Some(mark) => self.cache.invalidate_since(&scopes, mark),
            None => self.cache.invalidate(&scopes),
        };

        tracing::info!(
            wallet = %short_wallet(wallet),
            reason = ?reason,
            matched = outcome.matched,
            refetched = outcome.refetched,
            "Invalidated sync-dependent resources"
        );
        self.events.emit(DashboardEvent::Invalidated {
            wallet: Some(wallet.to_string()),
            reason,
            matched: outcome.matched,
            refetched: outcome.refetched,
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{QueryOptions, QueryResult, ResourceKey};
    use crate::session::{ConnectionStateTracker, WalletSession};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const WALLET: &str = "8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL";

    #[tokio::test(start_paused = true)]
    async fn test_refresh_covers_only_sync_dependent_kinds() {
        let tracker = Arc::new(ConnectionStateTracker::new());
        tracker.publish(WalletSession::connected(WALLET));
        let (events, rx) = EventSink::channel(16);
        let cache = ResourceCache::new(tracker, EventSink::disabled());
        let bus = InvalidationBus::new(cache.clone(), events);
        let calls = Arc::new(AtomicU32::new(0));

        for kind in [ResourceKind::HistoricalPnl, ResourceKind::Heatmap] {
            let calls = calls.clone();
            let key = ResourceKey::wallet_scoped(kind, WALLET);
            let _: QueryResult<u32> = cache.query(key, QueryOptions::for_kind(kind), move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(1u32) }
            });
        }
        cache.settled().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let outcome = bus.refresh(WALLET);
        assert_eq!(outcome, InvalidationOutcome { matched: 1, refetched: 1 });
        cache.settled().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        match rx.try_recv() {
            Ok(DashboardEvent::Invalidated { reason, matched, .. }) => {
                assert_eq!(reason, InvalidationReason::Refresh);
                assert_eq!(matched, 1);
            }
            other => panic!("expected invalidation event, got {:?}", other),
        }
    }

    #[test]
    fn test_scopes_are_wallet_bound() {
        let scopes = InvalidationBus::scopes_for("A");
        assert_eq!(scopes.len(), 4);
        assert!(scopes
            .iter()
            .all(|s| s.matches(&ResourceKey::wallet_scoped(s.kind, "A"))));
        assert!(!scopes
            .iter()
            .any(|s| s.matches(&ResourceKey::wallet_scoped(s.kind, "B"))));
    }
}
