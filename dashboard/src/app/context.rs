//! Session and cache context.
//!
//! [`DashboardContext`] owns every stateful component of the sync/cache layer
//! and exposes one typed accessor per resource. Accessors never block: in
//! demo mode they return fixtures, in live mode they evaluate the cache entry
//! (which serves the fixture as a placeholder until the first fetch lands).

use crate::app::events::{DashboardEvent, EventSink};
use crate::cache::{Gate, InvalidationOutcome, QueryOptions, QueryResult, ResourceCache, ResourceKey, ResourceKind};
use crate::core::error::Result;
use crate::core::service::{ApiService, SessionStore, WalletProvider};
use crate::debug::{spawn_tracked, with_trace_id_async};
use crate::demo::DemoDataProvider;
use crate::invalidation::InvalidationBus;
use crate::journal::{journal_key, JournalDraft, JournalSubmission, JournalSubmissionPipeline, ValidationReport};
use crate::session::{ConnectionStateTracker, SessionTransition, SyncCoordinator, SyncStatus, SyncTicket, WalletSession};
use parking_lot::Mutex;
use shared::dto::{
    drawdown_series, AnalyticsFilter, AnalyticsSummary, CompositionSlice, DrawdownPoint,
    HeatmapDay, HistoricalPnlPoint, JournalEntry, LeaderboardEntry, Position, TradeQuery,
    TradesPage,
};
use shared::short_wallet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct DashboardContext {
    tracker: Arc<ConnectionStateTracker>,
    coordinator: Arc<SyncCoordinator>,
    cache: ResourceCache,
    bus: InvalidationBus,
    demo: DemoDataProvider,
    api: Arc<dyn ApiService>,
    journal: JournalSubmissionPipeline,
    events: EventSink,
    /// Serializes session transitions so purge and reset run as one step
    transitions: Mutex<()>,
}

impl DashboardContext {
    pub fn new(
        api: Arc<dyn ApiService>,
        store: Arc<dyn SessionStore>,
        demo_latency: Duration,
        events: EventSink,
    ) -> Self {
        let tracker = Arc::new(ConnectionStateTracker::new());
        let coordinator = Arc::new(SyncCoordinator::new(store));
        let cache = ResourceCache::new(Arc::clone(&tracker), events.clone());
        let bus = InvalidationBus::new(cache.clone(), events.clone());
        let journal = JournalSubmissionPipeline::new(
            Arc::clone(&api),
            cache.clone(),
            Arc::clone(&tracker),
            demo_latency,
            events.clone(),
        );

        Self {
            tracker,
            coordinator,
            cache,
            bus,
            demo: DemoDataProvider::new(),
            api,
            journal,
            events,
            transitions: Mutex::new(()),
        }
    }

    pub fn tracker(&self) -> &ConnectionStateTracker {
        &self.tracker
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn is_demo(&self) -> bool {
        self.tracker.wallet_id().is_none()
    }

    /// Sync status of the active wallet; `None` in demo mode.
    pub fn sync_status(&self) -> Option<SyncStatus> {
        self.tracker
            .wallet_id()
            .map(|wallet| self.coordinator.status(&wallet))
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Re-read the provider's signals and apply any change.
    pub fn handle_wallet_change(&self, provider: &dyn WalletProvider) -> SessionTransition {
        let next = self.tracker.observe(provider);
        self.set_session(next)
    }

    /// Apply a new session.
    ///
    /// A departing wallet's cache entries and sync record are dropped before
    /// this returns; a switch runs as a disconnect followed by a connect.
    pub fn set_session(&self, next: WalletSession) -> SessionTransition {
        let _guard = self.transitions.lock();

        let transition = self.tracker.transition_to(&next);
        if transition == SessionTransition::Unchanged {
            return transition;
        }

        self.tracker.publish(next);

        if let Some(departed) = transition.departed() {
            self.cache.purge_wallet_scoped();
            self.coordinator.reset(departed);
        }

        tracing::info!(transition = %transition, "Wallet session changed");
        self.events.emit(DashboardEvent::SessionChanged(transition.clone()));

        if let Some(arrived) = transition.arrived() {
            let status = self.coordinator.on_connect(arrived);
            self.events.emit(DashboardEvent::SyncStatusChanged {
                wallet: arrived.to_string(),
                status,
            });
        }

        transition
    }

    /// Connect through the provider and apply the resulting session.
    pub async fn connect(&self, provider: &dyn WalletProvider) -> Result<SessionTransition> {
        provider.connect().await?;
        Ok(self.handle_wallet_change(provider))
    }

    pub async fn disconnect(&self, provider: &dyn WalletProvider) -> Result<SessionTransition> {
        provider.disconnect().await?;
        Ok(self.handle_wallet_change(provider))
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Start the sync of the active wallet if it has not run yet.
    ///
    /// Safe to call from any number of consumers: only the first call for a
    /// `NotSynced` wallet starts a sync.
    pub fn ensure_sync(&self) -> Option<SyncStatus> {
        let wallet = self.tracker.wallet_id()?;
        match self.coordinator.begin(&wallet) {
            Some(ticket) => {
                self.spawn_sync(ticket);
                Some(SyncStatus::Syncing)
            }
            None => Some(self.coordinator.status(&wallet)),
        }
    }

    /// Retry a failed sync of the active wallet. Returns `false` unless the
    /// wallet was in `Failed`.
    pub fn retry_sync(&self) -> bool {
        let Some(wallet) = self.tracker.wallet_id() else {
            return false;
        };
        match self.coordinator.retry(&wallet) {
            Some(ticket) => {
                self.spawn_sync(ticket);
                true
            }
            None => false,
        }
    }

    /// Wait for the active wallet's sync to leave `Syncing`.
    pub async fn wait_for_sync(&self) -> Option<SyncStatus> {
        let wallet = self.tracker.wallet_id()?;
        Some(self.coordinator.wait_until_settled(&wallet).await)
    }

    fn spawn_sync(&self, ticket: SyncTicket) {
        let wallet = ticket.wallet_id().to_string();
        self.events.emit(DashboardEvent::SyncStatusChanged {
            wallet: wallet.clone(),
            status: SyncStatus::Syncing,
        });

        let coordinator = Arc::clone(&self.coordinator);
        let api = Arc::clone(&self.api);
        let cache = self.cache.clone();
        let bus = self.bus.clone();
        let events = self.events.clone();

        spawn_tracked("sync", async move {
            // The wallet's entries stay gated until `run` flips the status, so
            // every fetch issued past this mark already sees the synced wallet.
            let mark = cache.watermark();
            let outcome = with_trace_id_async(|_trace_id| coordinator.run(api.as_ref(), ticket)).await;

            let Some(status) = outcome else {
                tracing::debug!(wallet = %short_wallet(&wallet), "Sync outcome dropped after reset");
                return;
            };

            events.emit(DashboardEvent::SyncStatusChanged {
                wallet: wallet.clone(),
                status,
            });
            if status == SyncStatus::Synced {
                bus.sync_completed(&wallet, mark);
            }
        });
    }

    /// Explicit user refresh: invalidate the sync-dependent set without
    /// re-running sync. No-op in demo mode and before sync completes.
    pub fn refresh(&self) -> Option<InvalidationOutcome> {
        let wallet = self.tracker.wallet_id()?;
        if self.coordinator.status(&wallet) != SyncStatus::Synced {
            return None;
        }
        Some(self.bus.refresh(&wallet))
    }

    // ========================================================================
    // Resources
    // ========================================================================

    pub fn positions(&self) -> QueryResult<Vec<Position>> {
        let Some(wallet) = self.live_wallet() else {
            return QueryResult::demo(self.demo.positions());
        };
        self.live(
            ResourceKey::wallet_scoped(ResourceKind::Positions, wallet.as_str()),
            self.demo.positions(),
            |api, wallet| async move { api.get_positions(&wallet).await },
        )
    }

    pub fn analytics(&self, filter: &AnalyticsFilter) -> QueryResult<AnalyticsSummary> {
        let Some(wallet) = self.live_wallet() else {
            return QueryResult::demo(self.demo.analytics(filter));
        };
        let fetch_filter = filter.clone();
        self.live(
            ResourceKey::wallet_scoped(ResourceKind::Analytics, wallet.as_str())
                .with_params(filter.cache_key()),
            self.demo.analytics(filter),
            move |api, wallet| {
                let filter = fetch_filter.clone();
                async move { api.get_analytics(&wallet, &filter).await }
            },
        )
    }

    pub fn trades(&self, query: &TradeQuery) -> QueryResult<TradesPage> {
        let Some(wallet) = self.live_wallet() else {
            return QueryResult::demo(self.demo.trades(query));
        };
        let fetch_query = query.clone();
        self.live(
            ResourceKey::wallet_scoped(ResourceKind::Trades, wallet.as_str())
                .with_params(query.cache_key()),
            self.demo.trades(query),
            move |api, wallet| {
                let query = fetch_query.clone();
                async move { api.get_trades(&wallet, &query).await }
            },
        )
    }

    pub fn historical_pnl(&self) -> QueryResult<Vec<HistoricalPnlPoint>> {
        let Some(wallet) = self.live_wallet() else {
            return QueryResult::demo(self.demo.historical_pnl());
        };
        self.live(
            ResourceKey::wallet_scoped(ResourceKind::HistoricalPnl, wallet.as_str()),
            self.demo.historical_pnl(),
            |api, wallet| async move { api.get_historical_pnl(&wallet).await },
        )
    }

    /// Peak-to-trough drawdown, derived from the historical PnL series.
    pub fn drawdown(&self) -> QueryResult<Vec<DrawdownPoint>> {
        let Some(wallet) = self.live_wallet() else {
            return QueryResult::demo(self.demo.drawdown());
        };
        self.live(
            ResourceKey::wallet_scoped(ResourceKind::Drawdown, wallet.as_str()),
            self.demo.drawdown(),
            |api, wallet| async move {
                api.get_historical_pnl(&wallet)
                    .await
                    .map(|points| drawdown_series(&points))
            },
        )
    }

    pub fn heatmap(&self, year: i32, month: u32) -> QueryResult<Vec<HeatmapDay>> {
        let Some(wallet) = self.live_wallet() else {
            return QueryResult::demo(self.demo.heatmap(year, month));
        };
        self.live(
            ResourceKey::wallet_scoped(ResourceKind::Heatmap, wallet.as_str())
                .with_params(format!("{}-{:02}", year, month)),
            self.demo.heatmap(year, month),
            move |api, wallet| async move { api.get_heatmap(&wallet, year, month).await },
        )
    }

    pub fn composition(&self) -> QueryResult<Vec<CompositionSlice>> {
        let Some(wallet) = self.live_wallet() else {
            return QueryResult::demo(self.demo.composition());
        };
        self.live(
            ResourceKey::wallet_scoped(ResourceKind::Composition, wallet.as_str()),
            self.demo.composition(),
            |api, wallet| async move { api.get_composition(&wallet).await },
        )
    }

    /// Wallet-independent; enabled whenever a wallet is connected and kept
    /// across wallet changes.
    pub fn leaderboard(&self) -> QueryResult<Vec<LeaderboardEntry>> {
        if self.is_demo() {
            return QueryResult::demo(self.demo.leaderboard());
        }

        let tracker = Arc::clone(&self.tracker);
        let api = Arc::clone(&self.api);
        let options = QueryOptions::for_kind(ResourceKind::Leaderboard)
            .enabled(Gate::when(move || tracker.connected()))
            .placeholder(self.demo.leaderboard());

        self.cache.query(ResourceKey::global(ResourceKind::Leaderboard), options, move || {
            let api = Arc::clone(&api);
            async move { api.get_leaderboard().await }
        })
    }

    pub fn journal(&self, position_id: &str) -> QueryResult<JournalEntry> {
        let Some(wallet) = self.live_wallet() else {
            return QueryResult::demo(self.demo.journal(position_id));
        };
        let fetch_id = position_id.to_string();
        self.live(
            journal_key(&wallet, position_id),
            self.demo.journal(position_id),
            move |api, _wallet| {
                let position_id = fetch_id.clone();
                async move { api.get_journal(&position_id).await }
            },
        )
    }

    // ========================================================================
    // Journal
    // ========================================================================

    pub fn validate_journal(&self, draft: &JournalDraft) -> ValidationReport {
        self.journal.validate(draft)
    }

    pub async fn submit_journal(&self, position_id: &str, draft: &JournalDraft) -> Result<JournalSubmission> {
        self.journal.submit(position_id, draft).await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Active wallet, after kicking off its sync if needed.
    fn live_wallet(&self) -> Option<String> {
        let wallet = self.tracker.wallet_id()?;
        self.ensure_sync();
        Some(wallet)
    }

    /// Open while `wallet` is the active session and its sync has completed.
    fn synced_gate(&self, wallet: &str) -> Gate {
        let tracker = Arc::clone(&self.tracker);
        let coordinator = Arc::clone(&self.coordinator);
        let wallet = wallet.to_string();
        Gate::when(move || tracker.is_active(&wallet) && coordinator.status(&wallet) == SyncStatus::Synced)
    }

    /// Evaluate a wallet-scoped entry behind the sync gate, with `placeholder`
    /// served until the first fetch lands.
    fn live<T, F, Fut>(&self, key: ResourceKey, placeholder: Arc<T>, fetch: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<dyn ApiService>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let owner = key.wallet.clone().unwrap_or_default();
        let options = QueryOptions::for_kind(key.kind)
            .enabled(self.synced_gate(&owner))
            .placeholder(placeholder);
        let api = Arc::clone(&self.api);

        self.cache
            .query(key, options, move || fetch(Arc::clone(&api), owner.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Source;
    use crate::services::MemorySessionStore;
    use async_trait::async_trait;
    use shared::dto::{JournalPayload, JournalResponse, SyncResult};

    const WALLET: &str = "8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL";

    /// Every call fails; the tests below must never reach it.
    struct UnreachableApi;

    #[async_trait]
    impl ApiService for UnreachableApi {
        async fn sync_wallet(&self, _: &str) -> Result<SyncResult> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn get_positions(&self, _: &str) -> Result<Vec<Position>> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn get_trades(&self, _: &str, _: &TradeQuery) -> Result<TradesPage> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn get_analytics(&self, _: &str, _: &AnalyticsFilter) -> Result<AnalyticsSummary> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn get_historical_pnl(&self, _: &str) -> Result<Vec<HistoricalPnlPoint>> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn get_composition(&self, _: &str) -> Result<Vec<CompositionSlice>> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn get_heatmap(&self, _: &str, _: i32, _: u32) -> Result<Vec<HeatmapDay>> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn get_journal(&self, _: &str) -> Result<JournalEntry> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
        async fn update_journal(&self, _: &str, _: &JournalPayload) -> Result<JournalResponse> {
            Err(crate::core::error::AppError::Network("unreachable".into()))
        }
    }

    fn context() -> DashboardContext {
        DashboardContext::new(
            Arc::new(UnreachableApi),
            Arc::new(MemorySessionStore::new()),
            Duration::from_millis(800),
            EventSink::disabled(),
        )
    }

    #[test]
    fn test_demo_accessors_serve_fixtures() {
        let ctx = context();
        assert!(ctx.is_demo());
        assert_eq!(ctx.sync_status(), None);

        let positions = ctx.positions();
        assert_eq!(positions.source, Some(Source::Demo));
        assert!(!positions.is_placeholder());
        assert!(Arc::ptr_eq(&positions.data.unwrap(), &ctx.demo.positions()));
        assert!(ctx.cache().keys().is_empty());
    }

    #[test]
    fn test_switch_resets_departed_record() {
        let ctx = context();
        let other = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

        ctx.set_session(WalletSession::connected(WALLET));
        assert_eq!(ctx.sync_status(), Some(SyncStatus::NotSynced));
        assert!(ctx.coordinator().record(WALLET).is_some());

        let transition = ctx.set_session(WalletSession::connected(other));
        assert_eq!(
            transition,
            SessionTransition::Switched {
                from: WALLET.to_string(),
                to: other.to_string()
            }
        );
        assert!(ctx.coordinator().record(WALLET).is_none());
        assert!(ctx.coordinator().record(other).is_some());
        assert_eq!(ctx.cache().epoch(), 1);
    }

    #[test]
    fn test_unchanged_session_is_a_no_op() {
        let ctx = context();
        ctx.set_session(WalletSession::connected(WALLET));
        let transition = ctx.set_session(WalletSession::connected(WALLET));
        assert_eq!(transition, SessionTransition::Unchanged);
        assert_eq!(ctx.cache().epoch(), 0);
    }

    #[test]
    fn test_refresh_is_a_no_op_before_sync() {
        let ctx = context();
        assert_eq!(ctx.refresh(), None);
        ctx.set_session(WalletSession::connected(WALLET));
        assert_eq!(ctx.refresh(), None);
    }
}
