//! Shared fixtures for the scenario tests: a counting fake API and helpers to
//! build a context and wait on its event stream.

#![allow(dead_code)]

use async_channel::Receiver;
use async_trait::async_trait;
use dashboard::app::{DashboardContext, DashboardEvent, EventSink};
use dashboard::core::service::{ApiService, SessionStore};
use dashboard::demo::DemoDataProvider;
use dashboard::services::{sync_flag_key, MemorySessionStore};
use dashboard::{AppError, Result};
use parking_lot::Mutex;
use shared::dto::{
    AnalyticsFilter, AnalyticsSummary, CompositionSlice, HeatmapDay, HistoricalPnlPoint,
    JournalEntry, JournalPayload, JournalResponse, LeaderboardEntry, Position, SyncResult,
    TradeQuery, TradesPage,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub const WALLET_A: &str = "8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL";
pub const WALLET_B: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

pub const DEMO_LATENCY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Sync,
    Positions,
    Trades,
    Analytics,
    HistoricalPnl,
    Composition,
    Heatmap,
    Leaderboard,
    GetJournal,
    UpdateJournal,
}

/// In-process `ApiService` that counts calls per endpoint.
///
/// An endpoint can be made to fail, or held until released so a test can act
/// while the call is in flight.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<HashMap<Endpoint, u32>>,
    failing: Mutex<HashSet<Endpoint>>,
    holds: Mutex<HashMap<Endpoint, Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self, endpoint: Endpoint) -> u32 {
        self.calls.lock().get(&endpoint).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().values().sum()
    }

    pub fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failing.lock().remove(&endpoint);
    }

    /// Calls to `endpoint` block until [`release`](Self::release).
    pub fn hold(&self, endpoint: Endpoint) {
        self.holds.lock().insert(endpoint, Arc::new(Notify::new()));
    }

    pub fn release(&self, endpoint: Endpoint) {
        if let Some(gate) = self.holds.lock().remove(&endpoint) {
            gate.notify_one();
        }
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<()> {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;

        let gate = self.holds.lock().get(&endpoint).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing.lock().contains(&endpoint) {
            return Err(AppError::Api {
                status: Some(500),
                message: format!("{:?} unavailable", endpoint),
            });
        }
        Ok(())
    }
}

/// Live positions carry the wallet in their id.
pub fn live_position_id(wallet: &str) -> String {
    format!("live-{}", wallet)
}

#[async_trait]
impl ApiService for FakeApi {
    async fn sync_wallet(&self, _wallet: &str) -> Result<SyncResult> {
        self.enter(Endpoint::Sync).await?;
        Ok(SyncResult {
            positions_updated: 2,
            fills_processed: 9,
        })
    }

    async fn get_positions(&self, wallet: &str) -> Result<Vec<Position>> {
        self.enter(Endpoint::Positions).await?;
        let mut position = DemoDataProvider::new().positions()[0].clone();
        position.id = live_position_id(wallet);
        Ok(vec![position])
    }

    async fn get_trades(&self, wallet: &str, query: &TradeQuery) -> Result<TradesPage> {
        self.enter(Endpoint::Trades).await?;
        let mut page = (*DemoDataProvider::new().trades(query)).clone();
        for trade in &mut page.data {
            trade.position_id = Some(live_position_id(wallet));
        }
        Ok(page)
    }

    async fn get_analytics(&self, _wallet: &str, filter: &AnalyticsFilter) -> Result<AnalyticsSummary> {
        self.enter(Endpoint::Analytics).await?;
        let mut summary = (*DemoDataProvider::new().analytics(filter)).clone();
        summary.total_trades = 1;
        Ok(summary)
    }

    async fn get_historical_pnl(&self, _wallet: &str) -> Result<Vec<HistoricalPnlPoint>> {
        self.enter(Endpoint::HistoricalPnl).await?;
        Ok(DemoDataProvider::new().historical_pnl()[..3].to_vec())
    }

    async fn get_composition(&self, _wallet: &str) -> Result<Vec<CompositionSlice>> {
        self.enter(Endpoint::Composition).await?;
        Ok(DemoDataProvider::new().composition()[..1].to_vec())
    }

    async fn get_heatmap(&self, _wallet: &str, year: i32, month: u32) -> Result<Vec<HeatmapDay>> {
        self.enter(Endpoint::Heatmap).await?;
        Ok(DemoDataProvider::new().heatmap(year, month)[..1].to_vec())
    }

    async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.enter(Endpoint::Leaderboard).await?;
        Ok(DemoDataProvider::new().leaderboard()[..2].to_vec())
    }

    async fn get_journal(&self, position_id: &str) -> Result<JournalEntry> {
        self.enter(Endpoint::GetJournal).await?;
        Ok(JournalEntry {
            position_id: position_id.to_string(),
            notes: Some(format!("remote note #{}", self.calls(Endpoint::GetJournal))),
            ..JournalEntry::default()
        })
    }

    async fn update_journal(&self, position_id: &str, payload: &JournalPayload) -> Result<JournalResponse> {
        self.enter(Endpoint::UpdateJournal).await?;
        let mut response = DemoDataProvider::new().journal_response(position_id, payload);
        response.data.ai_score = Some(6);
        Ok(response)
    }
}

pub struct Harness {
    pub ctx: DashboardContext,
    pub api: Arc<FakeApi>,
    pub store: Arc<MemorySessionStore>,
    pub events: Receiver<DashboardEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemorySessionStore::new()))
    }

    /// Harness whose session already holds the sync flag of each wallet.
    pub fn synced(wallets: &[&str]) -> Self {
        let store = Arc::new(MemorySessionStore::new());
        for wallet in wallets {
            store.set(&sync_flag_key(wallet), "true").ok();
        }
        Self::with_store(store)
    }

    pub fn with_store(store: Arc<MemorySessionStore>) -> Self {
        let api = FakeApi::new();
        let (sink, events) = EventSink::channel(4096);
        let ctx = DashboardContext::new(api.clone(), store.clone(), DEMO_LATENCY, sink);
        Self {
            ctx,
            api,
            store,
            events,
        }
    }

    pub fn sync_flag(&self, wallet: &str) -> Option<String> {
        self.store.get(&sync_flag_key(wallet))
    }

    /// Receive events until one matches `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> DashboardEvent
    where
        F: Fn(&DashboardEvent) -> bool,
    {
        let wait = async {
            loop {
                match self.events.recv().await {
                    Ok(event) if predicate(&event) => return event,
                    Ok(_) => continue,
                    Err(e) => panic!("event channel closed: {}", e),
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(60), wait)
            .await
            .expect("timed out waiting for event")
    }

    /// Events received so far, without waiting.
    pub fn drain(&self) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Yield until `condition` holds (bounded).
    pub async fn until<F: Fn() -> bool>(&self, condition: F) {
        for _ in 0..1000 {
            if condition() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("condition never held");
    }
}
