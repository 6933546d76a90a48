//! # Service Traits
//!
//! Seams to the three external collaborators of the dashboard core: the
//! analytics API, the wallet provider and session-scoped storage. Everything
//! above these traits is exercised in tests with in-process fakes.

use crate::core::error::Result;
use async_trait::async_trait;
use shared::dto::{
    AnalyticsFilter, AnalyticsSummary, CompositionSlice, HeatmapDay, HistoricalPnlPoint,
    JournalEntry, JournalPayload, JournalResponse, LeaderboardEntry, Position, SyncResult,
    TradeQuery, TradesPage,
};

/// Remote analytics API.
///
/// Implementations unwrap the `{success, data, error}` envelope: a non-2xx
/// status or `success = false` must come back as `Err`.
#[async_trait]
pub trait ApiService: Send + Sync {
    /// `POST /sync`: index the wallet's on-chain history
    async fn sync_wallet(&self, wallet: &str) -> Result<SyncResult>;

    /// `GET /dashboard/{wallet}`
    async fn get_positions(&self, wallet: &str) -> Result<Vec<Position>>;

    /// `GET /trades/{wallet}`
    async fn get_trades(&self, wallet: &str, query: &TradeQuery) -> Result<TradesPage>;

    /// `GET /analytics/{wallet}`
    async fn get_analytics(&self, wallet: &str, filter: &AnalyticsFilter) -> Result<AnalyticsSummary>;

    /// `GET /analytics/{wallet}/historical-pnl`
    async fn get_historical_pnl(&self, wallet: &str) -> Result<Vec<HistoricalPnlPoint>>;

    /// `GET /analytics/{wallet}/composition`
    async fn get_composition(&self, wallet: &str) -> Result<Vec<CompositionSlice>>;

    /// `GET /analytics/{wallet}/heatmap?year&month`
    async fn get_heatmap(&self, wallet: &str, year: i32, month: u32) -> Result<Vec<HeatmapDay>>;

    /// `GET /analytics/leaderboard` (wallet independent)
    async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>>;

    /// `GET /journal/{positionId}`
    async fn get_journal(&self, position_id: &str) -> Result<JournalEntry>;

    /// `PATCH /journal/{positionId}`
    async fn update_journal(&self, position_id: &str, payload: &JournalPayload) -> Result<JournalResponse>;
}

/// External wallet provider.
///
/// The dashboard only consumes these signals; key management and signing
/// stay inside the provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn connected(&self) -> bool;

    /// Base58 public key of the connected wallet
    fn public_key(&self) -> Option<String>;

    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;
}

/// Session-scoped key/value storage (the browser's `sessionStorage` equivalent).
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}
