//! # Demo Data Provider
//!
//! Deterministic fixtures served whenever no wallet is connected, and used as
//! the placeholder of live entries that have not resolved yet. Never performs
//! I/O; every accessor returns the same value for the same arguments.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use shared::dto::{
    drawdown_series, AnalyticsFilter, AnalyticsSummary, CompositionSlice, DrawdownPoint, Emotion,
    HeatmapDay, HistoricalPnlPoint, JournalAnalysis, JournalEntry, JournalPayload,
    JournalResponse, LeaderboardEntry, Pagination, Position, PositionSide, PositionStatus, Trade,
    TradeQuery, TradeSide, TradesPage,
};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// AI score attached to every simulated journal submission
pub const DEMO_AI_SCORE: u8 = 8;
/// Bias attached to every simulated journal submission
pub const DEMO_AI_BIAS: &str = "Recency Bias";

const DEFAULT_TRADES_LIMIT: u32 = 50;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap_or_default()
}

fn timestamp(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

static POSITIONS: Lazy<Arc<Vec<Position>>> = Lazy::new(|| {
    Arc::new(vec![
        Position {
            id: "demo-pos-1".to_string(),
            market: "SOL-PERP".to_string(),
            side: PositionSide::Long,
            status: PositionStatus::Open,
            size: 25.0,
            entry_price: 142.35,
            exit_price: None,
            mark_price: Some(151.80),
            realized_pnl: 0.0,
            unrealized_pnl: 236.25,
            fees: 3.56,
            opened_at: timestamp(3, 10, 14),
            closed_at: None,
        },
        Position {
            id: "demo-pos-2".to_string(),
            market: "BTC-PERP".to_string(),
            side: PositionSide::Short,
            status: PositionStatus::Open,
            size: 0.4,
            entry_price: 68_420.0,
            exit_price: None,
            mark_price: Some(67_150.0),
            realized_pnl: 0.0,
            unrealized_pnl: 508.0,
            fees: 13.68,
            opened_at: timestamp(3, 12, 9),
            closed_at: None,
        },
        Position {
            id: "demo-pos-3".to_string(),
            market: "ETH-PERP".to_string(),
            side: PositionSide::Long,
            status: PositionStatus::Closed,
            size: 6.0,
            entry_price: 3_480.0,
            exit_price: Some(3_395.0),
            mark_price: None,
            realized_pnl: -510.0,
            unrealized_pnl: 0.0,
            fees: 20.64,
            opened_at: timestamp(3, 4, 16),
            closed_at: Some(timestamp(3, 6, 11)),
        },
        Position {
            id: "demo-pos-4".to_string(),
            market: "JUP-PERP".to_string(),
            side: PositionSide::Short,
            status: PositionStatus::Closed,
            size: 4_000.0,
            entry_price: 1.12,
            exit_price: Some(0.97),
            mark_price: None,
            realized_pnl: 600.0,
            unrealized_pnl: 0.0,
            fees: 4.18,
            opened_at: timestamp(2, 26, 8),
            closed_at: Some(timestamp(3, 2, 19)),
        },
    ])
});

static TRADES: Lazy<Vec<Trade>> = Lazy::new(|| {
    let trade = |id: &str, position: &str, market: &str, side, price, size, fee, pnl, (m, d, h)| Trade {
        id: id.to_string(),
        position_id: Some(position.to_string()),
        market: market.to_string(),
        side,
        price,
        size,
        fee,
        pnl,
        executed_at: timestamp(m, d, h),
    };

    vec![
        trade("demo-fill-8", "demo-pos-2", "BTC-PERP", TradeSide::Sell, 68_420.0, 0.4, 13.68, None, (3, 12, 9)),
        trade("demo-fill-7", "demo-pos-1", "SOL-PERP", TradeSide::Buy, 142.35, 25.0, 3.56, None, (3, 10, 14)),
        trade("demo-fill-6", "demo-pos-3", "ETH-PERP", TradeSide::Sell, 3_395.0, 6.0, 10.19, Some(-510.0), (3, 6, 11)),
        trade("demo-fill-5", "demo-pos-3", "ETH-PERP", TradeSide::Buy, 3_480.0, 6.0, 10.45, None, (3, 4, 16)),
        trade("demo-fill-4", "demo-pos-4", "JUP-PERP", TradeSide::Buy, 0.97, 4_000.0, 1.94, Some(600.0), (3, 2, 19)),
        trade("demo-fill-3", "demo-pos-4", "JUP-PERP", TradeSide::Sell, 1.12, 4_000.0, 2.24, None, (2, 26, 8)),
        trade("demo-fill-2", "demo-pos-0", "SOL-PERP", TradeSide::Sell, 131.10, 40.0, 2.62, Some(412.0), (2, 20, 13)),
        trade("demo-fill-1", "demo-pos-0", "SOL-PERP", TradeSide::Buy, 120.80, 40.0, 2.42, None, (2, 14, 10)),
    ]
});

static ANALYTICS: Lazy<Arc<AnalyticsSummary>> = Lazy::new(|| {
    Arc::new(AnalyticsSummary {
        total_pnl: 1_246.25,
        total_volume: 91_742.0,
        total_fees: 45.42,
        win_rate: 66.67,
        total_trades: 8,
        winning_trades: 2,
        losing_trades: 1,
        avg_win: 506.0,
        avg_loss: -510.0,
        largest_win: 600.0,
        largest_loss: -510.0,
        profit_factor: 1.98,
        avg_trade_duration_secs: 271_800,
        long_short_ratio: 1.0,
    })
});

static HISTORICAL_PNL: Lazy<Arc<Vec<HistoricalPnlPoint>>> = Lazy::new(|| {
    let daily = [
        120.0, -45.0, 210.0, 85.0, -160.0, -95.0, 240.0, 310.0, -420.0, 55.0, 130.0, -60.0, 180.0,
        96.25,
    ];
    let mut cumulative = 0.0;
    let points = daily
        .iter()
        .enumerate()
        .map(|(i, pnl)| {
            cumulative += pnl;
            HistoricalPnlPoint {
                date: date(3, i as u32 + 1),
                pnl: *pnl,
                cumulative_pnl: cumulative,
            }
        })
        .collect();
    Arc::new(points)
});

static DRAWDOWN: Lazy<Arc<Vec<DrawdownPoint>>> =
    Lazy::new(|| Arc::new(drawdown_series(&HISTORICAL_PNL)));

static COMPOSITION: Lazy<Arc<Vec<CompositionSlice>>> = Lazy::new(|| {
    let slice = |market: &str, volume, pnl, trade_count, share| CompositionSlice {
        market: market.to_string(),
        volume,
        pnl,
        trade_count,
        share,
    };
    Arc::new(vec![
        slice("BTC-PERP", 27_368.0, 508.0, 1, 0.30),
        slice("ETH-PERP", 41_250.0, -510.0, 2, 0.45),
        slice("SOL-PERP", 14_382.0, 648.25, 3, 0.15),
        slice("JUP-PERP", 8_742.0, 600.0, 2, 0.10),
    ])
});

static LEADERBOARD: Lazy<Arc<Vec<LeaderboardEntry>>> = Lazy::new(|| {
    let entry = |rank, wallet: &str, total_pnl, win_rate, total_volume, trade_count| LeaderboardEntry {
        rank,
        wallet: wallet.to_string(),
        total_pnl,
        win_rate,
        total_volume,
        trade_count,
    };
    Arc::new(vec![
        entry(1, "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU", 48_210.5, 71.2, 2_410_000.0, 412),
        entry(2, "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1", 31_877.0, 64.8, 1_985_500.0, 377),
        entry(3, "HN7cABqLq46Es1jh92dQQisAq662SmxELLLsHHe4YWrH", 22_409.2, 58.3, 1_120_340.0, 251),
        entry(4, "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", 15_663.9, 61.0, 870_200.0, 198),
        entry(5, "3Kz9VhT6dRzKDqgxG1ej8s1mDGJMGRQyqpQTkYZNvbbH", 9_120.4, 55.6, 644_010.0, 166),
    ])
});

static JOURNAL_ANALYSIS: Lazy<JournalAnalysis> = Lazy::new(|| JournalAnalysis {
    summary: "Disciplined entry with a clear thesis, but the exit was driven by the last few \
              candles rather than the original plan."
        .to_string(),
    detected_bias: DEMO_AI_BIAS.to_string(),
    score: DEMO_AI_SCORE,
    strengths: vec![
        "Position size stayed within risk limits".to_string(),
        "Entry matched the documented setup".to_string(),
    ],
    weaknesses: vec!["Exit reacted to short-term price action".to_string()],
    suggestions: vec![
        "Write the exit criteria down before opening the trade".to_string(),
        "Review the last five trades before changing the plan mid-position".to_string(),
    ],
});

/// Parameterised fixtures, built once per argument.
static TRADE_PAGES: Lazy<Mutex<HashMap<String, Arc<TradesPage>>>> = Lazy::new(Default::default);
static HEATMAPS: Lazy<Mutex<HashMap<(i32, u32), Arc<Vec<HeatmapDay>>>>> = Lazy::new(Default::default);
static JOURNALS: Lazy<Mutex<HashMap<String, Arc<JournalEntry>>>> = Lazy::new(Default::default);

fn memoized<K: Eq + Hash, V>(table: &Mutex<HashMap<K, Arc<V>>>, key: K, build: impl FnOnce() -> V) -> Arc<V> {
    Arc::clone(table.lock().entry(key).or_insert_with(|| Arc::new(build())))
}

/// Stateless fixture lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoDataProvider;

impl DemoDataProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn positions(&self) -> Arc<Vec<Position>> {
        Arc::clone(&POSITIONS)
    }

    /// The same summary for every filter.
    pub fn analytics(&self, _filter: &AnalyticsFilter) -> Arc<AnalyticsSummary> {
        Arc::clone(&ANALYTICS)
    }

    /// Fixture trades filtered by market and date range, then paginated.
    pub fn trades(&self, query: &TradeQuery) -> Arc<TradesPage> {
        memoized(&TRADE_PAGES, query.cache_key(), || trades_page(query))
    }

    pub fn historical_pnl(&self) -> Arc<Vec<HistoricalPnlPoint>> {
        Arc::clone(&HISTORICAL_PNL)
    }

    pub fn drawdown(&self) -> Arc<Vec<DrawdownPoint>> {
        Arc::clone(&DRAWDOWN)
    }

    /// One day per calendar day of `year`/`month`; empty for an invalid month.
    pub fn heatmap(&self, year: i32, month: u32) -> Arc<Vec<HeatmapDay>> {
        memoized(&HEATMAPS, (year, month), || heatmap_days(year, month))
    }

    pub fn composition(&self) -> Arc<Vec<CompositionSlice>> {
        Arc::clone(&COMPOSITION)
    }

    pub fn leaderboard(&self) -> Arc<Vec<LeaderboardEntry>> {
        Arc::clone(&LEADERBOARD)
    }

    /// Journal of a fixture position; an empty entry for unknown ids.
    pub fn journal(&self, position_id: &str) -> Arc<JournalEntry> {
        memoized(&JOURNALS, position_id.to_string(), || journal_entry(position_id))
    }

    /// Canned response of a simulated journal submission.
    pub fn journal_response(&self, position_id: &str, payload: &JournalPayload) -> JournalResponse {
        let mut data = JournalEntry::from_payload(position_id, payload);
        data.ai_score = Some(DEMO_AI_SCORE);
        data.ai_bias = Some(DEMO_AI_BIAS.to_string());

        JournalResponse {
            data,
            analysis: JOURNAL_ANALYSIS.clone(),
        }
    }
}

fn trades_page(query: &TradeQuery) -> TradesPage {
    let matching: Vec<&Trade> = TRADES
        .iter()
        .filter(|t| query.market.as_deref().map_or(true, |m| t.market == m))
        .filter(|t| query.start_date.map_or(true, |d| t.executed_at.date_naive() >= d))
        .filter(|t| query.end_date.map_or(true, |d| t.executed_at.date_naive() <= d))
        .collect();

    let limit = query.limit.unwrap_or(DEFAULT_TRADES_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let data: Vec<Trade> = matching
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .map(|t| (*t).clone())
        .collect();
    let total = matching.len() as u64;

    TradesPage {
        pagination: Pagination {
            total,
            limit,
            offset,
            has_more: (offset as u64 + data.len() as u64) < total,
        },
        data,
    }
}

fn heatmap_days(year: i32, month: u32) -> Vec<HeatmapDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|d| {
            let seed = d.day() * 37 + month * 11;
            HeatmapDay {
                date: d,
                pnl: ((seed % 11) as f64 - 5.0) * 42.5,
                trade_count: seed % 5,
            }
        })
        .collect()
}

fn journal_entry(position_id: &str) -> JournalEntry {
    match position_id {
        "demo-pos-3" => JournalEntry {
            position_id: position_id.to_string(),
            notes: Some("Chased the breakout after missing the first leg.".to_string()),
            emotion: Some(Emotion::Anxious),
            rating: Some(2),
            hypothetical_exit_price: Some(3_520.0),
            ai_score: Some(4),
            ai_bias: Some("FOMO".to_string()),
            updated_at: Some(timestamp(3, 6, 12)),
        },
        "demo-pos-4" => JournalEntry {
            position_id: position_id.to_string(),
            notes: Some("Planned short into resistance, exited at target.".to_string()),
            emotion: Some(Emotion::Calm),
            rating: Some(5),
            hypothetical_exit_price: None,
            ai_score: Some(9),
            ai_bias: None,
            updated_at: Some(timestamp(3, 2, 20)),
        },
        _ => JournalEntry {
            position_id: position_id.to_string(),
            ..JournalEntry::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_identical_across_calls() {
        let demo = DemoDataProvider::new();
        assert!(Arc::ptr_eq(&demo.positions(), &demo.positions()));
        assert!(Arc::ptr_eq(&demo.leaderboard(), &DemoDataProvider.leaderboard()));
        assert!(Arc::ptr_eq(&demo.heatmap(2025, 2), &demo.heatmap(2025, 2)));
        assert!(Arc::ptr_eq(&demo.trades(&TradeQuery::default()), &demo.trades(&TradeQuery::default())));
        assert!(Arc::ptr_eq(&demo.journal("demo-pos-3"), &demo.journal("demo-pos-3")));
        assert!(!Arc::ptr_eq(&demo.heatmap(2025, 2), &demo.heatmap(2025, 3)));
    }

    #[test]
    fn test_drawdown_is_derived_from_historical_pnl() {
        let demo = DemoDataProvider::new();
        let pnl = demo.historical_pnl();
        let drawdown = demo.drawdown();
        assert_eq!(pnl.len(), drawdown.len());
        assert!(drawdown.iter().all(|p| p.drawdown <= 0.0));
        assert!(drawdown.iter().any(|p| p.drawdown < 0.0));
    }

    #[test]
    fn test_heatmap_covers_calendar_month() {
        let demo = DemoDataProvider::new();
        assert_eq!(demo.heatmap(2024, 2).len(), 29);
        assert_eq!(demo.heatmap(2025, 2).len(), 28);
        assert_eq!(demo.heatmap(2025, 12).len(), 31);
        assert!(demo.heatmap(2025, 13).is_empty());
    }

    #[test]
    fn test_trades_filter_and_paginate() {
        let demo = DemoDataProvider::new();

        let sol = demo.trades(&TradeQuery {
            market: Some("SOL-PERP".to_string()),
            ..TradeQuery::default()
        });
        assert_eq!(sol.data.len(), 3);
        assert!(sol.data.iter().all(|t| t.market == "SOL-PERP"));

        let page = demo.trades(&TradeQuery {
            limit: Some(3),
            offset: Some(3),
            ..TradeQuery::default()
        });
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.pagination.total, 8);
        assert!(page.pagination.has_more);

        let last = demo.trades(&TradeQuery {
            limit: Some(3),
            offset: Some(6),
            ..TradeQuery::default()
        });
        assert_eq!(last.data.len(), 2);
        assert!(!last.pagination.has_more);
    }

    #[test]
    fn test_composition_shares_sum_to_one() {
        let total: f64 = DemoDataProvider.composition().iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_journal_response_echoes_payload() {
        let payload = JournalPayload {
            notes: Some("Held through the retest as planned.".to_string()),
            emotion: Some(Emotion::Calm),
            rating: Some(4),
            hypothetical_exit_price: None,
        };
        let response = DemoDataProvider.journal_response("demo-pos-1", &payload);

        assert_eq!(response.data.position_id, "demo-pos-1");
        assert_eq!(response.data.notes, payload.notes);
        assert_eq!(response.data.ai_score, Some(8));
        assert_eq!(response.data.ai_bias.as_deref(), Some("Recency Bias"));
        assert_eq!(response.analysis.detected_bias, "Recency Bias");
    }
}
