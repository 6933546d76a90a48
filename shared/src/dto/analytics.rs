use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filter for `GET /analytics/{wallet}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl AnalyticsFilter {
    pub fn cache_key(&self) -> String {
        format!(
            "market={}&start={}&end={}",
            self.market.as_deref().unwrap_or("*"),
            self.start_date.map(|d| d.to_string()).unwrap_or_default(),
            self.end_date.map(|d| d.to_string()).unwrap_or_default(),
        )
    }
}

/// Aggregate performance metrics computed server-side
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_pnl: f64,
    pub total_volume: f64,
    pub total_fees: f64,
    pub win_rate: f64,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,
    pub avg_trade_duration_secs: u64,
    pub long_short_ratio: f64,
}

/// One day of the historical PnL series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPnlPoint {
    pub date: NaiveDate,
    pub pnl: f64,
    pub cumulative_pnl: f64,
}

/// Peak-to-trough drawdown for a day, derived from cumulative PnL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    /// Distance below the running peak (<= 0)
    pub drawdown: f64,
    /// Same distance as a percentage of the running peak, 0 while the peak is <= 0
    pub drawdown_pct: f64,
}

/// Calendar heatmap cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub pnl: f64,
    pub trade_count: u32,
}

/// Share of volume/PnL per market
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSlice {
    pub market: String,
    pub volume: f64,
    pub pnl: f64,
    pub trade_count: u32,
    /// Fraction of total volume in `[0, 1]`
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub wallet: String,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub total_volume: f64,
    pub trade_count: u32,
}

/// Build the drawdown series for a historical PnL series.
///
/// Drawdown is measured against the running maximum of `cumulative_pnl`.
pub fn drawdown_series(points: &[HistoricalPnlPoint]) -> Vec<DrawdownPoint> {
    let mut peak = f64::NEG_INFINITY;
    points
        .iter()
        .map(|point| {
            peak = peak.max(point.cumulative_pnl);
            let drawdown = point.cumulative_pnl - peak;
            let drawdown_pct = if peak > 0.0 { drawdown / peak * 100.0 } else { 0.0 };
            DrawdownPoint {
                date: point.date,
                drawdown,
                drawdown_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, cumulative: f64) -> HistoricalPnlPoint {
        HistoricalPnlPoint {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            pnl: 0.0,
            cumulative_pnl: cumulative,
        }
    }

    #[test]
    fn test_drawdown_tracks_running_peak() {
        let series = drawdown_series(&[point(1, 100.0), point(2, 150.0), point(3, 120.0), point(4, 160.0)]);
        let drawdowns: Vec<f64> = series.iter().map(|p| p.drawdown).collect();
        assert_eq!(drawdowns, vec![0.0, 0.0, -30.0, 0.0]);
        assert!((series[2].drawdown_pct + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_drawdown_pct_is_zero_without_positive_peak() {
        let series = drawdown_series(&[point(1, -10.0), point(2, -25.0)]);
        assert_eq!(series[1].drawdown, -15.0);
        assert_eq!(series[1].drawdown_pct, 0.0);
    }

    #[test]
    fn test_empty_series() {
        assert!(drawdown_series(&[]).is_empty());
    }
}
