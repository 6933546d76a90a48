use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a perp position
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Position as returned by `GET /dashboard/{wallet}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub market: String,
    pub side: PositionSide,
    pub status: PositionStatus,
    pub size: f64,
    pub entry_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark_price: Option<f64>,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub fees: f64,
    pub opened_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Single fill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    pub market: String,
    pub side: TradeSide,
    pub price: f64,
    pub size: f64,
    pub fee: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

/// `GET /trades/{wallet}` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradesPage {
    pub data: Vec<Trade>,
    pub pagination: Pagination,
}

/// Query string for `GET /trades/{wallet}`.
///
/// Serializes straight into `?market&startDate&endDate&limit&offset`; unset
/// fields are left out of the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TradeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl TradeQuery {
    /// Stable textual form used as a cache key parameter.
    pub fn cache_key(&self) -> String {
        format!(
            "market={}&start={}&end={}&limit={}&offset={}",
            self.market.as_deref().unwrap_or("*"),
            self.start_date.map(|d| d.to_string()).unwrap_or_default(),
            self.end_date.map(|d| d.to_string()).unwrap_or_default(),
            self.limit.map(|l| l.to_string()).unwrap_or_default(),
            self.offset.map(|o| o.to_string()).unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_uses_camel_case_fields() {
        let json = r#"{
            "id": "pos-1",
            "market": "SOL-PERP",
            "side": "long",
            "status": "open",
            "size": 2.5,
            "entryPrice": 140.0,
            "markPrice": 151.2,
            "realizedPnl": 0.0,
            "unrealizedPnl": 28.0,
            "fees": 0.35,
            "openedAt": "2025-01-02T10:00:00Z"
        }"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.side, PositionSide::Long);
        assert_eq!(position.mark_price, Some(151.2));
        assert!(position.exit_price.is_none());
    }

    #[test]
    fn test_trade_query_cache_key_distinguishes_filters() {
        let all = TradeQuery::default();
        let sol = TradeQuery {
            market: Some("SOL-PERP".to_string()),
            ..TradeQuery::default()
        };
        assert_ne!(all.cache_key(), sol.cache_key());
        assert_eq!(sol.cache_key(), sol.clone().cache_key());
    }
}
