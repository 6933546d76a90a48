//! # API Client
//!
//! Main HTTP client for analytics API communication.

use crate::core::error::{AppError, Result};
use crate::core::service::ApiService;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::dto::{
    AnalyticsFilter, AnalyticsSummary, ApiResponse, CompositionSlice, HeatmapDay,
    HistoricalPnlPoint, JournalEntry, JournalPayload, JournalResponse, LeaderboardEntry, Position,
    SyncResult, TradeQuery, TradesPage,
};
use std::time::{Duration, Instant};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the analytics API.
///
/// Holds a pooled `reqwest::Client`; cloning it is cheap and shares the pool.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with the default 10 second timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build configured HTTP client, using defaults");
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and unwrap the response envelope.
    ///
    /// `endpoint` is only used for log fields.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let start = Instant::now();

        let response = request.send().await.map_err(|e| {
            tracing::error!(
                endpoint,
                error = %e,
                duration_ms = start.elapsed().as_millis(),
                "Network error"
            );
            AppError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;

        let result = decode_envelope(status, &body);
        match &result {
            Ok(_) => tracing::debug!(
                endpoint,
                status,
                duration_ms = start.elapsed().as_millis(),
                "Request succeeded"
            ),
            Err(e) => tracing::warn!(
                endpoint,
                status,
                error = %e,
                duration_ms = start.elapsed().as_millis(),
                "Request failed"
            ),
        }
        result
    }
}

/// Decode a `{success, data, error}` body received with HTTP `status`.
///
/// Non-2xx statuses are failures; the envelope's `error` message is used when
/// the body carries one.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        return Err(AppError::Api {
            status: Some(status),
            message,
        });
    }

    let envelope: ApiResponse<T> = serde_json::from_str(body)?;
    envelope.into_result().map_err(|message| AppError::Api {
        status: Some(status),
        message,
    })
}

#[async_trait::async_trait]
impl ApiService for ApiClient {
    async fn sync_wallet(&self, wallet: &str) -> Result<SyncResult> {
        super::sync::sync_wallet(self, wallet).await
    }

    async fn get_positions(&self, wallet: &str) -> Result<Vec<Position>> {
        super::portfolio::get_positions(self, wallet).await
    }

    async fn get_trades(&self, wallet: &str, query: &TradeQuery) -> Result<TradesPage> {
        super::portfolio::get_trades(self, wallet, query).await
    }

    async fn get_analytics(&self, wallet: &str, filter: &AnalyticsFilter) -> Result<AnalyticsSummary> {
        super::analytics::get_analytics(self, wallet, filter).await
    }

    async fn get_historical_pnl(&self, wallet: &str) -> Result<Vec<HistoricalPnlPoint>> {
        super::analytics::get_historical_pnl(self, wallet).await
    }

    async fn get_composition(&self, wallet: &str) -> Result<Vec<CompositionSlice>> {
        super::analytics::get_composition(self, wallet).await
    }

    async fn get_heatmap(&self, wallet: &str, year: i32, month: u32) -> Result<Vec<HeatmapDay>> {
        super::analytics::get_heatmap(self, wallet, year, month).await
    }

    async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        super::analytics::get_leaderboard(self).await
    }

    async fn get_journal(&self, position_id: &str) -> Result<JournalEntry> {
        super::journal::get_journal(self, position_id).await
    }

    async fn update_journal(&self, position_id: &str, payload: &JournalPayload) -> Result<JournalResponse> {
        super::journal::update_journal(self, position_id, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3001/api/");
        assert_eq!(client.url("/sync"), "http://localhost:3001/api/sync");
    }

    #[test]
    fn test_decode_success_envelope() {
        let result: Result<Vec<u32>> = decode_envelope(200, r#"{"success":true,"data":[1,2]}"#);
        assert_eq!(result, Ok(vec![1, 2]));
    }

    #[test]
    fn test_decode_success_false_is_api_error() {
        let result: Result<u32> = decode_envelope(200, r#"{"success":false,"error":"not synced"}"#);
        assert_eq!(
            result,
            Err(AppError::Api {
                status: Some(200),
                message: "not synced".to_string()
            })
        );
    }

    #[test]
    fn test_decode_non_2xx_prefers_envelope_message() {
        let result: Result<u32> = decode_envelope(404, r#"{"success":false,"error":"Position not found"}"#);
        assert_eq!(
            result,
            Err(AppError::Api {
                status: Some(404),
                message: "Position not found".to_string()
            })
        );

        let result: Result<u32> = decode_envelope(500, "<html>oops</html>");
        assert!(matches!(result, Err(AppError::Api { status: Some(500), .. })));
    }

    #[test]
    fn test_decode_malformed_body_is_api_error() {
        let result: Result<u32> = decode_envelope(200, "not json");
        assert!(matches!(result, Err(AppError::Api { status: None, .. })));
    }
}
