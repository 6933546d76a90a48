//! # Analytics Endpoints
//!
//! Summary metrics and the per-wallet series behind the charts. The
//! leaderboard is the only wallet-independent endpoint.

use super::client::ApiClient;
use crate::core::error::Result;
use shared::dto::{
    AnalyticsFilter, AnalyticsSummary, CompositionSlice, HeatmapDay, HistoricalPnlPoint,
    LeaderboardEntry,
};

#[tracing::instrument(skip(client, filter), fields(wallet = %shared::short_wallet(wallet), filter = %filter.cache_key()))]
pub async fn get_analytics(
    client: &ApiClient,
    wallet: &str,
    filter: &AnalyticsFilter,
) -> Result<AnalyticsSummary> {
    let request = client
        .client
        .get(client.url(&format!("/analytics/{}", wallet)))
        .query(filter);
    client.send("analytics", request).await
}

#[tracing::instrument(skip(client), fields(wallet = %shared::short_wallet(wallet)))]
pub async fn get_historical_pnl(client: &ApiClient, wallet: &str) -> Result<Vec<HistoricalPnlPoint>> {
    let request = client
        .client
        .get(client.url(&format!("/analytics/{}/historical-pnl", wallet)));
    let series: Vec<HistoricalPnlPoint> = client.send("historical-pnl", request).await?;
    tracing::debug!(points = series.len(), "Historical PnL fetched");
    Ok(series)
}

#[tracing::instrument(skip(client), fields(wallet = %shared::short_wallet(wallet)))]
pub async fn get_composition(client: &ApiClient, wallet: &str) -> Result<Vec<CompositionSlice>> {
    let request = client
        .client
        .get(client.url(&format!("/analytics/{}/composition", wallet)));
    client.send("composition", request).await
}

#[tracing::instrument(skip(client), fields(wallet = %shared::short_wallet(wallet)))]
pub async fn get_heatmap(
    client: &ApiClient,
    wallet: &str,
    year: i32,
    month: u32,
) -> Result<Vec<HeatmapDay>> {
    let request = client
        .client
        .get(client.url(&format!("/analytics/{}/heatmap", wallet)))
        .query(&[("year", year.to_string()), ("month", month.to_string())]);
    client.send("heatmap", request).await
}

#[tracing::instrument(skip(client))]
pub async fn get_leaderboard(client: &ApiClient) -> Result<Vec<LeaderboardEntry>> {
    let request = client.client.get(client.url("/analytics/leaderboard"));
    client.send("leaderboard", request).await
}
