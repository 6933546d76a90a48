//! # Portfolio Endpoints
//!
//! Positions (`GET /dashboard/{wallet}`) and paginated trades (`GET /trades/{wallet}`).

use super::client::ApiClient;
use crate::core::error::Result;
use shared::dto::{Position, TradeQuery, TradesPage};

#[tracing::instrument(skip(client), fields(wallet = %shared::short_wallet(wallet)))]
pub async fn get_positions(client: &ApiClient, wallet: &str) -> Result<Vec<Position>> {
    let request = client.client.get(client.url(&format!("/dashboard/{}", wallet)));
    let positions: Vec<Position> = client.send("dashboard", request).await?;
    tracing::debug!(count = positions.len(), "Positions fetched");
    Ok(positions)
}

#[tracing::instrument(skip(client, query), fields(wallet = %shared::short_wallet(wallet), query = %query.cache_key()))]
pub async fn get_trades(client: &ApiClient, wallet: &str, query: &TradeQuery) -> Result<TradesPage> {
    let request = client
        .client
        .get(client.url(&format!("/trades/{}", wallet)))
        .query(query);
    let page: TradesPage = client.send("trades", request).await?;
    tracing::debug!(
        count = page.data.len(),
        total = page.pagination.total,
        has_more = page.pagination.has_more,
        "Trades fetched"
    );
    Ok(page)
}
