//! # Sync Endpoint
//!
//! Triggers server-side indexing of a wallet (`POST /sync`).

use super::client::ApiClient;
use crate::core::error::Result;
use shared::dto::{SyncRequest, SyncResult};

/// Ask the API to index `wallet`'s positions and fills.
#[tracing::instrument(skip(client), fields(wallet = %shared::short_wallet(wallet)))]
pub async fn sync_wallet(client: &ApiClient, wallet: &str) -> Result<SyncResult> {
    let body = SyncRequest {
        wallet_address: wallet.to_string(),
    };
    let request = client.client.post(client.url("/sync")).json(&body);

    let result: SyncResult = client.send("sync", request).await?;
    tracing::info!(
        positions_updated = result.positions_updated,
        fills_processed = result.fills_processed,
        "Wallet sync completed"
    );
    Ok(result)
}
