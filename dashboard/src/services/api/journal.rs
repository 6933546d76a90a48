//! # Journal Endpoints
//!
//! Read and annotate the journal entry attached to a position.

use super::client::ApiClient;
use crate::core::error::Result;
use shared::dto::{JournalEntry, JournalPayload, JournalResponse};

#[tracing::instrument(skip(client))]
pub async fn get_journal(client: &ApiClient, position_id: &str) -> Result<JournalEntry> {
    let request = client
        .client
        .get(client.url(&format!("/journal/{}", position_id)));
    client.send("journal", request).await
}

/// `PATCH /journal/{positionId}`. The payload must already be validated.
#[tracing::instrument(skip(client, payload))]
pub async fn update_journal(
    client: &ApiClient,
    position_id: &str,
    payload: &JournalPayload,
) -> Result<JournalResponse> {
    let request = client
        .client
        .patch(client.url(&format!("/journal/{}", position_id)))
        .json(payload);
    let response: JournalResponse = client.send("journal-update", request).await?;
    tracing::info!(
        ai_score = ?response.data.ai_score,
        ai_bias = ?response.data.ai_bias,
        "Journal entry updated"
    );
    Ok(response)
}
