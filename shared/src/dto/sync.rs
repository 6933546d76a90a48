use serde::{Deserialize, Serialize};

/// `POST /sync` body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub wallet_address: String,
}

/// Result of indexing a wallet's on-chain history
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub positions_updated: u32,
    pub fills_processed: u32,
}
