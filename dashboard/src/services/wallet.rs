//! # Wallet Provider Adapter
//!
//! In-process [`WalletProvider`] used by the CLI binary and by tests. A browser
//! build would implement the same trait over the wallet adapter; the dashboard
//! core never sees keys, only `connected` and the public key.

use crate::core::error::{AppError, Result};
use crate::core::service::WalletProvider;
use crate::utils::validation::validate_wallet_address;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Wallet connection status
#[derive(Debug, Clone, PartialEq)]
pub enum WalletStatus {
    /// Not connected
    Disconnected,
    /// Connecting in progress
    Connecting,
    /// Connected with wallet address
    Connected(String),
    /// Error state with message
    Error(String),
}

impl WalletStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, WalletStatus::Connected(_))
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            WalletStatus::Connected(addr) => Some(addr),
            _ => None,
        }
    }
}

/// Wallet provider holding a fixed public key.
///
/// `connect()` exposes the configured key; `switch_account` changes it while
/// connected, like selecting another account in a browser extension.
pub struct LocalWalletProvider {
    public_key: RwLock<String>,
    status: RwLock<WalletStatus>,
}

impl LocalWalletProvider {
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: RwLock::new(public_key.into()),
            status: RwLock::new(WalletStatus::Disconnected),
        }
    }

    pub fn status(&self) -> WalletStatus {
        self.status.read().clone()
    }

    /// Change the active account. Takes effect immediately if connected.
    pub fn switch_account(&self, public_key: impl Into<String>) -> Result<()> {
        let public_key = public_key.into();
        let check = validate_wallet_address(&public_key);
        if !check.is_valid {
            return Err(AppError::Wallet(check.error.unwrap_or_default()));
        }

        *self.public_key.write() = public_key.clone();
        let mut status = self.status.write();
        if status.is_connected() {
            *status = WalletStatus::Connected(public_key);
        }
        Ok(())
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    fn connected(&self) -> bool {
        self.status.read().is_connected()
    }

    fn public_key(&self) -> Option<String> {
        self.status.read().address().map(str::to_string)
    }

    async fn connect(&self) -> Result<()> {
        *self.status.write() = WalletStatus::Connecting;

        let public_key = self.public_key.read().clone();
        let check = validate_wallet_address(&public_key);
        if !check.is_valid {
            let message = check.error.unwrap_or_else(|| "Invalid public key".to_string());
            *self.status.write() = WalletStatus::Error(message.clone());
            return Err(AppError::Wallet(message));
        }

        tracing::info!(wallet = %shared::short_wallet(&public_key), "Wallet connected");
        *self.status.write() = WalletStatus::Connected(public_key);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        *self.status.write() = WalletStatus::Disconnected;
        tracing::info!("Wallet disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET_A: &str = "8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL";
    const WALLET_B: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

    #[tokio::test]
    async fn test_connect_exposes_public_key() {
        let wallet = LocalWalletProvider::new(WALLET_A);
        assert!(!wallet.connected());
        assert_eq!(wallet.public_key(), None);

        wallet.connect().await.unwrap();
        assert!(wallet.connected());
        assert_eq!(wallet.public_key().as_deref(), Some(WALLET_A));

        wallet.disconnect().await.unwrap();
        assert_eq!(wallet.status(), WalletStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_invalid_key_fails_to_connect() {
        let wallet = LocalWalletProvider::new("not-a-wallet");
        assert!(matches!(wallet.connect().await, Err(AppError::Wallet(_))));
        assert!(matches!(wallet.status(), WalletStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_switch_account_while_connected() {
        let wallet = LocalWalletProvider::new(WALLET_A);
        wallet.connect().await.unwrap();
        wallet.switch_account(WALLET_B).unwrap();
        assert_eq!(wallet.public_key().as_deref(), Some(WALLET_B));
    }
}
