//! # Connection State Tracker
//!
//! Pure projection of the wallet provider's `connected`/`publicKey` signals.
//! It is the single source of truth for demo-vs-live mode.

use crate::core::service::WalletProvider;
use parking_lot::RwLock;
use std::fmt;

/// Current wallet session as seen by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub wallet_id: Option<String>,
    pub connected: bool,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(wallet_id: impl Into<String>) -> Self {
        Self {
            wallet_id: Some(wallet_id.into()),
            connected: true,
        }
    }

    /// Project raw provider signals. A provider reporting `connected` without a
    /// public key is treated as disconnected.
    pub fn from_signals(connected: bool, public_key: Option<String>) -> Self {
        match (connected, public_key) {
            (true, Some(key)) if !key.is_empty() => Self::connected(key),
            _ => Self::disconnected(),
        }
    }

    pub fn is_demo(&self) -> bool {
        !self.connected
    }
}

/// Change between two consecutive sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransition {
    Connected(String),
    Disconnected(String),
    /// Direct account switch; handled as `Disconnected(from)` then `Connected(to)`.
    Switched { from: String, to: String },
    Unchanged,
}

impl SessionTransition {
    /// Wallet whose scoped state must be torn down, if any.
    pub fn departed(&self) -> Option<&str> {
        match self {
            SessionTransition::Disconnected(w) => Some(w),
            SessionTransition::Switched { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Wallet that became active, if any.
    pub fn arrived(&self) -> Option<&str> {
        match self {
            SessionTransition::Connected(w) => Some(w),
            SessionTransition::Switched { to, .. } => Some(to),
            _ => None,
        }
    }
}

impl fmt::Display for SessionTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionTransition::Connected(w) => write!(f, "connected {}", shared::short_wallet(w)),
            SessionTransition::Disconnected(w) => {
                write!(f, "disconnected {}", shared::short_wallet(w))
            }
            SessionTransition::Switched { from, to } => write!(
                f,
                "switched {} -> {}",
                shared::short_wallet(from),
                shared::short_wallet(to)
            ),
            SessionTransition::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Holds the published [`WalletSession`].
///
/// Computing a transition and publishing it are separate steps so the caller
/// can tear down wallet-scoped state in between.
#[derive(Default)]
pub struct ConnectionStateTracker {
    session: RwLock<WalletSession>,
}

impl ConnectionStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> WalletSession {
        self.session.read().clone()
    }

    pub fn connected(&self) -> bool {
        self.session.read().connected
    }

    pub fn wallet_id(&self) -> Option<String> {
        self.session.read().wallet_id.clone()
    }

    /// True while `wallet` is the active session.
    pub fn is_active(&self, wallet: &str) -> bool {
        self.session.read().wallet_id.as_deref() == Some(wallet)
    }

    /// Read the provider's current signals.
    pub fn observe(&self, provider: &dyn WalletProvider) -> WalletSession {
        WalletSession::from_signals(provider.connected(), provider.public_key())
    }

    /// Transition from the published session to `next`, without publishing it.
    pub fn transition_to(&self, next: &WalletSession) -> SessionTransition {
        let current = self.session.read();
        match (current.wallet_id.as_deref(), next.wallet_id.as_deref()) {
            (None, None) => SessionTransition::Unchanged,
            (None, Some(to)) => SessionTransition::Connected(to.to_string()),
            (Some(from), None) => SessionTransition::Disconnected(from.to_string()),
            (Some(from), Some(to)) if from == to => SessionTransition::Unchanged,
            (Some(from), Some(to)) => SessionTransition::Switched {
                from: from.to_string(),
                to: to.to_string(),
            },
        }
    }

    pub fn publish(&self, next: WalletSession) {
        *self.session.write() = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_without_key_is_demo() {
        let session = WalletSession::from_signals(true, None);
        assert!(session.is_demo());
        assert_eq!(session.wallet_id, None);
    }

    #[test]
    fn test_transitions() {
        let tracker = ConnectionStateTracker::new();
        assert_eq!(
            tracker.transition_to(&WalletSession::disconnected()),
            SessionTransition::Unchanged
        );

        let a = WalletSession::connected("A");
        assert_eq!(tracker.transition_to(&a), SessionTransition::Connected("A".into()));
        tracker.publish(a.clone());
        assert!(tracker.is_active("A"));
        assert_eq!(tracker.transition_to(&a), SessionTransition::Unchanged);

        let b = WalletSession::connected("B");
        let switched = tracker.transition_to(&b);
        assert_eq!(switched.departed(), Some("A"));
        assert_eq!(switched.arrived(), Some("B"));

        tracker.publish(b);
        assert_eq!(
            tracker.transition_to(&WalletSession::disconnected()),
            SessionTransition::Disconnected("B".into())
        );
    }

    #[test]
    fn test_transition_is_not_published_until_asked() {
        let tracker = ConnectionStateTracker::new();
        let _ = tracker.transition_to(&WalletSession::connected("A"));
        assert!(!tracker.connected());
        assert_eq!(tracker.wallet_id(), None);
    }
}
