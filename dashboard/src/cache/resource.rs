//! Resource keys, scopes and cached values.

use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;

/// Every independently cached unit of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Positions,
    Analytics,
    Trades,
    HistoricalPnl,
    Drawdown,
    Heatmap,
    Composition,
    Leaderboard,
    Journal,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::Positions,
        ResourceKind::Analytics,
        ResourceKind::Trades,
        ResourceKind::HistoricalPnl,
        ResourceKind::Drawdown,
        ResourceKind::Heatmap,
        ResourceKind::Composition,
        ResourceKind::Leaderboard,
        ResourceKind::Journal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Positions => "positions",
            ResourceKind::Analytics => "analytics",
            ResourceKind::Trades => "trades",
            ResourceKind::HistoricalPnl => "historicalPnl",
            ResourceKind::Drawdown => "drawdown",
            ResourceKind::Heatmap => "heatmap",
            ResourceKind::Composition => "composition",
            ResourceKind::Leaderboard => "leaderboard",
            ResourceKind::Journal => "journal",
        }
    }

    /// Leaderboard is the only wallet-independent resource.
    pub fn is_wallet_scoped(&self) -> bool {
        !matches!(self, ResourceKind::Leaderboard)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache key: resource kind, owning wallet, and an optional parameter string
/// (filter, query, heatmap month or journal position id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub kind: ResourceKind,
    pub wallet: Option<String>,
    pub params: Option<String>,
}

impl ResourceKey {
    pub fn wallet_scoped(kind: ResourceKind, wallet: impl Into<String>) -> Self {
        Self {
            kind,
            wallet: Some(wallet.into()),
            params: None,
        }
    }

    pub fn global(kind: ResourceKind) -> Self {
        Self {
            kind,
            wallet: None,
            params: None,
        }
    }

    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    pub fn is_wallet_scoped(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn belongs_to(&self, wallet: &str) -> bool {
        self.wallet.as_deref() == Some(wallet)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(wallet) = &self.wallet {
            write!(f, ":{}", shared::short_wallet(wallet))?;
        }
        if let Some(params) = &self.params {
            write!(f, "?{}", params)?;
        }
        Ok(())
    }
}

/// Invalidation target. `params = None` covers every parameter variant of
/// `(kind, wallet)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceScope {
    pub kind: ResourceKind,
    pub wallet: Option<String>,
    pub params: Option<String>,
}

impl ResourceScope {
    pub fn new(kind: ResourceKind, wallet: Option<&str>) -> Self {
        Self {
            kind,
            wallet: wallet.map(str::to_string),
            params: None,
        }
    }

    /// Scope matching exactly one key.
    pub fn exact(key: &ResourceKey) -> Self {
        Self {
            kind: key.kind,
            wallet: key.wallet.clone(),
            params: key.params.clone(),
        }
    }

    pub fn matches(&self, key: &ResourceKey) -> bool {
        self.kind == key.kind
            && self.wallet == key.wallet
            && self.params.as_ref().map_or(true, |p| key.params.as_ref() == Some(p))
    }
}

/// Where a served value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Remote,
    Demo,
}

/// A served value with its provenance.
#[derive(Debug)]
pub struct Resource<T> {
    pub key: Option<ResourceKey>,
    pub data: Arc<T>,
    pub fetched_at: Option<Instant>,
    pub source: Source,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            data: Arc::clone(&self.data),
            fetched_at: self.fetched_at,
            source: self.source,
        }
    }
}
