//! Per-resource staleness, polling and retry policy.

use super::resource::ResourceKind;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);
const POSITIONS_POLL: Duration = Duration::from_secs(10);
const ANALYTICS_POLL: Duration = Duration::from_secs(30);
const TRADES_POLL: Duration = Duration::from_secs(30);

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Two retries, 1s doubling, capped at 30s.
    pub fn trades() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Static policy of one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub stale_time: Duration,
    pub poll_interval: Option<Duration>,
    pub retry: RetryPolicy,
}

impl QueryPolicy {
    /// Polled kinds stay fresh for one poll period, so reads between ticks
    /// are served from cache and the timer alone drives their traffic.
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Positions => Self {
                stale_time: POSITIONS_POLL,
                poll_interval: Some(POSITIONS_POLL),
                retry: RetryPolicy::none(),
            },
            ResourceKind::Analytics => Self {
                stale_time: ANALYTICS_POLL,
                poll_interval: Some(ANALYTICS_POLL),
                retry: RetryPolicy::none(),
            },
            ResourceKind::Trades => Self {
                stale_time: TRADES_POLL,
                poll_interval: Some(TRADES_POLL),
                retry: RetryPolicy::trades(),
            },
            ResourceKind::HistoricalPnl
            | ResourceKind::Drawdown
            | ResourceKind::Heatmap
            | ResourceKind::Composition
            | ResourceKind::Leaderboard
            | ResourceKind::Journal => Self {
                stale_time: FIVE_MINUTES,
                poll_interval: None,
                retry: RetryPolicy::none(),
            },
        }
    }
}

/// Enablement predicate, re-evaluated on every query evaluation,
/// invalidation and poll tick.
#[derive(Clone)]
pub struct Gate(Arc<dyn Fn() -> bool + Send + Sync>);

impl Gate {
    pub fn open() -> Self {
        Gate(Arc::new(|| true))
    }

    pub fn closed() -> Self {
        Gate(Arc::new(|| false))
    }

    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Gate(Arc::new(predicate))
    }

    pub fn is_open(&self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Gate").field(&self.is_open()).finish()
    }
}

pub(crate) type AnyValue = Arc<dyn Any + Send + Sync>;

/// Options of one `query` call.
#[derive(Clone)]
pub struct QueryOptions {
    pub enabled: Gate,
    pub policy: QueryPolicy,
    pub(crate) placeholder: Option<AnyValue>,
}

impl QueryOptions {
    pub fn for_kind(kind: ResourceKind) -> Self {
        Self {
            enabled: Gate::open(),
            policy: QueryPolicy::for_kind(kind),
            placeholder: None,
        }
    }

    pub fn enabled(mut self, gate: Gate) -> Self {
        self.enabled = gate;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.policy.stale_time = stale_time;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Option<Duration>) -> Self {
        self.policy.poll_interval = poll_interval;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.policy.retry = retry;
        self
    }

    /// Value served (tagged `Source::Demo`) while the entry holds no data.
    pub fn placeholder<T: Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.placeholder = Some(value as AnyValue);
        self
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("enabled", &self.enabled)
            .field("policy", &self.policy)
            .field("placeholder", &self.placeholder.is_some())
            .finish()
    }
}
