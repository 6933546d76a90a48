//! # Resource Cache
//!
//! Keyed query engine with per-entry staleness, polling and retry.
//!
//! Entries hold type-erased values (`Arc<dyn Any>`) and are read back with the
//! type the consumer asks for. Every write goes through the fetch-resolution
//! path or through `invalidate`/`purge_wallet_scoped`.
//!
//! ## Stale-response guard
//!
//! A fetch captures the entry's sequence number and the cache epoch when it
//! starts. Its result is written only if, on resolution:
//! - the entry still exists and still expects that sequence number
//! - for wallet-scoped keys, the epoch is unchanged and the key's wallet is
//!   still the active session
//!
//! Anything else is discarded as [`AppError::StaleResponse`].
//!
//! ## Watermarks
//!
//! Sequence numbers grow monotonically across the whole cache. A
//! [`FetchWatermark`] taken before some event lets
//! [`invalidate_since`](ResourceCache::invalidate_since) leave alone entries
//! whose data or in-flight fetch was issued after it.

use super::policy::{AnyValue, QueryOptions, RetryPolicy};
use super::poller::Poller;
use super::resource::{Resource, ResourceKey, ResourceScope, Source};
use crate::app::events::{DashboardEvent, EventSink};
use crate::core::error::{AppError, Result};
use crate::debug::spawn_tracked;
use crate::session::ConnectionStateTracker;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::time::{sleep, Instant};

type ErasedFetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<AnyValue>> + Send + Sync>;

/// Per-entry fetch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched (or disabled before the first fetch)
    Idle,
    /// First fetch in flight, no data yet
    Loading,
    Success,
    Error,
}

struct Entry {
    data: Option<AnyValue>,
    fetched_at: Option<Instant>,
    status: QueryStatus,
    error: Option<AppError>,
    invalidated: bool,
    enabled: bool,
    in_flight: Option<u64>,
    /// Sequence number of the fetch that produced `data`
    data_seq: Option<u64>,
    fetcher: ErasedFetcher,
    options: QueryOptions,
    poller: Option<Poller>,
}

impl Entry {
    fn new(fetcher: ErasedFetcher, options: QueryOptions) -> Self {
        Self {
            data: None,
            fetched_at: None,
            status: QueryStatus::Idle,
            error: None,
            invalidated: false,
            enabled: false,
            in_flight: None,
            data_seq: None,
            fetcher,
            options,
            poller: None,
        }
    }

    /// Data or the fetch in flight was issued after `mark`.
    fn is_newer_than(&self, mark: FetchWatermark) -> bool {
        self.in_flight.max(self.data_seq).map_or(false, |seq| seq > mark.0)
    }

    fn is_stale(&self, now: Instant) -> bool {
        match self.fetched_at {
            Some(at) => now.duration_since(at) >= self.options.policy.stale_time,
            None => true,
        }
    }

    /// Whether an evaluation of this (enabled) entry should start a fetch.
    ///
    /// Failed entries wait for a poll tick, an invalidation or an explicit
    /// refetch instead of retrying on every evaluation.
    fn needs_fetch(&self, now: Instant) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        if self.invalidated {
            return true;
        }
        match self.status {
            QueryStatus::Idle => true,
            QueryStatus::Success => self.is_stale(now),
            QueryStatus::Loading | QueryStatus::Error => false,
        }
    }
}

struct CacheState {
    entries: HashMap<ResourceKey, Entry>,
    epoch: u64,
    next_seq: u64,
}

struct FetchJob {
    key: ResourceKey,
    seq: u64,
    epoch: u64,
    fetcher: ErasedFetcher,
    retry: RetryPolicy,
    started: Instant,
}

struct CacheShared {
    state: RwLock<CacheState>,
    tracker: Arc<ConnectionStateTracker>,
    events: EventSink,
    revision: watch::Sender<u64>,
}

/// Position in the cache-wide fetch sequence. See [`ResourceCache::watermark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchWatermark(u64);

/// Result of [`ResourceCache::invalidate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvalidationOutcome {
    /// Entries matching the scopes
    pub matched: usize,
    /// Fetches started (enabled entries without a fetch already in flight)
    pub refetched: usize,
}

/// Snapshot counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
    pub polling: usize,
    pub epoch: u64,
}

/// Shared handle to the cache. Clones refer to the same entries.
#[derive(Clone)]
pub struct ResourceCache {
    shared: Arc<CacheShared>,
}

impl ResourceCache {
    pub fn new(tracker: Arc<ConnectionStateTracker>, events: EventSink) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            shared: Arc::new(CacheShared {
                state: RwLock::new(CacheState {
                    entries: HashMap::new(),
                    epoch: 0,
                    next_seq: 0,
                }),
                tracker,
                events,
                revision,
            }),
        }
    }

    /// Evaluate `key`: register it on first use, start a fetch if it is
    /// enabled and missing, stale or invalidated, and return its current state.
    ///
    /// Never blocks on the fetch; await [`settled`](Self::settled) or watch
    /// the event stream for the resolution.
    pub fn query<T, F, Fut>(&self, key: ResourceKey, options: QueryOptions, fetcher: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let erased: ErasedFetcher = Arc::new(move || {
            let fut = fetcher();
            async move { fut.await.map(|value| Arc::new(value) as AnyValue) }.boxed()
        });

        let enabled = options.enabled.is_open();
        let now = Instant::now();

        let job = {
            let mut state = self.shared.state.write();
            let should_fetch = {
                let entry = state
                    .entries
                    .entry(key.clone())
                    .or_insert_with(|| Entry::new(Arc::clone(&erased), options.clone()));
                entry.fetcher = erased;
                entry.options = options;
                entry.enabled = enabled;
                self.shared.sync_poller(&key, entry);
                enabled && entry.needs_fetch(now)
            };
            if should_fetch {
                begin_fetch(&mut state, &key)
            } else {
                None
            }
        };

        if let Some(job) = job {
            self.shared.spawn_fetch(job);
        }

        self.peek(&key)
    }

    /// Current state of `key` without evaluating it.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &ResourceKey) -> QueryResult<T> {
        let state = self.shared.state.read();
        let refetch = RefetchHandle {
            shared: Arc::downgrade(&self.shared),
            key: key.clone(),
        };

        let Some(entry) = state.entries.get(key) else {
            return QueryResult {
                key: Some(key.clone()),
                data: None,
                source: None,
                status: QueryStatus::Idle,
                error: None,
                is_fetching: false,
                enabled: false,
                fetched_at: None,
                refetch: Some(refetch),
            };
        };

        let remote = entry.data.clone().and_then(|v| downcast::<T>(v, key));
        let (data, source, fetched_at) = match remote {
            Some(data) => (Some(data), Some(Source::Remote), entry.fetched_at),
            None => match entry.options.placeholder.clone().and_then(|v| downcast::<T>(v, key)) {
                Some(placeholder) => (Some(placeholder), Some(Source::Demo), None),
                None => (None, None, None),
            },
        };

        QueryResult {
            key: Some(key.clone()),
            data,
            source,
            status: entry.status,
            error: entry.error.clone(),
            is_fetching: entry.in_flight.is_some(),
            enabled: entry.enabled,
            fetched_at,
            refetch: Some(refetch),
        }
    }

    /// Mark every entry matched by `scopes` invalidated and refetch the enabled
    /// ones once. Disabled entries refetch when next evaluated enabled.
    pub fn invalidate(&self, scopes: &[ResourceScope]) -> InvalidationOutcome {
        self.shared.invalidate(scopes, None)
    }

    /// Like [`invalidate`](Self::invalidate), but entries whose data or
    /// in-flight fetch was issued after `mark` count as matched and are left
    /// untouched.
    pub fn invalidate_since(&self, scopes: &[ResourceScope], mark: FetchWatermark) -> InvalidationOutcome {
        self.shared.invalidate(scopes, Some(mark))
    }

    /// The latest fetch sequence number handed out so far.
    pub fn watermark(&self) -> FetchWatermark {
        FetchWatermark(self.shared.state.read().next_seq)
    }

    /// Force a fetch of `key` if it is enabled. Returns `true` when a fetch is
    /// running for the key afterwards.
    pub fn refetch(&self, key: &ResourceKey) -> bool {
        self.shared.refetch(key)
    }

    /// Drop every wallet-scoped entry and bump the epoch. Fetches in flight for
    /// dropped entries are discarded on resolution.
    pub fn purge_wallet_scoped(&self) -> usize {
        let (removed, epoch) = {
            let mut state = self.shared.state.write();
            state.epoch += 1;
            let before = state.entries.len();
            state.entries.retain(|key, _| !key.is_wallet_scoped());
            (before - state.entries.len(), state.epoch)
        };

        tracing::info!(removed, epoch, "Purged wallet-scoped cache entries");
        self.shared.events.emit(DashboardEvent::CachePurged { removed, epoch });
        self.shared.bump_revision();
        removed
    }

    /// Stop polling `key` and abandon its in-flight fetch. Data is kept.
    pub fn unmount(&self, key: &ResourceKey) {
        {
            let mut state = self.shared.state.write();
            if let Some(entry) = state.entries.get_mut(key) {
                entry.poller = None;
                if entry.in_flight.take().is_some() && entry.status == QueryStatus::Loading {
                    entry.status = QueryStatus::Idle;
                }
            }
        }
        tracing::debug!(key = %key, "Resource unmounted");
        self.shared.bump_revision();
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.shared.state.read().entries.contains_key(key)
    }

    /// Keys currently cached.
    pub fn keys(&self) -> Vec<ResourceKey> {
        self.shared.state.read().entries.keys().cloned().collect()
    }

    pub fn epoch(&self) -> u64 {
        self.shared.state.read().epoch
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.read();
        CacheStats {
            entries: state.entries.len(),
            in_flight: state.entries.values().filter(|e| e.in_flight.is_some()).count(),
            polling: state.entries.values().filter(|e| e.poller.is_some()).count(),
            epoch: state.epoch,
        }
    }

    /// Resolve once no fetch is in flight.
    pub async fn settled(&self) {
        let mut rx = self.shared.revision.subscribe();
        loop {
            if self.stats().in_flight == 0 {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl CacheShared {
    /// Create, keep or clear the entry's poll timer to match its enablement.
    fn sync_poller(self: &Arc<Self>, key: &ResourceKey, entry: &mut Entry) {
        match (entry.enabled, entry.options.policy.poll_interval) {
            (true, Some(period)) => {
                let current = entry
                    .poller
                    .as_ref()
                    .map_or(false, |p| p.period() == period && !p.is_finished());
                if current {
                    return;
                }

                let weak = Arc::downgrade(self);
                let poll_key = key.clone();
                entry.poller = Some(Poller::spawn("cache:poll", period, move || {
                    let weak = Weak::clone(&weak);
                    let key = poll_key.clone();
                    async move {
                        match weak.upgrade() {
                            Some(shared) => shared.poll_tick(&key),
                            None => false,
                        }
                    }
                }));
                tracing::debug!(key = %key, period_ms = period.as_millis() as u64, "Poller started");
            }
            _ => {
                if entry.poller.take().is_some() {
                    tracing::debug!(key = %key, "Poller cleared");
                }
            }
        }
    }

    /// One poll tick. Returns `false` to stop the timer.
    fn poll_tick(self: &Arc<Self>, key: &ResourceKey) -> bool {
        let gate = match self.state.read().entries.get(key) {
            Some(entry) => entry.options.enabled.clone(),
            None => return false,
        };
        let enabled = gate.is_open();

        let job = {
            let mut state = self.state.write();
            let Some(entry) = state.entries.get_mut(key) else {
                return false;
            };
            entry.enabled = enabled;
            if !enabled {
                entry.poller = None;
                tracing::debug!(key = %key, "Poller cleared on disabled tick");
                return false;
            }
            if entry.in_flight.is_some() {
                return true;
            }
            begin_fetch(&mut state, key)
        };

        if let Some(job) = job {
            tracing::trace!(key = %key, "Poll tick");
            self.spawn_fetch(job);
        }
        true
    }

    fn invalidate(self: &Arc<Self>, scopes: &[ResourceScope], mark: Option<FetchWatermark>) -> InvalidationOutcome {
        let candidates: Vec<_> = {
            let state = self.state.read();
            state
                .entries
                .iter()
                .filter(|(key, _)| scopes.iter().any(|scope| scope.matches(key)))
                .map(|(key, entry)| (key.clone(), entry.options.enabled.clone()))
                .collect()
        };
        let evaluated: Vec<_> = candidates
            .into_iter()
            .map(|(key, gate)| (key, gate.is_open()))
            .collect();

        let mut outcome = InvalidationOutcome::default();
        let mut jobs = Vec::new();
        {
            let mut state = self.state.write();
            for (key, enabled) in evaluated {
                let should_fetch = {
                    let Some(entry) = state.entries.get_mut(&key) else {
                        continue;
                    };
                    outcome.matched += 1;
                    entry.enabled = enabled;
                    self.sync_poller(&key, entry);
                    if mark.map_or(false, |mark| entry.is_newer_than(mark)) {
                        continue;
                    }
                    entry.invalidated = true;
                    enabled && entry.in_flight.is_none()
                };
                if should_fetch {
                    if let Some(job) = begin_fetch(&mut state, &key) {
                        jobs.push(job);
                    }
                }
            }
        }

        outcome.refetched = jobs.len();
        for job in jobs {
            self.spawn_fetch(job);
        }
        self.bump_revision();
        outcome
    }

    fn refetch(self: &Arc<Self>, key: &ResourceKey) -> bool {
        let gate = match self.state.read().entries.get(key) {
            Some(entry) => entry.options.enabled.clone(),
            None => return false,
        };
        if !gate.is_open() {
            return false;
        }

        let job = {
            let mut state = self.state.write();
            let in_flight = match state.entries.get(key) {
                Some(entry) => entry.in_flight.is_some(),
                None => return false,
            };
            if in_flight {
                return true;
            }
            begin_fetch(&mut state, key)
        };

        match job {
            Some(job) => {
                self.spawn_fetch(job);
                true
            }
            None => false,
        }
    }

    fn spawn_fetch(self: &Arc<Self>, job: FetchJob) {
        tracing::debug!(key = %job.key, seq = job.seq, "Fetching resource");
        let shared = Arc::clone(self);
        spawn_tracked(job.key.kind.as_str(), async move {
            let outcome = shared.run_fetch(&job).await;
            shared.complete_fetch(job, outcome);
        });
    }

    async fn run_fetch(&self, job: &FetchJob) -> Result<AnyValue> {
        let mut attempt = 0;
        loop {
            match (job.fetcher)().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < job.retry.max_retries && self.is_current(job) => {
                    let delay = job.retry.backoff(attempt);
                    attempt += 1;
                    tracing::warn!(
                        key = %job.key,
                        attempt,
                        max_retries = job.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Fetch failed, retrying"
                    );
                    sleep(delay).await;
                    if !self.is_current(job) {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The entry still expects this fetch and its wallet is still active.
    fn is_current(&self, job: &FetchJob) -> bool {
        let expected = {
            let state = self.state.read();
            let entry_matches = state
                .entries
                .get(&job.key)
                .map_or(false, |e| e.in_flight == Some(job.seq));
            entry_matches && (!job.key.is_wallet_scoped() || state.epoch == job.epoch)
        };
        expected && self.wallet_active(&job.key)
    }

    fn wallet_active(&self, key: &ResourceKey) -> bool {
        match &key.wallet {
            Some(wallet) => self.tracker.is_active(wallet),
            None => true,
        }
    }

    fn complete_fetch(&self, job: FetchJob, outcome: Result<AnyValue>) {
        let wallet_active = self.wallet_active(&job.key);
        let duration_ms = job.started.elapsed().as_millis() as u64;

        let event = {
            let mut state = self.state.write();
            let epoch_matches = !job.key.is_wallet_scoped() || state.epoch == job.epoch;
            let entry = state
                .entries
                .get_mut(&job.key)
                .filter(|e| e.in_flight == Some(job.seq));

            match entry {
                Some(entry) if epoch_matches && wallet_active => {
                    entry.in_flight = None;
                    match outcome {
                        Ok(value) => {
                            entry.data = Some(value);
                            entry.data_seq = Some(job.seq);
                            entry.fetched_at = Some(Instant::now());
                            entry.status = QueryStatus::Success;
                            entry.error = None;
                            tracing::debug!(key = %job.key, duration_ms, "Resource updated");
                            DashboardEvent::ResourceUpdated {
                                key: job.key.clone(),
                                source: Source::Remote,
                            }
                        }
                        Err(error) => {
                            entry.status = QueryStatus::Error;
                            entry.error = Some(error.clone());
                            tracing::warn!(key = %job.key, duration_ms, error = %error, "Resource fetch failed");
                            DashboardEvent::ResourceFailed {
                                key: job.key.clone(),
                                error,
                            }
                        }
                    }
                }
                entry => {
                    if let Some(entry) = entry {
                        entry.in_flight = None;
                        if entry.status == QueryStatus::Loading {
                            entry.status = QueryStatus::Idle;
                        }
                    }
                    let reason = AppError::StaleResponse {
                        wallet: job.key.wallet.clone().unwrap_or_default(),
                    };
                    tracing::debug!(key = %job.key, duration_ms, "Discarding stale response");
                    DashboardEvent::ResourceDiscarded {
                        key: job.key.clone(),
                        reason,
                    }
                }
            }
        };

        self.events.emit(event);
        self.bump_revision();
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

/// Mark the entry in flight and build its fetch job. `None` if the entry is
/// gone or already fetching.
fn begin_fetch(state: &mut CacheState, key: &ResourceKey) -> Option<FetchJob> {
    let epoch = state.epoch;
    let seq = state.next_seq + 1;

    let entry = state.entries.get_mut(key)?;
    if entry.in_flight.is_some() {
        return None;
    }
    entry.in_flight = Some(seq);
    entry.invalidated = false;
    if entry.data.is_none() {
        entry.status = QueryStatus::Loading;
    }

    let job = FetchJob {
        key: key.clone(),
        seq,
        epoch,
        fetcher: Arc::clone(&entry.fetcher),
        retry: entry.options.policy.retry,
        started: Instant::now(),
    };
    state.next_seq = seq;
    Some(job)
}

fn downcast<T: Send + Sync + 'static>(value: AnyValue, key: &ResourceKey) -> Option<Arc<T>> {
    match value.downcast::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                key = %key,
                expected = std::any::type_name::<T>(),
                "Cached value has a different type"
            );
            None
        }
    }
}

/// Re-triggers the fetch of one key. Holds the cache weakly.
#[derive(Clone)]
pub struct RefetchHandle {
    shared: Weak<CacheShared>,
    key: ResourceKey,
}

impl RefetchHandle {
    pub fn refetch(&self) -> bool {
        match self.shared.upgrade() {
            Some(shared) => shared.refetch(&self.key),
            None => false,
        }
    }
}

impl fmt::Debug for RefetchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefetchHandle").field("key", &self.key).finish()
    }
}

/// What a consumer sees for one resource.
#[derive(Debug)]
pub struct QueryResult<T> {
    /// `None` for values served straight from demo fixtures
    pub key: Option<ResourceKey>,
    pub data: Option<Arc<T>>,
    pub source: Option<Source>,
    pub status: QueryStatus,
    pub error: Option<AppError>,
    pub is_fetching: bool,
    pub enabled: bool,
    pub fetched_at: Option<Instant>,
    refetch: Option<RefetchHandle>,
}

impl<T> QueryResult<T> {
    /// A demo-mode value: always enabled, never fetched.
    pub fn demo(data: Arc<T>) -> Self {
        Self {
            key: None,
            data: Some(data),
            source: Some(Source::Demo),
            status: QueryStatus::Success,
            error: None,
            is_fetching: false,
            enabled: true,
            fetched_at: None,
            refetch: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    /// Data is a demo fixture standing in for a live value.
    pub fn is_placeholder(&self) -> bool {
        self.key.is_some() && self.source == Some(Source::Demo)
    }

    /// Re-run the fetch. No-op for demo values and disabled entries.
    pub fn refetch(&self) -> bool {
        self.refetch.as_ref().map_or(false, RefetchHandle::refetch)
    }

    pub fn resource(&self) -> Option<Resource<T>> {
        Some(Resource {
            key: self.key.clone(),
            data: Arc::clone(self.data.as_ref()?),
            fetched_at: self.fetched_at,
            source: self.source?,
        })
    }
}

impl<T> Clone for QueryResult<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            data: self.data.clone(),
            source: self.source,
            status: self.status,
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            enabled: self.enabled,
            fetched_at: self.fetched_at,
            refetch: self.refetch.clone(),
        }
    }
}
