//! Cancellable poll timer owned by a cache entry.

use crate::debug::spawn_tracked;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Interval task calling `on_tick` every `period`, first tick one period from
/// now. `on_tick` returning `false` stops the timer.
///
/// Dropping the poller aborts its task.
#[derive(Debug)]
pub struct Poller {
    period: Duration,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handle = spawn_tracked(name, async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !on_tick().await {
                    break;
                }
            }
        });

        Self { period, handle }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
