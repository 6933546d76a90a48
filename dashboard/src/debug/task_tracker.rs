//! Background task lifecycle tracking
//!
//! Fetches, pollers and sync runs are spawned through [`spawn_tracked`] so a
//! hung request shows up in the logs with its task name and duration.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Next task id
static TASK_IDS: AtomicU64 = AtomicU64::new(0);

/// Tasks spawned and not yet finished
static ACTIVE_TASKS: AtomicU64 = AtomicU64::new(0);

/// Tasks running longer than this are logged as slow
const SLOW_TASK_THRESHOLD: Duration = Duration::from_secs(30);

/// Get current number of active tasks
pub fn active_task_count() -> u64 {
    ACTIVE_TASKS.load(Ordering::Relaxed)
}

/// Decrements the active counter even if the task is aborted mid-await.
struct ActiveTask {
    name: &'static str,
    task_id: u64,
    start: Instant,
}

impl Drop for ActiveTask {
    fn drop(&mut self) {
        ACTIVE_TASKS.fetch_sub(1, Ordering::Relaxed);
        let duration = self.start.elapsed();

        if duration > SLOW_TASK_THRESHOLD {
            tracing::warn!(
                task = %self.name,
                task_id = self.task_id,
                duration_ms = duration.as_millis() as u64,
                "Task took very long (potential hang)"
            );
        } else {
            tracing::trace!(
                task = %self.name,
                task_id = self.task_id,
                duration_ms = duration.as_millis() as u64,
                "Task finished"
            );
        }
    }
}

/// Spawn an instrumented async task with lifecycle tracking
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() {
/// use dashboard::debug::spawn_tracked;
///
/// let handle = spawn_tracked("fetch:positions", async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub fn spawn_tracked<F>(name: &'static str, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let task_id = TASK_IDS.fetch_add(1, Ordering::Relaxed);
    ACTIVE_TASKS.fetch_add(1, Ordering::Relaxed);

    tracing::trace!(task = %name, task_id, "Task spawned");

    let guard = ActiveTask {
        name,
        task_id,
        start: Instant::now(),
    };

    tokio::spawn(async move {
        let _guard = guard;
        future.await
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_tracked_returns_output() {
        let handle = spawn_tracked("test", async { 7 });
        assert_eq!(handle.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_aborted_task_is_released() {
        let handle = spawn_tracked("test:abort", std::future::pending::<()>());
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
