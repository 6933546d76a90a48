//! Trace ID system for correlating operations across async boundaries
//!
//! A trace id is scoped to a future with [`with_trace_id_async`], so every log
//! line emitted while a sync run or a journal submission is being polled can
//! be correlated, whichever worker thread polls it.

use std::future::Future;
use uuid::Uuid;

tokio::task_local! {
    static TRACE_ID: String;
}

/// Generate a fresh trace ID
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get the trace ID of the current task, if one is set
pub fn get_trace_id() -> Option<String> {
    TRACE_ID.try_with(|id| id.clone()).ok()
}

/// Run `f` with a new trace ID in scope
pub async fn with_trace_id_async<F, Fut, R>(f: F) -> R
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = R>,
{
    let trace_id = new_trace_id();
    let result = TRACE_ID.scope(trace_id.clone(), f(trace_id.clone())).await;
    tracing::debug!(trace_id = %trace_id, "Trace context completed");
    result
}

/// Macro to include trace ID in log messages
#[macro_export]
macro_rules! trace_info {
    ($($arg:tt)*) => {
        if let Some(trace_id) = $crate::debug::trace_context::get_trace_id() {
            tracing::info!(trace_id = %trace_id, $($arg)*);
        } else {
            tracing::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! trace_warn {
    ($($arg:tt)*) => {
        if let Some(trace_id) = $crate::debug::trace_context::get_trace_id() {
            tracing::warn!(trace_id = %trace_id, $($arg)*);
        } else {
            tracing::warn!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trace_id_scoped_to_future() {
        assert_eq!(get_trace_id(), None);

        let seen = with_trace_id_async(|id| async move {
            tokio::task::yield_now().await;
            assert_eq!(get_trace_id().as_deref(), Some(id.as_str()));
            id
        })
        .await;

        assert_eq!(seen.len(), 36);
        assert_eq!(get_trace_id(), None);
    }
}
