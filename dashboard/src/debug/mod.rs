//! # Logging and Tracing Infrastructure
//!
//! - **Structured logging**: `tracing` events to stderr and to a daily-rotated
//!   file in `logs/` (non-blocking writer)
//! - **Trace IDs**: task-local ids correlating a sync run or a journal submission
//! - **Panic hook**: panics are logged with location and trace id
//! - **Task tracking**: named background tasks with slow-task warnings
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default `dashboard=info,warn`)
//! - `DASHBOARD_LOG_DIR`: Log directory (default `logs`)
//! - `DASHBOARD_LOG_FILE_ENABLED`: Write the rolling file (1=on, 0=off)

pub mod config;
pub mod logger;
pub mod task_tracker;
pub mod trace_context;

pub use config::LogConfig;
pub use logger::{init as init_logger, init_with as init_logger_with};
pub use task_tracker::{active_task_count, spawn_tracked};
pub use trace_context::{get_trace_id, new_trace_id, with_trace_id_async};

/// Initialize logging from the environment. Call once at startup.
pub fn init() {
    init_logger();
}
