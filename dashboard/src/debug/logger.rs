//! Subscriber initialization

use super::config::LogConfig;
use std::fs;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialize the logging system
///
/// Sets up:
/// - An `EnvFilter` from `RUST_LOG` (default `dashboard=info,warn`)
/// - A compact stderr layer
/// - A daily-rotated, non-blocking file layer in `DASHBOARD_LOG_DIR` (unless disabled)
/// - A panic hook that routes panics through `tracing`
///
/// Calling it twice is harmless; the second call leaves the installed subscriber alone.
pub fn init() {
    init_with(&LogConfig::from_env());
}

/// Initialize with an explicit configuration
pub fn init_with(config: &LogConfig) {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new("dashboard=info,warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .boxed();

    let mut layers = vec![stderr_layer];

    if config.file_enabled {
        match fs::create_dir_all(&config.log_dir) {
            Ok(()) => {
                let file_appender =
                    tracing_appender::rolling::daily(&config.log_dir, &config.file_prefix);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let _ = FILE_GUARD.set(guard);

                layers.push(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_ansi(false)
                        .boxed(),
                );
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log directory: {}", e);
            }
        }
    }

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .is_err()
    {
        return;
    }

    tracing::info!(
        log_level = %config.log_level,
        log_file = %config.log_file().display(),
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    setup_panic_hook();
}

/// Set up panic hook to log panics with location and trace id
fn setup_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic message".to_string()
        };

        match super::trace_context::get_trace_id() {
            Some(trace_id) => tracing::error!(
                trace_id = %trace_id,
                location = %location,
                message = %message,
                "Panic"
            ),
            None => tracing::error!(location = %location, message = %message, "Panic"),
        }

        default_panic(panic_info);
    }));
}
