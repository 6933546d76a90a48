//! Logging configuration from environment variables

use std::path::PathBuf;

const DEFAULT_LOG_LEVEL: &str = "dashboard=info,warn";

/// Logging system configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter (e.g., "dashboard=debug,info")
    pub log_level: String,
    /// Log directory (for rotation)
    pub log_dir: PathBuf,
    /// Write the daily-rotated log file in addition to stderr
    pub file_enabled: bool,
    /// File name prefix inside `log_dir`
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: PathBuf::from("logs"),
            file_enabled: true,
            file_prefix: "dashboard.log".to_string(),
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: std::env::var("DASHBOARD_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            file_enabled: std::env::var("DASHBOARD_LOG_FILE_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.file_enabled),
            file_prefix: defaults.file_prefix,
        }
    }

    /// Base path of the rolling log file (the appender adds a date suffix)
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(&self.file_prefix)
    }

    /// Check if debug logging is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.log_level.contains("trace")
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.log_level, "dashboard=info,warn");
        assert!(config.file_enabled);
        assert_eq!(config.log_file(), PathBuf::from("logs").join("dashboard.log"));
        assert!(!config.is_debug_enabled());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" on "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
