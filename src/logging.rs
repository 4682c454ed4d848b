//! Logging initialization for tourguide.
//!
//! Interactive mode (a tour owns the terminal): logs to
//! `<data_dir>/logs/tourguide-{datetime}.log`
//! Command mode: logs to stderr

use anyhow::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Guard that must be kept alive for the duration of the program.
    /// When dropped, ensures all buffered logs are flushed.
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set in interactive mode with file logging enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Name of the log file for a run started now
pub fn log_file_name() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    format!("tourguide-{timestamp}.log")
}

/// Whether log output should go to a file instead of stderr
pub fn logs_to_file(settings: &Settings, interactive: bool) -> bool {
    interactive && settings.logging.to_file
}

/// Initialize logging based on mode and settings.
///
/// # Arguments
/// * `settings` - Loaded settings
/// * `interactive` - Whether a tour is about to take over the terminal
/// * `debug_override` - If true, override log level to "debug" (from --debug flag)
pub fn init_logging(
    settings: &Settings,
    interactive: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let log_level = if debug_override {
        "debug".to_string()
    } else {
        settings.logging.level.clone()
    };

    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or(log_level));

    if logs_to_file(settings, interactive) {
        let logs_dir = settings.logs_path();
        std::fs::create_dir_all(&logs_dir)?;

        let log_filename = log_file_name();
        let log_file_path = logs_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false) // No ANSI codes in log files
                    .with_writer(non_blocking),
            )
            .init();

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(log_file_path),
        })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}
