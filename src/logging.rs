//! Logging setup for the tablescope binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the binary so embedding applications keep control of their own output.
//!
//! - Console output always, filtered by `RUST_LOG` or the configured level.
//! - When `logging.log_dir` is set, a daily-rolling `tablescope.log` is written
//!   there too (10 files retained), plus `error.log` with warnings and errors.

use crate::config::LoggingSettings;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

fn build_appender(dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Failed to create {prefix} file appender"))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns error if the log directory cannot be created, a file appender
/// fails, or a subscriber is already installed.
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("Failed to create env filter")?;

    // stderr keeps stdout free for the JSON report
    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    match &settings.log_dir {
        Some(dir) => {
            let log_dir = PathBuf::from(dir);
            std::fs::create_dir_all(&log_dir).with_context(|| {
                format!("Failed to create log directory: {}", log_dir.display())
            })?;

            let all_logs_layer = fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(build_appender(&log_dir, "tablescope")?);

            let error_logs_layer = fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(build_appender(&log_dir, "error")?)
                .with_filter(EnvFilter::new("warn"));

            registry
                .with(all_logs_layer)
                .with(error_logs_layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;

            tracing::info!("Logging initialized, log directory: {}", log_dir.display());
        }
        None => registry
            .try_init()
            .context("Failed to install tracing subscriber")?,
    }

    Ok(())
}
