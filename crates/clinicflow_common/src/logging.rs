//! Logging utilities for clinicflow.
//!
//! This module provides a standardized approach to logging across all crates
//! in the workspace. It includes functions for initializing the tracing
//! subscriber and for logging the outcome of fallible calls.

use std::path::Path;

use clinicflow_config::LoggingConfig;
use tracing::{error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{config_error, ClinicError};

/// File name prefix of the daily log files written by [`init_from_config`].
pub const LOG_FILE_PREFIX: &str = "clinicflow.log";

/// Initialize the tracing subscriber with the default level (INFO).
///
/// ```
/// use clinicflow_common::logging;
///
/// logging::init();
/// // a second call is a no-op
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives are honoured; the level given here applies to the
/// clinicflow crates. Uses `try_init`, so calling it more than once is harmless.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize logging to stdout and to a daily rolling file in `directory`.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for as long as the process logs.
pub fn init_with_file(level: Level, directory: impl AsRef<Path>, file_prefix: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(directory.as_ref(), file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!(
            "Logging initialized at level: {} (file: {})",
            level,
            directory.as_ref().display()
        );
    }
    guard
}

/// Initialize logging from the `[logging]` section.
///
/// Logs go to stdout, and also to daily files when `directory` is set; the
/// guard for the file writer is returned in that case.
pub fn init_from_config(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ClinicError> {
    let level = parse_level(&config.level)?;
    match config.directory.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(directory) => Ok(Some(init_with_file(level, directory, LOG_FILE_PREFIX))),
        None => {
            init_with_level(level);
            Ok(None)
        }
    }
}

/// Parses `trace`, `debug`, `info`, `warn` or `error`, ignoring case.
pub fn parse_level(level: &str) -> Result<Level, ClinicError> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| config_error(format!("unknown log level {:?}", level)))
}

fn build_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match format!("clinicflow={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => log_error(e, error_context),
    }
    result
}
