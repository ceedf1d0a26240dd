use anyhow::Context;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::shared::config::config;

/// Installs the global tracing subscriber: human-readable output on stdout
/// plus a daily-rolled plain-text file under `logging.log_dir`, each behind
/// its own level filter from the config.
///
/// File writes go through a non-blocking worker so index builds are never
/// stalled on log I/O; the returned guard flushes that worker on drop, so the
/// embedder must keep it alive for the life of the process.
pub fn init() -> anyhow::Result<WorkerGuard> {
    let cfg = &config().logging;
    let stdout_level: LevelFilter = cfg
        .stdout_level
        .parse()
        .context("invalid logging.stdout_level")?;
    let file_level: LevelFilter = cfg
        .file_level
        .parse()
        .context("invalid logging.file_level")?;

    let daily = tracing_appender::rolling::daily(&cfg.log_dir, "trajhash.log");
    let (file_writer, guard) = tracing_appender::non_blocking(daily);

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(stdout_level))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_level),
        )
        .init();

    info!(log_dir = %cfg.log_dir, "Logging initialized");
    Ok(guard)
}
