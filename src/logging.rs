use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Result;

pub const LOG_FILE_PREFIX: &str = "eartle.log";

/// Filter for the configured level. `RUST_LOG` wins over the config file.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("eartle={level}")))
        .unwrap_or_else(|_| EnvFilter::new("eartle=info"))
}

/// Sends logs to a daily-rolling file under `log_dir`; the terminal belongs
/// to the TUI. The returned guard must outlive the event loop or buffered
/// lines are lost.
pub fn init(log_dir: &Path, level: &str) -> Result<Option<WorkerGuard>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let installed = tracing_subscriber::registry()
        .with(filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init();

    // A subscriber is already installed (tests); dropping the guard shuts
    // the unused writer down.
    Ok(installed.ok().map(|_| guard))
}
