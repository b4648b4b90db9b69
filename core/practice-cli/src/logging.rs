//! Log setup for the `practice` binary.
//!
//! Logs go to a daily-rolling file under `<root>/logs/` so they never mix
//! with command output. `PRACTICE_LOG_DEBUG=1` forces debug level;
//! otherwise `RUST_LOG` applies, defaulting to `info`.

use std::env;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "practice.log";

fn filter() -> EnvFilter {
    let debug_enabled = env::var("PRACTICE_LOG_DEBUG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered lines are flushed.
///
/// If the log directory cannot be created, warnings and errors go to stderr
/// instead.
pub fn init(logs_dir: &Path) -> Option<WorkerGuard> {
    if let Err(err) = fs_err::create_dir_all(logs_dir) {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("warn"))
            .with_writer(std::io::stderr)
            .init();
        tracing::warn!(error = %err, "File logging unavailable");
        return None;
    }

    let appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .init();

    Some(guard)
}
