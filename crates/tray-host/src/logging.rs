//! Logging setup for the tray host.
//!
//! Logs go to stderr and to `TrayLog.txt` in the log directory. The file
//! writer runs on a background thread; its guard must be held until exit or
//! buffered lines are lost.

use jackett_tray_core::config::AppConfig;
use std::io::{self, IsTerminal};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
fn default_filter(debug: bool) -> EnvFilter {
    EnvFilter::new(if debug { "debug" } else { "info" })
}

/// Install the global subscriber.
///
/// Returns the file writer guard, or `None` when the log directory is not
/// writable and only stderr logging is active.
pub fn init(log_dir: &Path, debug: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .compact();

    let appender = std::fs::create_dir_all(log_dir)
        .map_err(|e| e.to_string())
        .and_then(|()| {
            RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(AppConfig::LOG_FILE_NAME)
                .build(log_dir)
                .map_err(|e| e.to_string())
        });

    let (file_layer, guard) = match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "Cannot open log file in {}: {}; logging to stderr only",
                log_dir.display(),
                e
            );
            (None, None)
        }
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    if let Err(e) = installed {
        eprintln!("Logging already initialised: {}", e);
    }

    guard
}
