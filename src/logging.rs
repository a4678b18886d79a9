use std::fs;

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// Console output is always on and filtered by `RUST_LOG`. When `LOG_DIR`
/// is set, errors go to a daily `classconnect.log` and structured events to
/// a daily `classconnect.json` in that directory.
pub fn init_tracing() {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,classconnect_auth=info,tower_http=warn",
            env!("CARGO_CRATE_NAME")
        ))
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    let log_dir = match log_dir {
        Some(dir) => match fs::create_dir_all(&dir) {
            Ok(()) => Some(dir),
            Err(e) => {
                eprintln!("⚠️  Failed to create log directory {dir}: {e}. Logging to console only...");
                None
            }
        },
        None => None,
    };

    // File layer for errors
    let file_layer = log_dir.as_deref().map(|dir| {
        fmt::layer()
            .with_writer(RollingFileAppender::new(Rotation::DAILY, dir, "classconnect.log"))
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_filter(EnvFilter::new("error"))
    });

    // JSON file layer for structured logs
    let json_layer = log_dir.as_deref().map(|dir| {
        fmt::layer()
            .json()
            .with_writer(RollingFileAppender::new(Rotation::DAILY, dir, "classconnect.json"))
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(EnvFilter::new("info"))
    });

    let file_logging = log_dir.is_some();

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .init();

    if file_logging {
        info!("Tracing initialized with file logging");
    } else {
        warn!("Tracing initialized without file logging (LOG_DIR not set)");
    }
}
