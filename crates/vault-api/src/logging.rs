//! Tracing subscriber setup.
//!
//! `RUST_LOG` selects what is recorded (default [`DEFAULT_LOG_FILTER`]);
//! [`ServerConfig`] selects the encoding and destination. File output rotates
//! daily and is written from a background thread, so the returned guard must
//! live until shutdown to flush buffered lines.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, ServerConfig};

pub const DEFAULT_LOG_FILTER: &str = "vault_api=debug,vault_db=info,tower_http=debug";

const DEFAULT_LOG_FILE_NAME: &str = "vault-api.log";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(config: &ServerConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (writer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let (dir, file_name) = split_log_path(path);
            let appender = tracing_appender::rolling::daily(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    // Colors on the console by default, never in files unless asked for.
    let ansi = config.log_ansi.unwrap_or(config.log_file.is_none());

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_ansi(ansi).with_writer(writer))
            .init(),
    }

    guard
}

/// Directory and file-name prefix for the rolling appender.
fn split_log_path(path: &str) -> (PathBuf, String) {
    let path = Path::new(path);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(DEFAULT_LOG_FILE_NAME)
        .to_string();
    (dir, file_name)
}
