//! Tracing subscriber setup.
//!
//! The card owns the terminal while it runs, so logs go to a file by
//! default. Stderr is only used when no log file can be opened.

use crate::config::{default_log_path, LoggingConfig, DEFAULT_LOG_FILTER};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, EnvFilter};

/// Where log output ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Install the global subscriber. Returns where logs are written.
///
/// `path_override` (from `--log-file`) wins over `logging.file`. Only the
/// first successful call per process installs anything; later calls return
/// the `try_init` error and leave the existing subscriber in place.
pub fn init_global(
    config: &LoggingConfig,
    path_override: Option<&str>,
) -> Result<LogTarget, TryInitError> {
    let filter = build_filter(&config.filter);
    let path = path_override
        .map(PathBuf::from)
        .or_else(|| config.file.as_ref().map(PathBuf::from))
        .or_else(default_log_path);

    match path.as_deref().and_then(|path| open_log_file(path).map(|f| (path, f))) {
        Some((path, file)) => {
            let layer = fmt::layer().with_ansi(false).with_writer(Arc::new(file));
            tracing_subscriber::registry()
                .with(layer)
                .with(filter)
                .try_init()?;
            Ok(LogTarget::File(path.to_path_buf()))
        }
        None => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(layer)
                .with(filter)
                .try_init()?;
            Ok(LogTarget::Stderr)
        }
    }
}

/// Parse a filter directive, falling back to the default on bad input.
pub fn build_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).ok()?;
    }
    File::options().create(true).append(true).open(path).ok()
}
