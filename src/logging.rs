use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{filter::EnvFilter, fmt};

/// Build the filter: RUST_LOG takes precedence over the configured level,
/// and an unparsable level falls back to `info`.
pub fn filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Send tracing output to `path`. The terminal is owned by the TUI, so
/// nothing is written to stdout or stderr.
///
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init(log_level: &str, path: &Path) -> io::Result<bool> {
    let file = open_log(path)?;
    let installed = fmt()
        .with_env_filter(filter(log_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(path = %path.display(), "logging started");
    }
    Ok(installed)
}
