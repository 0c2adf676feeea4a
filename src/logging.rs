//! Log sink setup.
//!
//! The terminal owns stdout and stderr while the UI runs, so logs only go to
//! the file named by `FLATVAL_LOG`. Without it, logging stays disabled.

use std::fs::{File, OpenOptions};
use std::io;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. Returns `Ok(false)` when no log file is
/// configured or a subscriber was already installed.
pub fn init(config: &EnvConfig) -> io::Result<bool> {
    let Some(path) = config.log_file.as_deref() else {
        return Ok(false);
    };

    let file = open_log_file(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .is_ok();
    Ok(installed)
}

fn open_log_file(path: &str) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
