//! Tracing setup.
//!
//! The terminal belongs to the menu, so logs go to a file under the data
//! dir. `INSTALLER_LOG` takes an `EnvFilter` directive; without it the
//! level is `info` (`debug` with `--verbose`).

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::types::default_data_dir;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "INSTALLER_LOG";

const LOG_FILENAME: &str = "installer.log";

pub fn default_log_path() -> PathBuf {
    default_data_dir().join(LOG_FILENAME)
}

/// Filter used when `INSTALLER_LOG` is unset or invalid.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Install the global subscriber, appending to `path`.
///
/// # Errors
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(path: &Path, verbose: bool) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)
}
