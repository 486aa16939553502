//! Tracing setup.
//!
//! Logs go to `<base>/logs/histpaste.log`, never to stdout: stdout carries
//! command results and OSC 52 clipboard sequences.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::paths;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "HISTPASTE_LOG";

const LOG_FILE: &str = "histpaste.log";

/// Installs the global subscriber writing to the default log directory.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init(verbose: bool) -> Result<WorkerGuard> {
    init_in(&paths::logs_dir(), verbose)
}

/// Installs the global subscriber writing to `log_dir`.
pub fn init_in(log_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join(LOG_FILE);
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("Global log subscriber already installed")?;

    Ok(guard)
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "histpaste=debug,histpaste_core=debug"
    } else {
        "histpaste=info,histpaste_core=info"
    }
}
