// src/logging.rs

//! Logging for `assetpipe`: subscriber setup plus the two reporting helpers
//! every pipeline logs through.
//!
//! Filter selection:
//! 1. `--log-level` sets one level for everything.
//! 2. Otherwise `ASSETPIPE_LOG` is read as an `EnvFilter` directive, so both
//!    `debug` and `assetpipe::watch=trace,info` work.
//! 3. Otherwise `info`.
//!
//! Output goes to STDERR; `--dry-run` prints its listing on stdout.

use std::fmt::Display;
use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;
use crate::types::ChangeAction;

/// Environment variable holding the default filter directive.
pub const LOG_ENV: &str = "ASSETPIPE_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(build_filter(cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("installing log subscriber: {err}"))
}

fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level_from_log_level(level).as_str());
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

/// Report a failure for one pipeline. `tag` is `"css"` or `"javascript"`.
pub fn log_error(tag: &str, err: &dyn Display) {
    error!(tag, error = %err, "build error");
}

/// Report a file being built or removed by a pipeline.
pub fn log_file_change(tag: &str, action: ChangeAction, path: &Path) {
    info!(tag, %action, path = %path.display(), "file change");
}
