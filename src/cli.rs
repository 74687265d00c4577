// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::AssetKind;

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Compile stylesheets and scripts from a source tree into a mirrored dist tree.",
    long_about = None
)]
pub struct CliArgs {
    /// Pipelines to run. Defaults to every enabled pipeline.
    #[arg(value_enum, value_name = "PIPELINE")]
    pub pipelines: Vec<PipelineArg>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Assetpipe.toml` in the current working directory. When the
    /// default file does not exist, built-in defaults are used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// After the initial build, keep watching the source tree and rebuild on change.
    #[arg(long)]
    pub watch: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print discovered sources and their targets, but don't compile anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Pipeline selector as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PipelineArg {
    Styles,
    Scripts,
}

impl From<PipelineArg> for AssetKind {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::Styles => AssetKind::Styles,
            PipelineArg::Scripts => AssetKind::Scripts,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
