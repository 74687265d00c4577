// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetpipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The external compiler ran but rejected the input.
    #[error("{tool} failed: {message}")]
    Compile { tool: String, message: String },

    #[error("Tool not found: {0} (install it or add it to node_modules/.bin)")]
    ToolNotFound(String),

    #[error("Path {path:?} is not under the source root {source_root:?}")]
    OutsideSourceRoot {
        path: PathBuf,
        source_root: PathBuf,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetpipeError>;
