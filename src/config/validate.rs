// src/config/validate.rs

use std::path::{Component, Path};
use std::str::FromStr;

use globset::Glob;

use crate::config::model::ConfigFile;
use crate::errors::{AssetpipeError, Result};
use crate::types::{AssetKind, OutputStyle};

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - `src` / `dist` are non-empty, relative, free of `..`, and disjoint
/// - extensions are non-empty and given without a leading dot
/// - every exclude glob compiles
/// - `output_style` is known and commands are non-empty
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    for kind in AssetKind::ALL {
        validate_pipeline(cfg, kind)?;
    }
    validate_styles(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> AssetpipeError {
    AssetpipeError::ConfigError(msg.into())
}

fn validate_paths(cfg: &ConfigFile) -> Result<()> {
    let src = cfg.paths.src.trim();
    let dist = cfg.paths.dist.trim();

    for (key, value) in [("src", src), ("dist", dist)] {
        if value.is_empty() {
            return Err(config_error(format!("[paths].{key} must not be empty")));
        }
        let path = Path::new(value);
        if path.is_absolute() {
            return Err(config_error(format!(
                "[paths].{key} must be relative to the project root (got {value:?})"
            )));
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(config_error(format!(
                "[paths].{key} must not contain '..' (got {value:?})"
            )));
        }
    }

    let src_path = Path::new(src);
    let dist_path = Path::new(dist);
    if src_path == dist_path {
        return Err(config_error(format!(
            "[paths].src and [paths].dist must differ (both are {src:?})"
        )));
    }
    if src_path.starts_with(dist_path) || dist_path.starts_with(src_path) {
        return Err(config_error(format!(
            "[paths].src ({src:?}) and [paths].dist ({dist:?}) must not be nested"
        )));
    }
    Ok(())
}

fn validate_pipeline(cfg: &ConfigFile, kind: AssetKind) -> Result<()> {
    let ext = cfg.extension(kind);
    if ext.trim().is_empty() {
        return Err(config_error(format!("[{kind}].extension must not be empty")));
    }
    if ext.starts_with('.') {
        return Err(config_error(format!(
            "[{kind}].extension must be given without a leading dot (got {ext:?})"
        )));
    }

    for pattern in cfg.exclude(kind) {
        Glob::new(pattern).map_err(|e| {
            config_error(format!("[{kind}].exclude has invalid glob {pattern:?}: {e}"))
        })?;
    }

    let command = match kind {
        AssetKind::Styles => &cfg.styles.command,
        AssetKind::Scripts => &cfg.scripts.command,
    };
    if command.trim().is_empty() {
        return Err(config_error(format!("[{kind}].command must not be empty")));
    }
    Ok(())
}

fn validate_styles(cfg: &ConfigFile) -> Result<()> {
    OutputStyle::from_str(&cfg.styles.output_style)
        .map_err(|e| config_error(format!("[styles].output_style: {e}")))?;

    if cfg.styles.import_marker.trim().is_empty() {
        return Err(config_error("[styles].import_marker must not be empty"));
    }
    Ok(())
}
