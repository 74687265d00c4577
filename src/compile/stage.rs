// src/compile/stage.rs

//! Rewritten copies of a stylesheet tree.
//!
//! Sass resolves `@import`/`@use` on its own, so a marker prefix has to be
//! gone from every file it may load, not just the entry. Each compile copies
//! the stylesheets under the source root into a private temp directory with
//! the marker stripped, and Sass is pointed at that copy instead.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;

/// Extensions Sass can load through `@import` / `@use` / `@forward`.
pub const STYLESHEET_EXTENSIONS: [&str; 3] = ["scss", "sass", "css"];

/// A staged tree. The directory is deleted when this is dropped.
#[derive(Debug)]
pub struct StagedTree {
    dir: TempDir,
    files: usize,
}

impl StagedTree {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Number of stylesheets copied.
    pub fn files(&self) -> usize {
        self.files
    }
}

/// Copy every stylesheet under `source_root` (read through `fs`) into a new
/// temp directory, passing each file's text through `rewrite` first.
///
/// The copy is written to real disk regardless of `fs`, since the external
/// compiler reads it from there.
pub fn stage_stylesheets<F>(
    fs: &dyn FileSystem,
    source_root: &Path,
    extra_extension: &str,
    rewrite: F,
) -> Result<StagedTree>
where
    F: Fn(&str) -> Cow<'_, str>,
{
    let dir = tempfile::Builder::new()
        .prefix("assetpipe-sass-")
        .tempdir()
        .context("creating staging directory")?;

    let files = copy_tree(fs, source_root, dir.path(), extra_extension, rewrite)?;
    debug!(?source_root, staged = ?dir.path(), files, "staged stylesheets");
    Ok(StagedTree { dir, files })
}

fn copy_tree<F>(
    fs: &dyn FileSystem,
    from: &Path,
    to: &Path,
    extra_extension: &str,
    rewrite: F,
) -> Result<usize>
where
    F: Fn(&str) -> Cow<'_, str>,
{
    if !fs.is_dir(from) {
        return Ok(0);
    }

    let mut copied = 0;
    let mut stack: Vec<PathBuf> = vec![from.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
                continue;
            }
            if !fs.is_file(&path) || !is_stylesheet(&path, extra_extension) {
                continue;
            }
            let Ok(rel) = path.strip_prefix(from) else {
                continue;
            };

            let text = fs.read_to_string(&path)?;
            let dest = to.join(rel);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating staging dir {:?}", parent))?;
            }
            std::fs::write(&dest, rewrite(&text).as_bytes())
                .with_context(|| format!("staging {:?}", dest))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn is_stylesheet(path: &Path, extra_extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext == extra_extension || STYLESHEET_EXTENSIONS.contains(&ext))
}
