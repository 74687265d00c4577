// src/pipeline/discover.rs

//! Source discovery: which files under the source root a pipeline builds.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::pipeline::paths::{slash_str, Layout};

/// Compiled include/exclude globs for one pipeline.
///
/// Patterns are evaluated against project-relative, forward-slash paths such
/// as `"src/widgets/button.scss"`.
#[derive(Clone)]
pub struct SourceMatcher {
    include: GlobSet,
    exclude: Option<GlobSet>,
    extension: String,
}

impl fmt::Debug for SourceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceMatcher").finish_non_exhaustive()
    }
}

impl SourceMatcher {
    /// Include everything matching `<src>/**/*.<extension>`, minus `exclude`.
    ///
    /// An empty `exclude` list never excludes anything.
    pub fn new(src: &Path, extension: &str, exclude: &[String]) -> Result<Self> {
        let include_pattern = format!("{}/**/*.{}", slash_str(src), extension);
        let include = build_globset(std::slice::from_ref(&include_pattern))
            .with_context(|| format!("building include globset {include_pattern}"))?;

        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };

        Ok(Self {
            include,
            exclude,
            extension: extension.to_string(),
        })
    }

    /// Source extension, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect every file under the source root accepted by `matcher`.
///
/// Returned paths are joined onto the layout root and sorted. A missing
/// source root yields an empty list.
pub fn collect_sources(
    fs: &dyn FileSystem,
    layout: &Layout,
    matcher: &SourceMatcher,
) -> Result<Vec<PathBuf>> {
    let source_root = layout.source_root();
    if !fs.is_dir(&source_root) {
        warn!(?source_root, "source root does not exist; nothing to discover");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut stack = vec![source_root];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Some(rel) = layout.project_relative(&path) {
                    if matcher.matches(&slash_str(&rel)) {
                        files.push(path);
                    }
                }
            }
        }
    }

    files.sort();
    debug!(count = files.len(), "discovered sources");
    Ok(files)
}
