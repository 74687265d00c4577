// src/pipeline/paths.rs

//! Mapping source paths onto the mirrored dist tree.

use std::path::{Component, Path, PathBuf};

use crate::errors::{AssetpipeError, Result};

/// Project root plus the source and distribution directories inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    src: PathBuf,
    dist: PathBuf,
}

/// Every form of one source path a pipeline needs.
///
/// `source` / `target` are relative to the project root (what external tools
/// see); the `*_abs` forms are joined onto the root (what the filesystem sees).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// Path below the source root, e.g. `widgets/button.scss`.
    pub rel: PathBuf,
    pub source: PathBuf,
    pub target: PathBuf,
    pub source_abs: PathBuf,
    pub target_abs: PathBuf,
}

impl AssetPaths {
    /// Companion sourcemap next to the target, e.g. `button.css.map`.
    pub fn map_abs(&self) -> PathBuf {
        with_map_suffix(&self.target_abs)
    }

    pub fn target_dir_abs(&self) -> &Path {
        self.target_abs.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, src: impl Into<PathBuf>, dist: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            src: lexical(src.into()),
            dist: lexical(dist.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn src(&self) -> &Path {
        &self.src
    }

    pub fn dist(&self) -> &Path {
        &self.dist
    }

    pub fn source_root(&self) -> PathBuf {
        self.root.join(&self.src)
    }

    /// Express `path` relative to the project root.
    ///
    /// Accepts paths under the root (`<root>/src/a.scss`) as well as paths
    /// that are already project-relative (`src/a.scss`, `./src/a.scss`).
    /// `..` components are resolved first; a path that climbs out of the
    /// root yields `None`.
    pub fn project_relative(&self, path: &Path) -> Option<PathBuf> {
        let path = normalize(path)?;
        if let Ok(rel) = path.strip_prefix(&self.root) {
            return Some(rel.to_path_buf());
        }
        if path.is_relative() {
            return Some(path);
        }
        None
    }

    /// Absolute dist directory mirroring the source directory `dir`.
    pub fn mirror_dir(&self, dir: &Path) -> Option<PathBuf> {
        let rel = self.project_relative(dir)?;
        let inner = rel.strip_prefix(&self.src).ok()?;
        Some(self.root.join(&self.dist).join(inner))
    }

    /// Resolve a source path into its mirrored target under the dist root,
    /// with the extension replaced by `output_ext`.
    pub fn resolve(&self, path: &Path, output_ext: &str) -> Result<AssetPaths> {
        let outside = || AssetpipeError::OutsideSourceRoot {
            path: path.to_path_buf(),
            source_root: self.source_root(),
        };

        let source = self.project_relative(path).ok_or_else(outside)?;
        let rel = source
            .strip_prefix(&self.src)
            .map(Path::to_path_buf)
            .map_err(|_| outside())?;
        if rel.file_name().is_none() {
            return Err(outside());
        }

        let target = self.dist.join(&rel).with_extension(output_ext);

        Ok(AssetPaths {
            source_abs: self.root.join(&source),
            target_abs: self.root.join(&target),
            rel,
            source,
            target,
        })
    }
}

/// Resolve `.` and `..` without touching the filesystem.
///
/// Returns `None` when a `..` would climb above the start of `path`.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    return None;
                }
                out.pop();
            }
            other => out.push(other),
        }
    }
    Some(out)
}

fn lexical(path: PathBuf) -> PathBuf {
    normalize(&path).unwrap_or(path)
}

pub fn with_map_suffix(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".map");
    PathBuf::from(s)
}

/// Forward-slash string form used for glob matching and log output.
pub fn slash_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// `nav-menu` -> `navMenu`: every `-x` becomes `X`.
pub fn dash_case_to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(next) = chars.peek().copied() {
                if next.is_alphanumeric() || next == '_' {
                    chars.next();
                    out.extend(next.to_uppercase());
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Global bundle name for a script source: its file stem in camel case.
pub fn bundle_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dash_case_to_camel_case(&stem)
}
