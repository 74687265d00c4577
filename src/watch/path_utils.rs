// src/watch/path_utils.rs

//! Relating notify event paths back to the watched project root.

use std::path::{Path, PathBuf};

/// Rebase an event path onto `root`, so pipelines see `<root>/src/...`.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (symlinks, `/private/var` vs `/var` on macOS), we
///   canonicalize both and try again. A removed file can't be canonicalized,
///   so for removals we canonicalize its parent instead.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn rebase_on_root(root: &Path, path: &Path) -> Option<PathBuf> {
    if path.strip_prefix(root).is_ok() {
        return Some(path.to_path_buf());
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok().or_else(|| {
        let parent = path.parent()?.canonicalize().ok()?;
        Some(parent.join(path.file_name()?))
    })?;

    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(|rel| root.join(rel))
}
