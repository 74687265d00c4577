// src/watch/event_handler.rs

//! Turning notify events into `BuildEvent`s and routing them to pipelines.

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::logging::{log_error, log_file_change};
use crate::pipeline::Pipeline;
use crate::types::{BuildEvent, ChangeAction};
use crate::watch::path_utils::rebase_on_root;

/// Decide what a filesystem event means for one path.
///
/// - access events are ignored
/// - removals and rename-away become `Remove`
/// - anything else on an existing file becomes `Build`
/// - anything else on a path that is gone becomes `Remove`
/// - events on directories that still exist are ignored; a directory that is
///   gone surfaces as `Remove` and is swept by [`dispatch`]
pub fn classify(kind: &EventKind, path: &Path, fs: &dyn FileSystem) -> Option<BuildEvent> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Remove(_) => Some(BuildEvent::Remove(path.to_path_buf())),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            Some(BuildEvent::Remove(path.to_path_buf()))
        }
        _ if fs.is_file(path) => Some(BuildEvent::Build(path.to_path_buf())),
        _ if fs.exists(path) => None,
        _ => Some(BuildEvent::Remove(path.to_path_buf())),
    }
}

/// Expand a batch of notify events into per-path `BuildEvent`s.
///
/// Editors often emit several events for one save; only the last event per
/// path is kept, in the order paths were last touched.
pub fn collect_build_events(
    root: &Path,
    events: Vec<Event>,
    fs: &dyn FileSystem,
) -> Vec<BuildEvent> {
    let mut out: Vec<BuildEvent> = Vec::new();

    for event in events {
        for path in &event.paths {
            let Some(path) = rebase_on_root(root, path) else {
                warn!(?path, ?root, "event path is outside the watched root");
                continue;
            };
            if let Some(build_event) = classify(&event.kind, &path, fs) {
                out.retain(|existing| existing.path() != build_event.path());
                out.push(build_event);
            }
        }
    }

    out
}

/// Hand one `BuildEvent` to every pipeline that owns its path.
///
/// A `Remove` for a path no pipeline accepts may be a whole source directory
/// (renamed away or deleted); pipelines whose dist tree mirrors it sweep the
/// outputs underneath. Returns the number of pipelines that handled the
/// event. Errors are logged with the pipeline tag; they never stop the
/// watcher.
pub async fn dispatch(pipelines: &[Pipeline], event: &BuildEvent) -> usize {
    let path = event.path();
    let mut handled = 0;
    for pipeline in pipelines {
        let result = if pipeline.accepts(path) {
            pipeline.rebuild(event).await
        } else if matches!(event, BuildEvent::Remove(_)) && pipeline.mirrors_dir(path) {
            log_file_change(pipeline.tag(), ChangeAction::Remove, path);
            pipeline.remove_tree(path).map(|_| ())
        } else {
            continue;
        };
        handled += 1;
        if let Err(err) = result {
            log_error(pipeline.tag(), &err);
        }
    }
    if handled == 0 {
        debug!(path = ?event.path(), "no pipeline interested in path");
    }
    handled
}

/// Paths touched by a batch, for debug output.
pub fn event_paths(events: &[BuildEvent]) -> Vec<PathBuf> {
    events.iter().map(|e| e.path().to_path_buf()).collect()
}
