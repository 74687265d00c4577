// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::Pipeline;
use crate::watch::event_handler::{collect_build_events, dispatch, event_paths};

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle stops
/// file watching and aborts the event loop.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and feeds
/// every change to the pipelines that own the changed path.
///
/// Events are processed serially, so a remove and a build for the same path
/// never race each other.
pub fn spawn_watcher(root: impl Into<PathBuf>, pipelines: Vec<Pipeline>) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("assetpipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetpipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    let pipelines = Arc::new(pipelines);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let task = tokio::spawn(async move {
        while let Some(first) = event_rx.recv().await {
            let mut batch = vec![first];
            while let Ok(more) = event_rx.try_recv() {
                batch.push(more);
            }

            let events = collect_build_events(&root, batch, fs.as_ref());
            if events.is_empty() {
                continue;
            }
            debug!(paths = ?event_paths(&events), "processing change batch");

            for event in &events {
                dispatch(&pipelines, event).await;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        task,
    })
}
