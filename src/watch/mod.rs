// src/watch/mod.rs

//! File watching for `--watch` mode.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Classifying raw events into `BuildEvent::Build` / `BuildEvent::Remove`.
//! - Routing each event to the pipeline(s) whose sources it touches.
//!
//! It does **not** compile anything itself; pipelines do that in `rebuild`.

pub mod event_handler;
pub mod path_utils;
pub mod watcher;

pub use event_handler::{classify, collect_build_events, dispatch};
pub use watcher::{spawn_watcher, WatcherHandle};
