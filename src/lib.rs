// src/lib.rs

pub mod cli;
pub mod compile;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_or_default};
use crate::config::ConfigFile;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{Pipeline, RunSummary};
use crate::types::AssetKind;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or defaults)
/// - one pipeline per selected asset kind
/// - the one-shot build of every pipeline
/// - (optional) the file watcher and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let (config_path, explicit) = match &args.config {
        Some(path) => (PathBuf::from(path), true),
        None => (default_config_path(), false),
    };
    let cfg = load_or_default(&config_path, explicit)?;

    let root = config_root_dir(&config_path);
    let root = root.canonicalize().unwrap_or(root);

    let kinds = selected_kinds(&args, &cfg);
    if kinds.is_empty() {
        warn!("no pipelines enabled; nothing to do");
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let pipelines = kinds
        .iter()
        .map(|&kind| Pipeline::from_config(kind, &cfg, &root, Arc::clone(&fs)))
        .collect::<errors::Result<Vec<_>>>()?;

    if args.dry_run {
        print_dry_run(&pipelines)?;
        return Ok(());
    }

    run_pipelines(&pipelines).await;

    if !args.watch {
        return Ok(());
    }

    let _watcher = watch::spawn_watcher(&root, pipelines)?;
    tokio::signal::ctrl_c().await?;
    info!("received Ctrl+C; stopping watcher");
    Ok(())
}

/// Run every pipeline's one-shot build concurrently and wait for all of them.
pub async fn run_pipelines(pipelines: &[Pipeline]) -> Vec<(AssetKind, RunSummary)> {
    let mut runs = JoinSet::new();
    for pipeline in pipelines.iter().cloned() {
        runs.spawn(async move { (pipeline.kind(), pipeline.run().await) });
    }

    let mut summaries = Vec::with_capacity(pipelines.len());
    while let Some(joined) = runs.join_next().await {
        match joined {
            Ok(summary) => summaries.push(summary),
            Err(err) => warn!(error = %err, "pipeline run task failed"),
        }
    }
    summaries.sort_by_key(|(kind, _)| kind.tag());
    summaries
}

/// Pipelines named on the command line, or every enabled one.
fn selected_kinds(args: &CliArgs, cfg: &ConfigFile) -> Vec<AssetKind> {
    if args.pipelines.is_empty() {
        return AssetKind::ALL
            .into_iter()
            .filter(|&k| cfg.is_enabled(k))
            .collect();
    }
    let mut kinds: Vec<AssetKind> = Vec::new();
    for arg in &args.pipelines {
        let kind = AssetKind::from(*arg);
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds
}

/// Project root: the directory holding the config file, or the cwd for a
/// bare file name like `Assetpipe.toml`.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print each pipeline's sources and where they would be written.
fn print_dry_run(pipelines: &[Pipeline]) -> Result<()> {
    println!("assetpipe dry-run");
    for pipeline in pipelines {
        let layout = pipeline.layout();
        let sources = pipeline.discover()?;
        println!();
        println!(
            "{} ({}): {} -> {}, {} source(s)",
            pipeline.kind(),
            pipeline.tag(),
            layout.src().display(),
            layout.dist().display(),
            sources.len()
        );
        for source in sources {
            let paths = pipeline.paths_for(&source)?;
            println!("  {} -> {}", paths.source.display(), paths.target.display());
        }
    }
    Ok(())
}
