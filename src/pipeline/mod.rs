// src/pipeline/mod.rs

//! One compile pipeline per asset kind.
//!
//! A [`Pipeline`] owns no state between calls: it discovers sources, asks its
//! [`AssetCompiler`] to compile them, and mirrors the results from the source
//! root into the dist root through a [`FileSystem`].
//!
//! - [`paths`] maps a source path onto its target in the dist tree.
//! - [`discover`] walks the source root and applies include/exclude globs.

pub mod discover;
pub mod paths;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::compile::{AssetCompiler, CompileRequest, EsbuildBundler, SassCompiler};
use crate::config::ConfigFile;
use crate::errors::{AssetpipeError, Result};
use crate::fs::FileSystem;
use crate::logging::{log_error, log_file_change};
use crate::types::{AssetKind, BuildEvent, ChangeAction};

pub use discover::{collect_sources, SourceMatcher};
pub use paths::{bundle_name_for, dash_case_to_camel_case, AssetPaths, Layout};

/// Result of building a single source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Output (and sourcemap, when the compiler produced one) was written.
    Written { target: PathBuf },
    /// The compiler rejected the source; the error was logged and nothing written.
    CompileFailed,
}

/// Totals for one `run()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub written: usize,
    pub failed: usize,
}

/// A stateless styles or scripts pipeline. Cheap to clone.
#[derive(Clone)]
pub struct Pipeline {
    kind: AssetKind,
    layout: Layout,
    matcher: SourceMatcher,
    fs: Arc<dyn FileSystem>,
    compiler: Arc<dyn AssetCompiler>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("kind", &self.kind)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        kind: AssetKind,
        layout: Layout,
        matcher: SourceMatcher,
        fs: Arc<dyn FileSystem>,
        compiler: Arc<dyn AssetCompiler>,
    ) -> Self {
        Self {
            kind,
            layout,
            matcher,
            fs,
            compiler,
        }
    }

    /// Build a pipeline from config with an explicit compiler (used by tests).
    pub fn with_compiler(
        kind: AssetKind,
        cfg: &ConfigFile,
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        compiler: Arc<dyn AssetCompiler>,
    ) -> Result<Self> {
        let layout = Layout::new(root, &cfg.paths.src, &cfg.paths.dist);
        let matcher = SourceMatcher::new(layout.src(), cfg.extension(kind), cfg.exclude(kind))?;
        Ok(Self::new(kind, layout, matcher, fs, compiler))
    }

    /// Build a pipeline from config backed by the real toolchain for `kind`.
    pub fn from_config(
        kind: AssetKind,
        cfg: &ConfigFile,
        root: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let compiler: Arc<dyn AssetCompiler> = match kind {
            AssetKind::Styles => Arc::new(SassCompiler::from_config(cfg, Arc::clone(&fs))?),
            AssetKind::Scripts => Arc::new(EsbuildBundler::from_config(&cfg.scripts)),
        };
        Self::with_compiler(kind, cfg, root, fs, compiler)
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Source and target paths for `path`.
    pub fn paths_for(&self, path: &Path) -> Result<AssetPaths> {
        self.layout.resolve(path, self.kind.output_extension())
    }

    /// Whether `path` is a source this pipeline builds.
    pub fn accepts(&self, path: &Path) -> bool {
        match self.layout.project_relative(path) {
            Some(rel) => self.matcher.matches(&paths::slash_str(&rel)),
            None => false,
        }
    }

    /// Every source under the source root that matches, excluded paths removed.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        collect_sources(self.fs.as_ref(), &self.layout, &self.matcher)
    }

    /// Compile one source into its mirrored target.
    ///
    /// A compiler failure is logged under this pipeline's tag and reported as
    /// [`BuildOutcome::CompileFailed`]; the output tree is left untouched.
    /// Filesystem failures while writing are returned as errors.
    pub async fn build(&self, path: &Path) -> Result<BuildOutcome> {
        let paths = self.paths_for(path)?;
        let request = CompileRequest {
            root: self.layout.root().to_path_buf(),
            source: paths.source.clone(),
            target: paths.target.clone(),
            bundle_name: self
                .kind
                .derives_bundle_name()
                .then(|| bundle_name_for(&paths.source)),
        };
        debug!(tag = self.tag(), source = ?paths.source, target = ?paths.target, "compiling");

        let asset = match self.compiler.compile(&request).await {
            Ok(asset) => asset,
            Err(err) => {
                log_error(self.tag(), &err);
                return Ok(BuildOutcome::CompileFailed);
            }
        };

        let target_dir = paths.target_dir_abs();
        if !self.fs.is_dir(target_dir) {
            self.fs.create_dir_all(target_dir)?;
        }

        self.fs.write(&paths.target_abs, asset.code.as_bytes())?;
        if let Some(map) = &asset.map {
            self.fs.write(&paths.map_abs(), map.as_bytes())?;
        }

        debug!(tag = self.tag(), target = ?paths.target_abs, "wrote output");
        Ok(BuildOutcome::Written {
            target: paths.target_abs,
        })
    }

    /// React to one change notification.
    ///
    /// - `Remove`: delete the mirrored target and its sourcemap if present.
    /// - `Build`: compile the source again.
    pub async fn rebuild(&self, event: &BuildEvent) -> Result<()> {
        let path = event.path();
        log_file_change(self.tag(), event.action(), path);

        match event {
            BuildEvent::Remove(_) => self.remove_outputs(path),
            BuildEvent::Build(_) => self.build(path).await.map(|_| ()),
        }
    }

    fn remove_outputs(&self, path: &Path) -> Result<()> {
        let paths = self.paths_for(path)?;
        for target in [paths.target_abs.clone(), paths.map_abs()] {
            if self.fs.exists(&target) {
                log_file_change(self.tag(), ChangeAction::Remove, &target);
                self.fs
                    .remove_file(&target)
                    .with_context(|| format!("removing output {:?}", target))?;
            }
        }
        Ok(())
    }

    /// Whether `dir` is a source directory whose mirror exists in the dist tree.
    pub fn mirrors_dir(&self, dir: &Path) -> bool {
        self.layout
            .mirror_dir(dir)
            .is_some_and(|mirror| self.fs.is_dir(&mirror))
    }

    /// Delete the outputs of every source that lived under the removed
    /// directory `dir`.
    ///
    /// Only files this pipeline would have produced are touched: a compiled
    /// file or its `.map` whose source path passes the include/exclude
    /// globs. Returns the number of files deleted.
    pub fn remove_tree(&self, dir: &Path) -> Result<usize> {
        let Some(mirror) = self.layout.mirror_dir(dir) else {
            return Err(AssetpipeError::OutsideSourceRoot {
                path: dir.to_path_buf(),
                source_root: self.layout.source_root(),
            });
        };
        if !self.fs.is_dir(&mirror) {
            return Ok(0);
        }

        let dist_root = self.layout.root().join(self.layout.dist());
        let mut removed = 0;
        let mut stack = vec![mirror];
        while let Some(current) = stack.pop() {
            for path in self.fs.read_dir(&current)? {
                if self.fs.is_dir(&path) {
                    stack.push(path);
                    continue;
                }
                let Ok(rel) = path.strip_prefix(&dist_root) else {
                    continue;
                };
                if !self.produced(rel) {
                    continue;
                }
                log_file_change(self.tag(), ChangeAction::Remove, &path);
                self.fs
                    .remove_file(&path)
                    .with_context(|| format!("removing output {:?}", path))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Whether `rel` (relative to the dist root) is an output of one of our sources.
    fn produced(&self, rel: &Path) -> bool {
        let output = match rel.extension().and_then(|e| e.to_str()) {
            Some("map") => rel.with_extension(""),
            _ => rel.to_path_buf(),
        };
        if output.extension().and_then(|e| e.to_str()) != Some(self.kind.output_extension()) {
            return false;
        }
        let source = self
            .layout
            .src()
            .join(output.with_extension(self.matcher.extension()));
        self.matcher.matches(&paths::slash_str(&source))
    }

    /// Discover every source and build them all concurrently.
    ///
    /// Resolves once every build has settled. Failures of individual files
    /// are logged and counted, never propagated.
    pub async fn run(&self) -> RunSummary {
        let sources = match self.discover() {
            Ok(sources) => sources,
            Err(err) => {
                log_error(self.tag(), &err);
                return RunSummary::default();
            }
        };

        let mut summary = RunSummary {
            discovered: sources.len(),
            ..RunSummary::default()
        };
        info!(tag = self.tag(), count = sources.len(), "building sources");

        let mut builds = JoinSet::new();
        for source in sources {
            let pipeline = self.clone();
            builds.spawn(async move { pipeline.build(&source).await });
        }

        while let Some(joined) = builds.join_next().await {
            match joined {
                Ok(Ok(BuildOutcome::Written { .. })) => summary.written += 1,
                Ok(Ok(BuildOutcome::CompileFailed)) => summary.failed += 1,
                Ok(Err(err)) => {
                    log_error(self.tag(), &err);
                    summary.failed += 1;
                }
                Err(join_err) => {
                    log_error(self.tag(), &join_err);
                    summary.failed += 1;
                }
            }
        }

        info!(
            tag = self.tag(),
            written = summary.written,
            failed = summary.failed,
            "build run finished"
        );
        summary
    }
}
