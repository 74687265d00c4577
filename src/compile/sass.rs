// src/compile/sass.rs

//! Stylesheet backend driving the Dart Sass CLI.

use std::borrow::Cow;
use std::ffi::OsString;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use regex::Regex;
use tracing::debug;

use crate::compile::sourcemap::{attach, replace_source_prefix, split_inline_map, CommentStyle};
use crate::compile::stage::{stage_stylesheets, StagedTree};
use crate::compile::tool::{resolve_tool, run_tool};
use crate::compile::{AssetCompiler, CompileRequest, CompiledAsset};
use crate::config::ConfigFile;
use crate::errors::{AssetpipeError, Result};
use crate::fs::FileSystem;
use crate::types::OutputStyle;

/// Compiles one `.scss` file to CSS plus a sourcemap.
///
/// Every stylesheet under the source root is staged into a temp directory
/// with marker-prefixed imports (`@import "~pkg/file"`) rewritten to plain
/// load-path imports. The entry is piped through `sass --stdin` and resolves
/// its imports against that staged copy, so partials get the same treatment.
#[derive(Debug, Clone)]
pub struct SassCompiler {
    command: String,
    output_style: OutputStyle,
    source_dir: PathBuf,
    extension: String,
    dependency_dir: PathBuf,
    marker_re: Regex,
    fs: Arc<dyn FileSystem>,
}

impl SassCompiler {
    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let styles = &cfg.styles;
        let output_style = OutputStyle::from_str(&styles.output_style)
            .map_err(AssetpipeError::ConfigError)?;
        Ok(Self {
            command: styles.command.clone(),
            output_style,
            source_dir: Path::new(&cfg.paths.src)
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect(),
            extension: styles.extension.clone(),
            dependency_dir: PathBuf::from(&styles.dependency_dir),
            marker_re: marker_regex(&styles.import_marker)?,
            fs,
        })
    }

    /// Command-line arguments; `entry_dir` is the staged directory of the entry.
    pub fn args(&self, entry_dir: &Path) -> Vec<OsString> {
        let mut load_path_src = OsString::from("--load-path=");
        load_path_src.push(entry_dir);
        let mut load_path_deps = OsString::from("--load-path=");
        load_path_deps.push(&self.dependency_dir);

        vec![
            OsString::from("--stdin"),
            OsString::from(format!("--style={}", self.output_style.as_str())),
            OsString::from("--embed-source-map"),
            load_path_src,
            load_path_deps,
        ]
    }

    /// Strip the import marker from `@import` / `@use` / `@forward` targets.
    pub fn rewrite_imports<'a>(&self, source: &'a str) -> Cow<'a, str> {
        rewrite_marker_imports(&self.marker_re, source)
    }

    /// Stage the source tree with marker imports rewritten.
    pub async fn stage(&self, root: &Path) -> Result<StagedTree> {
        let fs = Arc::clone(&self.fs);
        let source_root = root.join(&self.source_dir);
        let extension = self.extension.clone();
        let re = self.marker_re.clone();

        tokio::task::spawn_blocking(move || {
            stage_stylesheets(fs.as_ref(), &source_root, &extension, |text| {
                rewrite_marker_imports(&re, text)
            })
        })
        .await
        .context("staging stylesheets")?
    }

    async fn compile_inner(&self, request: &CompileRequest) -> Result<CompiledAsset> {
        let program = resolve_tool(&request.root, &self.command).await?;

        let entry = request
            .source
            .strip_prefix(&self.source_dir)
            .map_err(|_| AssetpipeError::OutsideSourceRoot {
                path: request.source.clone(),
                source_root: self.source_dir.clone(),
            })?
            .to_path_buf();

        let staged = self.stage(&request.root).await?;
        let staged_entry = staged.path().join(&entry);
        let text = tokio::fs::read_to_string(&staged_entry)
            .await
            .with_context(|| format!("reading staged stylesheet {:?}", staged_entry))?;
        let entry_dir = staged_entry.parent().unwrap_or_else(|| staged.path());

        let output = run_tool(
            "sass",
            &program,
            &self.args(entry_dir),
            &request.root,
            Some(text),
        )
        .await?;

        debug!(source = ?request.source, bytes = output.stdout.len(), "sass finished");
        let (code, mut map) = split_inline_map(&output.stdout)?;
        if let Some(map) = map.as_mut() {
            replace_source_prefix(map, staged.path(), &self.source_dir);
        }
        attach(code, map, request, CommentStyle::Block)
    }
}

impl AssetCompiler for SassCompiler {
    fn compile<'a>(
        &'a self,
        request: &'a CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompiledAsset>> + Send + 'a>> {
        Box::pin(self.compile_inner(request))
    }
}

/// Matches an `@import` / `@use` / `@forward` rule up to its terminating `;`.
fn marker_regex(marker: &str) -> Result<Regex> {
    let pattern = format!(
        r#"(?m)^([ \t]*@(?:import|use|forward)\b[^;\n]*?)(["']){}"#,
        regex::escape(marker)
    );
    Regex::new(&pattern)
        .map_err(|e| AssetpipeError::ConfigError(format!("invalid import marker: {e}")))
}

fn rewrite_marker_imports<'a>(re: &Regex, source: &'a str) -> Cow<'a, str> {
    if !re.is_match(source) {
        return Cow::Borrowed(source);
    }
    // `@import "~a", "~b";` carries the marker more than once; each pass
    // strips one occurrence per rule.
    let mut text = source.to_string();
    while re.is_match(&text) {
        text = re.replace_all(&text, "${1}${2}").into_owned();
    }
    Cow::Owned(text)
}
