// src/compile/esbuild.rs

//! Script backend driving esbuild.
//!
//! esbuild resolves `node_modules` imports, converts CommonJS dependencies
//! and transpiles down to the configured target on its own; we only pick the
//! output shape: a single IIFE assigned to a global named after the file.

use std::ffi::OsString;
use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::compile::sourcemap::{externalize, CommentStyle};
use crate::compile::tool::{resolve_tool, run_tool};
use crate::compile::{AssetCompiler, CompileRequest, CompiledAsset};
use crate::config::ScriptsSection;
use crate::errors::Result;
use crate::pipeline::paths::bundle_name_for;

#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    command: String,
    target: String,
    dom_ready: bool,
}

impl EsbuildBundler {
    pub fn from_config(cfg: &ScriptsSection) -> Self {
        Self {
            command: cfg.command.clone(),
            target: cfg.target.clone(),
            dom_ready: cfg.dom_ready,
        }
    }

    /// Command-line arguments for bundling `request`.
    pub fn args(&self, request: &CompileRequest) -> Vec<OsString> {
        let name = request
            .bundle_name
            .clone()
            .unwrap_or_else(|| bundle_name_for(&request.source));

        vec![
            OsString::from(request.source.to_string_lossy().replace('\\', "/")),
            OsString::from("--bundle"),
            OsString::from("--format=iife"),
            OsString::from(format!("--global-name={name}")),
            OsString::from("--sourcemap=inline"),
            OsString::from(format!("--target={}", self.target)),
            OsString::from("--log-level=error"),
            OsString::from(format!("--footer:js={}", footer(&name, self.dom_ready))),
        ]
    }

    async fn compile_inner(&self, request: &CompileRequest) -> Result<CompiledAsset> {
        let program = resolve_tool(&request.root, &self.command).await?;
        let output = run_tool(
            "esbuild",
            &program,
            &self.args(request),
            &request.root,
            None,
        )
        .await?;

        debug!(source = ?request.source, bytes = output.stdout.len(), "esbuild finished");
        externalize(&output.stdout, request, CommentStyle::Line)
    }
}

impl AssetCompiler for EsbuildBundler {
    fn compile<'a>(
        &'a self,
        request: &'a CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompiledAsset>> + Send + 'a>> {
        Box::pin(self.compile_inner(request))
    }
}

/// Runtime snippet that calls the bundle's entry function once the document
/// has finished loading.
pub fn dom_ready_snippet(bundle_name: &str) -> String {
    format!("document.addEventListener('DOMContentLoaded',function(){{{bundle_name}()}});")
}

/// esbuild exposes the module namespace as the global; lift a default export
/// so `name()` calls the entry function directly.
fn default_export_unwrap(bundle_name: &str) -> String {
    format!(
        "if({n}&&typeof {n}!=='function'&&typeof {n}.default==='function'){{{n}={n}.default;}}",
        n = bundle_name
    )
}

fn footer(bundle_name: &str, dom_ready: bool) -> String {
    let mut footer = default_export_unwrap(bundle_name);
    if dom_ready {
        footer.push_str(&dom_ready_snippet(bundle_name));
    }
    footer
}
