// src/compile/mod.rs

//! Adapters around the external compiler toolchains.
//!
//! The pipelines never parse or transform sources themselves. They hand a
//! [`CompileRequest`] to an [`AssetCompiler`] and write back whatever
//! [`CompiledAsset`] it returns.
//!
//! - [`sass`] drives the Dart Sass CLI for stylesheets.
//! - [`esbuild`] drives esbuild for scripts (bundling, transpiling, IIFE output).
//! - [`stage`] copies the stylesheet tree with marker imports rewritten.
//! - [`sourcemap`] pulls the inline map out of tool output and rewrites it so
//!   it can live next to the compiled file.
//! - [`tool`] locates executables and runs them.
//!
//! Tests swap in their own `AssetCompiler` that never spawns a process.

pub mod esbuild;
pub mod sass;
pub mod sourcemap;
pub mod stage;
pub mod tool;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::errors::Result;

pub use esbuild::EsbuildBundler;
pub use sass::SassCompiler;

/// Everything a compiler needs to turn one source into one output.
///
/// `source` and `target` are relative to `root`, which is also the working
/// directory external tools are run in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub root: PathBuf,
    pub source: PathBuf,
    pub target: PathBuf,
    /// Global name of the emitted bundle (scripts only).
    pub bundle_name: Option<String>,
}

impl CompileRequest {
    pub fn source_abs(&self) -> PathBuf {
        self.root.join(&self.source)
    }

    /// File name of the companion sourcemap, e.g. `button.css.map`.
    pub fn map_file_name(&self) -> String {
        let name = self
            .target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{name}.map")
    }

    /// Directory of the target, relative to `root`.
    pub fn target_dir(&self) -> &Path {
        self.target.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Output of a successful compile. `code` may legitimately be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledAsset {
    pub code: String,
    pub map: Option<String>,
}

/// Trait abstracting the external toolchain for one asset kind.
///
/// Production code uses [`SassCompiler`] and [`EsbuildBundler`].
pub trait AssetCompiler: Send + Sync {
    /// Compile one source. An `Err` means nothing must be written.
    fn compile<'a>(
        &'a self,
        request: &'a CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompiledAsset>> + Send + 'a>>;
}
