#![allow(dead_code)]

use std::sync::Arc;

use assetpipe::config::{validate_config, ConfigFile};
use assetpipe::fs::mock::MockFileSystem;
use assetpipe::pipeline::Pipeline;
use assetpipe::types::AssetKind;

use crate::fake_compiler::FakeCompiler;

/// Project root used by mock-filesystem fixtures.
pub const ROOT: &str = "/project";

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: ConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFile::default(),
        }
    }

    pub fn with_src(mut self, src: &str) -> Self {
        self.config.paths.src = src.to_string();
        self
    }

    pub fn with_dist(mut self, dist: &str) -> Self {
        self.config.paths.dist = dist.to_string();
        self
    }

    pub fn exclude(mut self, kind: AssetKind, pattern: &str) -> Self {
        match kind {
            AssetKind::Styles => self.config.styles.exclude.push(pattern.to_string()),
            AssetKind::Scripts => self.config.scripts.exclude.push(pattern.to_string()),
        }
        self
    }

    pub fn disable(mut self, kind: AssetKind) -> Self {
        match kind {
            AssetKind::Styles => self.config.styles.enabled = false,
            AssetKind::Scripts => self.config.scripts.enabled = false,
        }
        self
    }

    pub fn build(self) -> ConfigFile {
        validate_config(&self.config).expect("Failed to build valid config from builder");
        self.config
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A mock project: in-memory filesystem plus one pipeline on a fake compiler.
pub struct Fixture {
    pub fs: MockFileSystem,
    pub compiler: FakeCompiler,
    pub pipeline: Pipeline,
}

impl Fixture {
    pub fn new(kind: AssetKind, files: &[&str]) -> Self {
        Self::with(kind, ConfigFileBuilder::new().build(), FakeCompiler::new(), files)
    }

    /// `files` are project-relative (`"src/a.scss"`) and get `ROOT` prepended.
    pub fn with(kind: AssetKind, cfg: ConfigFile, compiler: FakeCompiler, files: &[&str]) -> Self {
        let fs = MockFileSystem::new();
        for file in files {
            fs.add_file(format!("{ROOT}/{file}"), format!("/* {file} */"));
        }

        let pipeline = Pipeline::with_compiler(
            kind,
            &cfg,
            ROOT,
            Arc::new(fs.clone()),
            Arc::new(compiler.clone()),
        )
        .expect("Failed to build pipeline for fixture");

        Self {
            fs,
            compiler,
            pipeline,
        }
    }

    /// Absolute (mock) path for a project-relative path.
    pub fn path(&self, rel: &str) -> String {
        format!("{ROOT}/{rel}")
    }

    pub fn contents(&self, rel: &str) -> Option<String> {
        self.fs.contents(self.path(rel))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.fs.contents(self.path(rel)).is_some()
    }
}
