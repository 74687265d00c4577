// src/config/model.rs

use serde::Deserialize;

use crate::types::AssetKind;

/// Top-level configuration as read from `Assetpipe.toml`.
///
/// ```toml
/// [paths]
/// src = "src"
/// dist = "app"
///
/// [styles]
/// exclude = ["src/**/_*.scss"]
///
/// [scripts]
/// target = "es2017"
/// ```
///
/// All sections are optional; an empty file (or no file) yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub scripts: ScriptsSection,
}

impl ConfigFile {
    /// Whether the given pipeline is switched on.
    pub fn is_enabled(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Styles => self.styles.enabled,
            AssetKind::Scripts => self.scripts.enabled,
        }
    }

    /// Source extension (without the dot) configured for a pipeline.
    pub fn extension(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Styles => &self.styles.extension,
            AssetKind::Scripts => &self.scripts.extension,
        }
    }

    /// Exclude globs configured for a pipeline.
    pub fn exclude(&self, kind: AssetKind) -> &[String] {
        match kind {
            AssetKind::Styles => &self.styles.exclude,
            AssetKind::Scripts => &self.scripts.exclude,
        }
    }
}

/// `[paths]` section: source and distribution roots, relative to the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    #[serde(default = "default_src")]
    pub src: String,

    #[serde(default = "default_dist")]
    pub dist: String,
}

fn default_src() -> String {
    "src".to_string()
}

fn default_dist() -> String {
    "app".to_string()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            dist: default_dist(),
        }
    }
}

/// `[styles]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylesSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_styles_extension")]
    pub extension: String,

    /// Globs matched against project-relative paths (`src/foo/_bar.scss`).
    ///
    /// Empty by default, which disables exclusion entirely.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Dart Sass executable.
    #[serde(default = "default_sass_command")]
    pub command: String,

    /// `"expanded"` (default) or `"compressed"`.
    #[serde(default = "default_output_style")]
    pub output_style: String,

    /// Directory that marker-prefixed imports resolve against.
    #[serde(default = "default_dependency_dir")]
    pub dependency_dir: String,

    /// Prefix marking an import as "resolve from `dependency_dir`",
    /// e.g. `@import "~bootstrap/scss/bootstrap";`.
    #[serde(default = "default_import_marker")]
    pub import_marker: String,
}

fn default_true() -> bool {
    true
}

fn default_styles_extension() -> String {
    AssetKind::Styles.default_source_extension().to_string()
}

fn default_sass_command() -> String {
    "sass".to_string()
}

fn default_output_style() -> String {
    "expanded".to_string()
}

fn default_dependency_dir() -> String {
    "node_modules".to_string()
}

fn default_import_marker() -> String {
    "~".to_string()
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            enabled: true,
            extension: default_styles_extension(),
            exclude: Vec::new(),
            command: default_sass_command(),
            output_style: default_output_style(),
            dependency_dir: default_dependency_dir(),
            import_marker: default_import_marker(),
        }
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptsSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_scripts_extension")]
    pub extension: String,

    #[serde(default)]
    pub exclude: Vec<String>,

    /// esbuild executable.
    #[serde(default = "default_esbuild_command")]
    pub command: String,

    /// Language level the bundle is transpiled down to.
    #[serde(default = "default_target")]
    pub target: String,

    /// Append the snippet that calls the bundle once the document has loaded.
    #[serde(default = "default_true")]
    pub dom_ready: bool,
}

fn default_scripts_extension() -> String {
    AssetKind::Scripts.default_source_extension().to_string()
}

fn default_esbuild_command() -> String {
    "esbuild".to_string()
}

fn default_target() -> String {
    "es2015".to_string()
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            extension: default_scripts_extension(),
            exclude: Vec::new(),
            command: default_esbuild_command(),
            target: default_target(),
            dom_ready: true,
        }
    }
}
