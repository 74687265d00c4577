use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The two asset classes handled by a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Styles,
    Scripts,
}

impl AssetKind {
    pub const ALL: [AssetKind; 2] = [AssetKind::Styles, AssetKind::Scripts];

    /// Tag used on every log line emitted by this pipeline.
    pub fn tag(self) -> &'static str {
        match self {
            AssetKind::Styles => "css",
            AssetKind::Scripts => "javascript",
        }
    }

    pub fn default_source_extension(self) -> &'static str {
        match self {
            AssetKind::Styles => "scss",
            AssetKind::Scripts => "js",
        }
    }

    /// Extension of the compiled file written into the dist tree.
    pub fn output_extension(self) -> &'static str {
        match self {
            AssetKind::Styles => "css",
            AssetKind::Scripts => "js",
        }
    }

    /// Scripts are emitted as a named IIFE; styles have no bundle name.
    pub fn derives_bundle_name(self) -> bool {
        matches!(self, AssetKind::Scripts)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Styles => f.write_str("styles"),
            AssetKind::Scripts => f.write_str("scripts"),
        }
    }
}

/// A single change notification for one source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// The file was added or modified and should be (re)compiled.
    Build(PathBuf),
    /// The file was removed; its mirrored output should be deleted.
    Remove(PathBuf),
}

impl BuildEvent {
    /// Map a watcher-style event tag onto a `BuildEvent`.
    ///
    /// `"remove"` is the only tag with special meaning; anything else builds.
    pub fn from_tag(tag: &str, path: impl Into<PathBuf>) -> Self {
        if tag == "remove" {
            BuildEvent::Remove(path.into())
        } else {
            BuildEvent::Build(path.into())
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            BuildEvent::Build(p) | BuildEvent::Remove(p) => p,
        }
    }

    pub fn action(&self) -> ChangeAction {
        match self {
            BuildEvent::Build(_) => ChangeAction::Build,
            BuildEvent::Remove(_) => ChangeAction::Remove,
        }
    }
}

/// Kind of change reported through [`crate::logging::log_file_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Build,
    Remove,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Build => f.write_str("build"),
            ChangeAction::Remove => f.write_str("remove"),
        }
    }
}

/// Output style passed to the stylesheet compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

impl OutputStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputStyle::Expanded => "expanded",
            OutputStyle::Compressed => "compressed",
        }
    }
}

impl FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expanded" => Ok(OutputStyle::Expanded),
            "compressed" => Ok(OutputStyle::Compressed),
            other => Err(format!(
                "invalid output_style: {other} (expected \"expanded\" or \"compressed\")"
            )),
        }
    }
}
