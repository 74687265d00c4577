// src/compile/sourcemap.rs

//! Inline sourcemap extraction and relocation.
//!
//! Both toolchains are asked to print their output with the sourcemap embedded
//! as a trailing `sourceMappingURL=data:...` comment. This module splits that
//! comment off, fixes the map up so it resolves from the dist directory, and
//! replaces the comment with a reference to the companion `.map` file.

use std::borrow::Cow;
use std::path::{Component, Path};
use std::sync::LazyLock;

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::Value;

use crate::compile::{CompileRequest, CompiledAsset};
use crate::errors::Result;

/// Matches a trailing inline sourcemap in either comment style.
///
/// Groups: 1/2 = header/payload of a `/*# ... */` comment, 3/4 = header/payload
/// of a `//# ...` comment.
static INLINE_MAP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?:/\*[#@][ \t]*sourceMappingURL=data:([^,]*),(\S*?)[ \t]*\*/|//[#@][ \t]*sourceMappingURL=data:([^,]*),(\S*))[ \t]*$",
    )
    .expect("inline sourcemap regex is valid")
});

/// Source names tools give to input read from stdin.
const STDIN_PLACEHOLDERS: [&str; 2] = ["stdin", "-"];

/// How the `sourceMappingURL` comment is written for an output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `/*# sourceMappingURL=... */`
    Block,
    /// `//# sourceMappingURL=...`
    Line,
}

/// Split the last inline sourcemap comment off `output`.
///
/// Returns the code without the comment and the decoded map, or the untouched
/// output and `None` if there is no inline map.
pub fn split_inline_map(output: &str) -> Result<(String, Option<Value>)> {
    let Some(caps) = INLINE_MAP_RE.captures_iter(output).last() else {
        return Ok((output.to_string(), None));
    };
    let Some(whole) = caps.get(0) else {
        return Ok((output.to_string(), None));
    };

    let (header, payload) = match (caps.get(1), caps.get(2)) {
        (Some(h), Some(p)) => (h.as_str(), p.as_str()),
        _ => (
            caps.get(3).map_or("", |m| m.as_str()),
            caps.get(4).map_or("", |m| m.as_str()),
        ),
    };

    let raw = if header.ends_with(";base64") {
        STANDARD
            .decode(payload)
            .context("decoding base64 inline sourcemap")?
    } else {
        percent_decode_str(payload).collect()
    };
    let map: Value = serde_json::from_slice(&raw).context("parsing inline sourcemap JSON")?;

    let mut code = String::with_capacity(output.len());
    code.push_str(output[..whole.start()].trim_end());
    let rest = output[whole.end()..].trim();
    if !rest.is_empty() {
        code.push('\n');
        code.push_str(rest);
    }
    code.push('\n');

    Ok((code, Some(map)))
}

/// Rewrite `map` so it describes `request.target` and resolves from its directory.
///
/// - `file` becomes the target's file name.
/// - A stdin placeholder source becomes the real source path.
/// - Relative sources (relative to the project root, where the tool ran) get
///   one `../` per directory level of the target.
pub fn relocate(map: &mut Value, request: &CompileRequest) {
    let Some(obj) = map.as_object_mut() else {
        return;
    };

    if let Some(name) = request.target.file_name() {
        obj.insert(
            "file".to_string(),
            Value::String(name.to_string_lossy().into_owned()),
        );
    }

    let source = to_slash(&request.source);
    let up = "../".repeat(depth(request.target_dir()));

    if let Some(Value::Array(sources)) = obj.get_mut("sources") {
        for entry in sources.iter_mut() {
            let Value::String(s) = entry else {
                continue;
            };
            if STDIN_PLACEHOLDERS.contains(&s.as_str()) || s.starts_with("data:") {
                *s = source.clone();
            }
            if is_root_relative(s) {
                *s = format!("{up}{s}");
            }
        }
    }
}

/// Rename sources that live under `from` to the same path under `to`.
///
/// Handles plain paths and `file://` URLs. `from` is also compared in its
/// canonical form, since tools report resolved paths for temp directories.
pub fn replace_source_prefix(map: &mut Value, from: &Path, to: &Path) {
    let Some(Value::Array(sources)) = map.get_mut("sources") else {
        return;
    };
    let canonical = from.canonicalize().ok();

    for entry in sources.iter_mut() {
        let Value::String(s) = entry else {
            continue;
        };
        let replacement = {
            let local = file_url_path(s);
            let path = Path::new(local.as_ref());
            path.strip_prefix(from)
                .ok()
                .or_else(|| canonical.as_deref().and_then(|c| path.strip_prefix(c).ok()))
                .map(|rest| to_slash(&to.join(rest)))
        };
        if let Some(replacement) = replacement {
            *s = replacement;
        }
    }
}

fn file_url_path(s: &str) -> Cow<'_, str> {
    match s.strip_prefix("file://") {
        Some(rest) => percent_decode_str(rest).decode_utf8_lossy(),
        None => Cow::Borrowed(s),
    }
}

fn is_root_relative(s: &str) -> bool {
    !(s.is_empty() || s.starts_with('/') || s.contains(':'))
}

fn depth(dir: &Path) -> usize {
    dir.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Append a `sourceMappingURL` comment pointing at `map_file`.
pub fn append_map_comment(code: &mut String, map_file: &str, style: CommentStyle) {
    if !code.is_empty() && !code.ends_with('\n') {
        code.push('\n');
    }
    match style {
        CommentStyle::Block => code.push_str(&format!("/*# sourceMappingURL={map_file} */\n")),
        CommentStyle::Line => code.push_str(&format!("//# sourceMappingURL={map_file}\n")),
    }
}

/// Turn raw tool output into a [`CompiledAsset`] with an external map.
///
/// Output without an inline map is passed through with `map: None`.
pub fn externalize(
    output: &str,
    request: &CompileRequest,
    style: CommentStyle,
) -> Result<CompiledAsset> {
    let (code, map) = split_inline_map(output)?;
    attach(code, map, request, style)
}

/// Relocate an already extracted map and point `code` at its companion file.
pub fn attach(
    mut code: String,
    map: Option<Value>,
    request: &CompileRequest,
    style: CommentStyle,
) -> Result<CompiledAsset> {
    let Some(mut map) = map else {
        return Ok(CompiledAsset { code, map: None });
    };

    relocate(&mut map, request);
    append_map_comment(&mut code, &request.map_file_name(), style);

    let map = serde_json::to_string(&map).context("serializing sourcemap")?;
    Ok(CompiledAsset {
        code,
        map: Some(map),
    })
}
