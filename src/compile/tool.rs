// src/compile/tool.rs

//! Locating and running external compiler executables.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{AssetpipeError, Result};

/// Project-local bin directory populated by npm/yarn/pnpm.
pub const LOCAL_BIN_DIR: &str = "node_modules/.bin";

/// Resolve `command` to an executable path.
///
/// Lookup order:
/// 1. `<root>/node_modules/.bin/<command>`
/// 2. `$PATH` (via `which`)
pub async fn resolve_tool(root: &Path, command: &str) -> Result<PathBuf> {
    let local = root.join(LOCAL_BIN_DIR).join(command);
    if tokio::fs::metadata(&local).await.is_ok_and(|m| m.is_file()) {
        return Ok(local);
    }

    let name = command.to_string();
    tokio::task::spawn_blocking(move || which::which(&name))
        .await
        .context("searching PATH")?
        .map_err(|_| AssetpipeError::ToolNotFound(command.to_string()))
}

/// Captured stdout of a successful tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
}

/// Run `program` in `cwd`, optionally feeding `stdin`, and capture its output.
///
/// A non-zero exit becomes [`AssetpipeError::Compile`] carrying the tool's
/// diagnostics (stderr, or stdout when stderr is empty).
pub async fn run_tool(
    tool_name: &str,
    program: &Path,
    args: &[OsString],
    cwd: &Path,
    stdin: Option<String>,
) -> Result<ToolOutput> {
    debug!(tool = tool_name, ?program, ?args, ?cwd, "running external tool");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning {tool_name} ({:?})", program))?;

    // Feed stdin from a separate task so a chatty tool can't deadlock us on a
    // full stdout pipe.
    let feeder = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => Some(tokio::spawn(async move {
            let res = pipe.write_all(input.as_bytes()).await;
            drop(pipe);
            res
        })),
        _ => None,
    };

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for {tool_name}"))?;

    if let Some(feeder) = feeder {
        match feeder.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(tool = tool_name, error = %err, "failed to write tool stdin"),
            Err(err) => warn!(tool = tool_name, error = %err, "stdin feeder task failed"),
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        let message = match output.status.code() {
            Some(code) => format!("exit code {code}: {message}"),
            None => format!("terminated by signal: {message}"),
        };
        return Err(AssetpipeError::Compile {
            tool: tool_name.to_string(),
            message,
        });
    }

    Ok(ToolOutput { stdout })
}
