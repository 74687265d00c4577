use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetpipe::compile::{AssetCompiler, CompileRequest, CompiledAsset};
use assetpipe::errors::{AssetpipeError, Result};

/// A fake compiler that:
/// - records every request it receives
/// - fails any source whose path contains one of the configured fragments
/// - otherwise returns `/* compiled <source> */` plus a tiny JSON map.
#[derive(Clone, Default)]
pub struct FakeCompiler {
    requests: Arc<Mutex<Vec<CompileRequest>>>,
    fail_on: Vec<String>,
    delay: Option<Duration>,
    empty_output: bool,
    with_map: bool,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self {
            with_map: true,
            ..Self::default()
        }
    }

    /// Fail any source whose path contains `fragment`.
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on.push(fragment.to_string());
        self
    }

    /// Sleep before answering, so several compiles are in flight at once.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Succeed with empty code (compiler reported no error but no output).
    pub fn with_empty_output(mut self) -> Self {
        self.empty_output = true;
        self
    }

    pub fn without_map(mut self) -> Self {
        self.with_map = false;
        self
    }

    pub fn requests(&self) -> Vec<CompileRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn compiled_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self
            .requests()
            .iter()
            .map(|r| r.source.to_string_lossy().replace('\\', "/"))
            .collect();
        sources.sort();
        sources
    }
}

impl AssetCompiler for FakeCompiler {
    fn compile<'a>(
        &'a self,
        request: &'a CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompiledAsset>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let source = request.source.to_string_lossy().replace('\\', "/");
            if self.fail_on.iter().any(|f| source.contains(f.as_str())) {
                return Err(AssetpipeError::Compile {
                    tool: "fake".to_string(),
                    message: format!("syntax error in {source}"),
                });
            }

            let code = if self.empty_output {
                String::new()
            } else {
                match &request.bundle_name {
                    Some(name) => format!("var {name} = (function(){{}})(); /* {source} */\n"),
                    None => format!("/* compiled {source} */\n"),
                }
            };
            let map = self
                .with_map
                .then(|| format!(r#"{{"version":3,"sources":["{source}"],"mappings":""}}"#));

            Ok(CompiledAsset { code, map })
        })
    }
}
