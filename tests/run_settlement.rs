// tests/run_settlement.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, Fixture, ROOT};
use crate::common::fake_compiler::FakeCompiler;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use assetpipe::fs::mock::MockFileSystem;
use assetpipe::pipeline::{Pipeline, RunSummary};
use assetpipe::run_pipelines;
use assetpipe::types::AssetKind;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn run_builds_every_discovered_file() {
    init_tracing();
    let fx = Fixture::new(
        AssetKind::Styles,
        &["src/a.scss", "src/nested/b.scss", "src/deeper/x/c.scss", "src/readme.md"],
    );

    let summary = with_timeout(fx.pipeline.run()).await;

    assert_eq!(
        summary,
        RunSummary {
            discovered: 3,
            written: 3,
            failed: 0
        }
    );
    assert!(fx.exists("app/a.css"));
    assert!(fx.exists("app/nested/b.css"));
    assert!(fx.exists("app/deeper/x/c.css"));
    assert!(!fx.exists("app/readme.md"));
}

#[tokio::test]
async fn one_failing_file_does_not_stop_the_others() {
    init_tracing();
    let fx = Fixture::with(
        AssetKind::Styles,
        ConfigFileBuilder::new().build(),
        FakeCompiler::new().failing_on("syntax-error"),
        &["src/ok-one.scss", "src/syntax-error.scss", "src/ok-two.scss"],
    );

    let summary = with_timeout(fx.pipeline.run()).await;

    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.failed, 1);
    assert!(fx.exists("app/ok-one.css"));
    assert!(fx.exists("app/ok-two.css"));
    assert!(!fx.exists("app/syntax-error.css"));
}

#[tokio::test]
async fn run_resolves_only_after_slow_builds_settle() {
    init_tracing();
    let fx = Fixture::with(
        AssetKind::Scripts,
        ConfigFileBuilder::new().build(),
        FakeCompiler::new().with_delay(Duration::from_millis(50)),
        &["src/one.js", "src/two.js", "src/three.js"],
    );

    let summary = with_timeout(fx.pipeline.run()).await;

    assert_eq!(summary.written, 3);
    for name in ["one", "two", "three"] {
        assert!(fx.exists(&format!("app/{name}.js")), "missing app/{name}.js");
    }
}

#[tokio::test]
async fn exclude_pattern_removes_paths_before_building() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .exclude(AssetKind::Styles, "src/**/_*.scss")
        .build();
    let fx = Fixture::with(
        AssetKind::Styles,
        cfg,
        FakeCompiler::new(),
        &["src/main.scss", "src/_variables.scss", "src/parts/_mixins.scss"],
    );

    let discovered = fx.pipeline.discover()?;
    assert_eq!(discovered.len(), 1);
    assert!(discovered[0].ends_with("src/main.scss"));

    fx.pipeline.run().await;
    assert_eq!(fx.compiler.compiled_sources(), vec!["src/main.scss"]);
    assert!(!fx.exists("app/_variables.css"));
    Ok(())
}

#[tokio::test]
async fn default_exclusion_is_a_no_op() -> TestResult {
    init_tracing();
    let fx = Fixture::new(
        AssetKind::Styles,
        &["src/main.scss", "src/_partial.scss", "src/vendor/reset.scss"],
    );

    assert_eq!(fx.pipeline.discover()?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn missing_source_root_yields_an_empty_run() {
    init_tracing();
    let fx = Fixture::new(AssetKind::Scripts, &["lib/orphan.js"]);

    let summary = fx.pipeline.run().await;

    assert_eq!(summary, RunSummary::default());
    assert!(fx.compiler.requests().is_empty());
}

#[tokio::test]
async fn both_pipelines_run_independently() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    for file in ["src/site.scss", "src/broken.scss", "src/site.js", "src/nav-menu.js"] {
        fs.add_file(format!("{ROOT}/{file}"), "");
    }
    let cfg = ConfigFileBuilder::new().build();
    let styles_compiler = FakeCompiler::new().failing_on("broken");
    let scripts_compiler = FakeCompiler::new();

    let pipelines = vec![
        Pipeline::with_compiler(
            AssetKind::Styles,
            &cfg,
            ROOT,
            Arc::new(fs.clone()),
            Arc::new(styles_compiler.clone()),
        )?,
        Pipeline::with_compiler(
            AssetKind::Scripts,
            &cfg,
            ROOT,
            Arc::new(fs.clone()),
            Arc::new(scripts_compiler.clone()),
        )?,
    ];

    let summaries = with_timeout(run_pipelines(&pipelines)).await;

    assert_eq!(summaries.len(), 2);
    for (kind, summary) in summaries {
        match kind {
            AssetKind::Styles => assert_eq!((summary.written, summary.failed), (1, 1)),
            AssetKind::Scripts => assert_eq!((summary.written, summary.failed), (2, 0)),
        }
    }
    assert_eq!(styles_compiler.compiled_sources(), vec!["src/broken.scss", "src/site.scss"]);
    assert_eq!(scripts_compiler.compiled_sources(), vec!["src/nav-menu.js", "src/site.js"]);
    assert!(fs.contents(format!("{ROOT}/app/site.css")).is_some());
    assert!(fs.contents(format!("{ROOT}/app/nav-menu.js")).is_some());
    Ok(())
}
