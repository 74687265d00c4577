// tests/log_reporting.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, Fixture};
use crate::common::fake_compiler::FakeCompiler;
use crate::common::logs::LogCapture;

use std::error::Error;
use std::path::Path;

use assetpipe::types::{AssetKind, BuildEvent};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn stylesheet_compile_error_is_reported_under_css_tag() -> TestResult {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fx = Fixture::with(
        AssetKind::Styles,
        ConfigFileBuilder::new().build(),
        FakeCompiler::new().failing_on("broken"),
        &["src/broken.scss"],
    );

    fx.pipeline.build(Path::new("src/broken.scss")).await?;

    let errors = logs.matching(&["ERROR", "build error"]);
    assert_eq!(errors.len(), 1, "log: {:#?}", logs.lines());
    assert!(errors[0].contains("tag=\"css\""), "line: {}", errors[0]);
    assert!(errors[0].contains("syntax error in src/broken.scss"));
    Ok(())
}

#[tokio::test]
async fn script_compile_error_is_reported_under_javascript_tag() -> TestResult {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fx = Fixture::with(
        AssetKind::Scripts,
        ConfigFileBuilder::new().build(),
        FakeCompiler::new().failing_on("broken"),
        &["src/broken.js", "src/fine.js"],
    );

    let summary = fx.pipeline.run().await;

    assert_eq!(summary.failed, 1);
    let errors = logs.matching(&["build error"]);
    assert_eq!(errors.len(), 1, "log: {:#?}", logs.lines());
    assert!(errors[0].contains("tag=\"javascript\""), "line: {}", errors[0]);
    Ok(())
}

#[tokio::test]
async fn removal_reports_the_source_and_each_deleted_output() -> TestResult {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fx = Fixture::new(
        AssetKind::Styles,
        &["src/site.scss", "app/site.css", "app/site.css.map"],
    );

    fx.pipeline
        .rebuild(&BuildEvent::Remove(fx.path("src/site.scss").into()))
        .await?;

    let removals = logs.matching(&["file change", "action=remove", "tag=\"css\""]);
    assert_eq!(removals.len(), 3, "log: {:#?}", logs.lines());
    assert!(removals[0].contains(&format!("path={}", fx.path("src/site.scss"))));
    assert!(removals[1].contains(&format!("path={}", fx.path("app/site.css"))));
    assert!(removals[2].contains(&format!("path={}", fx.path("app/site.css.map"))));
    Ok(())
}

#[tokio::test]
async fn rebuild_reports_a_build_change() -> TestResult {
    let logs = LogCapture::new();
    let _guard = logs.install();
    let fx = Fixture::new(AssetKind::Scripts, &["src/nav-menu.js"]);

    fx.pipeline
        .rebuild(&BuildEvent::from_tag("change", fx.path("src/nav-menu.js")))
        .await?;

    let changes = logs.matching(&["file change", "tag=\"javascript\""]);
    assert_eq!(changes.len(), 1, "log: {:#?}", logs.lines());
    assert!(changes[0].contains("action=build"));
    assert!(changes[0].contains(&format!("path={}", fx.path("src/nav-menu.js"))));
    assert!(logs.matching(&["action=remove"]).is_empty());
    Ok(())
}
