// tests/styles_pipeline.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, Fixture};
use crate::common::fake_compiler::FakeCompiler;
use crate::common::init_tracing;

use std::error::Error;
use std::path::{Path, PathBuf};

use assetpipe::errors::AssetpipeError;
use assetpipe::fs::FileSystem;
use assetpipe::pipeline::BuildOutcome;
use assetpipe::types::{AssetKind, BuildEvent};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn build_mirrors_source_into_dist_with_css_and_map() -> TestResult {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["src/widgets/button.scss"]);

    let outcome = fx
        .pipeline
        .build(Path::new(&fx.path("src/widgets/button.scss")))
        .await?;

    assert_eq!(
        outcome,
        BuildOutcome::Written {
            target: PathBuf::from(fx.path("app/widgets/button.css"))
        }
    );
    assert_eq!(
        fx.contents("app/widgets/button.css").as_deref(),
        Some("/* compiled src/widgets/button.scss */\n")
    );
    assert!(fx.exists("app/widgets/button.css.map"));

    let requests = fx.compiler.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].source, PathBuf::from("src/widgets/button.scss"));
    assert_eq!(requests[0].target, PathBuf::from("app/widgets/button.css"));
    assert_eq!(requests[0].bundle_name, None);
    Ok(())
}

#[tokio::test]
async fn build_accepts_project_relative_paths() -> TestResult {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["src/main.scss"]);

    fx.pipeline.build(Path::new("src/main.scss")).await?;

    assert!(fx.exists("app/main.css"));
    assert!(fx.exists("app/main.css.map"));
    Ok(())
}

#[tokio::test]
async fn build_creates_missing_target_directories() -> TestResult {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["src/a/b/c/deep.scss"]);
    assert!(!fx.fs.is_dir(Path::new(&fx.path("app/a/b/c"))));

    fx.pipeline.build(Path::new("src/a/b/c/deep.scss")).await?;

    assert!(fx.fs.is_dir(Path::new(&fx.path("app/a/b/c"))));
    assert!(fx.exists("app/a/b/c/deep.css"));
    Ok(())
}

#[tokio::test]
async fn build_reuses_existing_target_directory() -> TestResult {
    init_tracing();
    let fx = Fixture::new(
        AssetKind::Styles,
        &["src/theme.scss", "app/keep.txt"],
    );

    fx.pipeline.build(Path::new("src/theme.scss")).await?;

    assert!(fx.exists("app/keep.txt"));
    assert!(fx.exists("app/theme.css"));
    Ok(())
}

#[tokio::test]
async fn compile_failure_writes_nothing_and_keeps_previous_output() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().build();
    let compiler = FakeCompiler::new().failing_on("broken");
    let fx = Fixture::with(
        AssetKind::Styles,
        cfg,
        compiler,
        &["src/broken.scss", "src/fresh-broken.scss", "app/broken.css"],
    );
    let before = fx.contents("app/broken.css");

    let outcome = fx.pipeline.build(Path::new("src/broken.scss")).await?;
    assert_eq!(outcome, BuildOutcome::CompileFailed);
    assert_eq!(fx.contents("app/broken.css"), before);
    assert!(!fx.exists("app/broken.css.map"));

    let outcome = fx.pipeline.build(Path::new("src/fresh-broken.scss")).await?;
    assert_eq!(outcome, BuildOutcome::CompileFailed);
    assert!(!fx.exists("app/fresh-broken.css"));
    Ok(())
}

#[tokio::test]
async fn empty_compiler_output_still_writes_an_empty_file() -> TestResult {
    init_tracing();
    let cfg = ConfigFileBuilder::new().build();
    let fx = Fixture::with(
        AssetKind::Styles,
        cfg,
        FakeCompiler::new().with_empty_output().without_map(),
        &["src/empty.scss"],
    );

    fx.pipeline.build(Path::new("src/empty.scss")).await?;

    assert_eq!(fx.contents("app/empty.css").as_deref(), Some(""));
    assert!(!fx.exists("app/empty.css.map"));
    Ok(())
}

#[tokio::test]
async fn build_outside_source_root_is_an_error() {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["vendor/lib.scss"]);

    let result = fx.pipeline.build(Path::new("vendor/lib.scss")).await;

    assert!(matches!(
        result,
        Err(AssetpipeError::OutsideSourceRoot { .. })
    ));
    assert!(fx.compiler.requests().is_empty());
}

#[tokio::test]
async fn remove_event_deletes_css_and_map() -> TestResult {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["src/widgets/button.scss"]);
    fx.pipeline.build(Path::new("src/widgets/button.scss")).await?;
    assert!(fx.exists("app/widgets/button.css"));

    fx.fs.remove_file(Path::new(&fx.path("src/widgets/button.scss")))?;
    fx.pipeline
        .rebuild(&BuildEvent::Remove(PathBuf::from(
            fx.path("src/widgets/button.scss"),
        )))
        .await?;

    assert!(!fx.exists("app/widgets/button.css"));
    assert!(!fx.exists("app/widgets/button.css.map"));
    Ok(())
}

#[tokio::test]
async fn remove_event_without_output_is_a_no_op() -> TestResult {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["app/other.css"]);
    let before = fx.fs.file_paths();

    fx.pipeline
        .rebuild(&BuildEvent::from_tag("remove", "src/never-built.scss"))
        .await?;

    assert_eq!(fx.fs.file_paths(), before);
    assert!(fx.compiler.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn non_remove_tags_rebuild_the_file() -> TestResult {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["src/site.scss"]);

    for tag in ["add", "change"] {
        fx.pipeline
            .rebuild(&BuildEvent::from_tag(tag, "src/site.scss"))
            .await?;
    }

    assert_eq!(fx.compiler.requests().len(), 2);
    assert!(fx.exists("app/site.css"));
    Ok(())
}

#[test]
fn accepts_only_stylesheets_under_source_root() {
    let fx = Fixture::new(AssetKind::Styles, &[]);

    assert!(fx.pipeline.accepts(Path::new("/project/src/a.scss")));
    assert!(fx.pipeline.accepts(Path::new("src/nested/b.scss")));
    assert!(!fx.pipeline.accepts(Path::new("/project/src/a.js")));
    assert!(!fx.pipeline.accepts(Path::new("/project/app/a.scss")));
    assert!(!fx.pipeline.accepts(Path::new("/elsewhere/src/a.scss")));
}

#[tokio::test]
async fn parent_dir_segments_cannot_escape_the_source_root() {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["lib/evil.scss", "lib/victim.css"]);

    assert!(!fx.pipeline.accepts(Path::new("src/../lib/evil.scss")));
    assert!(!fx.pipeline.accepts(Path::new(&fx.path("src/../lib/evil.scss"))));

    let built = fx.pipeline.build(Path::new("src/../lib/evil.scss")).await;
    assert!(matches!(built, Err(AssetpipeError::OutsideSourceRoot { .. })));
    assert!(!fx.exists("lib/evil.css"));
    assert!(fx.compiler.requests().is_empty());

    let removed = fx
        .pipeline
        .rebuild(&BuildEvent::from_tag("remove", "src/../lib/victim.scss"))
        .await;
    assert!(matches!(removed, Err(AssetpipeError::OutsideSourceRoot { .. })));
    assert!(fx.exists("lib/victim.css"));
}

#[tokio::test]
async fn parent_dir_segments_inside_the_source_root_resolve() -> TestResult {
    init_tracing();
    let fx = Fixture::new(AssetKind::Styles, &["src/main.scss"]);

    assert!(fx.pipeline.accepts(Path::new("src/widgets/../main.scss")));
    fx.pipeline.build(Path::new("src/widgets/../main.scss")).await?;

    assert!(fx.exists("app/main.css"));
    assert_eq!(fx.compiler.compiled_sources(), vec!["src/main.scss"]);
    Ok(())
}
