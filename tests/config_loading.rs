// tests/config_loading.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;

use tempfile::{tempdir, NamedTempFile};

use assetpipe::config::{load_and_validate, load_or_default, ConfigFile};
use assetpipe::errors::AssetpipeError;
use assetpipe::types::AssetKind;

type TestResult = Result<(), Box<dyn Error>>;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    init_tracing();
    let file = config_file("");

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.paths.src, "src");
    assert_eq!(cfg.paths.dist, "app");
    assert_eq!(cfg.extension(AssetKind::Styles), "scss");
    assert_eq!(cfg.extension(AssetKind::Scripts), "js");
    assert!(cfg.exclude(AssetKind::Styles).is_empty());
    assert!(cfg.exclude(AssetKind::Scripts).is_empty());
    assert_eq!(cfg.styles.output_style, "expanded");
    assert_eq!(cfg.styles.import_marker, "~");
    assert_eq!(cfg.styles.dependency_dir, "node_modules");
    assert_eq!(cfg.scripts.target, "es2015");
    assert!(cfg.scripts.dom_ready);
    assert!(cfg.is_enabled(AssetKind::Styles) && cfg.is_enabled(AssetKind::Scripts));
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    init_tracing();
    let file = config_file(
        r#"
[paths]
src = "assets"
dist = "public/build"

[styles]
exclude = ["assets/**/_*.scss"]
output_style = "compressed"

[scripts]
enabled = false
target = "es2020"
"#,
    );

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.paths.src, "assets");
    assert_eq!(cfg.paths.dist, "public/build");
    assert_eq!(cfg.exclude(AssetKind::Styles), ["assets/**/_*.scss".to_string()]);
    assert_eq!(cfg.styles.output_style, "compressed");
    assert!(!cfg.is_enabled(AssetKind::Scripts));
    assert_eq!(cfg.scripts.target, "es2020");
    Ok(())
}

#[test]
fn identical_src_and_dist_is_a_config_error() {
    init_tracing();
    let file = config_file("[paths]\nsrc = \"web\"\ndist = \"web\"\n");

    match load_and_validate(file.path()) {
        Err(AssetpipeError::ConfigError(msg)) => assert!(msg.contains("must differ")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn nested_dist_is_a_config_error() {
    init_tracing();
    let file = config_file("[paths]\nsrc = \"src\"\ndist = \"src/out\"\n");

    match load_and_validate(file.path()) {
        Err(AssetpipeError::ConfigError(msg)) => assert!(msg.contains("nested")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn parent_dir_in_paths_is_rejected() {
    init_tracing();
    let file = config_file("[paths]\ndist = \"../outside\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetpipeError::ConfigError(_))
    ));
}

#[test]
fn invalid_exclude_glob_is_a_config_error() {
    init_tracing();
    let file = config_file("[scripts]\nexclude = [\"src/[unclosed\"]\n");

    match load_and_validate(file.path()) {
        Err(AssetpipeError::ConfigError(msg)) => {
            assert!(msg.contains("[scripts].exclude"));
            assert!(msg.contains("src/[unclosed"));
        }
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn dotted_extension_is_a_config_error() {
    init_tracing();
    let file = config_file("[styles]\nextension = \".scss\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetpipeError::ConfigError(_))
    ));
}

#[test]
fn unknown_output_style_is_a_config_error() {
    init_tracing();
    let file = config_file("[styles]\noutput_style = \"nested\"\n");

    match load_and_validate(file.path()) {
        Err(AssetpipeError::ConfigError(msg)) => assert!(msg.contains("nested")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn unknown_keys_are_a_toml_error() {
    init_tracing();
    let file = config_file("[styles]\ncompiler = \"node-sass\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetpipeError::TomlError(_))
    ));
}

#[test]
fn missing_default_config_falls_back_to_defaults() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let path = dir.path().join("Assetpipe.toml");

    let cfg = load_or_default(&path, false)?;

    assert_eq!(cfg.paths.src, ConfigFile::default().paths.src);
    Ok(())
}

#[test]
fn missing_explicit_config_is_an_error() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let path = dir.path().join("custom.toml");

    assert!(load_or_default(&path, true).is_err());
    Ok(())
}
