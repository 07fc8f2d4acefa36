//! Settings loading with layered precedence.
//!
//! These tests use temp directories for the local layer only; no global
//! config is expected on the test machine.

use std::fs;

use tempfile::TempDir;

use treeviz::config::{local_config_path, OutputFormat, Settings};
use treeviz::domain::BuildMode;

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
mode = "graph"
weighted = true
null_marker = "nil"
format = "json"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.mode, BuildMode::Graph);
    assert!(settings.weighted);
    assert!(!settings.directed, "unspecified keys keep their default");
    assert_eq!(settings.null_marker, "nil");
    assert_eq!(settings.format, OutputFormat::Json);

    let options = settings.build_options();
    assert_eq!(options.mode, BuildMode::Graph);
    assert_eq!(options.null_marker, "nil");
}

#[test]
fn given_invalid_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "mode = \"heap\"\n").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains(".treeviz.toml"), "{err}");
}

#[test]
fn given_template_when_parsed_then_yields_defaults() {
    let parsed: Settings = toml::from_str(&Settings::template()).unwrap();

    assert_eq!(parsed, Settings::default());
}
