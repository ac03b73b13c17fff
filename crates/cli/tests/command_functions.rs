use std::path::PathBuf;

use ma_lines::commands::{
    analyze_command, build_config, primitives_command, registration_command, AnalyzeOptions,
};
use ma_lines_core::config::DEFAULT_OUTPUT_FILE;
use tempfile::tempdir;

mod support;
use support::{expected_lines, read_lines, write_unit};

#[test]
fn build_config_uses_defaults() {
    let config = build_config(&AnalyzeOptions::default()).expect("config");
    assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_FILE));
    assert!(!config.ipa_pta);
    assert_eq!(config.lock_timeout_ms, None);
}

#[test]
fn file_flag_overrides_plugin_argument() {
    let options = AnalyzeOptions {
        file: Some(PathBuf::from("flag.list")),
        plugin_args: vec!["file=arg.list".into()],
        ipa_pta: true,
        lock_timeout_ms: Some(250),
        json: false,
    };
    let config = build_config(&options).expect("config");
    assert_eq!(config.output_path, PathBuf::from("flag.list"));
    assert!(config.ipa_pta);
    assert_eq!(config.lock_timeout_ms, Some(250));
}

#[test]
fn malformed_plugin_argument_is_an_error() {
    let options = AnalyzeOptions { plugin_args: vec!["=oops".into()], ..Default::default() };
    let err = build_config(&options).expect_err("empty key");
    assert!(format!("{err:#}").contains("Invalid plugin argument \"=oops\""));
}

#[test]
fn analyze_command_writes_records() {
    let dir = tempdir().expect("tempdir");
    let unit = write_unit(dir.path(), "u.json", "u.c");
    let out = dir.path().join("out.list");
    let options = AnalyzeOptions { file: Some(out.clone()), ..Default::default() };

    analyze_command(&[unit], &options).expect("analyze");
    assert_eq!(read_lines(&out), expected_lines("u.c"));
}

#[test]
fn analyze_command_with_json_output_succeeds() {
    let dir = tempdir().expect("tempdir");
    let unit = write_unit(dir.path(), "u.json", "u.c");
    let options = AnalyzeOptions {
        file: Some(dir.path().join("out.list")),
        json: true,
        ..Default::default()
    };

    analyze_command(&[unit], &options).expect("analyze --json");
}

#[test]
fn analyze_command_reports_unparsable_unit() {
    let dir = tempdir().expect("tempdir");
    let unit = dir.path().join("broken.json");
    std::fs::write(&unit, "{ not json").expect("write broken unit");
    let options = AnalyzeOptions { file: Some(dir.path().join("out.list")), ..Default::default() };

    let err = analyze_command(&[unit], &options).expect_err("broken unit");
    assert!(format!("{err:#}").contains("Failed to parse translation unit JSON"));
    assert!(!dir.path().join("out.list").exists());
}

#[test]
fn info_commands_succeed() {
    primitives_command(false).expect("primitives");
    primitives_command(true).expect("primitives --json");
    registration_command(&AnalyzeOptions::default(), false).expect("registration");
    registration_command(&AnalyzeOptions::default(), true).expect("registration --json");
}
