use std::fs;

use predicates::prelude::*;
use tempfile::tempdir;

mod support;
use support::{expected_lines, read_lines, write_unit};

#[test]
fn analyze_appends_accesses_to_the_file_given_with_file_flag() {
    let dir = tempdir().expect("tempdir");
    let unit = write_unit(dir.path(), "a.json", "a.c");
    let out = dir.path().join("accesses.list");

    assert_cmd::cargo::cargo_bin_cmd!("ma-lines")
        .arg("analyze")
        .arg("--file")
        .arg(&out)
        .arg(&unit)
        .assert()
        .success()
        .stdout(predicate::str::contains("a.c [functions: 1] writes=1 reads=1 calls=1"));

    assert_eq!(read_lines(&out), expected_lines("a.c"));
}

#[test]
fn analyze_accepts_the_file_plugin_argument() {
    let dir = tempdir().expect("tempdir");
    let unit = write_unit(dir.path(), "a.json", "a.c");
    let out = dir.path().join("from-plugin-arg.list");

    assert_cmd::cargo::cargo_bin_cmd!("ma-lines")
        .arg("analyze")
        .arg("--plugin-arg")
        .arg(format!("file={}", out.display()))
        .arg(&unit)
        .assert()
        .success();

    assert_eq!(read_lines(&out), expected_lines("a.c"));
}

#[test]
fn analyze_defaults_to_the_list_in_the_working_directory() {
    let dir = tempdir().expect("tempdir");
    let unit = write_unit(dir.path(), "a.json", "a.c");

    assert_cmd::cargo::cargo_bin_cmd!("ma-lines")
        .current_dir(dir.path())
        .arg("analyze")
        .arg(&unit)
        .assert()
        .success();

    assert_eq!(read_lines(&dir.path().join("dump_memory_accesses.list")), expected_lines("a.c"));
}

#[test]
fn analyze_keeps_existing_content_of_the_list() {
    let dir = tempdir().expect("tempdir");
    let unit = write_unit(dir.path(), "b.json", "b.c");
    let out = dir.path().join("accesses.list");
    fs::write(&out, "earlier.c:7:read\n").expect("seed list");

    assert_cmd::cargo::cargo_bin_cmd!("ma-lines")
        .args(["analyze", "--file"])
        .arg(&out)
        .arg(&unit)
        .assert()
        .success();

    let mut expected = vec!["earlier.c:7:read".to_string()];
    expected.extend(expected_lines("b.c"));
    assert_eq!(read_lines(&out), expected);
}

#[test]
fn analyze_json_reports_per_unit_summaries() {
    let dir = tempdir().expect("tempdir");
    let first = write_unit(dir.path(), "a.json", "a.c");
    let second = write_unit(dir.path(), "b.json", "b.c");
    let out = dir.path().join("accesses.list");

    let output = assert_cmd::cargo::cargo_bin_cmd!("ma-lines")
        .args(["analyze", "--json", "--file"])
        .arg(&out)
        .arg(&first)
        .arg(&second)
        .output()
        .expect("run analyze");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    let units = report["units"].as_array().expect("units array");
    assert_eq!(units.len(), 2);
    assert_eq!(units[0]["source_file"], "a.c");
    assert_eq!(units[1]["source_file"], "b.c");
    assert_eq!(units[0]["writes"], 1);
    assert_eq!(units[0]["skipped"], 1);
    assert_eq!(units[0]["functions"][0]["skipped"]["does_not_escape"], 1);

    let mut expected = expected_lines("a.c");
    expected.extend(expected_lines("b.c"));
    assert_eq!(read_lines(&out), expected);
}

#[test]
fn analyze_fails_on_missing_input() {
    let dir = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("ma-lines")
        .args(["analyze", "--file"])
        .arg(dir.path().join("out.list"))
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read translation unit"));
}

#[test]
fn analyze_rejects_empty_file_plugin_argument() {
    let dir = tempdir().expect("tempdir");
    let unit = write_unit(dir.path(), "a.json", "a.c");

    assert_cmd::cargo::cargo_bin_cmd!("ma-lines")
        .current_dir(dir.path())
        .args(["analyze", "--plugin-arg", "file="])
        .arg(&unit)
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a non-empty path"));

    assert!(!dir.path().join("dump_memory_accesses.list").exists());
}

#[test]
fn analyze_requires_at_least_one_input() {
    assert_cmd::cargo::cargo_bin_cmd!("ma-lines").arg("analyze").assert().failure();
}

#[test]
fn analyze_reports_unwritable_output_and_keeps_going() {
    let dir = tempdir().expect("tempdir");
    let unit = write_unit(dir.path(), "a.json", "a.c");
    let out = dir.path().join("no-such-dir").join("out.list");

    assert_cmd::cargo::cargo_bin_cmd!("ma-lines")
        .args(["analyze", "--file"])
        .arg(&out)
        .arg(&unit)
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to open file"));

    assert!(!out.exists());
}
