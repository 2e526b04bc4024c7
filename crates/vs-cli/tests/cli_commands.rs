//! CLI command integration tests.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CLEAN: &str = "\
label start
The cabin looms ahead.
Cold: It doesn't matter.
jumpto finish
This line is skipped.
label finish
Hero: We can do this.
";

const BROKEN: &str = "\
Hello.
jumpto nowhere
pause
";

fn vessel() -> Command {
    Command::cargo_bin("vessel").unwrap()
}

/// Create a temp directory holding one script.
fn script_dir(name: &str, source: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    (dir, path)
}

// ---- check ----

#[test]
fn check_clean_script_passes() {
    let (_dir, path) = script_dir("cabin.script", CLEAN);
    vessel()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file checked"));
}

#[test]
fn check_reports_errors_with_file_prefix() {
    let (_dir, path) = script_dir("broken.script", BROKEN);
    vessel()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("broken.script: error: line 2: invalid jumpto: label not found"))
        .stdout(predicate::str::contains("invalid pause: missing argument"));
}

#[test]
fn check_directory_collects_scripts() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("chapter1")).unwrap();
    fs::write(dir.path().join("chapter1").join("cabin.script"), CLEAN).unwrap();
    fs::write(dir.path().join("hill.script"), CLEAN).unwrap();
    fs::write(dir.path().join("notes.txt"), BROKEN).unwrap();

    vessel()
        .arg("check")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 files checked"));
}

#[test]
fn check_json_format() {
    let (_dir, path) = script_dir("broken.script", BROKEN);
    let output = vessel()
        .args(["check", "--format", "json"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files = value.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0]["file"].as_str().unwrap().ends_with("broken.script"));

    let diagnostics = files[0]["diagnostics"].as_array().unwrap();
    assert!(diagnostics.iter().any(|d| d["code"] == "jumpto-unknown-label" && d["line"] == 2));
}

#[test]
fn check_pretty_format_renders_source() {
    let (_dir, path) = script_dir("broken.script", BROKEN);
    vessel()
        .args(["check", "--format", "pretty"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.script"));
}

#[test]
fn check_missing_file_fails() {
    vessel()
        .args(["check", "/nonexistent/ghost.script"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn check_strict_config_promotes_notes() {
    let (dir, path) = script_dir("odd.script", "stranger: Hello there.\n");
    vessel().arg("check").arg(&path).assert().success();

    let config = dir.path().join("vessel.toml");
    fs::write(&config, "[validator]\nstrict = true\n").unwrap();
    vessel()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("error: line 1: unknown speaker"));
}

#[test]
fn invalid_config_fails() {
    let (dir, path) = script_dir("cabin.script", CLEAN);
    let config = dir.path().join("vessel.toml");
    fs::write(&config, "[runtime]\nseed = \"not a number\"\n").unwrap();
    vessel()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

// ---- commands ----

#[test]
fn commands_lists_table() {
    vessel()
        .arg("commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("throw"))
        .stdout(predicate::str::contains("toss"))
        .stdout(predicate::str::contains("meta"))
        .stdout(predicate::str::contains("commands"));
}

// ---- labels ----

#[test]
fn labels_lists_names_and_lines() {
    let (_dir, path) = script_dir("cabin.script", CLEAN);
    vessel()
        .arg("labels")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("finish"))
        .stdout(predicate::str::contains("2 labels"));
}

#[test]
fn labels_rejects_broken_script() {
    let (_dir, path) = script_dir("broken.script", BROKEN);
    vessel()
        .arg("labels")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error(s)"));
}

// ---- run ----

#[test]
fn run_follows_jumps() {
    let (_dir, path) = script_dir("cabin.script", CLEAN);
    vessel()
        .args(["run", "--no-wait"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("The cabin looms ahead."))
        .stdout(predicate::str::contains("Voice of the Cold:"))
        .stdout(predicate::str::contains("It doesn't matter."))
        .stdout(predicate::str::contains("This line is skipped.").not())
        .stdout(predicate::str::contains("end of script"));
}

#[test]
fn run_from_label() {
    let (_dir, path) = script_dir("cabin.script", CLEAN);
    vessel()
        .args(["run", "--no-wait", "--label", "finish"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("We can do this."))
        .stdout(predicate::str::contains("The cabin looms ahead.").not());
}

#[test]
fn run_unknown_label_fails() {
    let (_dir, path) = script_dir("cabin.script", CLEAN);
    vessel()
        .args(["run", "--no-wait", "--label", "attic"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn run_gates_lines_on_context() {
    let source = "\
Cold: Leave it. /// checkvoice
The blade glints. /// hasblade
The path is empty. /// nothasblade
";
    let (_dir, path) = script_dir("gates.script", source);

    vessel()
        .args(["run", "--no-wait", "--blade", "held"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("The blade glints."))
        .stdout(predicate::str::contains("Leave it.").not())
        .stdout(predicate::str::contains("The path is empty.").not());

    vessel()
        .args(["run", "--no-wait", "--voice", "cold"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Leave it."))
        .stdout(predicate::str::contains("The path is empty."));
}

#[test]
fn run_break_resumes() {
    let source = "\
Before.
break /// threwblade
After.
";
    let (_dir, path) = script_dir("break.script", source);
    vessel()
        .args(["run", "--no-wait", "--flag", "threwblade"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("-- break before line 3 --"))
        .stdout(predicate::str::contains("After."));
}

#[test]
fn run_unknown_voice_fails() {
    let (_dir, path) = script_dir("cabin.script", CLEAN);
    vessel()
        .args(["run", "--no-wait", "--voice", "whisper"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown voice 'whisper'"));
}

#[test]
fn run_broken_script_fails() {
    let (_dir, path) = script_dir("broken.script", BROKEN);
    vessel()
        .args(["run", "--no-wait"])
        .arg(&path)
        .assert()
        .failure();
}
