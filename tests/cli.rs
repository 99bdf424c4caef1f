//! End-to-end tests driving the `relay` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CHANGELOG: &str = "# Changelog

## Unreleased

- Pending change

## v1.2.3

- Fixed critical bug
- Added feature X

## v1.2.2

- Older fix
";

/// A `relay` command isolated from the user's configuration.
fn relay(config_dir: &TempDir) -> Command {
    let config = config_dir.path().join("config.toml");
    fs::write(&config, "[runner]\npty = false\n").unwrap();

    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("relay").unwrap();
    cmd.env("RELAY_CONFIG", &config).env_remove("RELAY_DISABLE_PTY");
    cmd
}

fn changelog(dir: &TempDir) -> String {
    let path = dir.path().join("CHANGELOG.md");
    fs::write(&path, CHANGELOG).unwrap();
    path.to_str().unwrap().to_string()
}

// --- Help ---

#[test]
fn help_lists_subcommands() {
    let tmp = tempfile::tempdir().unwrap();
    relay(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("result-of"))
        .stdout(predicate::str::contains("changelog"));
}

// --- run ---

#[test]
fn run_streams_output() {
    let tmp = tempfile::tempdir().unwrap();
    relay(&tmp)
        .args(["run", "--", "echo", "hello from relay"])
        .assert()
        .success()
        .stdout("hello from relay\n");
}

#[test]
fn run_applies_leading_assignments() {
    let tmp = tempfile::tempdir().unwrap();
    relay(&tmp)
        .args(["run", "--", "GREETING=hi sh -c 'echo $GREETING'"])
        .assert()
        .success()
        .stdout("hi\n");
}

#[test]
fn run_silent_prints_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    relay(&tmp)
        .args(["run", "--silent", "--", "echo", "quiet"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn run_silent_failure_exits_one_without_echo() {
    let tmp = tempfile::tempdir().unwrap();
    relay(&tmp)
        .env("RUST_LOG", "relay=debug")
        .args(["run", "--silent", "--", "sh -c 'echo noisy; exit 2'"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("noisy").not())
        .stderr(predicate::str::contains("exit code 2"))
        .stderr(predicate::str::contains("run command failed"));
}

#[test]
fn run_failure_exits_one_and_runs_cleanups() {
    let tmp = tempfile::tempdir().unwrap();
    let marker = tmp.path().join("cleaned");
    relay(&tmp)
        .args([
            "run",
            "--cleanup",
            &format!("touch '{}'", marker.display()),
            "--",
            "sh -c 'echo partial; exit 3'",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("partial"))
        .stderr(predicate::str::contains("exit code 3"));
    assert!(marker.exists());
}

#[test]
fn run_success_also_runs_cleanups() {
    let tmp = tempfile::tempdir().unwrap();
    let marker = tmp.path().join("cleaned");
    relay(&tmp)
        .args([
            "run",
            "--cleanup",
            &format!("touch '{}'", marker.display()),
            "--",
            "true",
        ])
        .assert()
        .success();
    assert!(marker.exists());
}

#[test]
fn run_rejects_unterminated_quote() {
    let tmp = tempfile::tempdir().unwrap();
    relay(&tmp)
        .args(["run", "--", "echo 'unterminated"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("quoting is not terminated"));
}

#[test]
fn run_honors_root() {
    let tmp = tempfile::tempdir().unwrap();
    let workdir = tmp.path().join("work");
    fs::create_dir(&workdir).unwrap();
    fs::write(workdir.join("inside.txt"), "").unwrap();
    relay(&tmp)
        .args(["--root", workdir.to_str().unwrap(), "run", "--", "ls"])
        .assert()
        .success()
        .stdout("inside.txt\n");
}

// --- result-of ---

#[test]
fn result_of_prints_stdout_only() {
    let tmp = tempfile::tempdir().unwrap();
    relay(&tmp)
        .args(["result-of", "sh -c 'echo out; echo err >&2'"])
        .assert()
        .success()
        .stdout("out\n");
}

#[test]
fn result_of_failure_reports_combined_output() {
    let tmp = tempfile::tempdir().unwrap();
    relay(&tmp)
        .args(["result-of", "sh -c 'echo release not found >&2; exit 2'"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("release not found"))
        .stderr(predicate::str::contains("exit code 2"));
}

// --- changelog ---

#[test]
fn extract_section_latest_by_default() {
    let tmp = tempfile::tempdir().unwrap();
    let file = changelog(&tmp);
    relay(&tmp)
        .args(["changelog", "extract-section", &file])
        .assert()
        .success()
        .stdout("- Pending change");
}

#[test]
fn extract_section_for_version() {
    let tmp = tempfile::tempdir().unwrap();
    let file = changelog(&tmp);
    relay(&tmp)
        .args(["changelog", "extract-section", &file, "v1.2.3"])
        .assert()
        .success()
        .stdout("- Fixed critical bug\n- Added feature X");
}

#[test]
fn extract_section_unknown_version_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let file = changelog(&tmp);
    relay(&tmp)
        .args(["changelog", "extract-section", &file, "v9.9.9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No section found for version 'v9.9.9'"));
}

#[test]
fn extract_section_missing_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("NOPE.md");
    relay(&tmp)
        .args(["changelog", "extract-section", missing.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn extract_section_to_github_output() {
    let tmp = tempfile::tempdir().unwrap();
    let file = changelog(&tmp);
    let output = tmp.path().join("github_output");
    relay(&tmp)
        .args([
            "changelog",
            "extract-section",
            &file,
            "v1.2.2",
            "--github-output",
            &format!("notes:{}", output.display()),
        ])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("variable 'notes'"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("notes<<ghadelimiter_"));
    assert!(written.contains("\n- Older fix\n"));
}

#[test]
fn release_notes_and_version() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("CHANGELOG.md");
    fs::write(&file, "# Changelog\n\n## [2.0.0] - 2024-03-01\n\n- Big release\n\n## v1.0.0\n\n- First\n").unwrap();
    let file = file.to_str().unwrap();

    relay(&tmp)
        .args(["changelog", "release-notes", file])
        .assert()
        .success()
        .stdout("- Big release\n");
    relay(&tmp)
        .args(["changelog", "version", file])
        .assert()
        .success()
        .stdout("v2.0.0\n");
}

#[test]
fn version_of_unreleased_changelog_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let file = changelog(&tmp);
    relay(&tmp)
        .args(["changelog", "version", &file])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No released version"));
}
