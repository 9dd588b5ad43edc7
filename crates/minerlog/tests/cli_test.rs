//! Integration tests for the `minerlog` CLI binary.
//!
//! These cover argument parsing, help output, shell completions, config
//! handling and the console's command loop, without a live appliance.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `minerlog` binary with env isolation.
///
/// Clears `MINERLOG_*` env vars and points config directories at `home`
/// so tests never touch the user's real configuration.
fn minerlog_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("minerlog");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("MINERLOG_PROFILE")
        .env_remove("MINERLOG_DEVICE")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = minerlog_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    minerlog_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("tail")
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_tail_help_shows_flags() {
    let home = tempfile::tempdir().unwrap();
    minerlog_cmd(home.path())
        .args(["tail", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--filter")
                .and(predicate::str::contains("--paused"))
                .and(predicate::str::contains("--export-dir")),
        );
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    minerlog_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("minerlog"));
}

// ── Resolution errors ───────────────────────────────────────────────

#[test]
fn test_tail_without_device_or_profile() {
    let home = tempfile::tempdir().unwrap();
    let output = minerlog_cmd(home.path()).arg("tail").output().unwrap();
    assert_eq!(output.status.code(), Some(78));
    let text = combined_output(&output);
    assert!(text.contains("No appliance configured"), "got:\n{text}");
}

#[test]
fn test_tail_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    let output = minerlog_cmd(home.path())
        .args(["--profile", "shed", "tail"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(78));
    let text = combined_output(&output);
    assert!(text.contains("Profile 'shed' not found"), "got:\n{text}");
}

#[test]
fn test_tail_unsupported_scheme() {
    let home = tempfile::tempdir().unwrap();
    let output = minerlog_cmd(home.path())
        .args(["--device", "ftp://10.0.0.9", "tail"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    let text = combined_output(&output);
    assert!(text.contains("ftp"), "got:\n{text}");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_points_at_config_toml() {
    let home = tempfile::tempdir().unwrap();
    minerlog_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_show() {
    let home = tempfile::tempdir().unwrap();
    minerlog_cmd(home.path())
        .args(["config", "init", "--device", "http://10.0.0.9", "--name", "rig"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved profile 'rig'"));

    minerlog_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.rig]")
                .and(predicate::str::contains("device = \"http://10.0.0.9\"")),
        );
}

#[test]
fn test_config_init_rejects_bad_device() {
    let home = tempfile::tempdir().unwrap();
    let output = minerlog_cmd(home.path())
        .args(["config", "init", "--device", "gopher://rig"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));

    minerlog_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gopher").not());
}

// ── Console ─────────────────────────────────────────────────────────

#[test]
fn test_tail_status_then_quit() {
    let home = tempfile::tempdir().unwrap();
    let output = minerlog_cmd(home.path())
        .args(["--device", "127.0.0.1:9", "tail", "--paused"])
        .write_stdin("status\nbogus\nquit\n")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("endpoint: ws://127.0.0.1:9/api/miner/logs"), "got:\n{stderr}");
    assert!(stderr.contains("lines: 0/2000"), "got:\n{stderr}");
    assert!(stderr.contains("paused: true"), "got:\n{stderr}");
    assert!(stderr.contains("unknown command 'bogus'"), "got:\n{stderr}");
    assert!(stderr.contains("[disconnected: stopped]"), "got:\n{stderr}");
}

#[test]
fn test_tail_export_writes_file() {
    let home = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    minerlog_cmd(home.path())
        .args(["--device", "127.0.0.1:9", "tail", "--export-dir"])
        .arg(out_dir.path())
        .write_stdin("export\nquit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("exported 0 lines"));

    let names: Vec<String> = std::fs::read_dir(out_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1, "{names:?}");
    assert!(names[0].starts_with("miner-logs-"), "{names:?}");
    assert!(names[0].ends_with(".txt"), "{names:?}");
}

#[test]
fn test_tail_export_on_exit() {
    let home = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    minerlog_cmd(home.path())
        .args(["--device", "127.0.0.1:9", "tail", "--export-on-exit", "--export-dir"])
        .arg(out_dir.path())
        .write_stdin("quit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("exported 0 lines"));

    let count = std::fs::read_dir(out_dir.path()).unwrap().count();
    assert_eq!(count, 1);
}

#[test]
fn test_tail_export_on_exit_into_missing_dir_fails() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("no-such-dir");
    let output = minerlog_cmd(home.path())
        .args(["--device", "127.0.0.1:9", "tail", "--export-on-exit", "--export-dir"])
        .arg(&missing)
        .write_stdin("quit\n")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Could not write log export"), "got:\n{text}");
}
