//! End-to-end tests for the `xyb` binary.
//!
//! None of these reach the network: they cover paths that finish before any
//! session is opened.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn xyb_binary() -> String {
    env!("CARGO_BIN_EXE_xyb").to_string()
}

fn xyb(home: &Path, args: &[&str]) -> Output {
    Command::new(xyb_binary())
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run xyb")
}

fn write_config(dir: &Path, contents: &str) -> String {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn check_lists_configured_accounts() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        r#"
[[accounts]]
username = "13812345678"
password = "secret"

[accounts.sign_in]
time = ["1-7 1-12 1-31 0-23 0-59"]

[[accounts]]
openid = "oWx-openid-0001"
"#,
    );

    let output = xyb(temp.path(), &["--config", &config, "check"]);
    assert!(
        output.status.success(),
        "xyb check should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Attendance accounts\n"), "{stdout}");
    assert!(
        stdout.contains("- 138***78 [password] signIn: due, signOut: not scheduled"),
        "{stdout}"
    );
    assert!(
        stdout.contains("- oWx***01 [missing credentials] signIn: not scheduled"),
        "{stdout}"
    );
    assert!(!stdout.contains("secret"), "passwords must not be printed");
}

#[test]
fn check_without_config_reports_no_accounts() {
    let temp = TempDir::new().unwrap();
    let output = xyb(temp.path(), &["check"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No accounts configured."));
}

#[test]
fn unknown_trigger_fails() {
    let temp = TempDir::new().unwrap();
    let output = xyb(temp.path(), &["trigger", "Bogus"]);
    assert!(!output.status.success(), "unknown trigger should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected SignIn or SignOut"), "{stderr}");
}

#[test]
fn malformed_window_aborts_run() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        r#"
[[accounts]]
openid = "oWx-openid-0009"
unionid = "union"

[accounts.sign_out]
time = "whenever"
"#,
    );

    let output = xyb(temp.path(), &["--config", &config, "run"]);
    assert!(!output.status.success(), "run should fail on a bad window");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid signOut window for oWx***09"), "{stderr}");
}

#[test]
fn empty_batch_saves_log() {
    let temp = TempDir::new().unwrap();
    let log_dir = temp.path().join("logs");
    let config = write_config(
        temp.path(),
        &format!("log_dir = {:?}\n", log_dir.to_string_lossy()),
    );

    let output = xyb(temp.path(), &["--config", &config, "sign-in"]);
    assert!(
        output.status.success(),
        "empty batch should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let logs: Vec<_> = std::fs::read_dir(&log_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 1, "{logs:?}");
    assert!(logs[0].starts_with("LOG#t="), "{logs:?}");

    let contents = std::fs::read_to_string(log_dir.join(&logs[0])).unwrap();
    assert!(contents.contains("starting signIn"), "{contents}");
}

#[test]
fn no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = xyb(temp.path(), &[]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage: xyb"));
}
