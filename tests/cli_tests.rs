//! CLI integration tests

use std::process::Command;

fn mic2mp3_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mic2mp3"))
}

#[test]
fn help_output() {
    let output = mic2mp3_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("MP3"));
    assert!(stdout.contains("record"));
    assert!(stdout.contains("convert"));
    assert!(stdout.contains("inspect"));
    assert!(stdout.contains("config"));
    assert!(stdout.contains("--verbose"));
}

#[test]
fn version_output() {
    let output = mic2mp3_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mic2mp3"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn record_help_lists_options() {
    let output = mic2mp3_bin()
        .args(["record", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--duration"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("--keep-wav"));
    assert!(stdout.contains("--bitrate"));
    assert!(stdout.contains("--timeout"));
}

#[test]
fn config_path_command() {
    let output = mic2mp3_bin()
        .args(["config", "path"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mic2mp3"));
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_help() {
    let output = mic2mp3_bin()
        .args(["config", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("init"));
    assert!(stdout.contains("set"));
    assert!(stdout.contains("get"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("path"));
}

#[test]
fn missing_subcommand_is_usage_error() {
    let output = mic2mp3_bin().output().expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_duration_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = mic2mp3_bin()
        .args(["record", "--duration", "invalid"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid duration"),
        "Expected error about invalid duration, got: {}",
        stderr
    );
}

#[test]
fn invalid_bitrate_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = mic2mp3_bin()
        .args(["record", "--bitrate", "100"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unsupported bitrate"),
        "Expected error about the bitrate, got: {}",
        stderr
    );
}

#[test]
fn config_set_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();

    let set = mic2mp3_bin()
        .args(["config", "set", "bitrate", "192"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(set.status.success());
    assert!(dir.path().join("mic2mp3").join("config.toml").exists());

    let get = mic2mp3_bin()
        .args(["config", "get", "bitrate"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(get.status.success());
    assert_eq!(String::from_utf8_lossy(&get.stdout).trim(), "192");
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();

    let first = mic2mp3_bin()
        .args(["config", "init"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(first.status.success());

    let second = mic2mp3_bin()
        .args(["config", "init"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");
    assert!(!second.status.success());
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("already exists"), "got: {}", stderr);
}

// Recording needs a microphone, so `record` with valid arguments is left to
// the capture session tests that use a fake device.
