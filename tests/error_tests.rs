//! Error scenario integration tests

use std::process::Command;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;

fn mic2mp3_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mic2mp3"))
}

#[test]
fn config_get_unknown_key() {
    let output = mic2mp3_bin()
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_unknown_key() {
    let output = mic2mp3_bin()
        .args(["config", "set", "unknown_key", "value"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_duration() {
    let output = mic2mp3_bin()
        .args(["config", "set", "duration", "invalid"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid duration"),
        "Expected error about invalid duration, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_bitrate() {
    let output = mic2mp3_bin()
        .args(["config", "set", "bitrate", "100"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("320"),
        "Expected the list of valid bitrates, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_channels() {
    let output = mic2mp3_bin()
        .args(["config", "set", "channels", "6"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 or 2"), "got: {}", stderr);
}

#[test]
fn config_list_with_no_file() {
    let output = mic2mp3_bin()
        .args(["config", "list"])
        .env("HOME", "/nonexistent")
        .env("XDG_CONFIG_HOME", "/nonexistent")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("not set") && stdout.contains("bitrate"),
        "Expected config list output, got: {}",
        stdout
    );
}

#[test]
fn convert_missing_input_file() {
    AssertCommand::cargo_bin("mic2mp3")
        .unwrap()
        .args(["convert", "/nonexistent/take.wav"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn convert_rejects_non_wav_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.wav");
    std::fs::write(&input, b"these are not riff bytes, just plain text notes").unwrap();

    AssertCommand::cargo_bin("mic2mp3")
        .unwrap()
        .arg("convert")
        .arg(&input)
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Malformed PCM container"));

    assert!(!dir.path().join("notes.mp3").exists());
}

#[test]
fn inspect_rejects_float_wav() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("float.wav");

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&44u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&3u16.to_le_bytes()); // IEEE float
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8_000u32.to_le_bytes());
    bytes.extend_from_slice(&32_000u32.to_le_bytes());
    bytes.extend_from_slice(&4u16.to_le_bytes());
    bytes.extend_from_slice(&32u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&8u32.to_le_bytes());
    bytes.extend_from_slice(&[0; 8]);
    std::fs::write(&input, bytes).unwrap();

    AssertCommand::cargo_bin("mic2mp3")
        .unwrap()
        .arg("inspect")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format tag"));
}

#[test]
fn convert_with_invalid_timeout_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();

    AssertCommand::cargo_bin("mic2mp3")
        .unwrap()
        .args(["convert", "whatever.wav", "--timeout", "later"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid timeout"));
}
