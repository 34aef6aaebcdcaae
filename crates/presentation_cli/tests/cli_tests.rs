//! Integration tests for the resilience-sim binary
//!
//! Only commands that do not touch the network are exercised here.

use std::process::Command;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_resilience-sim"))
}

#[test]
fn help_lists_subcommands() {
    let output = cli().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("run"));
    assert!(stdout.contains("compare"));
    assert!(stdout.contains("config"));
}

#[test]
fn config_prints_defaults_as_toml() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli()
        .arg("config")
        .current_dir(dir.path())
        .env_remove("RESILIENCE_SIM_CONFIG")
        .output()
        .unwrap();
    assert!(output.status.success());

    let printed: toml::Value = toml::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(printed["vus"].as_integer(), Some(500));
    assert_eq!(printed["breaker"]["failure_threshold"].as_integer(), Some(5));
    assert_eq!(printed["fault_window"]["start_offset_ms"].as_integer(), Some(30_000));
}

#[test]
fn config_reads_file_and_verbosity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "vus = 25\n\n[breaker]\nfailure_threshold = 2\n").unwrap();

    let output = cli()
        .args(["-vv", "--config"])
        .arg(&path)
        .arg("config")
        .output()
        .unwrap();
    assert!(output.status.success());

    let printed: toml::Value = toml::from_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(printed["vus"].as_integer(), Some(25));
    assert_eq!(printed["breaker"]["failure_threshold"].as_integer(), Some(2));
    assert_eq!(printed["telemetry"]["log_filter"].as_str(), Some("debug"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "vus = 0\n").unwrap();

    let output = cli().arg("--config").arg(&path).arg("config").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn unknown_protocol_fails() {
    let output = cli().args(["run", "--protocol", "soap"]).output().unwrap();
    assert!(!output.status.success());
}
