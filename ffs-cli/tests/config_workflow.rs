//! Integration tests for the `ffs config` workflow.
//!
//! These run the built binary against a config file in a temporary
//! directory, so the user's ~/.ffs is never touched.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_cli(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ffs"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("FFS_DB_URL")
        .env_remove("FFS_LOG_FILE")
        .output()
        .expect("Failed to execute CLI command")
}

/// Assert a command succeeded and return its stdout.
fn assert_success(output: &Output, context: &str) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("{} failed:\nstdout: {}\nstderr: {}", context, stdout, stderr);
    }
    stdout
}

fn config_path(temp: &TempDir) -> PathBuf {
    temp.path().join("conf/config.ini")
}

#[test]
fn test_init_set_get_round_trip() {
    let temp = TempDir::new().unwrap();
    let config = config_path(&temp);

    let out = assert_success(&run_cli(&config, &["config", "init"]), "config init");
    assert!(out.contains("Created"));
    assert!(config.exists());

    assert_success(
        &run_cli(&config, &["config", "set", "store.database", "/srv/catalogue.db"]),
        "config set",
    );
    let out = assert_success(
        &run_cli(&config, &["config", "get", "store.database"]),
        "config get",
    );
    assert_eq!(out.trim(), "/srv/catalogue.db");

    let out = assert_success(
        &run_cli(&config, &["config", "get", "store.magic_file"]),
        "config get unset",
    );
    assert_eq!(out.trim(), "(not set)");
}

#[test]
fn test_list_shows_every_section() {
    let temp = TempDir::new().unwrap();
    let config = config_path(&temp);

    let out = assert_success(&run_cli(&config, &["config", "list"]), "config list");
    for section in ["[store]", "[mount]", "[logging]"] {
        assert!(out.contains(section), "missing {section} in:\n{out}");
    }
    assert!(out.contains("auto_unmount = false"));
}

#[test]
fn test_path_reports_the_given_file() {
    let temp = TempDir::new().unwrap();
    let config = config_path(&temp);

    let out = assert_success(&run_cli(&config, &["config", "path"]), "config path");
    assert_eq!(out.trim(), config.display().to_string());
}

#[test]
fn test_unknown_key_fails_with_message() {
    let temp = TempDir::new().unwrap();
    let config = config_path(&temp);

    let output = run_cli(&config, &["config", "get", "store.colour"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown configuration key 'store.colour'"));
}

#[test]
fn test_bad_arguments_are_rejected_by_the_parser() {
    let temp = TempDir::new().unwrap();
    let config = config_path(&temp);

    let output = run_cli(&config, &["remove", "not-a-number"]);
    assert!(!output.status.success());
}
