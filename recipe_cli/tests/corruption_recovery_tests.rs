//! Corruption recovery tests for recipebox.
//!
//! These tests verify the system handles:
//! - Missing files (fresh start)
//! - Corrupted store files (reported, never overwritten)
//! - Bad configuration

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("recipebox"));
    cmd.arg("--data-dir")
        .arg(data_dir)
        .env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("RUST_LOG");
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_missing_data_dir_starts_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("not/created/yet");

    cli(&data_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recipes found."));
}

#[test]
fn test_corrupted_store_file_is_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let store_path = data_dir.join("recipes.json");
    fs::write(&store_path, "{ invalid json }}}}").expect("Failed to write corrupted store");

    cli(data_dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Persistence error"));

    // Adding must not replace the corrupt file with a fresh store
    cli(data_dir)
        .args(["add", "--name", "Tea", "--time", "5", "-i", "Water"])
        .assert()
        .failure();

    assert_eq!(
        fs::read_to_string(&store_path).unwrap(),
        "{ invalid json }}}}"
    );
}

#[test]
fn test_invalid_recipe_in_store_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("recipes.json"),
        r#"{"next_id": 2, "recipes": [{"id": 1, "name": "Tea", "cooking_time": -5, "ingredients": []}], "ingredients": []}"#,
    )
    .unwrap();

    cli(data_dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn test_stale_difficulty_in_store_file_is_recomputed() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("recipes.json"),
        r#"{
            "next_id": 2,
            "recipes": [{
                "id": 1,
                "name": "Cake",
                "cooking_time": 50,
                "ingredients": ["Sugar", "Butter", "Eggs", "Flour"],
                "difficulty": "Easy"
            }],
            "ingredients": ["Sugar", "Butter", "Eggs", "Flour"]
        }"#,
    )
    .unwrap();

    cli(data_dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Difficulty: Hard"));
}

#[test]
fn test_unknown_backend() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["--backend", "pickle", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown backend"));
}

#[test]
fn test_malformed_config_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let config_dir = data_dir.join("config/recipebox");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[storage\nbackend = ").unwrap();

    cli(data_dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}
