//! End-to-end CLI tests for the eduverza binary.
//!
//! Every test isolates configuration: a temporary `XDG_CONFIG_HOME`, a
//! temporary working directory (so no `.env` is picked up) and no backend
//! variables inherited from the environment.

#![allow(deprecated)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BACKEND_ENV: [&str; 4] = [
    "EDUVERZA_SUPABASE_URL",
    "EDUVERZA_SUPABASE_ANON_KEY",
    "VITE_SUPABASE_URL",
    "VITE_SUPABASE_ANON_KEY",
];

fn isolated(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("eduverza").unwrap();
    cmd.current_dir(config_home.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("COLUMNS", "200")
        .env_remove("RUST_LOG");
    for name in BACKEND_ENV {
        cmd.env_remove(name);
    }
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Browse and share college study resources"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("eduverza"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["browse", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_about_prints_static_text() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .arg("about")
        .assert()
        .success()
        .stdout(predicate::str::contains("ABOUT EDUVERZA"))
        .stdout(predicate::str::contains("OUR MISSION"));
}

#[test]
fn test_demo_home_shows_sample_statistics() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["--demo", "home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resources:       12"))
        .stdout(predicate::str::contains("Downloads:       9,580"))
        .stdout(predicate::str::contains("Active Students: 1,916"));
}

#[test]
fn test_demo_browse_lists_whole_catalog() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["--demo", "browse", "--view", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 12 resources"))
        .stdout(predicate::str::contains("Database Management Systems Guide"));
}

#[test]
fn test_demo_browse_applies_facets() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args([
            "--demo",
            "browse",
            "--department",
            "Computer Science",
            "--year",
            "3",
            "--sem",
            "5",
            "--subject",
            "Operating Systems",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 resources"))
        .stdout(predicate::str::contains("Operating Systems Exam Papers 2023"));
}

#[test]
fn test_demo_browse_no_match_shows_hint() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["--demo", "browse", "--search", "quantum chromodynamics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 resources"))
        .stdout(predicate::str::contains("Try adjusting your filters or search terms"));
}

#[test]
fn test_browse_semester_outside_year_is_rejected() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["--demo", "browse", "--year", "1", "--sem", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not belong to year 1"));
}

#[test]
fn test_demo_show_renders_detail_page() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["--demo", "show", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database Management Systems Guide"))
        .stdout(predicate::str::contains("ABOUT THIS RESOURCE"))
        .stdout(predicate::str::contains("Semester:   Semester 5"));
}

#[test]
fn test_demo_show_unknown_id_is_not_found() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["--demo", "show", "999"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Resource Not Found"));
}

#[test]
fn test_demo_download_without_document() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["--demo", "download", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Download: Data Structures Lecture Notes - Module 1"))
        .stdout(predicate::str::contains("no document available"));
}

#[test]
fn test_demo_admin_upload_prints_card() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args([
            "--demo",
            "admin",
            "upload",
            "--title",
            "Signals and Systems Notes",
            "--department",
            "Electronics",
            "--year",
            "2",
            "--sem",
            "4",
            "--subject",
            "Signals and Systems",
            "--type",
            "Notes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resource uploaded successfully!"))
        .stdout(predicate::str::contains("(id 13)"));
}

#[test]
fn test_demo_admin_upload_invalid_type_fails() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args([
            "--demo",
            "admin",
            "upload",
            "--title",
            "Signals",
            "--department",
            "Electronics",
            "--year",
            "2",
            "--sem",
            "4",
            "--subject",
            "Signals",
            "--type",
            "Podcast",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid type"));
}

#[test]
fn test_unconfigured_backend_shows_error_panel() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .arg("browse")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error loading resources"))
        .stderr(predicate::str::contains("backend is not configured"))
        .stderr(predicate::str::contains("Troubleshooting Steps:"));
}

#[test]
fn test_placeholder_environment_counts_as_unconfigured() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .env("EDUVERZA_SUPABASE_URL", "https://placeholder.supabase.co")
        .env("EDUVERZA_SUPABASE_ANON_KEY", "placeholder-key")
        .args(["show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("placeholder value"));
}

#[test]
fn test_config_show_without_file_uses_defaults() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file: not found (using defaults)"))
        .stdout(predicate::str::contains("mode: hosted"))
        .stdout(predicate::str::contains("status: backend is not configured"));
}

#[test]
fn test_config_show_reads_file_and_masks_key() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("eduverza");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("config.toml"),
        "supabase_url = \"https://abc.supabase.co\"\nanon_key = \"public-anon-key-1234\"\nread_timeout_secs = 45\n",
    )
    .unwrap();

    isolated(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file: loaded"))
        .stdout(predicate::str::contains("supabase_url: https://abc.supabase.co"))
        .stdout(predicate::str::contains("read_timeout_secs: 45"))
        .stdout(predicate::str::contains("status: configured"))
        .stdout(predicate::str::contains("public-anon-key").not());
}

#[test]
fn test_environment_overrides_config_file() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("eduverza");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("config.toml"),
        "supabase_url = \"https://file.supabase.co\"\nanon_key = \"file-key\"\n",
    )
    .unwrap();

    isolated(&home)
        .env("VITE_SUPABASE_URL", "https://env.supabase.co")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("supabase_url: https://env.supabase.co"));
}

#[test]
fn test_invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("eduverza");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), "connect_timeout_secs = 0\n").unwrap();

    isolated(&home)
        .arg("about")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
