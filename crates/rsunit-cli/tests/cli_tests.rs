//! Command-line behaviour of the `rsunit` binary
//!
//! Covers usage errors, plug-in load failures and configuration errors, and
//! runs the sample and clocker plug-ins end to end.

use assert_cmd::Command;
use predicates::prelude::*;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn rsunit() -> Command {
    let mut cmd = Command::cargo_bin("rsunit").unwrap();
    cmd.env_remove("RSUNIT_PROGRESS")
        .env_remove("RSUNIT_OUTPUT")
        .env_remove("RSUNIT_XML_ENCODING")
        .env_remove("RSUNIT_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// A plug-in cdylib cargo built for this test run
///
/// Dev-dependencies land in `deps/` with a hash suffix; a copy under the
/// plain name may sit in the profile directory. The newest candidate wins.
fn built_plugin(crate_name: &str) -> PathBuf {
    let exe = std::env::current_exe().unwrap();
    let deps = exe.parent().unwrap();
    let plain = format!("{DLL_PREFIX}{crate_name}{DLL_SUFFIX}");
    let hashed = format!("{DLL_PREFIX}{crate_name}-");

    let mut candidates: Vec<PathBuf> = Vec::new();
    for dir in [Some(deps), deps.parent()].into_iter().flatten() {
        for entry in fs::read_dir(dir).unwrap().flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == plain || (name.starts_with(&hashed) && name.ends_with(DLL_SUFFIX)) {
                candidates.push(entry.path());
            }
        }
    }
    candidates
        .into_iter()
        .max_by_key(|path| modified(path))
        .unwrap_or_else(|| panic!("{plain} not built next to {}", exe.display()))
}

fn modified(path: &Path) -> std::time::SystemTime {
    fs::metadata(path).and_then(|meta| meta.modified()).unwrap()
}

fn plugin_arg(crate_name: &str, parameters: Option<&str>) -> String {
    let path = built_plugin(crate_name);
    let path = path.to_str().unwrap();
    match parameters {
        Some(parameters) => format!("{path}={parameters}"),
        None => path.to_string(),
    }
}

// ============================================================================
// Usage
// ============================================================================

#[test]
fn test_no_arguments_prints_usage() {
    rsunit()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_version() {
    rsunit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rsunit"));
}

#[test]
fn test_help_lists_options() {
    rsunit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--brief-progress"))
        .stdout(predicate::str::contains("--xml"))
        .stdout(predicate::str::contains("Exit status"));
}

#[test]
fn test_help_explains_xml_file_argument() {
    rsunit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--xml=FILE"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    rsunit().args(["--frobnicate", "a.so"]).assert().code(2);
}

#[test]
fn test_two_test_paths_are_rejected() {
    rsunit()
        .args(["a.so", ":Math", ":Parser"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("only one test path"));
}

#[test]
fn test_test_path_without_plugin_is_rejected() {
    rsunit()
        .arg(":Math")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least one test plug-in"));
}

#[test]
fn test_brief_and_no_progress_conflict() {
    rsunit().args(["-b", "-n", "a.so"]).assert().code(2);
}

// ============================================================================
// Plug-in loading
// ============================================================================

#[test]
fn test_missing_plugin_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    rsunit()
        .current_dir(temp_dir.path())
        .arg("nonexistent_plugin_xyz")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load test plug-in:"))
        .stderr(predicate::str::contains("nonexistent_plugin_xyz"));
}

#[test]
fn test_garbage_plugin_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    let bogus = temp_dir.path().join("libbogus.so");
    fs::write(&bogus, b"not a library").unwrap();

    rsunit()
        .current_dir(temp_dir.path())
        .arg(bogus.to_str().unwrap())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load test plug-in:"));
}

#[test]
fn test_plugin_search_path_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let lib_dir = temp_dir.path().join("plugins");
    fs::create_dir(&lib_dir).unwrap();
    fs::write(lib_dir.join("libbogus.so"), b"not a library").unwrap();
    fs::write(
        temp_dir.path().join("rsunit.toml"),
        "[plugins]\nsearch_paths = [\"plugins\"]\n",
    )
    .unwrap();

    // Found through the search path, so it fails to load rather than being
    // reported missing.
    let expected = if cfg!(target_os = "linux") {
        "failed to load plug-in library"
    } else {
        "bogus"
    };
    rsunit()
        .current_dir(temp_dir.path())
        .arg("bogus")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(expected));
}

#[test]
fn test_xml_file_named_like_library_warns() {
    let temp_dir = TempDir::new().unwrap();
    rsunit()
        .current_dir(temp_dir.path())
        .args(["-x", "libclocker.so", "nonexistent_plugin_xyz"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--xml=FILE"))
        .stderr(predicate::str::contains("Failed to load test plug-in:"));
    assert!(!temp_dir.path().join("libclocker.so").exists());
}

// ============================================================================
// Running plug-ins
// ============================================================================

#[test]
fn test_sample_plugin_with_clocker() {
    let temp_dir = TempDir::new().unwrap();
    rsunit()
        .current_dir(temp_dir.path())
        .args(["-b", "-c"])
        .arg(plugin_arg("rsunit_clocker", Some("quiet")))
        .arg(plugin_arg("rsunit_sample", None))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Sample.ok : OK"))
        .stdout(predicate::str::contains("Sample.bad : assertion"))
        .stdout(predicate::str::contains("Sample.boom : error"))
        .stdout(predicate::str::contains("Test timings").not())
        .stderr(predicate::str::contains("Run:  3   Failures: 1   Errors: 1"))
        .stderr(predicate::str::contains("three comma separated words"));
}

#[test]
fn test_clocker_prints_timing_report() {
    let temp_dir = TempDir::new().unwrap();
    rsunit()
        .current_dir(temp_dir.path())
        .arg("-n")
        .arg(plugin_arg("rsunit_clocker", Some("flat")))
        .arg(plugin_arg("rsunit_sample", None))
        .arg(":Sample/Sample.ok")
        .assert()
        .success()
        .stdout(predicate::str::contains("Test timings:"))
        .stdout(predicate::str::contains("Sample.ok: "));
}

#[test]
fn test_selected_passing_test_writes_timed_xml() {
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("out.xml");

    rsunit()
        .current_dir(temp_dir.path())
        .args(["-n", "-t"])
        .arg(format!("--xml={}", report.display()))
        .arg(plugin_arg("rsunit_clocker", Some("quiet")))
        .arg(plugin_arg("rsunit_sample", None))
        .arg(":Sample/Sample.ok")
        .assert()
        .success()
        .stderr(predicate::str::contains("OK (1)"));

    let xml = fs::read_to_string(&report).unwrap();
    assert!(xml.contains("<Name>Sample.ok</Name>"));
    assert!(!xml.contains("Sample.bad"));
    assert!(xml.contains("<Time>"));
    assert!(xml.contains("<TotalElapsedTime>"));
}

#[test]
fn test_unresolved_test_path_in_plugin() {
    let temp_dir = TempDir::new().unwrap();
    rsunit()
        .current_dir(temp_dir.path())
        .arg("-n")
        .arg(plugin_arg("rsunit_sample", None))
        .arg(":Sample/Sample.missing")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to resolve test path:"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("rsunit.toml"), "[output]\nspeed = 1\n").unwrap();

    rsunit()
        .current_dir(temp_dir.path())
        .arg("a.so")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("rsunit.toml"));
}

#[test]
fn test_invalid_env_override_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    rsunit()
        .current_dir(temp_dir.path())
        .env("RSUNIT_PROGRESS", "sparkles")
        .arg("a.so")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("RSUNIT_PROGRESS"));
}

#[test]
fn test_explicit_config_file_missing() {
    let temp_dir = TempDir::new().unwrap();
    rsunit()
        .current_dir(temp_dir.path())
        .args(["--config", "missing.toml", "a.so"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.toml"));
}
