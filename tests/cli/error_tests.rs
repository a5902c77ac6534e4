use super::common::{cmd, fixture, LOCK_HASH};
use predicates::prelude::*;

#[test]
fn missing_fixture_exits_with_error() {
    cmd()
        .args(["run", "--tx-file", "/definitely/not/here.json"])
        .args(["--script-hash", LOCK_HASH])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Failed to read fixture"));
}

#[test]
fn invalid_json_fixture_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(&path)
        .args(["--script-hash", LOCK_HASH])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid fixture"));
}

#[test]
fn unknown_module_is_a_load_fault() {
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH])
        .args(["--module", "process:/definitely/not/ckb-debugger"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load debugger module"));
}

#[test]
fn missing_library_is_a_load_fault() {
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH])
        .env("CKB_DEBUGGER_MODULE", "/definitely/not/libckb_debugger.so")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load debugger module"));
}

#[test]
fn type_group_needs_a_script_locator() {
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-group-type", "type"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--cell-type and --cell-index"));
}

#[test]
fn unknown_group_type_is_a_usage_error() {
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-group-type", "witness"])
        .assert()
        .code(2);
}

#[test]
fn bad_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "max_cycles = \"lots\"\n").unwrap();
    cmd()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .assert()
        .success();
    cmd()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}
