#![cfg(unix)]

use super::common::{
    cmd, fixture, stub_engine, FAILING_ENGINE, LOCK_HASH, OUTPUT_LOCK_HASH, SUCCEEDING_ENGINE,
    TYPE_HASH,
};
use predicates::prelude::*;
use serde_json::Value;

fn module_arg(engine: &std::path::Path) -> String {
    format!("process:{}", engine.display())
}

#[test]
fn prints_cycles_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total cycles consumed:"))
        .stdout(predicate::str::contains("1234(1.2K)"))
        .stdout(predicate::str::contains("Script log").not());
}

#[test]
fn printer_streams_script_logs_before_the_total() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    let output = cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH, "--with-printer"])
        .args(["--module", &module_arg(&engine)])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let hello = stdout.find("Script log: hello").unwrap();
    let world = stdout.find("Script log: world").unwrap();
    let total = stdout.find("Total cycles consumed:").unwrap();
    assert!(hello < world && world < total, "{}", stdout);
}

#[test]
fn forwards_arguments_to_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-group-type", "type", "--script-hash", TYPE_HASH])
        .args(["--max-cycles", "1000"])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .success();
    let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert_eq!(
        args.trim(),
        format!(
            "--mode fast --tx-file - --script-group-type type --script-hash {} --max-cycles 1000",
            TYPE_HASH
        )
    );
}

#[test]
fn lock_group_defaults_to_first_input() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--module", &module_arg(&engine)])
        .assert()
        .success();
    let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert!(args.contains(LOCK_HASH), "{}", args);
    assert!(args.contains("--max-cycles 70000000"), "{}", args);
}

#[test]
fn lock_group_fills_in_a_missing_cell_locator_half() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);

    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--cell-index", "0"])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .success();
    let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert!(args.contains(LOCK_HASH), "{}", args);

    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--cell-type", "output"])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .success()
        .stderr(predicate::str::contains("Assume --cell-index = 0"));
    let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert!(args.contains(OUTPUT_LOCK_HASH), "{}", args);
}

#[test]
fn type_group_needs_both_cell_locator_halves() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-group-type", "type", "--cell-index", "0"])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("provide either --script-hash"));
    assert!(!dir.path().join("args.txt").exists());
}

#[test]
fn type_script_located_by_output_cell() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-group-type", "type", "--cell-type", "output", "--cell-index", "0"])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .success();
    let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert!(args.contains(TYPE_HASH), "{}", args);
}

#[test]
fn malformed_hash_never_reaches_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", "0x1234"])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid script hash format!"));
    assert!(!dir.path().join("args.txt").exists());
}

#[test]
fn non_numeric_cycles_from_environment_fail() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH])
        .args(["--module", &module_arg(&engine)])
        .env("CKB_DEBUG_MAX_CYCLES", "plenty")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid max cycle!"));
}

#[test]
fn engine_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), FAILING_ENGINE);
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ValidationFailure(-31)"));
}

#[test]
fn json_output_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    let output = cmd()
        .arg("--quiet")
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH, "--with-printer", "--output", "json"])
        .args(["--module", &module_arg(&engine)])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["cycle"], 1234);
    assert_eq!(value["error"], Value::Null);
    assert_eq!(value["messages"][0]["script_hash"], LOCK_HASH);
    assert_eq!(value["messages"][1]["message"], "world");
}

#[test]
fn json_output_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), FAILING_ENGINE);
    let output = cmd()
        .arg("--quiet")
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH, "--output", "json"])
        .args(["--module", &module_arg(&engine)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["cycle"], Value::Null);
    assert_eq!(value["error"], "ValidationFailure(-31)");
}

#[test]
fn json_failure_keeps_printed_messages() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(
        dir.path(),
        &format!("echo \"Script log: about to fail\"\n{}", FAILING_ENGINE),
    );
    let output = cmd()
        .arg("--quiet")
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH, "--with-printer", "--output", "json"])
        .args(["--module", &module_arg(&engine)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["error"], "ValidationFailure(-31)");
    assert_eq!(value["messages"][0]["script_hash"], LOCK_HASH);
    assert_eq!(value["messages"][0]["message"], "about to fail");
}

#[test]
fn text_failure_still_streams_messages() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(
        dir.path(),
        &format!("echo \"Script log: about to fail\"\n{}", FAILING_ENGINE),
    );
    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH, "--with-printer"])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Script log: about to fail"))
        .stderr(predicate::str::contains("ValidationFailure(-31)"));
}

#[test]
fn config_file_supplies_module_and_budget() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!("module = \"{}\"\nmax_cycles = 4321\n", module_arg(&engine)),
    )
    .unwrap();
    cmd()
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["--script-hash", LOCK_HASH])
        .assert()
        .success();
    let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert!(args.contains("--max-cycles 4321"), "{}", args);
}

#[test]
fn inconsistent_fixture_warns_but_runs() {
    let dir = tempfile::tempdir().unwrap();
    let engine = stub_engine(dir.path(), SUCCEEDING_ENGINE);
    let mut tx: Value =
        serde_json::from_str(&std::fs::read_to_string(fixture("sample.json")).unwrap()).unwrap();
    tx["tx"]["inputs"][0]["since"] = Value::from("0x5");
    let path = dir.path().join("tx.json");
    std::fs::write(&path, tx.to_string()).unwrap();

    let output = cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(&path)
        .args(["--script-hash", LOCK_HASH])
        .args(["--module", &module_arg(&engine)])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(
        stderr
            .matches("Potential format error found: inputs at index 0 is mismatched")
            .count(),
        1,
        "{}",
        stderr
    );

    cmd()
        .arg("run")
        .arg("--tx-file")
        .arg(&path)
        .args(["--script-hash", LOCK_HASH, "--no-pre-check"])
        .args(["--module", &module_arg(&engine)])
        .assert()
        .success()
        .stderr(predicate::str::contains("Potential format error").not());
}
