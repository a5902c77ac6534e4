use super::common::{cmd, fixture, LOCK_HASH, OUTPUT_LOCK_HASH, TYPE_HASH};
use predicates::prelude::*;
use serde_json::Value;

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn consistent_fixture_passes_check() {
    cmd()
        .arg("check")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn missing_cell_dep_fails_check() {
    let dir = tempfile::tempdir().unwrap();
    let mut tx = read_json(&fixture("sample.json"));
    tx["mock_info"]["cell_deps"] = Value::Array(vec![]);
    let path = dir.path().join("tx.json");
    std::fs::write(&path, tx.to_string()).unwrap();
    cmd()
        .arg("check")
        .arg("--tx-file")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Potential format error found"));
}

#[test]
fn script_hash_defaults_to_first_input_lock() {
    cmd()
        .arg("script-hash")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .assert()
        .success()
        .stdout(format!("{}\n", LOCK_HASH));
}

#[test]
fn script_hash_of_output_scripts() {
    cmd()
        .arg("script-hash")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["-s", "type", "-t", "output", "-i", "0"])
        .assert()
        .success()
        .stdout(format!("{}\n", TYPE_HASH));
    cmd()
        .arg("script-hash")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["-t", "output"])
        .assert()
        .success()
        .stdout(format!("{}\n", OUTPUT_LOCK_HASH));
}

#[test]
fn script_hash_index_out_of_range() {
    cmd()
        .arg("script-hash")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["-i", "3"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn input_cell_without_type_script() {
    cmd()
        .arg("script-hash")
        .arg("--tx-file")
        .arg(fixture("sample.json"))
        .args(["-s", "type"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("has no type script"));
}

#[test]
fn expanded_template_matches_hand_written_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("expanded.json");
    cmd()
        .arg("expand")
        .arg("--tx-file")
        .arg(fixture("templated.json"))
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(read_json(&out), read_json(&fixture("sample.json")));
}

#[test]
fn expand_prints_to_stdout() {
    cmd()
        .arg("expand")
        .arg("--tx-file")
        .arg(fixture("templated.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(&TYPE_HASH[2..]).not())
        .stdout(predicate::str::contains("545950455f4944"));
}

#[test]
fn templated_fixture_checks_clean() {
    cmd()
        .arg("check")
        .arg("--tx-file")
        .arg(fixture("templated.json"))
        .assert()
        .success();
}
