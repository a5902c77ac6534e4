use super::common::cmd;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("script-hash"))
        .stdout(predicate::str::contains("expand"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn run_help_documents_arguments() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--tx-file"))
        .stdout(predicate::str::contains("--script-group-type"))
        .stdout(predicate::str::contains("--max-cycles"))
        .stdout(predicate::str::contains("CKB_DEBUGGER_MODULE"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn completions_for_bash() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ckb-debug-invoke"));
}
