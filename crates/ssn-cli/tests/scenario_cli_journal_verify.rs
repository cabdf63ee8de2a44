//! `ssn journal verify`
//!
//! GREEN when:
//! - A journal written by `ssn analyze` verifies.
//! - Editing any recorded decision breaks the chain and exits non-zero.

use assert_cmd::Command;
use predicates::prelude::*;
use ssn_testkit::{raw_loan, t0, write_json_fixture};
use std::fs;

#[test]
fn tampered_journal_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let journal = dir.path().join("decisions.jsonl");
    let journal_s = journal.to_str().unwrap();
    let loans = write_json_fixture(&vec![raw_loan(
        "QB-17",
        "Energy",
        Some("PIK"),
        "10000000",
        "12500000",
    )])
    .unwrap();

    Command::cargo_bin("ssn")
        .unwrap()
        .args(["analyze", "--loans", loans.path().to_str().unwrap()])
        .args(["--journal", journal_s, "--now", &t0().to_rfc3339()])
        .assert()
        .success();

    Command::cargo_bin("ssn")
        .unwrap()
        .args(["journal", "verify", journal_s])
        .assert()
        .success()
        .stdout(predicate::str::contains("journal_ok=true lines=1"));

    let content = fs::read_to_string(&journal).unwrap();
    assert!(content.contains("\"critical\""));
    fs::write(&journal, content.replacen("\"critical\"", "\"high\"", 1)).unwrap();

    Command::cargo_bin("ssn")
        .unwrap()
        .args(["journal", "verify", journal_s])
        .assert()
        .failure()
        .stdout(predicate::str::contains("journal_ok=false line=1"))
        .stderr(predicate::str::contains("JOURNAL_CHAIN_BROKEN"));
}
