use std::io::Write;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

fn kvbench() -> Command {
    Command::cargo_bin("kvbench").unwrap()
}

#[test]
fn unknown_adapter_name_fails_loudly() {
    kvbench()
        .args(&["--db", "nosuchkv", "read", "users", "1", "f0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnknownAdapter"));
}

#[test]
fn replkv_requires_a_coordinator_address() {
    kvbench()
        .args(&["--db", "replkv", "read", "users", "alice", "f0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MissingProperty"));
}

#[test]
fn shardkv_rejects_non_numeric_keys_before_touching_the_network() {
    kvbench()
        .args(&["--db", "shardkv", "read", "users", "alice", "f0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidKeyFormat"));
}

#[test]
fn shardkv_refuses_insert() {
    kvbench()
        .args(&["--db", "shardkv", "insert", "users", "42", "f0", "v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnsupportedOperation"));
}

#[test]
fn delete_is_unsupported_everywhere() {
    kvbench()
        .args(&["--db", "shardkv", "delete", "users", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnsupportedOperation"));
}

#[test]
fn properties_load_from_a_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[connkv]\ncoord = \"127.0.0.1:1\"\nclients = 4").unwrap();

    // Construction succeeds from the file; the first round trip then
    // fails against the unreachable coordinator.
    kvbench()
        .args(&["--db", "connkv", "--props"])
        .arg(file.path())
        .args(&["update", "users", "42", "f0", "v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TransportFailure"));
}

#[test]
fn malformed_property_files_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "not = toml =").unwrap();

    kvbench()
        .args(&["--db", "shardkv", "--props"])
        .arg(file.path())
        .args(&["read", "users", "42", "f0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidProperties"));
}
