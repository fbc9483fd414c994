use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("panos-xapi"))
}

#[test]
fn xpath_standalone_address() {
    bin()
        .args(["xpath", "--kind", "address", "--name", "web1"])
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='vsys1']/address/entry[@name='web1']\n",
        ));
}

#[test]
fn xpath_panorama_device_group() {
    bin()
        .args([
            "xpath",
            "--kind",
            "address",
            "--name",
            "web1",
            "--mode",
            "panorama",
            "--device-group",
            "DG1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/device-group/entry[@name='DG1']/address/entry[@name='web1']",
        ));
}

#[test]
fn xpath_prefer_shared_wins() {
    bin()
        .args([
            "xpath",
            "--kind",
            "tag",
            "--name",
            "dmz",
            "--mode",
            "panorama",
            "--prefer-shared",
            "--device-group",
            "DG1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::diff("/config/shared/tag/entry[@name='dmz']\n"));
}

#[test]
fn xpath_interface_on_panorama_fails() {
    bin()
        .args([
            "xpath",
            "--kind",
            "ethernet-interface",
            "--name",
            "ethernet1/1",
            "--mode",
            "panorama",
            "--shared",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be placed"));
}

#[test]
fn xpath_prefer_shared_needs_panorama() {
    bin()
        .args([
            "xpath",
            "--kind",
            "address",
            "--name",
            "web1",
            "--prefer-shared",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--prefer-shared requires --mode panorama"));
}

#[test]
fn xpath_container_json() {
    bin()
        .args([
            "xpath",
            "--kind",
            "security-rule",
            "--container",
            "--mode",
            "panorama",
            "--device-group",
            "DG1",
            "--phase",
            "pre",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"xpath\""))
        .stdout(predicate::str::contains("pre-rulebase/security/rules"));
}

#[test]
fn xpath_rejects_long_name() {
    let name = "a".repeat(64);
    bin()
        .args(["xpath", "--kind", "address", "--name", &name])
        .assert()
        .failure()
        .stderr(predicate::str::contains("the limit is 63"));
}

#[test]
fn address_builds_fragment_offline() {
    bin()
        .args([
            "address",
            "--name",
            "web1",
            "--value",
            "10.1.1.1/32",
            "--tag",
            "dmz",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("/address/entry[@name='web1']"))
        .stdout(predicate::str::contains(
            "<ip-netmask>10.1.1.1/32</ip-netmask><tag><member>dmz</member></tag>",
        ));
}

#[test]
fn address_rejects_unknown_type() {
    bin()
        .args([
            "address",
            "--name",
            "web1",
            "--type",
            "wildcard",
            "--value",
            "10.0.0.0/0.0.0.255",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized address type 'wildcard'"));
}

#[test]
fn address_with_missing_profile_fails() {
    bin()
        .args([
            "address",
            "--name",
            "web1",
            "--value",
            "10.1.1.1",
            "--profile",
        ])
        .arg(fixture("fixtures/does-not-exist.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read profile"));
}

#[test]
fn classify_object_not_present() {
    bin()
        .args(["classify", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RECOVERABLE"))
        .stdout(predicate::str::contains("category=not-found"))
        .stdout(predicate::str::contains("Object not present"));
}

#[test]
fn classify_unknown_code_json() {
    bin()
        .args(["classify", "13", "--message", "odd", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"fatal\""))
        .stdout(predicate::str::contains("\"category\": \"unknown\""))
        .stdout(predicate::str::contains("\"message\": \"odd\""));
}

#[test]
fn classify_table() {
    bin()
        .args(["classify", "--table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reference-count-nonzero"))
        .stdout(predicate::str::contains("timeout"));
}

#[test]
fn url_redacts_key_and_encodes_xpath() {
    bin()
        .args([
            "url",
            "--host",
            "fw.example.net",
            "--kind",
            "address",
            "--name",
            "web1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "GET https://fw.example.net/api/?type=config&action=get&xpath=",
        ))
        .stdout(predicate::str::contains("key=***"))
        .stdout(predicate::str::contains("%27web1%27"));
}

#[test]
fn get_with_bad_profile_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fw.toml");
    std::fs::write(&path, "host = \"fw\"\nunknown_key = 1\n").expect("write profile");

    bin()
        .args(["get", "--kind", "address", "--profile"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse profile"));
}
