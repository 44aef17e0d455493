//! CLI end-to-end tests that invoke the compiled `cami` binary.
//!
//! Every test points `CAMI_WORKSPACE` at a temporary workspace so the real
//! home directory is never touched.

use assert_cmd::Command;
use cami_test_utils::TestWorkspace;
use predicates::prelude::*;

fn cami(fixture: &TestWorkspace) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cami"));
    cmd.env("CAMI_WORKSPACE", fixture.root()).current_dir(fixture.base());
    cmd
}

#[test]
fn test_help_exits_zero() {
    Command::new(env!("CARGO_BIN_EXE_cami"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("source"));
}

#[test]
fn test_version_flag() {
    Command::new(env!("CARGO_BIN_EXE_cami"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cami"));
}

#[test]
fn test_init_creates_config() {
    let fixture = TestWorkspace::new();
    cami(&fixture)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized workspace"));
    assert!(fixture.root().join("config.yaml").exists());
}

#[test]
fn test_reconcile_then_deploy_then_docs() {
    let fixture = TestWorkspace::new();
    fixture.create_source("team", &[("frontend", "1.0.0"), ("backend", "2.0.0")]);
    let project = fixture.create_project("app", &[]);

    cami(&fixture).arg("init").assert().success();
    cami(&fixture)
        .args(["source", "reconcile", "--auto"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered"));

    cami(&fixture)
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"frontend\""));

    cami(&fixture)
        .args(["deploy", "-a", "frontend,backend", "-l"])
        .arg(&project)
        .assert()
        .success();
    assert!(project.join(".claude/agents/frontend.md").exists());
    assert!(project.join(".claude/cami-manifest.yaml").exists());

    cami(&fixture)
        .args(["deploy", "-a", "frontend", "-l"])
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("--overwrite"));

    cami(&fixture)
        .args(["update-docs", "-l"])
        .arg(&project)
        .assert()
        .success();
    fixture.assert_file_contains(&project.join("CLAUDE.md"), "### backend (v2.0.0)");

    cami(&fixture)
        .args(["project", "analyze", "--json"])
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("cami-native"));
}

#[test]
fn test_location_add_and_scan() {
    let fixture = TestWorkspace::new();
    fixture.create_source("team", &[("frontend", "2.0.0")]);
    let project = fixture.create_project("app", &[("frontend", "1.0.0")]);

    cami(&fixture).args(["source", "reconcile", "--auto"]).assert().success();
    cami(&fixture)
        .args(["location", "add", "app"])
        .arg(&project)
        .assert()
        .success();
    cami(&fixture)
        .args(["scan", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("update-available"));
}

#[test]
fn test_errors_exit_nonzero() {
    let fixture = TestWorkspace::new();
    cami(&fixture)
        .args(["source", "remove", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));

    let project = fixture.create_project("app", &[("x", "1.0.0")]);
    cami(&fixture)
        .args(["project", "normalize", "--level", "full"])
        .arg(&project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not implemented").or(predicate::str::contains("Not implemented")));
}

#[test]
fn test_discover_finds_projects() {
    let fixture = TestWorkspace::new();
    fixture.create_project("app", &[("frontend", "1.0.0")]);
    fixture.create_project("empty", &[]);

    cami(&fixture)
        .args(["discover", "--json"])
        .arg(fixture.base().join("projects"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"agent_count\": 1"));
}
