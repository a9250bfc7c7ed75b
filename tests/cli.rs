//! Integration tests for the nautikos CLI.
//!
//! These tests run the compiled binary against a temporary configuration.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

const CONFIG_FILE: &str = "environments:
- name: prod
  manifests:
  - path: prod/deployment.yaml
    type: kubernetes
    labels: [app1, app2]
  - path: prod/kustomization.yaml
    type: kustomize
- name: dev
  manifests:
  - path: dev/deployment.yaml
    type: kubernetes
";

const DEPLOYMENT: &str = "# web tier
spec:
  template:
    spec:
      containers:
      - image: repo-a:1.0.0 # pinned
      - image: repo-b:2.0
";

const KUSTOMIZATION: &str = "images:
- name: repo-a
  newTag: '1.0.0'
";

fn nautikos() -> Command {
    let mut cmd = cargo_bin_cmd!("nautikos");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn workspace() -> assert_fs::TempDir {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("nautikos.yaml").write_str(CONFIG_FILE).unwrap();
    temp.child("prod/deployment.yaml").write_str(DEPLOYMENT).unwrap();
    temp.child("prod/kustomization.yaml")
        .write_str(KUSTOMIZATION)
        .unwrap();
    temp.child("dev/deployment.yaml").write_str(DEPLOYMENT).unwrap();
    temp
}

#[test]
fn cli_help_flag_shows_usage() {
    nautikos()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn cli_missing_arguments_fails() {
    nautikos()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn cli_updates_selected_environment() {
    let temp = workspace();

    nautikos()
        .current_dir(temp.path())
        .args(["repo-a", "1.2.3", "--env", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod/deployment.yaml: repo-a 1.0.0 -> 1.2.3"))
        .stdout(predicate::str::contains("prod/kustomization.yaml: repo-a 1.0.0 -> 1.2.3"));

    temp.child("prod/deployment.yaml")
        .assert(DEPLOYMENT.replace("repo-a:1.0.0 # pinned", "repo-a:1.2.3 # pinned"));
    temp.child("prod/kustomization.yaml")
        .assert("images:\n- name: repo-a\n  newTag: '1.2.3'\n");
    temp.child("dev/deployment.yaml").assert(DEPLOYMENT);
}

#[test]
fn cli_dry_run_prints_manifests() {
    let temp = workspace();

    nautikos()
        .current_dir(temp.path())
        .args(["repo-b", "3.0", "--env", "dev", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# dev/deployment.yaml"))
        .stdout(predicate::str::contains("- image: repo-b:3.0"));

    temp.child("dev/deployment.yaml").assert(DEPLOYMENT);
}

#[test]
fn cli_labels_select_manifests() {
    let temp = workspace();

    nautikos()
        .current_dir(temp.path())
        .args(["repo-b", "3.0", "--labels", "app1,app2", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"new_tag\": \"3.0\""))
        .stdout(predicate::str::contains("dev/deployment.yaml").not());

    temp.child("prod/deployment.yaml")
        .assert(predicate::str::contains("repo-b:3.0"));
    temp.child("dev/deployment.yaml").assert(DEPLOYMENT);
}

#[test]
fn cli_no_matching_manifest_exits_with_failure() {
    let temp = workspace();

    nautikos()
        .current_dir(temp.path())
        .args(["repo-a", "1.2.3", "--labels", "missing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no manifest matched"));
}

#[test]
fn cli_unknown_environment_fails() {
    let temp = workspace();

    nautikos()
        .current_dir(temp.path())
        .args(["repo-a", "1.2.3", "--env", "staging"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("environment 'staging' not found"));
}

#[test]
fn cli_explicit_config_path() {
    let temp = workspace();

    nautikos()
        .args(["repo-a", "2.0.0", "--env", "dev", "--config"])
        .arg(temp.child("nautikos.yaml").path())
        .assert()
        .success();

    temp.child("dev/deployment.yaml")
        .assert(predicate::str::contains("repo-a:2.0.0 # pinned"));
}
