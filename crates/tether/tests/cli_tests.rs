//! Integration tests for the tether CLI.
//!
//! These tests run the compiled binary inside temporary repositories.

use rstest::{fixture, rstest};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_tether_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tether"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("TETHER_ASCII", "1")
        .output()
        .expect("Failed to execute tether binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn json(output: &Output) -> serde_json::Value {
    assert_success(output);
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

/// Provides a temporary directory with an initialized repository and three
/// issues in project `api`.
#[fixture]
fn repo() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    assert_success(&run_tether_in_dir(
        temp.path(),
        &["init", "--prefix", "link", "--quiet"],
    ));
    for (identifier, priority) in [("API-1", "high"), ("API-2", "medium"), ("API-3", "urgent")] {
        assert_success(&run_tether_in_dir(
            temp.path(),
            &[
                "issue", "add", identifier, "--title", "Some work", "-P", "api", "-p", priority,
            ],
        ));
    }
    temp
}

#[test]
fn test_cli_help() {
    let output = run_tether_in_dir(Path::new("."), &["--help"]);

    assert_success(&output);
    assert!(stdout(&output).contains("Usage:"));
}

#[test]
fn test_commands_outside_repository_fail() {
    let temp = TempDir::new().unwrap();

    let output = run_tether_in_dir(temp.path(), &["blocked"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not a tether repository"));
}

#[test]
fn test_init_twice_fails() {
    let temp = TempDir::new().unwrap();
    assert_success(&run_tether_in_dir(temp.path(), &["init", "--quiet"]));

    let output = run_tether_in_dir(temp.path(), &["init"]);

    assert!(!output.status.success());
    assert!(temp.path().join(".tether/config.yaml").exists());
}

#[rstest]
fn test_dep_add_then_ready_and_blocked(repo: TempDir) {
    let added = json(&run_tether_in_dir(
        repo.path(),
        &["--json", "dep", "add", "API-1", "API-2"],
    ));
    assert!(added["id"].as_str().unwrap().starts_with("link-"));

    let ready = json(&run_tether_in_dir(repo.path(), &["ready", "--json"]));
    let ready: Vec<&str> = ready
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(ready, vec!["API-3", "API-1"]);

    let blocked = json(&run_tether_in_dir(repo.path(), &["blocked", "--json"]));
    assert_eq!(blocked[0]["issue"]["identifier"], "API-2");
    assert_eq!(blocked[0]["blocked_by"][0]["identifier"], "API-1");
}

#[rstest]
fn test_cycle_is_rejected(repo: TempDir) {
    assert_success(&run_tether_in_dir(repo.path(), &["dep", "add", "API-1", "API-2"]));
    assert_success(&run_tether_in_dir(repo.path(), &["dep", "add", "API-2", "API-3"]));

    let check = json(&run_tether_in_dir(
        repo.path(),
        &["--json", "dep", "check", "API-3", "API-1"],
    ));
    let output = run_tether_in_dir(repo.path(), &["dep", "add", "API-3", "API-1"]);

    assert_eq!(check["would_create_cycle"], true);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Circular dependency"));
}

#[rstest]
fn test_critical_path(repo: TempDir) {
    assert_success(&run_tether_in_dir(repo.path(), &["dep", "add", "API-3", "API-1"]));
    assert_success(&run_tether_in_dir(repo.path(), &["dep", "add", "API-1", "API-2"]));

    let result = json(&run_tether_in_dir(repo.path(), &["--json", "critical-path", "api"]));

    assert_eq!(
        result["critical_path"]["path"],
        serde_json::json!(["API-3", "API-1", "API-2"])
    );
    assert_eq!(result["critical_path"]["length"], 2);
}

#[rstest]
fn test_done_blocker_unblocks(repo: TempDir) {
    assert_success(&run_tether_in_dir(repo.path(), &["dep", "add", "API-1", "API-2"]));
    assert_success(&run_tether_in_dir(
        repo.path(),
        &["issue", "status", "API-1", "done"],
    ));

    let blocked = json(&run_tether_in_dir(repo.path(), &["blocked", "--json"]));

    assert_eq!(blocked, serde_json::json!([]));
}

#[rstest]
fn test_dep_rm_is_idempotent(repo: TempDir) {
    let added = json(&run_tether_in_dir(
        repo.path(),
        &["--json", "dep", "add", "API-1", "API-2", "--type", "relates"],
    ));
    let edge_id = added["id"].as_str().unwrap().to_string();

    let first = run_tether_in_dir(repo.path(), &["dep", "rm", &edge_id]);
    let second = run_tether_in_dir(repo.path(), &["dep", "rm", &edge_id]);

    assert_success(&first);
    assert!(stdout(&first).contains("Removed dependency"));
    assert_success(&second);
    assert!(stdout(&second).contains("nothing removed"));
}

#[rstest]
fn test_dep_show_lists_both_directions(repo: TempDir) {
    assert_success(&run_tether_in_dir(
        repo.path(),
        &["dep", "add", "API-1", "API-2", "-t", "relates"],
    ));

    let shown = json(&run_tether_in_dir(repo.path(), &["--json", "dep", "show", "API-2"]));

    assert_eq!(
        shown["dependencies"]["relates_to"][0]["issue"]["identifier"],
        "API-1"
    );
}

#[rstest]
fn test_dep_tree_text(repo: TempDir) {
    assert_success(&run_tether_in_dir(repo.path(), &["dep", "add", "API-1", "API-2"]));
    assert_success(&run_tether_in_dir(repo.path(), &["dep", "add", "API-3", "API-1"]));

    let output = run_tether_in_dir(repo.path(), &["dep", "tree", "API-2"]);

    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("Blockers of API-2 (2):"));
    assert!(text.contains("`- o API-1"));
    assert!(text.contains("   `- o API-3"));
}
