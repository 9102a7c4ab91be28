//! Integration tests for the agentreg binary
//!
//! Every test runs the built binary inside a throwaway HOME/config dir and
//! only exercises commands that stay offline:
//! - Listing seeded agents and built-in skills
//! - Registering agents and recording tasks across invocations via snapshots
//! - Stats, manifest and completions output

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Number of agents in a fresh registry: the local agent plus the seeds
const FRESH_AGENTS: u64 = 9;

fn agentreg_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_agentreg"))
}

/// Run agentreg with HOME, config and data dirs inside `home`
fn run_agentreg(home: &Path, args: &[&str]) -> Output {
    Command::new(agentreg_binary())
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env("AGENTREG_DIR", home.join(".config/agentreg"))
        .env_remove("AGENTREG_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute agentreg")
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let output = run_agentreg(home, args);
    assert!(
        output.status.success(),
        "agentreg {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn run_stdout(home: &Path, args: &[&str]) -> String {
    let output = run_agentreg(home, args);
    assert!(
        output.status.success(),
        "agentreg {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_agents_list_is_seeded_and_sorted() {
    let home = TempDir::new().unwrap();
    let agents = run_json(home.path(), &["agents", "list", "-o", "json"]);
    let agents = agents.as_array().unwrap();

    assert_eq!(agents.len() as u64, FRESH_AGENTS);
    assert!(agents.iter().any(|a| a["name"] == "ElizaOS" && a["isExternal"] == true));
    assert!(agents.iter().any(|a| a["name"] == "agentreg" && a["isExternal"] == false));

    let reputations: Vec<u64> = agents.iter().map(|a| a["reputation"].as_u64().unwrap()).collect();
    assert!(reputations.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_agents_list_filters() {
    let home = TempDir::new().unwrap();
    let frameworks = run_json(home.path(), &["agents", "list", "--category", "framework", "-o", "json"]);
    let frameworks = frameworks.as_array().unwrap();
    assert!(!frameworks.is_empty());
    assert!(frameworks.iter().all(|a| a["category"] == "framework"));

    let limited = run_json(home.path(), &["agents", "list", "--limit", "2", "-o", "json"]);
    assert_eq!(limited.as_array().unwrap().len(), 2);

    let output = run_agentreg(home.path(), &["agents", "list", "--category", "robots"]);
    assert!(!output.status.success());
}

#[test]
fn test_stats_for_fresh_registry() {
    let home = TempDir::new().unwrap();
    let stats = run_json(home.path(), &["stats", "-o", "json"]);

    assert_eq!(stats["totalAgents"].as_u64(), Some(FRESH_AGENTS));
    assert_eq!(stats["totalSkills"].as_u64(), Some(4));
    assert_eq!(stats["totalTasks"].as_u64(), Some(0));
    assert_eq!(stats["topAgents"].as_array().unwrap().len(), 5);
    assert_eq!(stats["topAgents"][0]["name"], "ElizaOS");
}

#[test]
fn test_skills_list_and_search() {
    let home = TempDir::new().unwrap();
    let skills = run_json(home.path(), &["skills", "list", "-o", "json"]);
    let slugs: Vec<&str> = skills
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["slug"].as_str().unwrap())
        .collect();
    assert_eq!(
        slugs,
        vec!["wallet-balance", "token-prices", "transaction-history", "network-status"]
    );
    assert!(skills[0].get("handler").is_none());

    let found = run_json(home.path(), &["skills", "search", "analytics", "-o", "json"]);
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Transaction History");
}

#[test]
fn test_skills_run_rejects_missing_parameter() {
    let home = TempDir::new().unwrap();
    let output = run_agentreg(home.path(), &["skills", "run", "wallet-balance"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("address"), "unexpected stderr: {}", stderr);
}

#[test]
fn test_manifest_output() {
    let home = TempDir::new().unwrap();
    let manifest = run_stdout(home.path(), &["manifest"]);
    assert!(manifest.starts_with("---\n"));
    assert!(manifest.contains("name: agentreg"));
    assert!(manifest.contains("(`wallet-balance`)"));

    let export = run_json(home.path(), &["manifest", "--json"]);
    assert_eq!(export["protocol"]["name"], "agentreg");
    assert_eq!(export["agent"]["name"], "agentreg");
    assert_eq!(export["skills"].as_array().unwrap().len(), 4);
    assert_eq!(export["stats"]["totalAgents"].as_u64(), Some(FRESH_AGENTS));
}

#[test]
fn test_register_agent_persists_through_snapshot() {
    let home = TempDir::new().unwrap();
    let snapshot = home.path().join("registry.json");
    let snapshot_arg = snapshot.to_str().unwrap();

    run_stdout(
        home.path(),
        &[
            "--save",
            snapshot_arg,
            "agents",
            "register",
            "Balance Bot",
            "-d",
            "Checks balances",
            "--capabilities",
            "Balance Checks,Alerts",
        ],
    );
    assert!(snapshot.exists());

    let found = run_json(
        home.path(),
        &["--load", snapshot_arg, "agents", "list", "--search", "balance bot", "-o", "json"],
    );
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["reputation"].as_u64(), Some(0));
    assert_eq!(found[0]["tasksCompleted"].as_u64(), Some(0));
    assert_eq!(found[0]["successRate"].as_f64(), Some(100.0));
    assert_eq!(found[0]["isExternal"], true);
    assert_eq!(found[0]["capabilities"].as_array().unwrap().len(), 2);

    let stats = run_json(home.path(), &["--load", snapshot_arg, "stats", "-o", "json"]);
    assert_eq!(stats["totalAgents"].as_u64(), Some(FRESH_AGENTS + 1));
}

#[test]
fn test_record_task_updates_local_agent() {
    let home = TempDir::new().unwrap();
    let snapshot = home.path().join("registry.json");
    let snapshot_arg = snapshot.to_str().unwrap();

    run_stdout(
        home.path(),
        &["--save", snapshot_arg, "tasks", "record", "checked the network", "--skill", "network status"],
    );
    run_stdout(
        home.path(),
        &[
            "--load",
            snapshot_arg,
            "--save",
            snapshot_arg,
            "tasks",
            "record",
            "balance lookup",
            "--skill",
            "Wallet Balance",
            "--failed",
        ],
    );

    let tasks = run_json(home.path(), &["--load", snapshot_arg, "tasks", "list", "-o", "json"]);
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["description"], "balance lookup");
    assert_eq!(tasks[0]["status"], "failed");
    assert_eq!(tasks[1]["status"], "completed");
    assert_eq!(tasks[1]["result"], "checked the network");

    let stats = run_json(home.path(), &["--load", snapshot_arg, "stats", "-o", "json"]);
    assert_eq!(stats["totalTasks"].as_u64(), Some(2));
    assert_eq!(stats["completedTasks"].as_u64(), Some(1));

    let skills = run_json(home.path(), &["--load", snapshot_arg, "skills", "list", "-o", "json"]);
    let usage: u64 = skills
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["usageCount"].as_u64().unwrap())
        .sum();
    assert_eq!(usage, 2);

    // Default reputation 50, +1 then -2
    let manifest = run_json(home.path(), &["--load", snapshot_arg, "manifest", "--json"]);
    assert_eq!(manifest["agent"]["reputation"].as_u64(), Some(49));
}

#[test]
fn test_record_task_unknown_skill_fails_without_changes() {
    let home = TempDir::new().unwrap();
    let snapshot = home.path().join("registry.json");
    let snapshot_arg = snapshot.to_str().unwrap();

    let output = run_agentreg(
        home.path(),
        &["--save", snapshot_arg, "tasks", "record", "desc", "--skill", "Nonexistent Skill"],
    );
    assert!(!output.status.success());
    assert!(!snapshot.exists());
}

#[test]
fn test_snapshot_export() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("out/registry.json");

    run_stdout(home.path(), &["snapshot", "export", path.to_str().unwrap()]);

    let blob: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(blob["agents"].as_object().unwrap().len() as u64, FRESH_AGENTS);
    assert_eq!(blob["skills"].as_object().unwrap().len(), 4);
    assert!(blob["tasks"].as_object().unwrap().is_empty());
}

#[test]
fn test_load_malformed_snapshot_fails() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("broken.json");
    std::fs::write(&path, "{\"agents\": [").unwrap();

    let output = run_agentreg(home.path(), &["--load", path.to_str().unwrap(), "stats"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("snapshot"));
}

#[test]
fn test_config_file_sets_local_identity() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config/agentreg");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("agentreg.yaml"),
        "agent:\n  name: Scout\n  description: Local scout agent\n  version: 2.0.0\n",
    )
    .unwrap();

    let export = run_json(home.path(), &["manifest", "--json"]);
    assert_eq!(export["agent"]["name"], "Scout");
    assert_eq!(export["agent"]["version"], "2.0.0");
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let script = run_stdout(home.path(), &["completions", "bash"]);
    assert!(script.contains("agentreg"));
}
