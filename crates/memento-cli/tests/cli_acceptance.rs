use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    project: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let home = temp_dir.path().join("home");
        let project = temp_dir.path().join("my-project");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&project).expect("failed to create project");

        Self {
            _temp_dir: temp_dir,
            home,
            project,
        }
    }

    fn claude_dir(&self) -> PathBuf {
        self.home.join(".claude")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(PathBuf::from(assert_cmd::cargo::cargo_bin!("memento")))
            .args(args)
            .arg("--project")
            .arg(&self.project)
            .env("HOME", &self.home)
            .env_remove("RUST_LOG")
            .output()
            .unwrap_or_else(|e| panic!("failed to execute memento: {e}"))
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let output = self.run(args);
        assert_success(args, &output);
        serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
            panic!(
                "stdout is not JSON ({e}):\n{}",
                String::from_utf8_lossy(&output.stdout)
            )
        })
    }

    fn read_log(&self, name: &str) -> Value {
        let raw = fs::read_to_string(self.claude_dir().join(name)).expect("log file missing");
        serde_json::from_str(&raw).expect("log file is not JSON")
    }
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    panic!(
        "memento {} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().expect("missing parent")).expect("failed to create dirs");
    fs::write(path, content).expect("failed to write fixture");
}

#[test]
fn analyze_project_with_budget() {
    let env = CliTestEnv::new();
    write(&env.project.join("CLAUDE.md"), &"x".repeat(160));

    let report = env.run_json(&["analyze", "--json", "--estimate", "--budget", "5000"]);
    assert_eq!(report["totals"]["claude_md_tokens"], 40);
    assert_eq!(report["totals"]["total_project_tokens"], 40);
    assert_eq!(report["estimates"]["baseline_total"], 10_040);
    assert_eq!(report["budget"], 5000);
    assert_eq!(report["budget_remaining"], -5040);
    assert_eq!(report["budget_used_percent"], 200.8);
    assert_eq!(report["exact_tokenizer"], false);
    assert_eq!(report["components"]["claude_md"][0]["estimated"], true);
}

#[test]
fn analyze_default_budget() {
    let env = CliTestEnv::new();

    let report = env.run_json(&["analyze", "--json"]);
    assert_eq!(report["budget"], 200_000);
    assert_eq!(report["budget_remaining"], 190_000);
    assert_eq!(report["totals"]["total_project_tokens"], 0);
}

#[test]
fn analyze_includes_user_level_artifacts() {
    let env = CliTestEnv::new();
    write(&env.claude_dir().join("CLAUDE.md"), &"y".repeat(80));
    write(&env.claude_dir().join(".mcp.json"), &"z".repeat(40));

    let report = env.run_json(&["analyze", "--json", "--estimate"]);
    assert_eq!(report["totals"]["claude_md_tokens"], 20);
    assert_eq!(report["totals"]["mcp_tokens"], 10);
}

#[test]
fn analyze_nonexistent_file() {
    let env = CliTestEnv::new();

    let report = env.run_json(&["analyze", "--json", "/nonexistent/path/file.txt"]);
    assert_eq!(report["files"][0]["exists"], false);
    assert!(report["files"][0]["error"].is_string());
    assert!(report["files"][0].get("tokens").is_none());
    assert_eq!(report["total_tokens"], 0);
}

#[test]
fn analyze_human_output() {
    let env = CliTestEnv::new();
    write(&env.project.join("CLAUDE.md"), "# Guide\n");

    let output = env.run(&["analyze", "--text"]);
    assert_success(&["analyze", "--text"], &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Context Token Report"));
    assert!(stdout.contains("CLAUDE.md"));
}

#[test]
fn analyze_prints_json_by_default() {
    let env = CliTestEnv::new();
    write(&env.project.join("CLAUDE.md"), &"x".repeat(160));

    let report = env.run_json(&["analyze", "--estimate"]);
    assert_eq!(report["estimates"]["baseline_total"], 10_040);

    let files = env.run_json(&["analyze", "--estimate", "CLAUDE.md"]);
    assert!(files["files"].is_array());
}

#[test]
fn analyze_expands_home_in_file_paths() {
    let env = CliTestEnv::new();
    write(&env.claude_dir().join("CLAUDE.md"), &"y".repeat(80));

    let report = env.run_json(&["analyze", "--estimate", "~/.claude/CLAUDE.md"]);
    assert_eq!(report["files"][0]["exists"], true);
    assert_eq!(report["total_tokens"], 20);
}

#[test]
fn settings_override_system_prompt_tokens() {
    let env = CliTestEnv::new();
    write(
        &env.claude_dir().join("memento.toml"),
        "[analysis]\nsystem_prompt_tokens = 2000\nbudget = 4000\n",
    );

    let report = env.run_json(&["analyze", "--json", "--estimate"]);
    assert_eq!(report["estimates"]["system_prompt_tokens"], 2000);
    assert_eq!(report["budget"], 4000);
    assert_eq!(report["budget_used_percent"], 50.0);
}

#[test]
fn log_command_extracts_json_command() {
    let env = CliTestEnv::new();

    let status = env.run_json(&["log-command", "-i", r#"{"command": "cargo build"}"#]);
    assert_eq!(status["status"], "logged");

    let log = env.read_log("memento-commands.json");
    assert_eq!(log["version"], "1.0");
    assert_eq!(log["commands"][0]["command"], "cargo build");
    assert_eq!(log["commands"][0]["project"], "my-project");
}

#[test]
fn log_command_quiet_and_empty_input() {
    let env = CliTestEnv::new();

    let output = env.run(&["log-command", "-q", "-i", "ls"]);
    assert_success(&["log-command"], &output);
    assert!(output.stdout.is_empty());

    let output = env.run(&["log-command"]);
    assert_success(&["log-command"], &output);
    assert!(output.stdout.is_empty());

    let log = env.read_log("memento-commands.json");
    assert_eq!(log["commands"].as_array().map(Vec::len), Some(1));
}

#[test]
fn session_start_then_stop() {
    let env = CliTestEnv::new();

    let none = env.run_json(&["log-session", "-e", "stop"]);
    assert_eq!(none["status"], "no_open_session");

    let started = env.run_json(&["log-session", "-e", "start"]);
    assert_eq!(started["status"], "started");
    let id = started["session_id"].as_str().expect("missing session id").to_string();

    let stopped = env.run_json(&["log-session", "--event", "stop"]);
    assert_eq!(stopped["status"], "stopped");
    assert_eq!(stopped["session_id"], id.as_str());

    let log = env.read_log("memento-stats.json");
    let session = &log["sessions"][0];
    assert_eq!(session["id"], id.as_str());
    assert_eq!(session["project"], "my-project");
    assert!(session["ended_at"].is_string());
    assert!(session["duration_minutes"].is_number());
    assert!(session["baseline_tokens"].as_u64().unwrap() >= 10_000);
}

#[test]
fn session_zero_retention_keeps_open_session() {
    let env = CliTestEnv::new();
    write(
        &env.claude_dir().join("memento.toml"),
        "[sessions]\nretention = 0\n",
    );

    let started = env.run_json(&["log-session", "-e", "start"]);
    let stopped = env.run_json(&["log-session", "-e", "stop"]);
    assert_eq!(stopped["status"], "stopped");
    assert_eq!(stopped["session_id"], started["session_id"]);
}

#[test]
fn session_start_recovers_from_corrupt_log() {
    let env = CliTestEnv::new();
    write(&env.claude_dir().join("memento-stats.json"), "{{{ definitely not json");

    let started = env.run_json(&["log-session", "-e", "start"]);
    assert_eq!(started["status"], "started");

    let log = env.read_log("memento-stats.json");
    assert_eq!(log["sessions"].as_array().map(Vec::len), Some(1));
}

#[test]
fn history_lists_recent_entries() {
    let env = CliTestEnv::new();
    env.run_json(&["log-session", "-e", "start"]);
    env.run_json(&["log-command", "-i", "git status"]);

    let history = env.run_json(&["history", "--json"]);
    assert_eq!(history["sessions"].as_array().map(Vec::len), Some(1));
    assert_eq!(history["commands"][0]["command"], "git status");

    let only_commands = env.run_json(&["history", "--json", "--commands"]);
    assert!(only_commands.get("sessions").is_none());
}
