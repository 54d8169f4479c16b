//! CLI tests for `agent run` and `agent transitions`.
//!
//! Spawns the agent binary with a config whose inference command is a small
//! shell script standing in for codex, and checks exit codes and output.
#![cfg(unix)]

use std::path::Path;
use std::process::{Command, Output};

use agent::exit_codes;
use agent::io::config::{AgentConfig, InferenceConfig, write_config};

/// `$4` is the `--output-last-message` path appended by the backend.
fn write_fake_backend_config(root: &Path, next_stage: &str) {
    let payload = format!(r#"{{"chain_of_thought":"done","next_stage":"{next_stage}"}}"#);
    let script = format!(r#"cat > /dev/null; printf '%s' '{payload}' > "$4""#);
    let config = AgentConfig {
        inference: InferenceConfig {
            command: vec!["sh".into(), "-c".into(), script, "codex".into()],
            max_attempts: 1,
            ..InferenceConfig::default()
        },
        ..AgentConfig::default()
    };
    write_config(&root.join("agent.toml"), &config).expect("write config");
}

fn agent_cmd(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agent"))
        .current_dir(root)
        .args(args)
        .output()
        .expect("agent binary")
}

#[test]
fn run_to_completion_exits_ok_and_prints_summary() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fake_backend_config(temp.path(), "COMPLETED");

    let output = agent_cmd(temp.path(), &["run", "--goal", "say hello"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("step 1: invoke_tool (INITIAL -> COORDINATOR)"));
    assert!(stdout.contains("step 2: invoke_skill (COORDINATOR -> COMPLETED)"));
    assert!(stdout.contains("completed at COMPLETED after 3 step(s)"));
}

#[test]
fn max_steps_override_exits_with_budget_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_fake_backend_config(temp.path(), "COORDINATOR");

    let output = agent_cmd(temp.path(), &["run", "--goal", "g", "--max-steps", "3"]);

    assert_eq!(output.status.code(), Some(exit_codes::BUDGET_EXHAUSTED));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("step budget of 3 exhausted at COORDINATOR"));
}

#[test]
fn failing_backend_exits_with_error_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = AgentConfig {
        inference: InferenceConfig {
            command: vec![
                "sh".into(),
                "-c".into(),
                "cat > /dev/null; echo boom >&2; exit 1".into(),
                "codex".into(),
            ],
            max_attempts: 1,
            ..InferenceConfig::default()
        },
        ..AgentConfig::default()
    };
    write_config(&temp.path().join("agent.toml"), &config).expect("write config");

    let output = agent_cmd(temp.path(), &["run", "--goal", "g"]);

    assert_eq!(output.status.code(), Some(exit_codes::ERROR));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("LLM call failed for skill 'analyze_and_plan'"));
}

#[test]
fn invalid_config_exits_with_error_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("agent.toml"), "step_limit = 0\n").expect("write");

    let output = agent_cmd(temp.path(), &["run", "--goal", "g"]);

    assert_eq!(output.status.code(), Some(exit_codes::ERROR));
    assert!(String::from_utf8_lossy(&output.stderr).contains("step_limit must be > 0"));
}

#[test]
fn transitions_lists_builtin_table() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = agent_cmd(temp.path(), &["transitions"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("INITIAL\tinvoke_tool hello_world"));
    assert!(stdout.contains("COORDINATOR\tinvoke_skill analyze_and_plan"));
}
