//! Goal-driven agent CLI.
//!
//! `agent run` drives the built-in workflow against the Codex backend and
//! prints one line per step plus a final summary. The exit code encodes how
//! the run stopped (see [`agent::exit_codes`]).

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use agent::core::coordinator::{Action, TransitionTable};
use agent::exit_codes;
use agent::io::config::load_config;
use agent::io::inference::CodexInference;
use agent::{Agent, AgentError, AgentParts, AgentState, RunOutcome};

#[derive(Parser)]
#[command(name = "agent", version, about = "Goal-driven agent orchestration runtime")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the built-in workflow for a goal until it completes or stops.
    Run {
        /// Free-text objective for the run.
        #[arg(short, long)]
        goal: String,
        /// Agent config (TOML). Defaults apply when the file is missing.
        #[arg(short, long, default_value = "agent.toml")]
        config: PathBuf,
        /// Override `step_limit` from the config.
        #[arg(long)]
        max_steps: Option<u32>,
    },
    /// Print the built-in stage transition table.
    Transitions,
}

fn main() {
    agent::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            goal,
            config,
            max_steps,
        } => cmd_run(goal, config, max_steps),
        Command::Transitions => {
            print!("{}", format_transitions(&TransitionTable::builtin()));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_run(goal: String, config_path: PathBuf, max_steps: Option<u32>) -> Result<i32> {
    let mut config = load_config(&config_path).map_err(AgentError::Config)?;
    if let Some(max_steps) = max_steps {
        config.step_limit = max_steps;
        config.validate().map_err(AgentError::Config)?;
    }

    let workdir = env::current_dir().context("resolve working directory")?;
    let inference = CodexInference::new(&config.inference, workdir);
    let agent = Agent::new(AgentParts::from_config(&config, inference));

    let result = agent.run_with(AgentState::from_goal(goal), |record| {
        println!(
            "step {}: {} ({} -> {}) {}",
            record.step,
            record.decision.kind().as_str(),
            record.stage_before,
            record.stage_after,
            record.decision.rationale()
        );
    })?;
    println!("{}", result.summary());

    Ok(outcome_exit_code(&result.outcome))
}

fn outcome_exit_code(outcome: &RunOutcome) -> i32 {
    match outcome {
        RunOutcome::Completed { .. } => exit_codes::OK,
        RunOutcome::PolicyGap { .. } => exit_codes::POLICY_GAP,
        RunOutcome::BudgetExhausted { .. } => exit_codes::BUDGET_EXHAUSTED,
    }
}

/// One `STAGE<TAB>action<TAB>rationale` line per declared stage.
fn format_transitions(table: &TransitionTable) -> String {
    let mut out = String::new();
    for (stage, transition) in table.iter() {
        let action = match &transition.action {
            Action::Skill(skill) => format!("invoke_skill {skill}"),
            Action::Tool(tool) => format!("invoke_tool {tool}"),
            Action::Complete => "complete".to_string(),
        };
        out.push_str(&format!("{stage}\t{action}\t{}\n", transition.rationale));
    }
    out
}
