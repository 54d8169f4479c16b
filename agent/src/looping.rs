//! The agent run loop: decide, execute, update, repeat.

use tracing::{info, instrument, warn};

use crate::core::coordinator::{Coordinator, TransitionTable};
use crate::core::decision::Decision;
use crate::core::state_update::StateUpdater;
use crate::core::types::Stage;
use crate::error::AgentError;
use crate::executor::SkillExecutor;
use crate::io::config::AgentConfig;
use crate::io::inference::Inference;
use crate::state::AgentState;
use crate::tools::ToolCatalog;

/// Reason why a run stopped without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The coordinator returned `complete`.
    Completed { rationale: String },
    /// No transition is defined for the current stage.
    PolicyGap { rationale: String },
    /// The step budget ran out before a terminal decision.
    BudgetExhausted { step_limit: u32 },
}

/// Final state and stop reason of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResult {
    pub state: AgentState,
    /// Loop iterations, the terminal one included.
    pub steps_executed: u32,
    pub outcome: RunOutcome,
}

impl AgentResult {
    pub fn summary(&self) -> String {
        let stage = self.state.current_stage();
        let steps = self.steps_executed;
        match &self.outcome {
            RunOutcome::Completed { rationale } => {
                format!("completed at {stage} after {steps} step(s): {rationale}")
            }
            RunOutcome::PolicyGap { rationale } => {
                format!("stopped at {stage} after {steps} step(s): {rationale}")
            }
            RunOutcome::BudgetExhausted { step_limit } => {
                format!("step budget of {step_limit} exhausted at {stage}")
            }
        }
    }
}

/// One loop iteration as seen by the `run_with` callback.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// 1-based iteration number.
    pub step: u32,
    pub decision: Decision,
    pub stage_before: Stage,
    pub stage_after: Stage,
}

/// Everything an [`Agent`] is assembled from.
#[derive(Debug)]
pub struct AgentParts<I> {
    pub coordinator: Coordinator,
    pub executor: SkillExecutor<I>,
    pub tools: ToolCatalog,
    pub updater: StateUpdater,
    pub step_limit: u32,
}

impl<I: Inference> AgentParts<I> {
    /// Built-in workflow, skills, tools and handlers on top of `inference`.
    pub fn builtin(inference: I) -> Self {
        Self::from_config(&AgentConfig::default(), inference)
    }

    pub fn from_config(config: &AgentConfig, inference: I) -> Self {
        Self {
            coordinator: Coordinator::default(),
            executor: SkillExecutor::from_config(&config.inference, inference),
            tools: ToolCatalog::builtin(),
            updater: StateUpdater::builtin(),
            step_limit: config.step_limit,
        }
    }

    pub fn with_table(mut self, table: TransitionTable) -> Self {
        self.coordinator = Coordinator::new(table);
        self
    }

    pub fn with_step_limit(mut self, step_limit: u32) -> Self {
        self.step_limit = step_limit;
        self
    }
}

#[derive(Debug)]
pub struct Agent<I> {
    coordinator: Coordinator,
    executor: SkillExecutor<I>,
    tools: ToolCatalog,
    updater: StateUpdater,
    step_limit: u32,
}

impl<I: Inference> Agent<I> {
    pub fn new(parts: AgentParts<I>) -> Self {
        Self {
            coordinator: parts.coordinator,
            executor: parts.executor,
            tools: parts.tools,
            updater: parts.updater,
            step_limit: parts.step_limit,
        }
    }

    pub fn builtin(inference: I) -> Self {
        Self::new(AgentParts::builtin(inference))
    }

    pub fn step_limit(&self) -> u32 {
        self.step_limit
    }

    pub fn executor(&self) -> &SkillExecutor<I> {
        &self.executor
    }

    /// Run from a fresh `INITIAL` state for `goal`.
    pub fn run(&self, goal: impl Into<String>) -> Result<AgentResult, AgentError> {
        self.run_from_state(AgentState::from_goal(goal))
    }

    pub fn run_from_state(&self, state: AgentState) -> Result<AgentResult, AgentError> {
        self.run_with(state, |_| {})
    }

    /// Loop until a terminal decision, an error, or the step budget runs out.
    ///
    /// `on_step` is called after every iteration, the terminal one included.
    /// Any capability or handler error stops the run immediately.
    #[instrument(skip_all, fields(goal = state.goal(), step_limit = self.step_limit))]
    pub fn run_with<F: FnMut(&StepRecord)>(
        &self,
        state: AgentState,
        mut on_step: F,
    ) -> Result<AgentResult, AgentError> {
        let mut state = state;
        for step in 1..=self.step_limit {
            let decision = self.coordinator.next_action(&state);
            let stage_before = state.current_stage().clone();

            let outcome = match &decision {
                Decision::Complete { rationale } => Some(RunOutcome::Completed {
                    rationale: rationale.clone(),
                }),
                Decision::Noop { rationale } => {
                    warn!(stage = %stage_before, "no transition for stage");
                    Some(RunOutcome::PolicyGap {
                        rationale: rationale.clone(),
                    })
                }
                Decision::InvokeSkill { skill, .. } => {
                    info!(step, %skill, stage = %stage_before, "invoking skill");
                    let output = self.executor.execute(skill, &state)?;
                    state = self.updater.apply_skill(&state, skill, &output)?;
                    None
                }
                Decision::InvokeTool { tool, .. } => {
                    info!(step, %tool, stage = %stage_before, "invoking tool");
                    let output = self.tools.call(tool, &state)?;
                    state = self.updater.apply_tool(&state, tool, &output)?;
                    None
                }
            };

            on_step(&StepRecord {
                step,
                decision,
                stage_before,
                stage_after: state.current_stage().clone(),
            });

            if let Some(outcome) = outcome {
                info!(step, stage = %state.current_stage(), ?outcome, "run stopped");
                return Ok(AgentResult {
                    state,
                    steps_executed: step,
                    outcome,
                });
            }
        }

        warn!(
            step_limit = self.step_limit,
            stage = %state.current_stage(),
            "step budget exhausted before a terminal decision"
        );
        Ok(AgentResult {
            state,
            steps_executed: self.step_limit,
            outcome: RunOutcome::BudgetExhausted {
                step_limit: self.step_limit,
            },
        })
    }
}
