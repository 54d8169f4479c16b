//! The agent state tree.
//!
//! Every region sits behind an `Arc`: deriving the next state clones the
//! pointers and only the regions that actually change get copied
//! (`Arc::make_mut`). A state handed out by the loop is therefore never
//! mutated afterwards and can be retained or diffed freely.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::types::Stage;
use crate::error::AgentError;

/// Guardrails the agent must never break. Set once at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstitutionalMemory {}

/// Scratch space for the current reasoning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingMemory {
    /// Latest analysis payload produced by a skill.
    pub query_analysis: Option<Value>,
    /// Latest response produced by a tool.
    pub last_tool_response: Option<Value>,
}

/// One recorded stage change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTransition {
    pub from_stage: Stage,
    pub to_stage: Stage,
    pub timestamp: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Workflow state machine region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMemory {
    pub current_stage: Stage,
    /// The goal that started the workflow.
    pub goal: String,
    /// Append-only record of stage changes.
    pub history: Vec<WorkflowTransition>,
}

impl WorkflowMemory {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            current_stage: Stage::INITIAL,
            goal: goal.into(),
            history: Vec::new(),
        }
    }

    /// Move to `to_stage`, appending a transition record.
    ///
    /// Re-entering the current stage is a no-op and records nothing.
    /// Returns true if the stage changed.
    pub fn record_transition(&mut self, to_stage: Stage, reason: Option<String>) -> bool {
        if self.current_stage == to_stage {
            return false;
        }
        let from_stage = std::mem::replace(&mut self.current_stage, to_stage.clone());
        self.history.push(WorkflowTransition {
            from_stage,
            to_stage,
            timestamp: Utc::now(),
            reason,
        });
        true
    }
}

/// Interaction history and event log. Not written by the base loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodicMemory {}

/// Knowledge store. Not written by the base loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticMemory {}

/// Mirror of capability definitions. Not written by the base loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProceduralMemory {}

/// Capacity and budget tracking. Not written by the base loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMemory {}

/// Full memory object passed between loop iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub core: Arc<ConstitutionalMemory>,
    pub working: Arc<WorkingMemory>,
    pub workflow: Arc<WorkflowMemory>,
    pub episodic: Arc<EpisodicMemory>,
    pub semantic: Arc<SemanticMemory>,
    pub procedural: Arc<ProceduralMemory>,
    pub resource: Arc<ResourceMemory>,
}

impl AgentState {
    /// Fresh state at the `INITIAL` stage for `goal`.
    pub fn from_goal(goal: impl Into<String>) -> Self {
        Self::from_workflow(WorkflowMemory::new(goal))
    }

    fn from_workflow(workflow: WorkflowMemory) -> Self {
        Self {
            core: Arc::default(),
            working: Arc::default(),
            workflow: Arc::new(workflow),
            episodic: Arc::default(),
            semantic: Arc::default(),
            procedural: Arc::default(),
            resource: Arc::default(),
        }
    }

    pub fn current_stage(&self) -> &Stage {
        &self.workflow.current_stage
    }

    pub fn goal(&self) -> &str {
        &self.workflow.goal
    }
}

/// Optional pieces for building an initial state.
///
/// At least one of `goal` or `workflow` must be set; a supplied `workflow`
/// wins over `goal`.
#[derive(Debug, Clone, Default)]
pub struct InitialState {
    pub goal: Option<String>,
    pub core: Option<ConstitutionalMemory>,
    pub working: Option<WorkingMemory>,
    pub workflow: Option<WorkflowMemory>,
    pub episodic: Option<EpisodicMemory>,
    pub semantic: Option<SemanticMemory>,
    pub procedural: Option<ProceduralMemory>,
    pub resource: Option<ResourceMemory>,
}

/// Build a fully populated state tree.
pub fn create_initial_state(init: InitialState) -> Result<AgentState, AgentError> {
    let workflow = match (init.workflow, init.goal) {
        (Some(workflow), _) => workflow,
        (None, Some(goal)) => WorkflowMemory::new(goal),
        (None, None) => return Err(AgentError::MissingGoal),
    };

    Ok(AgentState {
        core: Arc::new(init.core.unwrap_or_default()),
        working: Arc::new(init.working.unwrap_or_default()),
        workflow: Arc::new(workflow),
        episodic: Arc::new(init.episodic.unwrap_or_default()),
        semantic: Arc::new(init.semantic.unwrap_or_default()),
        procedural: Arc::new(init.procedural.unwrap_or_default()),
        resource: Arc::new(init.resource.unwrap_or_default()),
    })
}
