//! Capability output -> next state transformations.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::core::types::{SkillName, Stage, ToolName};
use crate::error::AgentError;
use crate::skills::AnalyzeAndPlanOutput;
use crate::state::AgentState;
use crate::tools::hello_world::HelloWorldResponse;

/// Pure transformation `(old_state, output) -> new_state`.
///
/// Handlers must not mutate `old_state`; they derive the next state from a
/// clone and only touch the regions they change.
pub type SkillHandler = fn(&AgentState, &Value) -> Result<AgentState>;
pub type ToolHandler = fn(&AgentState, &Value) -> Result<AgentState>;

/// Dispatch tables routing skill and tool outputs to their handlers.
#[derive(Debug, Clone, Default)]
pub struct StateUpdater {
    skills: HashMap<SkillName, SkillHandler>,
    tools: HashMap<ToolName, ToolHandler>,
}

impl StateUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers for the built-in skill and tool.
    pub fn builtin() -> Self {
        let mut updater = Self::new();
        updater.register_skill(SkillName::ANALYZE_AND_PLAN, apply_analyze_and_plan);
        updater.register_tool(ToolName::HELLO_WORLD, apply_hello_world);
        updater
    }

    /// Register a skill handler. A later registration for the same name wins.
    pub fn register_skill(&mut self, skill: SkillName, handler: SkillHandler) {
        self.skills.insert(skill, handler);
    }

    /// Register a tool handler. A later registration for the same name wins.
    pub fn register_tool(&mut self, tool: ToolName, handler: ToolHandler) {
        self.tools.insert(tool, handler);
    }

    pub fn apply_skill(
        &self,
        state: &AgentState,
        skill: &SkillName,
        output: &Value,
    ) -> Result<AgentState, AgentError> {
        let handler = self
            .skills
            .get(skill)
            .ok_or_else(|| AgentError::NoSkillHandler(skill.clone()))?;
        let next = handler(state, output)
            .map_err(|err| AgentError::state_update(skill.as_str(), err))?;
        debug!(%skill, stage = %next.current_stage(), "applied skill output");
        Ok(next)
    }

    pub fn apply_tool(
        &self,
        state: &AgentState,
        tool: &ToolName,
        output: &Value,
    ) -> Result<AgentState, AgentError> {
        let handler = self
            .tools
            .get(tool)
            .ok_or_else(|| AgentError::NoToolHandler(tool.clone()))?;
        let next =
            handler(state, output).map_err(|err| AgentError::state_update(tool.as_str(), err))?;
        debug!(%tool, stage = %next.current_stage(), "applied tool output");
        Ok(next)
    }
}

/// Store the analysis and advance to the recommended stage.
///
/// The chain of thought becomes the transition reason.
pub fn apply_analyze_and_plan(state: &AgentState, output: &Value) -> Result<AgentState> {
    let parsed: AnalyzeAndPlanOutput =
        serde_json::from_value(output.clone()).context("parse analyze_and_plan output")?;

    let mut next = state.clone();
    Arc::make_mut(&mut next.working).query_analysis = Some(output.clone());
    let reason = (!parsed.chain_of_thought.is_empty()).then_some(parsed.chain_of_thought);
    Arc::make_mut(&mut next.workflow).record_transition(parsed.next_stage, reason);
    Ok(next)
}

/// Keep the greeting and hand control to the coordinator stage.
pub fn apply_hello_world(state: &AgentState, output: &Value) -> Result<AgentState> {
    let parsed: HelloWorldResponse =
        serde_json::from_value(output.clone()).context("parse hello_world response")?;

    let mut next = state.clone();
    Arc::make_mut(&mut next.working).last_tool_response = Some(output.clone());
    Arc::make_mut(&mut next.workflow).record_transition(Stage::COORDINATOR, Some(parsed.message));
    Ok(next)
}
