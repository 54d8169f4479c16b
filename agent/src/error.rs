//! Typed errors surfaced by the agent.
//!
//! Collaborator boundaries (inference, tools, templates, files) report
//! `anyhow` errors; the agent wraps them here with the capability they
//! belong to. Policy gaps and budget exhaustion are not errors, see
//! [`crate::looping::RunOutcome`].

use thiserror::Error;

use crate::core::types::{SkillName, ToolName};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Inference failed or returned a payload that violates the skill's output schema.
    #[error("LLM call failed for skill '{skill}': {source}")]
    SkillCall {
        skill: SkillName,
        #[source]
        source: BoxError,
    },

    #[error("tool call failed for '{tool}': {source}")]
    ToolCall {
        tool: ToolName,
        #[source]
        source: BoxError,
    },

    #[error("no such skill registered: {0}")]
    UnknownSkill(SkillName),

    #[error("no such tool registered: {0}")]
    UnknownTool(ToolName),

    #[error("no state handler registered for skill {0}")]
    NoSkillHandler(SkillName),

    #[error("no state handler registered for tool {0}")]
    NoToolHandler(ToolName),

    #[error("either a goal or a workflow must be provided")]
    MissingGoal,

    #[error("render template '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: BoxError,
    },

    #[error("state update for '{capability}' failed: {source}")]
    StateUpdate {
        capability: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid configuration: {0:#}")]
    Config(anyhow::Error),
}

impl AgentError {
    pub fn skill_call(skill: &SkillName, err: anyhow::Error) -> Self {
        AgentError::SkillCall {
            skill: skill.clone(),
            source: err.into(),
        }
    }

    pub fn tool_call(tool: &ToolName, err: anyhow::Error) -> Self {
        AgentError::ToolCall {
            tool: tool.clone(),
            source: err.into(),
        }
    }

    pub fn state_update(capability: impl Into<String>, err: anyhow::Error) -> Self {
        AgentError::StateUpdate {
            capability: capability.into(),
            source: err.into(),
        }
    }

    /// True for errors that indicate a wiring bug rather than a runtime failure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AgentError::UnknownSkill(_)
                | AgentError::UnknownTool(_)
                | AgentError::NoSkillHandler(_)
                | AgentError::NoToolHandler(_)
                | AgentError::MissingGoal
                | AgentError::Template { .. }
                | AgentError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn skill_call_names_the_skill() {
        let err = AgentError::skill_call(&SkillName::ANALYZE_AND_PLAN, anyhow!("boom"));
        let message = err.to_string();
        assert!(message.contains("analyze_and_plan"));
        assert!(message.contains("boom"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn lookup_misses_are_configuration_errors() {
        assert!(AgentError::UnknownSkill(SkillName::new("missing")).is_configuration());
        assert!(AgentError::NoToolHandler(ToolName::HELLO_WORLD).is_configuration());
    }
}
