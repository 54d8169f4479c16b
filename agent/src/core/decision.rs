//! Decisions emitted by the coordinator.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActionKind, SkillName, ToolName};

/// The coordinator's single recommended next action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    InvokeSkill { skill: SkillName, rationale: String },
    InvokeTool { tool: ToolName, rationale: String },
    /// The workflow reached its goal.
    Complete { rationale: String },
    /// No transition is defined for the current stage.
    Noop { rationale: String },
}

impl Decision {
    pub fn skill(skill: SkillName, rationale: impl Into<String>) -> Self {
        Decision::InvokeSkill {
            skill,
            rationale: rationale.into(),
        }
    }

    pub fn tool(tool: ToolName, rationale: impl Into<String>) -> Self {
        Decision::InvokeTool {
            tool,
            rationale: rationale.into(),
        }
    }

    pub fn complete(rationale: impl Into<String>) -> Self {
        Decision::Complete {
            rationale: rationale.into(),
        }
    }

    pub fn noop(rationale: impl Into<String>) -> Self {
        Decision::Noop {
            rationale: rationale.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Decision::InvokeSkill { .. } => ActionKind::InvokeSkill,
            Decision::InvokeTool { .. } => ActionKind::InvokeTool,
            Decision::Complete { .. } => ActionKind::Complete,
            Decision::Noop { .. } => ActionKind::Noop,
        }
    }

    pub fn rationale(&self) -> &str {
        match self {
            Decision::InvokeSkill { rationale, .. }
            | Decision::InvokeTool { rationale, .. }
            | Decision::Complete { rationale }
            | Decision::Noop { rationale } => rationale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_decision_is_tagged_by_action() {
        let decision = Decision::tool(ToolName::HELLO_WORLD, "say hi");
        let value = serde_json::to_value(&decision).expect("serialize");
        assert_eq!(value["action"], "invoke_tool");
        assert_eq!(value["tool"], "hello_world");
        assert_eq!(value["rationale"], "say hi");
    }

    #[test]
    fn kind_and_rationale_follow_variant() {
        let decision = Decision::noop("No transition defined for stage: X");
        assert_eq!(decision.kind(), ActionKind::Noop);
        assert!(decision.rationale().contains("stage: X"));
    }
}
