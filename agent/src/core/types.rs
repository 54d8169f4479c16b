//! Shared identifiers for workflow stages and capabilities.
//!
//! Stages and capability names are open sets: the built-in values are exposed
//! as associated constants, and an embedding application can mint new ones
//! with `new` without touching the run loop.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named position in the workflow state machine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(Cow<'static, str>);

impl Stage {
    pub const INITIAL: Stage = Stage(Cow::Borrowed("INITIAL"));
    pub const COORDINATOR: Stage = Stage(Cow::Borrowed("COORDINATOR"));
    pub const COMPLETED: Stage = Stage(Cow::Borrowed("COMPLETED"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::INITIAL
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a knowledge-producing capability backed by inference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillName(Cow<'static, str>);

impl SkillName {
    pub const ANALYZE_AND_PLAN: SkillName = SkillName(Cow::Borrowed("analyze_and_plan"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a deterministic capability that needs no inference call.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolName(Cow<'static, str>);

impl ToolName {
    pub const HELLO_WORLD: ToolName = ToolName(Cow::Borrowed("hello_world"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of action carried by a coordinator decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    InvokeSkill,
    InvokeTool,
    Complete,
    Noop,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::InvokeSkill => "invoke_skill",
            ActionKind::InvokeTool => "invoke_tool",
            ActionKind::Complete => "complete",
            ActionKind::Noop => "noop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_stage_equals_builtin_with_same_name() {
        assert_eq!(Stage::new("COMPLETED"), Stage::COMPLETED);
        assert_eq!(Stage::new(String::from("REVIEW")).as_str(), "REVIEW");
    }

    #[test]
    fn stage_serializes_as_plain_string() {
        let json = serde_json::to_string(&Stage::COORDINATOR).expect("serialize");
        assert_eq!(json, "\"COORDINATOR\"");
        let parsed: Stage = serde_json::from_str("\"REVIEW\"").expect("deserialize");
        assert_eq!(parsed, Stage::new("REVIEW"));
    }
}
