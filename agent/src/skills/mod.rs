//! Skill catalog: inference-backed capabilities.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::types::{SkillName, Stage};
use crate::error::AgentError;

const ANALYZE_AND_PLAN_SCHEMA: &str =
    include_str!("../../schemas/analyze_and_plan_output.schema.json");

/// Template id of the built-in planning prompt.
pub const ANALYZE_AND_PLAN_TEMPLATE: &str = "analyze_and_plan";

/// Structured fields returned by the analyze-and-plan skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeAndPlanOutput {
    /// Reasoning about the goal and the current context.
    #[serde(default)]
    pub chain_of_thought: String,
    #[serde(default = "default_next_stage")]
    pub next_stage: Stage,
}

fn default_next_stage() -> Stage {
    Stage::COORDINATOR
}

/// Declarative description of a skill.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillDefinition {
    pub name: SkillName,
    /// Id of the prompt template rendered from the full state.
    pub template_id: &'static str,
    /// JSON Schema the inference result must satisfy.
    pub output_schema: Arc<Value>,
}

impl SkillDefinition {
    pub fn new(name: SkillName, template_id: &'static str, output_schema: Value) -> Self {
        Self {
            name,
            template_id,
            output_schema: Arc::new(output_schema),
        }
    }

    pub fn analyze_and_plan() -> Self {
        Self::new(
            SkillName::ANALYZE_AND_PLAN,
            ANALYZE_AND_PLAN_TEMPLATE,
            serde_json::from_str(ANALYZE_AND_PLAN_SCHEMA)
                .expect("analyze_and_plan schema should be valid json"),
        )
    }
}

/// Name -> definition lookup, built once before a run.
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    skills: HashMap<SkillName, SkillDefinition>,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::from_definitions([SkillDefinition::analyze_and_plan()])
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = SkillDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.register(definition);
        }
        catalog
    }

    /// Add a skill. Re-registering a name replaces the earlier definition.
    pub fn register(&mut self, definition: SkillDefinition) {
        self.skills.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &SkillName) -> Result<&SkillDefinition, AgentError> {
        self.skills
            .get(name)
            .ok_or_else(|| AgentError::UnknownSkill(name.clone()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&SkillName> {
        let mut names: Vec<_> = self.skills.keys().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_catalog_resolves_analyze_and_plan() {
        let catalog = SkillCatalog::builtin();
        let definition = catalog.get(&SkillName::ANALYZE_AND_PLAN).expect("skill");
        assert_eq!(definition.template_id, ANALYZE_AND_PLAN_TEMPLATE);
        assert_eq!(definition.output_schema["title"], "AnalyzeAndPlanOutput");
    }

    #[test]
    fn unknown_skill_is_reported_by_name() {
        let err = SkillCatalog::builtin()
            .get(&SkillName::new("summarize"))
            .unwrap_err();
        assert_eq!(err.to_string(), "no such skill registered: summarize");
    }

    #[test]
    fn duplicate_registration_overwrites() {
        let replacement =
            SkillDefinition::new(SkillName::ANALYZE_AND_PLAN, "other", json!({"type": "object"}));
        let catalog =
            SkillCatalog::from_definitions([SkillDefinition::analyze_and_plan(), replacement]);
        assert_eq!(catalog.names().len(), 1);
        assert_eq!(
            catalog
                .get(&SkillName::ANALYZE_AND_PLAN)
                .expect("skill")
                .template_id,
            "other"
        );
    }

    #[test]
    fn output_defaults_match_planning_contract() {
        let parsed: AnalyzeAndPlanOutput = serde_json::from_value(json!({})).expect("parse");
        assert_eq!(parsed.chain_of_thought, "");
        assert_eq!(parsed.next_stage, Stage::COORDINATOR);
    }
}
