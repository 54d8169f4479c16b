//! Deterministic stage-transition policy.
//!
//! The coordinator looks only at `workflow.current_stage` and maps it through
//! a static [`TransitionTable`]. It holds no mutable state, so asking twice
//! about the same state always yields equal decisions.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::decision::Decision;
use crate::core::types::{SkillName, Stage, ToolName};
use crate::state::AgentState;

/// What a stage asks the loop to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Skill(SkillName),
    Tool(ToolName),
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub action: Action,
    pub rationale: String,
}

/// Static `stage -> (action, rationale)` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    entries: BTreeMap<Stage, Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The base workflow: greet with the reference tool, plan once, finish.
    pub fn builtin() -> Self {
        Self::new()
            .with(
                Stage::INITIAL,
                Action::Tool(ToolName::HELLO_WORLD),
                "Analyzing the user query and planning next steps",
            )
            .with(
                Stage::COORDINATOR,
                Action::Skill(SkillName::ANALYZE_AND_PLAN),
                "Coordinating the next actions based on the current state",
            )
            .with(
                Stage::COMPLETED,
                Action::Complete,
                "Workflow completed successfully",
            )
    }

    /// Add or replace the transition for `stage`.
    pub fn with(mut self, stage: Stage, action: Action, rationale: impl Into<String>) -> Self {
        self.insert(stage, action, rationale);
        self
    }

    pub fn insert(&mut self, stage: Stage, action: Action, rationale: impl Into<String>) {
        self.entries.insert(
            stage,
            Transition {
                action,
                rationale: rationale.into(),
            },
        );
    }

    pub fn get(&self, stage: &Stage) -> Option<&Transition> {
        self.entries.get(stage)
    }

    /// Declared stages in sorted order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Stage, &Transition)> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Coordinator {
    table: TransitionTable,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(TransitionTable::builtin())
    }
}

impl Coordinator {
    pub fn new(table: TransitionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Decide the next action for `state`.
    pub fn next_action(&self, state: &AgentState) -> Decision {
        let stage = state.current_stage();
        let decision = match self.table.get(stage) {
            Some(Transition { action, rationale }) => match action {
                Action::Skill(skill) => Decision::skill(skill.clone(), rationale.as_str()),
                Action::Tool(tool) => Decision::tool(tool.clone(), rationale.as_str()),
                Action::Complete => Decision::complete(rationale.as_str()),
            },
            None => Decision::noop(format!("No transition defined for stage: {stage}")),
        };
        debug!(
            %stage,
            action = decision.kind().as_str(),
            rationale = decision.rationale(),
            "coordinator decision"
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ActionKind;
    use crate::test_support::state_at;

    #[test]
    fn builtin_table_drives_tool_then_skill_then_complete() {
        let coordinator = Coordinator::default();

        assert_eq!(
            coordinator.next_action(&state_at(Stage::INITIAL)),
            Decision::tool(
                ToolName::HELLO_WORLD,
                "Analyzing the user query and planning next steps"
            )
        );
        assert_eq!(
            coordinator.next_action(&state_at(Stage::COORDINATOR)).kind(),
            ActionKind::InvokeSkill
        );
        assert_eq!(
            coordinator.next_action(&state_at(Stage::COMPLETED)),
            Decision::complete("Workflow completed successfully")
        );
    }

    #[test]
    fn next_action_is_deterministic() {
        let coordinator = Coordinator::default();
        for stage in [
            Stage::INITIAL,
            Stage::COORDINATOR,
            Stage::COMPLETED,
            Stage::new("UNKNOWN"),
        ] {
            let state = state_at(stage);
            assert_eq!(coordinator.next_action(&state), coordinator.next_action(&state));
        }
    }

    #[test]
    fn missing_stage_yields_noop_naming_the_stage() {
        let coordinator = Coordinator::default();
        let decision = coordinator.next_action(&state_at(Stage::new("REVIEW")));
        assert_eq!(decision.kind(), ActionKind::Noop);
        assert_eq!(
            decision.rationale(),
            "No transition defined for stage: REVIEW"
        );
    }

    #[test]
    fn custom_stages_extend_the_table() {
        let review = Stage::new("REVIEW");
        let table = TransitionTable::builtin().with(
            review.clone(),
            Action::Tool(ToolName::new("lint")),
            "Review the plan",
        );
        let coordinator = Coordinator::new(table);

        assert_eq!(
            coordinator.next_action(&state_at(review)),
            Decision::tool(ToolName::new("lint"), "Review the plan")
        );
        assert_eq!(coordinator.table().stages().count(), 4);
    }

    #[test]
    fn later_insert_replaces_transition() {
        let table = TransitionTable::builtin().with(Stage::INITIAL, Action::Complete, "skip");
        let coordinator = Coordinator::new(table);
        assert_eq!(
            coordinator.next_action(&state_at(Stage::INITIAL)),
            Decision::complete("skip")
        );
    }
}
