//! Prompt rendering for inference-backed skills.
//!
//! Templates see the full state: `state` plus each memory region as a
//! top-level variable. Undefined variables are a render error, never an
//! empty string.

use anyhow::Result;
use minijinja::{Environment, UndefinedBehavior, context};
use tracing::debug;

use crate::error::AgentError;
use crate::skills::ANALYZE_AND_PLAN_TEMPLATE;
use crate::state::AgentState;

const ANALYZE_AND_PLAN_PROMPT: &str = include_str!("prompts/analyze_and_plan.md");

/// Template engine wrapper around minijinja.
#[derive(Debug)]
pub struct PromptEngine {
    env: Environment<'static>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptEngine {
    /// An engine with no templates registered.
    pub fn empty() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        Self { env }
    }

    /// An engine holding the templates of the built-in skills.
    pub fn builtin() -> Self {
        let mut engine = Self::empty();
        engine
            .add_template(ANALYZE_AND_PLAN_TEMPLATE, ANALYZE_AND_PLAN_PROMPT)
            .expect("analyze_and_plan template should be valid");
        engine
    }

    /// Register a template under `id`, replacing any previous one.
    pub fn add_template(&mut self, id: &'static str, source: &'static str) -> Result<()> {
        self.env.add_template(id, source)?;
        Ok(())
    }

    /// Render template `id` against the whole state.
    pub fn render(&self, id: &str, state: &AgentState) -> Result<String, AgentError> {
        let template_error = |err: minijinja::Error| AgentError::Template {
            template: id.to_string(),
            source: Box::new(err),
        };
        let template = self.env.get_template(id).map_err(template_error)?;
        let rendered = template
            .render(context! {
                state => state,
                core => &state.core,
                working => &state.working,
                workflow => &state.workflow,
                episodic => &state.episodic,
                semantic => &state.semantic,
                procedural => &state.procedural,
                resource => &state.resource,
            })
            .map_err(template_error)?;
        debug!(template = id, bytes = rendered.len(), "rendered prompt");
        Ok(rendered)
    }
}
