//! Skill execution: prompt rendering, inference, output validation.

use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::core::retry::RetryPolicy;
use crate::core::schema::validate_against_schema;
use crate::core::types::SkillName;
use crate::error::AgentError;
use crate::io::config::InferenceConfig;
use crate::io::inference::{Inference, InferenceRequest};
use crate::io::prompt::PromptEngine;
use crate::skills::SkillCatalog;
use crate::state::AgentState;

/// Runs inference-backed skills against a state snapshot.
#[derive(Debug)]
pub struct SkillExecutor<I> {
    skills: SkillCatalog,
    prompts: PromptEngine,
    inference: I,
    retry: RetryPolicy,
    timeout: Duration,
}

impl<I: Inference> SkillExecutor<I> {
    pub fn new(skills: SkillCatalog, prompts: PromptEngine, inference: I) -> Self {
        let defaults = InferenceConfig::default();
        Self {
            skills,
            prompts,
            inference,
            retry: defaults.retry_policy(),
            timeout: defaults.timeout(),
        }
    }

    /// Built-in skills and templates with retry and timeout from `config`.
    pub fn from_config(config: &InferenceConfig, inference: I) -> Self {
        Self::new(SkillCatalog::builtin(), PromptEngine::builtin(), inference)
            .with_retry(config.retry_policy())
            .with_timeout(config.timeout())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn skills(&self) -> &SkillCatalog {
        &self.skills
    }

    pub fn inference(&self) -> &I {
        &self.inference
    }

    /// Render the skill's prompt from `state`, call inference, validate the result.
    ///
    /// Backend failures are retried per the retry policy. A payload that
    /// violates the output schema is rejected without retrying.
    #[instrument(skip_all, fields(skill = %skill))]
    pub fn execute(&self, skill: &SkillName, state: &AgentState) -> Result<Value, AgentError> {
        let definition = self.skills.get(skill)?;
        let prompt = self.prompts.render(definition.template_id, state)?;
        let request = InferenceRequest {
            prompt,
            output_schema: definition.output_schema.clone(),
            timeout: self.timeout,
        };

        let output = self.invoke_with_retry(skill, &request)?;
        validate_against_schema(&definition.output_schema, &output)
            .map_err(|err| AgentError::skill_call(skill, err))?;
        Ok(output)
    }

    fn invoke_with_retry(
        &self,
        skill: &SkillName,
        request: &InferenceRequest,
    ) -> Result<Value, AgentError> {
        let mut attempt = 1u32;
        loop {
            info!(attempt, "invoking inference");
            match self.inference.invoke(request) {
                Ok(output) => return Ok(output),
                Err(err) => match self.retry.backoff_after(attempt) {
                    Some(delay) => {
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %format!("{err:#}"),
                            "inference failed, retrying"
                        );
                        thread::sleep(delay);
                        attempt += 1;
                    }
                    None => {
                        warn!(attempt, error = %format!("{err:#}"), "inference failed, giving up");
                        return Err(AgentError::skill_call(skill, err));
                    }
                },
            }
        }
    }
}
