//! Test-only helpers: deterministic states and scripted inference backends.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::core::types::Stage;
use crate::io::inference::{Inference, InferenceRequest};
use crate::state::AgentState;

/// Goal used by [`state_at`].
pub const TEST_GOAL: &str = "test goal";

/// State for [`TEST_GOAL`] that has walked the built-in path up to `stage`.
///
/// Anything past `INITIAL` carries an `INITIAL -> COORDINATOR` transition;
/// other stages add one more hop from `COORDINATOR`.
pub fn state_at(stage: Stage) -> AgentState {
    let mut state = AgentState::from_goal(TEST_GOAL);
    if stage == Stage::INITIAL {
        return state;
    }
    let workflow = Arc::make_mut(&mut state.workflow);
    workflow.record_transition(Stage::COORDINATOR, Some("tool ran".to_string()));
    workflow.record_transition(stage, Some("planned".to_string()));
    state
}

/// Well-formed analyze-and-plan payload pointing at `next_stage`.
pub fn planning_output(next_stage: Stage) -> Value {
    json!({
        "chain_of_thought": format!("moving to {next_stage}"),
        "next_stage": next_stage.as_str(),
    })
}

/// Inference backend that replays queued results and records each request.
///
/// `Err(message)` entries fail that call. An empty queue fails every call.
#[derive(Debug, Default)]
pub struct ScriptedInference {
    responses: Mutex<VecDeque<Result<Value, String>>>,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl ScriptedInference {
    pub fn new(responses: Vec<Result<Value, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `planning_output(next_stage)`.
    pub fn repeating(next_stage: Stage, times: usize) -> Self {
        Self::new(vec![Ok(planning_output(next_stage)); times])
    }

    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Queued results not consumed yet.
    pub fn remaining(&self) -> usize {
        self.responses.lock().expect("responses lock").len()
    }
}

impl Inference for ScriptedInference {
    fn invoke(&self, request: &InferenceRequest) -> Result<Value> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        match self.responses.lock().expect("responses lock").pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted inference exhausted")),
        }
    }
}

/// Inference backend that fails every call with the same message.
#[derive(Debug)]
pub struct FailingInference {
    message: String,
    calls: AtomicU32,
}

impl FailingInference {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Inference for FailingInference {
    fn invoke(&self, _request: &InferenceRequest) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("{}", self.message))
    }
}
