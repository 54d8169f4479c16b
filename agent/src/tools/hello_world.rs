//! Reference tool that echoes its request back.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AgentState;

use super::Tool;

const HELLO_WORLD_RESPONSE_SCHEMA: &str =
    include_str!("../../schemas/hello_world_response.schema.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloWorldRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloWorldResponse {
    pub message: String,
}

/// Connectivity check that needs no external service.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelloWorldTool;

impl Tool for HelloWorldTool {
    fn call(&self, request: &Value) -> Result<Value> {
        let request: HelloWorldRequest =
            serde_json::from_value(request.clone()).context("parse hello_world request")?;
        let response = HelloWorldResponse {
            message: format!("Hello, you sent: {}", request.query),
        };
        Ok(serde_json::to_value(response)?)
    }
}

/// Build the tool request from the workflow goal.
pub fn build_request(state: &AgentState) -> Result<Value> {
    let request = HelloWorldRequest {
        query: state.goal().to_string(),
    };
    Ok(serde_json::to_value(request)?)
}

pub(crate) fn response_schema() -> Value {
    serde_json::from_str(HELLO_WORLD_RESPONSE_SCHEMA)
        .expect("hello_world response schema should be valid json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn echoes_query_inside_message() {
        let response = HelloWorldTool
            .call(&json!({"query": "test goal"}))
            .expect("call");
        assert_eq!(response, json!({"message": "Hello, you sent: test goal"}));
    }

    #[test]
    fn request_carries_the_goal() {
        let request = build_request(&AgentState::from_goal("test goal")).expect("request");
        assert_eq!(request, json!({"query": "test goal"}));
    }

    #[test]
    fn malformed_request_is_an_error() {
        let err = HelloWorldTool.call(&json!({"q": 1})).unwrap_err();
        assert!(err.to_string().contains("parse hello_world request"));
    }
}
