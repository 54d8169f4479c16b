//! Tool catalog: deterministic capabilities that need no inference call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::schema::validate_against_schema;
use crate::core::types::ToolName;
use crate::error::AgentError;
use crate::state::AgentState;

pub mod hello_world;

/// A synchronous external capability.
///
/// New tools only need to implement this shape; failures are reported as
/// errors and surface as [`AgentError::ToolCall`].
pub trait Tool: Send + Sync {
    fn call(&self, request: &Value) -> Result<Value>;
}

/// Derives a tool request from the current state.
pub type RequestBuilder = fn(&AgentState) -> Result<Value>;

#[derive(Clone)]
pub struct ToolDefinition {
    pub name: ToolName,
    pub build_request: RequestBuilder,
    pub tool: Arc<dyn Tool>,
    /// JSON Schema the tool response must satisfy.
    pub output_schema: Arc<Value>,
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("output_schema", &self.output_schema)
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    pub fn new(
        name: ToolName,
        build_request: RequestBuilder,
        tool: impl Tool + 'static,
        output_schema: Value,
    ) -> Self {
        Self {
            name,
            build_request,
            tool: Arc::new(tool),
            output_schema: Arc::new(output_schema),
        }
    }

    pub fn hello_world() -> Self {
        Self::new(
            ToolName::HELLO_WORLD,
            hello_world::build_request,
            hello_world::HelloWorldTool,
            hello_world::response_schema(),
        )
    }
}

/// Name -> definition lookup, built once before a run.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: HashMap<ToolName, ToolDefinition>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::from_definitions([ToolDefinition::hello_world()])
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = ToolDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.register(definition);
        }
        catalog
    }

    /// Add a tool. Re-registering a name replaces the earlier definition.
    pub fn register(&mut self, definition: ToolDefinition) {
        self.tools.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &ToolName) -> Result<&ToolDefinition, AgentError> {
        self.tools
            .get(name)
            .ok_or_else(|| AgentError::UnknownTool(name.clone()))
    }

    /// Build the request from `state`, call the tool, and validate its response.
    #[instrument(skip_all, fields(tool = %name))]
    pub fn call(&self, name: &ToolName, state: &AgentState) -> Result<Value, AgentError> {
        let definition = self.get(name)?;
        let request =
            (definition.build_request)(state).map_err(|err| AgentError::tool_call(name, err))?;
        info!("calling tool");
        let response = definition
            .tool
            .call(&request)
            .map_err(|err| AgentError::tool_call(name, err))?;
        validate_against_schema(&definition.output_schema, &response)
            .map_err(|err| AgentError::tool_call(name, err))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;

    struct BrokenTool;

    impl Tool for BrokenTool {
        fn call(&self, _request: &Value) -> Result<Value> {
            Err(anyhow!("connection refused"))
        }
    }

    struct WrongShapeTool;

    impl Tool for WrongShapeTool {
        fn call(&self, _request: &Value) -> Result<Value> {
            Ok(json!({"msg": 1}))
        }
    }

    #[test]
    fn builtin_hello_world_round_trip() {
        let response = ToolCatalog::builtin()
            .call(&ToolName::HELLO_WORLD, &AgentState::from_goal("test goal"))
            .expect("call");
        assert_eq!(response["message"], "Hello, you sent: test goal");
    }

    #[test]
    fn unknown_tool_is_a_configuration_error() {
        let err = ToolCatalog::builtin()
            .call(&ToolName::new("search"), &AgentState::from_goal("g"))
            .unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn tool_failure_is_wrapped_with_tool_name() {
        let catalog = ToolCatalog::from_definitions([ToolDefinition::new(
            ToolName::HELLO_WORLD,
            hello_world::build_request,
            BrokenTool,
            hello_world::response_schema(),
        )]);
        let err = catalog
            .call(&ToolName::HELLO_WORLD, &AgentState::from_goal("g"))
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::ToolCall { ref tool, .. } if *tool == ToolName::HELLO_WORLD
        ));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn response_outside_schema_is_rejected() {
        let mut catalog = ToolCatalog::builtin();
        catalog.register(ToolDefinition::new(
            ToolName::HELLO_WORLD,
            hello_world::build_request,
            WrongShapeTool,
            hello_world::response_schema(),
        ));
        let err = catalog
            .call(&ToolName::HELLO_WORLD, &AgentState::from_goal("g"))
            .unwrap_err();
        assert!(err.to_string().contains("output schema validation failed"));
    }
}
