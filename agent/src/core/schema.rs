//! JSON Schema checks for capability outputs.

use anyhow::{Result, anyhow, bail};
use jsonschema::validator_for;
use serde_json::Value;

/// Validate `instance` against `schema`, collecting every violation.
pub fn validate_against_schema(schema: &Value, instance: &Value) -> Result<()> {
    let compiled = validator_for(schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("output schema validation failed: {}", messages.join("; "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stage_schema() -> Value {
        json!({
            "type": "object",
            "required": ["next_stage"],
            "properties": {
                "next_stage": {"type": "string", "enum": ["INITIAL", "COMPLETED"]}
            }
        })
    }

    #[test]
    fn accepts_conforming_instance() {
        validate_against_schema(&stage_schema(), &json!({"next_stage": "COMPLETED"}))
            .expect("valid");
    }

    #[test]
    fn rejects_enum_value_outside_declared_set() {
        let err = validate_against_schema(&stage_schema(), &json!({"next_stage": "DONE"}))
            .unwrap_err();
        assert!(err.to_string().contains("output schema validation failed"));
    }

    #[test]
    fn rejects_missing_required_field() {
        assert!(validate_against_schema(&stage_schema(), &json!({})).is_err());
    }
}
