//! Action factory
//!
//! Builds [`Action`]s from their dictionary form. The `"type"` key is checked
//! against the registry of known types before the payload is deserialized, so
//! an unknown type is reported as such rather than as a generic serde error.

use serde_json::Value;

use super::action::{Action, ActionType};

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("Action data must be an object, got: {0}")]
    NotAnObject(String),

    #[error("Action data is missing the 'type' key")]
    MissingType,

    #[error("Unknown action type: {0}")]
    UnknownType(String),

    #[error("Invalid {action_type} action: {error}")]
    Invalid {
        action_type: String,
        error: serde_json::Error,
    },
}

pub struct ActionFactory;

impl ActionFactory {
    /// Registered action type names
    pub fn registered_types() -> Vec<&'static str> {
        ActionType::ALL.iter().map(|t| t.as_str()).collect()
    }

    /// Build one action from its dictionary form
    pub fn create_action(data: &Value) -> Result<Action, FactoryError> {
        let map = data
            .as_object()
            .ok_or_else(|| FactoryError::NotAnObject(type_name(data).to_string()))?;

        let type_name = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(FactoryError::MissingType)?;

        if ActionType::parse(type_name).is_none() {
            return Err(FactoryError::UnknownType(type_name.to_string()));
        }

        serde_json::from_value(data.clone()).map_err(|error| FactoryError::Invalid {
            action_type: type_name.to_string(),
            error,
        })
    }

    /// Build a list of actions, stopping at the first bad entry
    pub fn create_actions(data: &[Value]) -> Result<Vec<Action>, FactoryError> {
        data.iter().map(Self::create_action).collect()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
