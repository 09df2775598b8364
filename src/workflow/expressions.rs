//! Placeholder substitution and value comparison
//!
//! Templates use `{{ param }}` placeholders inside string values:
//! - `{{username}}` and `{{ username }}` are equivalent
//! - placeholders with no matching parameter are left as written
//! - keys of the action dictionary are never rewritten

use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::context::ExecutionContext;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Substitute all `{{ param }}` placeholders in a string
pub fn substitute(input: &str, params: &HashMap<String, String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(input, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Substitute placeholders in every string value of a JSON tree
pub fn substitute_value(value: &Value, params: &HashMap<String, String>) -> Value {
    match value {
        Value::String(s) => Value::String(substitute(s, params)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_value(item, params))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_value(v, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Render a JSON value the way it reads in a browser form field
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Truthiness of a value returned by a browser script
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            !s.is_empty()
                && s != "false"
                && s != "0"
                && s.to_lowercase() != "null"
                && s.to_lowercase() != "none"
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Compare a context variable against an expected string
///
/// A missing variable never equals anything, not even the empty string.
pub fn variable_equals(ctx: &ExecutionContext, variable_name: &str, expected: &str) -> bool {
    match ctx.get(variable_name) {
        Some(value) => value_to_string(value) == expected,
        None => false,
    }
}
