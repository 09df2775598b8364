//! Action types
//!
//! An action is one step of a workflow. Atomic actions (navigate, click, type,
//! wait, screenshot) talk to the browser driver. Control-flow actions
//! (conditional, loop, error handling, template) own nested action lists that
//! the runner executes through its control-flow handlers.
//!
//! The serialized form is a flat dictionary keyed by `"type"`:
//!
//! ```json
//! { "type": "Click", "name": "Submit", "selector": "#submit" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Discriminator for every action variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Navigate,
    Click,
    Type,
    Wait,
    Screenshot,
    Conditional,
    Loop,
    ErrorHandling,
    Template,
    JavaScriptCondition,
}

impl ActionType {
    /// Every registered action type, in registry order
    pub const ALL: [ActionType; 10] = [
        ActionType::Navigate,
        ActionType::Click,
        ActionType::Type,
        ActionType::Wait,
        ActionType::Screenshot,
        ActionType::Conditional,
        ActionType::Loop,
        ActionType::ErrorHandling,
        ActionType::Template,
        ActionType::JavaScriptCondition,
    ];

    /// The `"type"` string used in the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Navigate => "Navigate",
            ActionType::Click => "Click",
            ActionType::Type => "Type",
            ActionType::Wait => "Wait",
            ActionType::Screenshot => "Screenshot",
            ActionType::Conditional => "Conditional",
            ActionType::Loop => "Loop",
            ActionType::ErrorHandling => "ErrorHandling",
            ActionType::Template => "Template",
            ActionType::JavaScriptCondition => "JavaScriptCondition",
        }
    }

    /// Look up a type by its serialized name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Returns true if the runner dispatches this type to a control-flow handler
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            ActionType::Conditional
                | ActionType::Loop
                | ActionType::ErrorHandling
                | ActionType::Template
                | ActionType::JavaScriptCondition
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a `Type` action takes its text from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// `value_key` is the literal text
    #[default]
    Text,
    /// `value_key` is `<credential name>.<username|password>`
    Credential,
}

/// Condition kinds shared by `Conditional` and `while` loops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    ElementPresent,
    ElementNotPresent,
    VariableEquals,
    JavascriptEval,
}

/// Loop kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopType {
    Count,
    ForEach,
    While,
}

/// A resolved condition, built from the flat condition fields of an action
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    ElementPresent { selector: String },
    ElementNotPresent { selector: String },
    VariableEquals { variable_name: String, expected_value: String },
    JavaScript { script: String },
}

impl Condition {
    /// Build a condition from its flat fields, reporting the first missing one
    pub fn from_fields(
        condition_type: ConditionType,
        selector: Option<&String>,
        variable_name: Option<&String>,
        expected_value: Option<&String>,
        script: Option<&String>,
    ) -> Result<Self, String> {
        fn required(value: Option<&String>, field: &str, kind: &str) -> Result<String, String> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v.clone()),
                _ => Err(format!("'{}' is required for condition type '{}'", field, kind)),
            }
        }

        match condition_type {
            ConditionType::ElementPresent => Ok(Condition::ElementPresent {
                selector: required(selector, "selector", "element_present")?,
            }),
            ConditionType::ElementNotPresent => Ok(Condition::ElementNotPresent {
                selector: required(selector, "selector", "element_not_present")?,
            }),
            ConditionType::VariableEquals => Ok(Condition::VariableEquals {
                variable_name: required(variable_name, "variable_name", "variable_equals")?,
                // An empty expected value is a legitimate comparison target
                expected_value: expected_value.cloned().unwrap_or_default(),
            }),
            ConditionType::JavascriptEval => Ok(Condition::JavaScript {
                script: required(script, "script", "javascript_eval")?,
            }),
        }
    }
}

/// A single workflow step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Human-readable label, never empty
    pub name: String,

    /// Variant payload, tagged by `"type"`
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// Variant-specific action data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionKind {
    Navigate {
        url: String,
    },

    Click {
        selector: String,
    },

    Type {
        selector: String,
        #[serde(default)]
        value_type: ValueType,
        value_key: String,
    },

    Wait {
        duration_seconds: f64,
    },

    Screenshot {
        file_path: String,
    },

    Conditional {
        condition_type: ConditionType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script: Option<String>,
        #[serde(default)]
        true_branch: Vec<Action>,
        #[serde(default)]
        false_branch: Vec<Action>,
    },

    Loop {
        loop_type: LoopType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list_variable_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Vec<Value>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition_type: Option<ConditionType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_iterations: Option<u32>,
        #[serde(default)]
        loop_actions: Vec<Action>,
    },

    ErrorHandling {
        #[serde(default)]
        try_actions: Vec<Action>,
        #[serde(default)]
        catch_actions: Vec<Action>,
    },

    Template {
        template_name: String,
        #[serde(default)]
        parameters: HashMap<String, String>,
    },

    JavaScriptCondition {
        script: String,
        #[serde(default)]
        true_branch: Vec<Action>,
        #[serde(default)]
        false_branch: Vec<Action>,
    },
}

/// Structural problem found by [`Action::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid action at {path}: {reason}")]
pub struct ValidationError {
    /// Slash-separated path of action names from the root
    pub path: String,
    pub reason: String,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn navigate(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Navigate { url: url.into() })
    }

    pub fn click(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(
            name,
            ActionKind::Click {
                selector: selector.into(),
            },
        )
    }

    pub fn type_text(
        name: impl Into<String>,
        selector: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            ActionKind::Type {
                selector: selector.into(),
                value_type: ValueType::Text,
                value_key: text.into(),
            },
        )
    }

    /// Type a stored credential field, `credential_key` being `"<name>.<field>"`
    pub fn type_credential(
        name: impl Into<String>,
        selector: impl Into<String>,
        credential_key: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            ActionKind::Type {
                selector: selector.into(),
                value_type: ValueType::Credential,
                value_key: credential_key.into(),
            },
        )
    }

    pub fn wait(name: impl Into<String>, duration_seconds: f64) -> Self {
        Self::new(name, ActionKind::Wait { duration_seconds })
    }

    pub fn screenshot(name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self::new(
            name,
            ActionKind::Screenshot {
                file_path: file_path.into(),
            },
        )
    }

    pub fn variable_equals(
        name: impl Into<String>,
        variable_name: impl Into<String>,
        expected_value: impl Into<String>,
        true_branch: Vec<Action>,
        false_branch: Vec<Action>,
    ) -> Self {
        Self::new(
            name,
            ActionKind::Conditional {
                condition_type: ConditionType::VariableEquals,
                selector: None,
                variable_name: Some(variable_name.into()),
                expected_value: Some(expected_value.into()),
                script: None,
                true_branch,
                false_branch,
            },
        )
    }

    pub fn element_present(
        name: impl Into<String>,
        selector: impl Into<String>,
        true_branch: Vec<Action>,
        false_branch: Vec<Action>,
    ) -> Self {
        Self::new(
            name,
            ActionKind::Conditional {
                condition_type: ConditionType::ElementPresent,
                selector: Some(selector.into()),
                variable_name: None,
                expected_value: None,
                script: None,
                true_branch,
                false_branch,
            },
        )
    }

    pub fn count_loop(name: impl Into<String>, count: u32, loop_actions: Vec<Action>) -> Self {
        Self::new(
            name,
            ActionKind::Loop {
                loop_type: LoopType::Count,
                count: Some(count),
                list_variable_name: None,
                items: None,
                condition_type: None,
                selector: None,
                variable_name: None,
                expected_value: None,
                script: None,
                max_iterations: None,
                loop_actions,
            },
        )
    }

    pub fn for_each_loop(
        name: impl Into<String>,
        items: Vec<Value>,
        loop_actions: Vec<Action>,
    ) -> Self {
        Self::new(
            name,
            ActionKind::Loop {
                loop_type: LoopType::ForEach,
                count: None,
                list_variable_name: None,
                items: Some(items),
                condition_type: None,
                selector: None,
                variable_name: None,
                expected_value: None,
                script: None,
                max_iterations: None,
                loop_actions,
            },
        )
    }

    pub fn try_catch(
        name: impl Into<String>,
        try_actions: Vec<Action>,
        catch_actions: Vec<Action>,
    ) -> Self {
        Self::new(
            name,
            ActionKind::ErrorHandling {
                try_actions,
                catch_actions,
            },
        )
    }

    pub fn template(
        name: impl Into<String>,
        template_name: impl Into<String>,
        parameters: HashMap<String, String>,
    ) -> Self {
        Self::new(
            name,
            ActionKind::Template {
                template_name: template_name.into(),
                parameters,
            },
        )
    }

    /// The discriminator of this action's variant
    pub fn action_type(&self) -> ActionType {
        match &self.kind {
            ActionKind::Navigate { .. } => ActionType::Navigate,
            ActionKind::Click { .. } => ActionType::Click,
            ActionKind::Type { .. } => ActionType::Type,
            ActionKind::Wait { .. } => ActionType::Wait,
            ActionKind::Screenshot { .. } => ActionType::Screenshot,
            ActionKind::Conditional { .. } => ActionType::Conditional,
            ActionKind::Loop { .. } => ActionType::Loop,
            ActionKind::ErrorHandling { .. } => ActionType::ErrorHandling,
            ActionKind::Template { .. } => ActionType::Template,
            ActionKind::JavaScriptCondition { .. } => ActionType::JavaScriptCondition,
        }
    }

    pub fn is_control_flow(&self) -> bool {
        self.action_type().is_control_flow()
    }

    /// Label used in logs and error messages: `name (Type)`
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.action_type())
    }

    /// The condition guarding a conditional or `while` loop, if this action has one
    pub fn condition(&self) -> Option<Result<Condition, String>> {
        match &self.kind {
            ActionKind::Conditional {
                condition_type,
                selector,
                variable_name,
                expected_value,
                script,
                ..
            } => Some(Condition::from_fields(
                *condition_type,
                selector.as_ref(),
                variable_name.as_ref(),
                expected_value.as_ref(),
                script.as_ref(),
            )),
            ActionKind::JavaScriptCondition { script, .. } => {
                if script.trim().is_empty() {
                    Some(Err("'script' is required".to_string()))
                } else {
                    Some(Ok(Condition::JavaScript {
                        script: script.clone(),
                    }))
                }
            }
            ActionKind::Loop {
                loop_type: LoopType::While,
                condition_type,
                selector,
                variable_name,
                expected_value,
                script,
                ..
            } => Some(match condition_type {
                Some(condition_type) => Condition::from_fields(
                    *condition_type,
                    selector.as_ref(),
                    variable_name.as_ref(),
                    expected_value.as_ref(),
                    script.as_ref(),
                ),
                None => Err("'condition_type' is required for while loops".to_string()),
            }),
            _ => None,
        }
    }

    /// Nested action lists owned by this action
    pub fn branches(&self) -> Vec<(&'static str, &[Action])> {
        match &self.kind {
            ActionKind::Conditional {
                true_branch,
                false_branch,
                ..
            }
            | ActionKind::JavaScriptCondition {
                true_branch,
                false_branch,
                ..
            } => vec![
                ("true_branch", true_branch.as_slice()),
                ("false_branch", false_branch.as_slice()),
            ],
            ActionKind::Loop { loop_actions, .. } => vec![("loop_actions", loop_actions.as_slice())],
            ActionKind::ErrorHandling {
                try_actions,
                catch_actions,
            } => vec![
                ("try_actions", try_actions.as_slice()),
                ("catch_actions", catch_actions.as_slice()),
            ],
            _ => vec![],
        }
    }

    /// Check the structural invariants of this action and everything nested in it
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_at("")
    }

    fn validate_at(&self, parent: &str) -> Result<(), ValidationError> {
        let path = if parent.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", parent, self.name)
        };
        let invalid = |reason: String| ValidationError {
            path: path.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("action name cannot be empty".to_string()));
        }

        match &self.kind {
            ActionKind::Navigate { url } => {
                if url.trim().is_empty() {
                    return Err(invalid("url cannot be empty".to_string()));
                }
            }
            ActionKind::Click { selector } => {
                if selector.trim().is_empty() {
                    return Err(invalid("selector cannot be empty".to_string()));
                }
            }
            ActionKind::Type {
                selector,
                value_type,
                value_key,
            } => {
                if selector.trim().is_empty() {
                    return Err(invalid("selector cannot be empty".to_string()));
                }
                if *value_type == ValueType::Credential {
                    parse_credential_key(value_key).map_err(invalid)?;
                }
            }
            ActionKind::Wait { duration_seconds } => {
                if !duration_seconds.is_finite() || *duration_seconds < 0.0 {
                    return Err(invalid(format!(
                        "duration_seconds must be a non-negative number, got {}",
                        duration_seconds
                    )));
                }
            }
            ActionKind::Screenshot { file_path } => {
                if file_path.trim().is_empty() {
                    return Err(invalid("file_path cannot be empty".to_string()));
                }
            }
            ActionKind::Conditional { .. } | ActionKind::JavaScriptCondition { .. } => {
                if let Some(Err(reason)) = self.condition() {
                    return Err(invalid(reason));
                }
            }
            ActionKind::Loop {
                loop_type,
                count,
                list_variable_name,
                items,
                max_iterations,
                ..
            } => {
                match loop_type {
                    LoopType::Count => {
                        if count.is_none() {
                            return Err(invalid("'count' is required for count loops".to_string()));
                        }
                    }
                    LoopType::ForEach => {
                        let has_variable = list_variable_name
                            .as_ref()
                            .map(|n| !n.trim().is_empty())
                            .unwrap_or(false);
                        if items.is_none() && !has_variable {
                            return Err(invalid(
                                "for_each loops need 'items' or 'list_variable_name'".to_string(),
                            ));
                        }
                    }
                    LoopType::While => {
                        if let Some(Err(reason)) = self.condition() {
                            return Err(invalid(reason));
                        }
                    }
                }
                if *max_iterations == Some(0) {
                    return Err(invalid("max_iterations must be greater than 0".to_string()));
                }
            }
            ActionKind::ErrorHandling { .. } => {}
            ActionKind::Template { template_name, .. } => {
                if template_name.trim().is_empty() {
                    return Err(invalid("template_name cannot be empty".to_string()));
                }
            }
        }

        for (_, branch) in self.branches() {
            for child in branch {
                child.validate_at(&path)?;
            }
        }

        Ok(())
    }

    /// Serialize to the dictionary form accepted by the action factory
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Split a credential reference `"<name>.<field>"` into its parts
pub fn parse_credential_key(key: &str) -> Result<(&str, &str), String> {
    match key.rsplit_once('.') {
        Some((name, field)) if !name.is_empty() && (field == "username" || field == "password") => {
            Ok((name, field))
        }
        _ => Err(format!(
            "credential reference '{}' must look like '<name>.username' or '<name>.password'",
            key
        )),
    }
}
