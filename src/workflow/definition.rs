//! Workflow definition

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::action::{Action, ValidationError};

/// A named, ordered list of top-level actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow name (required)
    pub name: String,

    /// Initial context variables for each run
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub variables: HashMap<String, Value>,

    /// Actions to execute, in order
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            variables: HashMap::new(),
            actions,
        }
    }

    /// Validate every action, nested ones included
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError {
                path: String::new(),
                reason: "workflow name cannot be empty".to_string(),
            });
        }
        for action in &self.actions {
            action.validate()?;
        }
        Ok(())
    }

    /// Number of actions including everything nested in branches
    pub fn action_count(&self) -> usize {
        fn count(actions: &[Action]) -> usize {
            actions
                .iter()
                .map(|a| 1 + a.branches().iter().map(|(_, b)| count(b)).sum::<usize>())
                .sum()
        }
        count(&self.actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        let workflow = Workflow::new(
            "login",
            vec![
                Action::navigate("Open", "https://a.test"),
                Action::click("Submit", "#submit"),
            ],
        );
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_name() {
        let workflow = Workflow::new(" ", vec![]);
        assert!(workflow.validate().is_err());
    }

    #[test]
    fn test_validate_nested_error() {
        let workflow = Workflow::new(
            "wf",
            vec![Action::try_catch(
                "Guard",
                vec![Action::navigate("Open", "")],
                vec![],
            )],
        );
        let err = workflow.validate().unwrap_err();
        assert_eq!(err.path, "Guard/Open");
    }

    #[test]
    fn test_action_count() {
        let workflow = Workflow::new(
            "wf",
            vec![
                Action::wait("Pause", 0.0),
                Action::count_loop(
                    "Repeat",
                    3,
                    vec![Action::click("A", "#a"), Action::click("B", "#b")],
                ),
            ],
        );
        assert_eq!(workflow.action_count(), 4);
    }
}
