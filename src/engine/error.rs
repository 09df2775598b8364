//! Executor error types
//!
//! Two families of errors flow through a run:
//! - `ActionError` - something went wrong inside one action. Strategies
//!   decide whether it aborts the run, is recorded, or is retried.
//! - `WorkflowError` - stop requests and structural problems. These bypass
//!   strategies and try/catch blocks entirely.

use std::error::Error as StdError;

use crate::repository::RepositoryError;
use crate::workflow::{Action, ActionType};

type BoxError = Box<dyn StdError + Send + Sync>;

/// Failure raised while executing a single action
#[derive(Debug, thiserror::Error)]
#[error("{}", self.render())]
pub struct ActionError {
    pub action_name: Option<String>,
    pub action_type: Option<ActionType>,
    pub message: String,
    #[source]
    cause: Option<BoxError>,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            action_name: None,
            action_type: None,
            message: message.into(),
            cause: None,
        }
    }

    /// Error attributed to a specific action
    pub fn for_action(action: &Action, message: impl Into<String>) -> Self {
        Self {
            action_name: Some(action.name.clone()),
            action_type: Some(action.action_type()),
            message: message.into(),
            cause: None,
        }
    }

    /// Chain an underlying error as the cause
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    fn render(&self) -> String {
        match (&self.action_name, &self.action_type) {
            (Some(name), Some(action_type)) => {
                format!("Action '{}' ({}) failed: {}", name, action_type, self.message)
            }
            (Some(name), None) => format!("Action '{}' failed: {}", name, self.message),
            _ => self.message.clone(),
        }
    }

    /// Wrap a store failure with the action it happened in
    pub fn from_repository(action: &Action, context: &str, error: RepositoryError) -> Self {
        Self::for_action(action, format!("{}: {}", context, error)).with_cause(error)
    }
}

/// Stop requests and structural problems
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Execution stopped by request")]
    Stopped,

    #[error("{handler} handler cannot handle {actual} action '{action_name}'")]
    HandlerMismatch {
        handler: &'static str,
        actual: ActionType,
        action_name: String,
    },

    #[error("No handler registered for {0} actions")]
    NoHandler(ActionType),

    #[error("{0} actions must be executed by the workflow runner")]
    RequiresRunner(ActionType),

    #[error("Template cycle detected: {}", .0.join(" -> "))]
    TemplateCycle(Vec<String>),

    #[error("Template nesting exceeds maximum depth {max_depth}: {}", .chain.join(" -> "))]
    TemplateDepthExceeded { max_depth: usize, chain: Vec<String> },
}

/// Errors that can occur during workflow execution
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Action failure not yet seen by a strategy
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Action failure a strategy already decided to propagate
    #[error("{0}")]
    Aborted(ActionError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl ExecutorError {
    /// Returns true for errors that bypass strategies and catch blocks
    pub fn is_control(&self) -> bool {
        matches!(self, ExecutorError::Workflow(_))
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, ExecutorError::Workflow(WorkflowError::Stopped))
    }

    /// Returns true if a try/catch block may handle this error
    pub fn is_catchable(&self) -> bool {
        matches!(self, ExecutorError::Action(_) | ExecutorError::Aborted(_))
    }

    /// Short name of the error kind, exposed to catch blocks
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExecutorError::Action(_) | ExecutorError::Aborted(_) => "ActionError",
            ExecutorError::Workflow(_) => "WorkflowError",
        }
    }
}
