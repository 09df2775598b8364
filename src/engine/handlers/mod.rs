//! Control-flow handlers
//!
//! Each branching action kind has a handler. Handlers never execute nested
//! actions themselves; they hand sub-sequences back to the runner through
//! `SequenceExecutor`, so nested actions get the same dispatch, stop checks
//! and error strategy as top-level ones.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

mod conditional;
mod error_handling;
mod loop_handler;
mod template;

pub use conditional::ConditionalHandler;
pub use error_handling::ErrorHandlingHandler;
pub use loop_handler::LoopHandler;
pub use template::TemplateHandler;

use super::error::{ExecutorError, WorkflowError};
use super::result::ActionResult;
use super::template::TemplateExpander;
use crate::driver::WebDriver;
use crate::workflow::{Action, ActionType, ExecutionContext};

/// Entry point for running a nested action list
#[async_trait]
pub trait SequenceExecutor: Send + Sync {
    /// Run actions in order, returning the result of each
    async fn execute_actions(
        &self,
        actions: &[Action],
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
    ) -> Result<Vec<ActionResult>, ExecutorError>;

    fn driver(&self) -> &dyn WebDriver;

    fn stop_requested(&self) -> bool;
}

#[async_trait]
pub trait ControlFlowHandler: Send + Sync {
    async fn handle(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
        executor: &dyn SequenceExecutor,
    ) -> Result<ActionResult, ExecutorError>;
}

/// Handlers for every control-flow action type
pub fn default_handlers(
    while_max_iterations: u32,
    expander: TemplateExpander,
) -> HashMap<ActionType, Arc<dyn ControlFlowHandler>> {
    let conditional: Arc<dyn ControlFlowHandler> = Arc::new(ConditionalHandler);
    let mut handlers: HashMap<ActionType, Arc<dyn ControlFlowHandler>> = HashMap::new();
    handlers.insert(ActionType::Conditional, conditional.clone());
    handlers.insert(ActionType::JavaScriptCondition, conditional);
    handlers.insert(
        ActionType::Loop,
        Arc::new(LoopHandler::new(while_max_iterations)),
    );
    handlers.insert(ActionType::ErrorHandling, Arc::new(ErrorHandlingHandler));
    handlers.insert(ActionType::Template, Arc::new(TemplateHandler::new(expander)));
    handlers
}

/// Structural error for a handler given the wrong action kind
pub(crate) fn mismatch(handler: &'static str, action: &Action) -> ExecutorError {
    WorkflowError::HandlerMismatch {
        handler,
        actual: action.action_type(),
        action_name: action.name.clone(),
    }
    .into()
}

/// Prefix for log lines of actions nested under `action`
pub(crate) fn nested_prefix(log_prefix: &str, label: &str) -> String {
    format!("{}{} > ", log_prefix, label)
}

pub(crate) fn count_failures(results: &[ActionResult]) -> usize {
    results.iter().filter(|r| !r.is_success()).count()
}
