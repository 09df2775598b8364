//! Try/catch handler
//!
//! The try block counts as failed when it raises an action-level error or
//! completes with recorded failures. Catch actions run on a copy of the
//! context carrying `error`, `error_type`, `error_message` and
//! `try_block_error`, so those keys never leak into the enclosing scope.

use async_trait::async_trait;
use tracing::{info, warn};

use super::{count_failures, mismatch, nested_prefix, ControlFlowHandler, SequenceExecutor};
use crate::engine::error::{ActionError, ExecutorError};
use crate::engine::result::ActionResult;
use crate::workflow::{Action, ActionKind, ExecutionContext};

pub struct ErrorHandlingHandler;

/// Why the try block is considered failed
enum TryFailure {
    Raised(ExecutorError),
    Recorded { failures: usize, total: usize },
}

impl TryFailure {
    fn error_type(&self) -> &'static str {
        match self {
            TryFailure::Raised(e) => e.kind_name(),
            TryFailure::Recorded { .. } => "ActionFailure",
        }
    }

    fn message(&self) -> String {
        match self {
            TryFailure::Raised(e) => e.to_string(),
            TryFailure::Recorded { failures, total } => {
                format!("{} of {} actions in try block failed", failures, total)
            }
        }
    }
}

#[async_trait]
impl ControlFlowHandler for ErrorHandlingHandler {
    async fn handle(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
        executor: &dyn SequenceExecutor,
    ) -> Result<ActionResult, ExecutorError> {
        let ActionKind::ErrorHandling {
            try_actions,
            catch_actions,
        } = &action.kind
        else {
            return Err(mismatch("ErrorHandling", action));
        };

        let try_prefix = nested_prefix(log_prefix, &format!("{} [try]", action.name));
        let failure = match executor
            .execute_actions(try_actions, ctx, workflow_name, &try_prefix)
            .await
        {
            Ok(results) => {
                let failures = count_failures(&results);
                if failures == 0 {
                    return Ok(ActionResult::success(format!(
                        "Try block completed ({} actions)",
                        results.len()
                    )));
                }
                TryFailure::Recorded {
                    failures,
                    total: results.len(),
                }
            }
            Err(e) if e.is_catchable() => TryFailure::Raised(e),
            Err(e) => return Err(e),
        };

        if catch_actions.is_empty() {
            return match failure {
                TryFailure::Raised(e) => Err(e),
                recorded => Ok(ActionResult::failure(recorded.message())),
            };
        }

        let message = failure.message();
        warn!(
            "{}Try block of '{}' failed, running catch block: {}",
            log_prefix, action.name, message
        );

        let mut catch_ctx = ctx.with_error(failure.error_type(), &message);
        let catch_prefix = nested_prefix(log_prefix, &format!("{} [catch]", action.name));
        match executor
            .execute_actions(catch_actions, &mut catch_ctx, workflow_name, &catch_prefix)
            .await
        {
            Ok(results) => {
                let failures = count_failures(&results);
                if failures == 0 {
                    info!("{}Catch block of '{}' handled the error", log_prefix, action.name);
                    Ok(ActionResult::success(format!(
                        "Try block failed; catch block handled: {}",
                        message
                    ))
                    .with_data("try_block_error", message))
                } else {
                    Ok(ActionResult::failure(format!(
                        "Catch block had {} failed actions after try block failed: {}",
                        failures, message
                    )))
                }
            }
            Err(catch_error) if catch_error.is_catchable() => Err(ActionError::for_action(
                action,
                format!(
                    "Catch block failed: {} (original error: {})",
                    catch_error, message
                ),
            )
            .with_cause(catch_error)
            .into()),
            Err(control) => Err(control),
        }
    }
}
