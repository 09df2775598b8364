//! Conditional and JavaScriptCondition handler

use async_trait::async_trait;
use tracing::info;

use super::{count_failures, mismatch, nested_prefix, ControlFlowHandler, SequenceExecutor};
use crate::engine::condition::evaluate_action_condition;
use crate::engine::error::ExecutorError;
use crate::engine::result::ActionResult;
use crate::workflow::{Action, ActionKind, ExecutionContext};

pub struct ConditionalHandler;

#[async_trait]
impl ControlFlowHandler for ConditionalHandler {
    async fn handle(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
        executor: &dyn SequenceExecutor,
    ) -> Result<ActionResult, ExecutorError> {
        let (true_branch, false_branch) = match &action.kind {
            ActionKind::Conditional {
                true_branch,
                false_branch,
                ..
            }
            | ActionKind::JavaScriptCondition {
                true_branch,
                false_branch,
                ..
            } => (true_branch, false_branch),
            _ => return Err(mismatch("Conditional", action)),
        };

        let outcome = evaluate_action_condition(action, executor.driver(), ctx).await?;
        let (branch, label) = if outcome {
            (true_branch, "true")
        } else {
            (false_branch, "false")
        };
        info!(
            "{}Condition of '{}' is {}, running {} branch ({} actions)",
            log_prefix,
            action.name,
            outcome,
            label,
            branch.len()
        );

        if branch.is_empty() {
            return Ok(ActionResult::success(format!(
                "Condition was {}; {} branch is empty",
                outcome, label
            ))
            .with_data("condition", outcome));
        }

        let prefix = nested_prefix(log_prefix, &format!("{} [{}]", action.name, label));
        let results = executor
            .execute_actions(branch, ctx, workflow_name, &prefix)
            .await?;

        let failures = count_failures(&results);
        let result = if failures == 0 {
            ActionResult::success(format!(
                "Condition was {}; {} branch completed",
                outcome, label
            ))
        } else {
            ActionResult::failure(format!(
                "Condition was {}; {} of {} actions in {} branch failed",
                outcome,
                failures,
                results.len(),
                label
            ))
        };
        Ok(result.with_data("condition", outcome))
    }
}
