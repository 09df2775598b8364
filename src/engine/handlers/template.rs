//! Template handler

use async_trait::async_trait;
use tracing::info;

use super::{count_failures, nested_prefix, ControlFlowHandler, SequenceExecutor};
use crate::engine::error::ExecutorError;
use crate::engine::result::ActionResult;
use crate::engine::template::TemplateExpander;
use crate::workflow::{Action, ActionKind, ExecutionContext};

pub struct TemplateHandler {
    expander: TemplateExpander,
}

impl TemplateHandler {
    pub fn new(expander: TemplateExpander) -> Self {
        Self { expander }
    }
}

#[async_trait]
impl ControlFlowHandler for TemplateHandler {
    async fn handle(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
        executor: &dyn SequenceExecutor,
    ) -> Result<ActionResult, ExecutorError> {
        // expand() rejects other kinds with a mismatch error
        let actions = self.expander.expand(action, ctx)?;
        let template_name = match &action.kind {
            ActionKind::Template { template_name, .. } => template_name.as_str(),
            _ => action.name.as_str(),
        };
        info!(
            "{}Running template '{}' ({} actions)",
            log_prefix,
            template_name,
            actions.len()
        );

        let prefix = nested_prefix(log_prefix, &format!("{} <{}>", action.name, template_name));
        ctx.push_template(template_name);
        let outcome = executor
            .execute_actions(&actions, ctx, workflow_name, &prefix)
            .await;
        ctx.pop_template();
        let results = outcome?;

        let failures = count_failures(&results);
        if failures == 0 {
            Ok(ActionResult::success(format!(
                "Template '{}' completed ({} actions)",
                template_name,
                results.len()
            )))
        } else {
            Ok(ActionResult::failure(format!(
                "Template '{}': {} of {} actions failed",
                template_name,
                failures,
                results.len()
            )))
        }
    }
}
