//! Loop handler
//!
//! Per iteration the context gets `loop_index` (0-based), `loop_iteration`
//! (1-based), `loop_total` when the length is known, and `loop_item` for
//! `for_each` loops.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::{mismatch, nested_prefix, ControlFlowHandler, SequenceExecutor};
use crate::engine::condition::evaluate_action_condition;
use crate::engine::error::{ActionError, ExecutorError, WorkflowError};
use crate::engine::result::ActionResult;
use crate::workflow::{Action, ActionKind, ExecutionContext, LoopType};

pub struct LoopHandler {
    while_max_iterations: u32,
}

impl LoopHandler {
    pub fn new(while_max_iterations: u32) -> Self {
        Self {
            while_max_iterations,
        }
    }
}

struct LoopRun<'a> {
    action: &'a Action,
    body: &'a [Action],
    workflow_name: &'a str,
    log_prefix: &'a str,
    executor: &'a dyn SequenceExecutor,
    iterations: u32,
    failures: usize,
}

impl LoopRun<'_> {
    async fn iteration(
        &mut self,
        ctx: &mut ExecutionContext,
        total: Option<usize>,
        item: Option<&Value>,
    ) -> Result<(), ExecutorError> {
        if self.executor.stop_requested() {
            return Err(WorkflowError::Stopped.into());
        }

        let index = self.iterations;
        ctx.set("loop_index", index);
        ctx.set("loop_iteration", index + 1);
        if let Some(total) = total {
            ctx.set("loop_total", total);
        }
        if let Some(item) = item {
            ctx.set("loop_item", item.clone());
        }
        debug!("{}Loop '{}' iteration {}", self.log_prefix, self.action.name, index + 1);

        let prefix = nested_prefix(
            self.log_prefix,
            &format!("{} #{}", self.action.name, index + 1),
        );
        let results = self
            .executor
            .execute_actions(self.body, ctx, self.workflow_name, &prefix)
            .await?;

        self.failures += results.iter().filter(|r| !r.is_success()).count();
        self.iterations += 1;
        Ok(())
    }
}

#[async_trait]
impl ControlFlowHandler for LoopHandler {
    async fn handle(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
        executor: &dyn SequenceExecutor,
    ) -> Result<ActionResult, ExecutorError> {
        let ActionKind::Loop {
            loop_type,
            count,
            list_variable_name,
            items,
            max_iterations,
            loop_actions,
            ..
        } = &action.kind
        else {
            return Err(mismatch("Loop", action));
        };

        let mut run = LoopRun {
            action,
            body: loop_actions,
            workflow_name,
            log_prefix,
            executor,
            iterations: 0,
            failures: 0,
        };

        match loop_type {
            LoopType::Count => {
                let count = count.ok_or_else(|| {
                    ActionError::for_action(action, "'count' is required for count loops")
                })?;
                info!("{}Loop '{}' running {} times", log_prefix, action.name, count);
                for _ in 0..count {
                    run.iteration(ctx, Some(count as usize), None).await?;
                }
            }
            LoopType::ForEach => {
                let list = match (items, list_variable_name) {
                    (Some(items), _) => items.clone(),
                    (None, Some(name)) => match ctx.get(name) {
                        Some(Value::Array(list)) => list.clone(),
                        Some(other) => {
                            return Err(ActionError::for_action(
                                action,
                                format!("Variable '{}' is not a list: {}", name, other),
                            )
                            .into())
                        }
                        None => {
                            return Err(ActionError::for_action(
                                action,
                                format!("List variable '{}' not found", name),
                            )
                            .into())
                        }
                    },
                    (None, None) => {
                        return Err(ActionError::for_action(
                            action,
                            "for_each loops need 'items' or 'list_variable_name'",
                        )
                        .into())
                    }
                };
                info!(
                    "{}Loop '{}' iterating over {} items",
                    log_prefix,
                    action.name,
                    list.len()
                );
                for item in &list {
                    run.iteration(ctx, Some(list.len()), Some(item)).await?;
                }
            }
            LoopType::While => {
                let cap = max_iterations.unwrap_or(self.while_max_iterations);
                info!(
                    "{}Loop '{}' running while condition holds (max {})",
                    log_prefix, action.name, cap
                );
                while evaluate_action_condition(action, executor.driver(), ctx).await? {
                    if run.iterations >= cap {
                        return Err(ActionError::for_action(
                            action,
                            format!("While loop exceeded max iterations ({})", cap),
                        )
                        .into());
                    }
                    run.iteration(ctx, None, None).await?;
                }
            }
        }

        let result = if run.failures == 0 {
            ActionResult::success(format!("Loop completed {} iterations", run.iterations))
        } else {
            ActionResult::failure(format!(
                "Loop completed {} iterations with {} failed actions",
                run.iterations, run.failures
            ))
        };
        Ok(result.with_data("iterations", run.iterations))
    }
}
