//! Workflow Runner - Executes action lists and builds execution reports
//!
//! The runner:
//! 1. Walks the action list in order
//! 2. Runs atomic actions against the driver and hands control-flow actions
//!    to their handlers, which recurse back through `SequenceExecutor`
//! 3. Applies the error strategy to failures, retrying when it asks to
//! 4. Checks the stop signal before every action, nested ones included
//! 5. Collects top-level results into an `ExecutionReport`

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::error::{ExecutorError, WorkflowError};
use super::handlers::{default_handlers, ControlFlowHandler, SequenceExecutor};
use super::result::{ActionResult, ExecutionReport, ExecutionStatus, ReportSummary};
use super::strategy::{ErrorHandlingStrategy, StopOnError};
use super::template::TemplateExpander;
use crate::driver::WebDriver;
use crate::repository::{CredentialRepository, TemplateStore};
use crate::workflow::{Action, ActionType, ExecutionContext, LimitsConfig, RunnerConfig, Workflow};

/// Cooperative cancellation flag shared between the runner and its caller
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop; the runner honors it before its next action
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct WorkflowRunner {
    driver: Arc<dyn WebDriver>,
    credentials: Arc<dyn CredentialRepository>,
    strategy: Arc<dyn ErrorHandlingStrategy>,
    stop_signal: StopSignal,
    limits: LimitsConfig,
    templates: Option<Arc<dyn TemplateStore>>,
    handlers: HashMap<ActionType, Arc<dyn ControlFlowHandler>>,
}

impl WorkflowRunner {
    /// Create a runner with the stop-on-error strategy and no template store
    pub fn new(driver: Arc<dyn WebDriver>, credentials: Arc<dyn CredentialRepository>) -> Self {
        let limits = LimitsConfig::default();
        let handlers = default_handlers(
            limits.while_max_iterations,
            TemplateExpander::new(None, limits.template_max_depth),
        );
        Self {
            driver,
            credentials,
            strategy: Arc::new(StopOnError),
            stop_signal: StopSignal::new(),
            limits,
            templates: None,
            handlers,
        }
    }

    /// Create a runner with the strategy and limits of a runner config
    pub fn from_config(
        config: &RunnerConfig,
        driver: Arc<dyn WebDriver>,
        credentials: Arc<dyn CredentialRepository>,
    ) -> Self {
        Self::new(driver, credentials)
            .with_strategy(config.error_handling.build())
            .with_limits(config.limits.clone())
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ErrorHandlingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_stop_signal(mut self, stop_signal: StopSignal) -> Self {
        self.stop_signal = stop_signal;
        self
    }

    pub fn with_template_store(mut self, store: Arc<dyn TemplateStore>) -> Self {
        self.templates = Some(store);
        self.rebuild_handlers();
        self
    }

    pub fn with_limits(mut self, limits: LimitsConfig) -> Self {
        self.limits = limits;
        self.rebuild_handlers();
        self
    }

    fn rebuild_handlers(&mut self) {
        self.handlers = default_handlers(
            self.limits.while_max_iterations,
            TemplateExpander::new(self.templates.clone(), self.limits.template_max_depth),
        );
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop_signal.clone()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Run a workflow with its declared variables
    pub async fn run_workflow(&self, workflow: &Workflow) -> ExecutionReport {
        let ctx = ExecutionContext::with_variables(workflow.variables.clone());
        self.run_with_context(&workflow.actions, &workflow.name, ctx)
            .await
    }

    /// Run an action list with a fresh context
    pub async fn run(&self, actions: &[Action], workflow_name: &str) -> ExecutionReport {
        self.run_with_context(actions, workflow_name, ExecutionContext::new())
            .await
    }

    /// Run an action list with a caller-supplied context
    #[instrument(skip(self, actions, ctx), fields(run_id = %ctx.run_id, strategy = self.strategy.name()))]
    pub async fn run_with_context(
        &self,
        actions: &[Action],
        workflow_name: &str,
        mut ctx: ExecutionContext,
    ) -> ExecutionReport {
        info!(
            "Starting workflow '{}' ({} top-level actions)",
            workflow_name,
            actions.len()
        );
        let start_time = Utc::now();
        let timer = Instant::now();
        let mut results = Vec::new();

        let outcome = self
            .execute_into(actions, &mut ctx, &mut results, workflow_name, "")
            .await;

        let (final_status, error_message) = match outcome {
            Ok(()) if results.iter().all(ActionResult::is_success) => {
                (ExecutionStatus::Success, None)
            }
            Ok(()) => (ExecutionStatus::CompletedWithErrors, None),
            Err(e) if e.is_stop() => {
                warn!("Workflow '{}' stopped by request", workflow_name);
                (ExecutionStatus::Stopped, Some(e.to_string()))
            }
            Err(e) => {
                error!("Workflow '{}' failed: {}", workflow_name, e);
                (ExecutionStatus::Failed, Some(e.to_string()))
            }
        };

        let report = ExecutionReport {
            run_id: ctx.run_id.clone(),
            workflow_name: workflow_name.to_string(),
            final_status,
            summary: ReportSummary::from_results(&results),
            action_results: results,
            error_message,
            start_time,
            end_time: Utc::now(),
            duration_seconds: timer.elapsed().as_secs_f64(),
        };

        info!(
            "Workflow '{}' finished with status {} ({}/{} actions succeeded)",
            workflow_name,
            report.final_status,
            report.summary.success_count,
            report.summary.total_actions
        );
        report
    }

    /// Run actions in order, appending each result as it is produced
    ///
    /// On an abort the failing action's result is appended before the error
    /// propagates. A stop request appends nothing.
    async fn execute_into(
        &self,
        actions: &[Action],
        ctx: &mut ExecutionContext,
        results: &mut Vec<ActionResult>,
        workflow_name: &str,
        log_prefix: &str,
    ) -> Result<(), ExecutorError> {
        for action in actions {
            self.check_stop()?;

            match self
                .execute_with_policy(action, ctx, workflow_name, log_prefix)
                .await
            {
                Ok(result) => results.push(result),
                Err(e) if e.is_stop() => return Err(e),
                Err(e) => {
                    results.push(ActionResult::failure(e.to_string()));
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Execute one action node, applying the strategy and any retries
    ///
    /// The attempt counter lives in this frame, so reaching the same node
    /// again (another loop iteration, say) starts from the first attempt.
    async fn execute_with_policy(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
    ) -> Result<ActionResult, ExecutorError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let decision = match self.dispatch(action, ctx, workflow_name, log_prefix).await {
                Ok(result) if result.is_success() => {
                    debug!("{}{} succeeded: {}", log_prefix, action.display_name(), result.message());
                    return Ok(result);
                }
                Ok(result) => self.strategy.handle_action_failure(result, action, attempt)?,
                Err(ExecutorError::Action(e)) => {
                    self.strategy.handle_action_error(e, action, attempt)?
                }
                Err(other) => return Err(other),
            };

            match decision.retry_delay() {
                Some(delay) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    self.check_stop()?;
                    info!(
                        "{}Retrying {} (attempt {})",
                        log_prefix,
                        action.display_name(),
                        attempt + 1
                    );
                }
                None => return Ok(decision),
            }
        }
    }

    #[instrument(level = "debug", skip_all, fields(action = %action.name))]
    async fn dispatch(
        &self,
        action: &Action,
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
    ) -> Result<ActionResult, ExecutorError> {
        info!("{}Executing {}", log_prefix, action.display_name());

        if action.is_control_flow() {
            let handler = self
                .handlers
                .get(&action.action_type())
                .ok_or(WorkflowError::NoHandler(action.action_type()))?;
            handler
                .handle(action, ctx, workflow_name, log_prefix, self)
                .await
        } else {
            action
                .execute(self.driver.as_ref(), self.credentials.as_ref(), ctx)
                .await
        }
    }

    fn check_stop(&self) -> Result<(), ExecutorError> {
        if self.stop_signal.is_stopped() {
            Err(WorkflowError::Stopped.into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SequenceExecutor for WorkflowRunner {
    async fn execute_actions(
        &self,
        actions: &[Action],
        ctx: &mut ExecutionContext,
        workflow_name: &str,
        log_prefix: &str,
    ) -> Result<Vec<ActionResult>, ExecutorError> {
        let mut results = Vec::with_capacity(actions.len());
        self.execute_into(actions, ctx, &mut results, workflow_name, log_prefix)
            .await?;
        Ok(results)
    }

    fn driver(&self) -> &dyn WebDriver {
        self.driver.as_ref()
    }

    fn stop_requested(&self) -> bool {
        self.stop_signal.is_stopped()
    }
}
