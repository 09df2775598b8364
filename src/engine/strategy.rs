//! Error-handling strategies
//!
//! A strategy decides what happens to an action that returned a failure
//! result or raised an `ActionError`:
//! - `Err(ExecutorError::Aborted)` stops the run
//! - `Ok(result)` records a failure and moves on
//! - `Ok(ActionResult::retry(..))` asks the runner to run the action again
//!
//! Strategies are stateless. The runner owns the attempt counter for each
//! action execution and passes it in.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::error::{ActionError, ExecutorError};
use super::result::ActionResult;
use crate::workflow::{Action, ErrorStrategyConfig, FallbackStrategy};

/// Policy applied to failing actions
///
/// Neither method takes a display label. Implementations that log or build
/// messages use `action.display_name()`, which renders as `name (Type)`.
pub trait ErrorHandlingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Decide on an action that raised an error
    ///
    /// `attempt` counts invocations of this action so far, starting at 1.
    fn handle_action_error(
        &self,
        error: ActionError,
        action: &Action,
        attempt: u32,
    ) -> Result<ActionResult, ExecutorError>;

    /// Decide on an action that returned a failure result
    ///
    /// `attempt` counts the same way as in `handle_action_error`.
    fn handle_action_failure(
        &self,
        result: ActionResult,
        action: &Action,
        attempt: u32,
    ) -> Result<ActionResult, ExecutorError>;
}

/// Abort on the first failure
#[derive(Debug, Clone, Copy, Default)]
pub struct StopOnError;

impl ErrorHandlingStrategy for StopOnError {
    fn name(&self) -> &'static str {
        "stop"
    }

    fn handle_action_error(
        &self,
        error: ActionError,
        action: &Action,
        _attempt: u32,
    ) -> Result<ActionResult, ExecutorError> {
        warn!("{} raised an error, stopping: {}", action.display_name(), error);
        Err(ExecutorError::Aborted(error))
    }

    fn handle_action_failure(
        &self,
        result: ActionResult,
        action: &Action,
        _attempt: u32,
    ) -> Result<ActionResult, ExecutorError> {
        warn!("{} failed, stopping: {}", action.display_name(), result.message());
        Err(ExecutorError::Aborted(ActionError::for_action(
            action,
            result.message(),
        )))
    }
}

/// Record failures and keep going
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinueOnError;

impl ErrorHandlingStrategy for ContinueOnError {
    fn name(&self) -> &'static str {
        "continue"
    }

    fn handle_action_error(
        &self,
        error: ActionError,
        action: &Action,
        _attempt: u32,
    ) -> Result<ActionResult, ExecutorError> {
        warn!("{} raised an error, continuing: {}", action.display_name(), error);
        Ok(ActionResult::failure(error.to_string()).with_data("error_type", "ActionError"))
    }

    fn handle_action_failure(
        &self,
        result: ActionResult,
        action: &Action,
        _attempt: u32,
    ) -> Result<ActionResult, ExecutorError> {
        warn!("{} failed, continuing: {}", action.display_name(), result.message());
        Ok(result)
    }
}

/// Re-run failing actions before handing over to a fallback
#[derive(Debug, Clone)]
pub struct RetryOnError {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub fallback: FallbackStrategy,
}

impl RetryOnError {
    pub fn new(max_retries: u32, retry_delay: Duration, fallback: FallbackStrategy) -> Self {
        Self {
            max_retries,
            retry_delay,
            fallback,
        }
    }

    /// Control-flow actions are never retried as a whole; their leaf
    /// actions already went through this strategy.
    fn should_retry(&self, action: &Action, attempt: u32) -> bool {
        !action.is_control_flow() && attempt <= self.max_retries
    }

    fn fallback(&self) -> &dyn ErrorHandlingStrategy {
        match self.fallback {
            FallbackStrategy::Stop => &StopOnError,
            FallbackStrategy::Continue => &ContinueOnError,
        }
    }
}

impl ErrorHandlingStrategy for RetryOnError {
    fn name(&self) -> &'static str {
        "retry"
    }

    fn handle_action_error(
        &self,
        error: ActionError,
        action: &Action,
        attempt: u32,
    ) -> Result<ActionResult, ExecutorError> {
        if self.should_retry(action, attempt) {
            info!(
                "{} raised an error (attempt {}/{}), retrying after {}ms: {}",
                action.display_name(),
                attempt,
                self.max_retries + 1,
                self.retry_delay.as_millis(),
                error
            );
            return Ok(ActionResult::retry(error.to_string(), self.retry_delay));
        }
        self.fallback().handle_action_error(error, action, attempt)
    }

    fn handle_action_failure(
        &self,
        result: ActionResult,
        action: &Action,
        attempt: u32,
    ) -> Result<ActionResult, ExecutorError> {
        if self.should_retry(action, attempt) {
            info!(
                "{} failed (attempt {}/{}), retrying after {}ms: {}",
                action.display_name(),
                attempt,
                self.max_retries + 1,
                self.retry_delay.as_millis(),
                result.message()
            );
            return Ok(ActionResult::retry(result.message(), self.retry_delay));
        }
        self.fallback().handle_action_failure(result, action, attempt)
    }
}

impl ErrorStrategyConfig {
    /// Build the configured strategy
    pub fn build(&self) -> Arc<dyn ErrorHandlingStrategy> {
        match self {
            ErrorStrategyConfig::Stop => Arc::new(StopOnError),
            ErrorStrategyConfig::Continue => Arc::new(ContinueOnError),
            ErrorStrategyConfig::Retry {
                max_retries,
                retry_delay_ms,
                fallback,
            } => Arc::new(RetryOnError::new(
                *max_retries,
                Duration::from_millis(*retry_delay_ms),
                *fallback,
            )),
        }
    }
}
