//! Atomic action implementations
//!
//! Control-flow actions are dispatched to handlers by the runner; everything
//! else runs here against the driver. Driver errors are wrapped into
//! `ActionError`s at this boundary.

mod browser;

use crate::driver::{DriverError, WebDriver};
use crate::engine::error::{ActionError, ExecutorError, WorkflowError};
use crate::engine::result::ActionResult;
use crate::repository::CredentialRepository;
use crate::workflow::{Action, ActionKind, ExecutionContext};

impl Action {
    /// Execute an atomic action
    ///
    /// Control-flow actions need the runner and return
    /// `WorkflowError::RequiresRunner`.
    pub async fn execute(
        &self,
        driver: &dyn WebDriver,
        credentials: &dyn CredentialRepository,
        _ctx: &mut ExecutionContext,
    ) -> Result<ActionResult, ExecutorError> {
        let result = match &self.kind {
            ActionKind::Navigate { url } => browser::navigate(self, driver, url).await?,
            ActionKind::Click { selector } => browser::click(self, driver, selector).await?,
            ActionKind::Type {
                selector,
                value_type,
                value_key,
            } => {
                browser::type_value(self, driver, credentials, selector, *value_type, value_key)
                    .await?
            }
            ActionKind::Wait { duration_seconds } => browser::wait(self, *duration_seconds).await?,
            ActionKind::Screenshot { file_path } => {
                browser::screenshot(self, driver, file_path).await?
            }
            _ => return Err(WorkflowError::RequiresRunner(self.action_type()).into()),
        };
        Ok(result)
    }
}

/// Wrap a driver failure with the action and operation it happened in
pub(crate) fn driver_boundary<T>(
    action: &Action,
    operation: &str,
    result: Result<T, DriverError>,
) -> Result<T, ActionError> {
    result.map_err(|e| ActionError::for_action(action, format!("{}: {}", operation, e)).with_cause(e))
}
