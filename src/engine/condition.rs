//! Condition evaluation for conditionals and `while` loops

use tracing::debug;

use super::actions::driver_boundary;
use super::error::ActionError;
use crate::driver::WebDriver;
use crate::workflow::expressions::{is_truthy, variable_equals};
use crate::workflow::{Action, Condition, ExecutionContext};

/// Evaluate a condition against the page and the context
pub async fn evaluate_condition(
    action: &Action,
    condition: &Condition,
    driver: &dyn WebDriver,
    ctx: &ExecutionContext,
) -> Result<bool, ActionError> {
    let outcome = match condition {
        Condition::ElementPresent { selector } => driver_boundary(
            action,
            &format!("Failed to look up '{}'", selector),
            driver.is_element_present(selector).await,
        )?,
        Condition::ElementNotPresent { selector } => !driver_boundary(
            action,
            &format!("Failed to look up '{}'", selector),
            driver.is_element_present(selector).await,
        )?,
        Condition::VariableEquals {
            variable_name,
            expected_value,
        } => variable_equals(ctx, variable_name, expected_value),
        Condition::JavaScript { script } => {
            let value = driver_boundary(
                action,
                "Condition script failed",
                driver.execute_script(script, Vec::new()).await,
            )?;
            is_truthy(&value)
        }
    };
    debug!("Condition {:?} evaluated to {}", condition, outcome);
    Ok(outcome)
}

/// Resolve and evaluate the condition carried by a conditional or `while` action
pub async fn evaluate_action_condition(
    action: &Action,
    driver: &dyn WebDriver,
    ctx: &ExecutionContext,
) -> Result<bool, ActionError> {
    let condition = match action.condition() {
        Some(Ok(condition)) => condition,
        Some(Err(reason)) => return Err(ActionError::for_action(action, reason)),
        None => {
            return Err(ActionError::for_action(
                action,
                "Action carries no condition",
            ))
        }
    };
    evaluate_condition(action, &condition, driver, ctx).await
}
