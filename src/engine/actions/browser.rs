//! Browser action implementations

use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::driver_boundary;
use crate::driver::WebDriver;
use crate::engine::error::ActionError;
use crate::engine::result::ActionResult;
use crate::repository::CredentialRepository;
use crate::workflow::{parse_credential_key, Action, ValueType};

pub async fn navigate(
    action: &Action,
    driver: &dyn WebDriver,
    url: &str,
) -> Result<ActionResult, ActionError> {
    driver_boundary(
        action,
        &format!("Failed to navigate to {}", url),
        driver.navigate(url).await,
    )?;
    Ok(ActionResult::success(format!("Navigated to {}", url)).with_data("url", url))
}

pub async fn click(
    action: &Action,
    driver: &dyn WebDriver,
    selector: &str,
) -> Result<ActionResult, ActionError> {
    driver_boundary(
        action,
        &format!("Failed to click '{}'", selector),
        driver.click_element(selector).await,
    )?;
    Ok(ActionResult::success(format!("Clicked '{}'", selector)))
}

pub async fn type_value(
    action: &Action,
    driver: &dyn WebDriver,
    credentials: &dyn CredentialRepository,
    selector: &str,
    value_type: ValueType,
    value_key: &str,
) -> Result<ActionResult, ActionError> {
    let text = match value_type {
        ValueType::Text => value_key.to_string(),
        ValueType::Credential => {
            let (name, field) =
                parse_credential_key(value_key).map_err(|e| ActionError::for_action(action, e))?;
            let credential = credentials
                .get_by_name(name)
                .map_err(|e| ActionError::from_repository(action, "Credential lookup failed", e))?;
            match credential.as_ref().and_then(|c| c.field(field)) {
                Some(value) => value.to_string(),
                None => {
                    return Ok(ActionResult::failure(format!(
                        "Credential '{}' not found",
                        name
                    )))
                }
            }
        }
    };

    driver_boundary(
        action,
        &format!("Failed to type into '{}'", selector),
        driver.type_text(selector, &text).await,
    )?;

    // Never echo credential values
    let message = match value_type {
        ValueType::Text => format!("Typed text into '{}'", selector),
        ValueType::Credential => format!("Typed credential '{}' into '{}'", value_key, selector),
    };
    Ok(ActionResult::success(message))
}

pub async fn wait(action: &Action, duration_seconds: f64) -> Result<ActionResult, ActionError> {
    let duration = Duration::try_from_secs_f64(duration_seconds).map_err(|e| {
        ActionError::for_action(
            action,
            format!("Invalid wait duration {}: {}", duration_seconds, e),
        )
    })?;
    debug!("Waiting {:?}", duration);
    tokio::time::sleep(duration).await;
    Ok(ActionResult::success(format!(
        "Waited for {} seconds",
        duration_seconds
    )))
}

pub async fn screenshot(
    action: &Action,
    driver: &dyn WebDriver,
    file_path: &str,
) -> Result<ActionResult, ActionError> {
    driver_boundary(
        action,
        &format!("Failed to save screenshot to {}", file_path),
        driver.take_screenshot(Path::new(file_path)).await,
    )?;
    Ok(
        ActionResult::success(format!("Screenshot saved to {}", file_path))
            .with_data("file_path", file_path),
    )
}
