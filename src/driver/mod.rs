//! Browser drivers
//!
//! The engine talks to the browser only through the `WebDriver` trait:
//! - `playwright`: Playwright via a Node.js server over JSON-RPC
//! - `webdriver`: any W3C WebDriver endpoint over HTTP
//! - `LazyDriver`: defers starting either one until the first browser call

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

pub mod playwright;
pub mod rpc;
pub mod webdriver;

pub use playwright::PlaywrightDriver;
pub use webdriver::WebDriverClient;

use crate::workflow::{DriverConfig, DriverKind};

/// Common error type for driver operations
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Failed to start driver: {0}")]
    StartupFailed(String),

    #[error("Driver disconnected")]
    Disconnected,

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Browser operations used by actions and condition checks
#[async_trait]
pub trait WebDriver: Send + Sync {
    fn kind(&self) -> DriverKind;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn click_element(&self, selector: &str) -> Result<(), DriverError>;

    /// Replace the content of an input with `text`
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError>;

    /// Returns true if at least one element matches the selector right now
    async fn is_element_present(&self, selector: &str) -> Result<bool, DriverError>;

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Run a script in the page and return its result
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;

    async fn take_screenshot(&self, path: &Path) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn quit(&self) -> Result<(), DriverError>;
}

/// Start the driver selected by the configuration
pub async fn create_driver(config: &DriverConfig) -> Result<Box<dyn WebDriver>, DriverError> {
    match config.kind {
        DriverKind::Playwright => Ok(Box::new(PlaywrightDriver::start(config).await?)),
        DriverKind::Selenium => Ok(Box::new(WebDriverClient::connect(config).await?)),
    }
}

/// Driver that starts the configured backend on first use
///
/// Workflows that never touch the browser (waits only, variable checks)
/// run without a browser ever being launched.
pub struct LazyDriver {
    config: DriverConfig,
    inner: OnceCell<Box<dyn WebDriver>>,
}

impl LazyDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            inner: OnceCell::new(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.inner.initialized()
    }

    async fn driver(&self) -> Result<&dyn WebDriver, DriverError> {
        let driver = self
            .inner
            .get_or_try_init(|| async {
                info!(kind = %self.config.kind, "Starting browser driver");
                create_driver(&self.config).await
            })
            .await?;
        Ok(driver.as_ref())
    }
}

#[async_trait]
impl WebDriver for LazyDriver {
    fn kind(&self) -> DriverKind {
        self.config.kind
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.driver().await?.navigate(url).await
    }

    async fn click_element(&self, selector: &str) -> Result<(), DriverError> {
        self.driver().await?.click_element(selector).await
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.driver().await?.type_text(selector, text).await
    }

    async fn is_element_present(&self, selector: &str) -> Result<bool, DriverError> {
        self.driver().await?.is_element_present(selector).await
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        self.driver().await?.wait_for_element(selector, timeout).await
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.driver().await?.execute_script(script, args).await
    }

    async fn take_screenshot(&self, path: &Path) -> Result<(), DriverError> {
        self.driver().await?.take_screenshot(path).await
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.driver().await?.current_url().await
    }

    async fn quit(&self) -> Result<(), DriverError> {
        match self.inner.get() {
            Some(driver) => driver.quit().await,
            None => Ok(()),
        }
    }
}
