//! Playwright driver - browser automation via a Node.js Playwright server
//!
//! The server script is spawned as a child process and spoken to over
//! JSON-RPC. One browser and one page are opened on start and used for the
//! whole run.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::rpc::{send_request, spawn_communication_task, RequestSender};
use super::{DriverError, WebDriver};
use crate::workflow::{BrowserType, DriverConfig, DriverKind};

pub struct PlaywrightDriver {
    request_tx: RequestSender,
    browser_id: String,
    page_id: String,
    #[allow(dead_code)]
    child: Child,
}

impl PlaywrightDriver {
    /// Spawn the server, launch a browser and open a page
    pub async fn start(config: &DriverConfig) -> Result<Self, DriverError> {
        let node = resolve_node(config.node_binary.as_deref())?;
        info!(node = %node.display(), script = %config.server_script, "Starting Playwright server");

        let mut child = Command::new(&node)
            .arg(&config.server_script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DriverError::StartupFailed(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DriverError::StartupFailed("server stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::StartupFailed("server stdout unavailable".to_string()))?;

        let (request_tx, request_rx) = mpsc::channel(100);
        spawn_communication_task(request_rx, stdin, stdout);

        let browser_id = browser_launch(&request_tx, config.browser, config.headless).await?;
        let page_id = page_new(&request_tx, &browser_id).await?;

        send_request(
            &request_tx,
            "page.setDefaultTimeout",
            json!({ "pageId": page_id, "timeout": config.element_timeout_ms }),
        )
        .await?;

        debug!(%browser_id, %page_id, "Playwright page ready");

        Ok(Self {
            request_tx,
            browser_id,
            page_id,
            child,
        })
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, DriverError> {
        send_request(&self.request_tx, method, params).await
    }
}

fn resolve_node(configured: Option<&str>) -> Result<PathBuf, DriverError> {
    match configured {
        Some(path) => Ok(PathBuf::from(path)),
        None => which::which("node")
            .map_err(|e| DriverError::StartupFailed(format!("node not found on PATH: {}", e))),
    }
}

async fn browser_launch(
    request_tx: &RequestSender,
    browser_type: BrowserType,
    headless: bool,
) -> Result<String, DriverError> {
    let result = send_request(
        request_tx,
        "browser.launch",
        json!({
            "browserType": browser_type.as_str(),
            "headless": headless,
        }),
    )
    .await?;
    result["browserId"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| DriverError::ServerError("No browser ID returned".to_string()))
}

async fn page_new(request_tx: &RequestSender, browser_id: &str) -> Result<String, DriverError> {
    let result = send_request(request_tx, "page.new", json!({ "browserId": browser_id })).await?;
    result["pageId"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| DriverError::ServerError("No page ID returned".to_string()))
}

#[async_trait]
impl WebDriver for PlaywrightDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Playwright
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.request("page.goto", json!({ "pageId": self.page_id, "url": url }))
            .await?;
        Ok(())
    }

    async fn click_element(&self, selector: &str) -> Result<(), DriverError> {
        self.request(
            "element.click",
            json!({ "pageId": self.page_id, "selector": selector }),
        )
        .await?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.request(
            "element.fill",
            json!({ "pageId": self.page_id, "selector": selector, "value": text }),
        )
        .await?;
        Ok(())
    }

    async fn is_element_present(&self, selector: &str) -> Result<bool, DriverError> {
        let result = self
            .request(
                "element.count",
                json!({ "pageId": self.page_id, "selector": selector }),
            )
            .await?;
        Ok(result["count"].as_u64().unwrap_or(0) > 0)
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        self.request(
            "wait.selector",
            json!({
                "pageId": self.page_id,
                "selector": selector,
                "timeout": timeout.as_millis() as u64,
            }),
        )
        .await?;
        Ok(())
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        let result = self
            .request(
                "page.evaluate",
                json!({ "pageId": self.page_id, "script": script, "args": args }),
            )
            .await?;
        Ok(result.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn take_screenshot(&self, path: &Path) -> Result<(), DriverError> {
        self.request(
            "page.screenshot",
            json!({ "pageId": self.page_id, "path": path.display().to_string() }),
        )
        .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let result = self
            .request("page.url", json!({ "pageId": self.page_id }))
            .await?;
        result["url"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DriverError::ServerError("No URL returned".to_string()))
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.request("browser.close", json!({ "browserId": self.browser_id }))
            .await?;
        Ok(())
    }
}
