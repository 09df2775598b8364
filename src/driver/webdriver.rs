//! W3C WebDriver client - Selenium, chromedriver and geckodriver over HTTP
//!
//! Speaks the W3C WebDriver wire protocol directly with reqwest. Every
//! response body has the shape `{"value": ...}`; errors carry
//! `{"value": {"error": "...", "message": "..."}}`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Method;
use serde_json::{json, Value};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{DriverError, WebDriver};
use crate::workflow::{BrowserType, DriverConfig, DriverKind};

/// Key under which W3C element references are returned
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct WebDriverClient {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverClient {
    /// Open a new browser session on the configured endpoint
    pub async fn connect(config: &DriverConfig) -> Result<Self, DriverError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.page_load_timeout_ms + 5_000))
            .build()
            .map_err(|e| DriverError::StartupFailed(e.to_string()))?;

        let base_url = config.webdriver_url.trim_end_matches('/').to_string();
        info!(url = %base_url, browser = config.browser.as_str(), "Opening WebDriver session");

        let response = send(
            &client,
            Method::POST,
            &format!("{}/session", base_url),
            Some(capabilities(config.browser, config.headless)),
        )
        .await
        .map_err(|e| DriverError::StartupFailed(e.to_string()))?;

        let session_id = response["sessionId"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DriverError::StartupFailed("No session ID returned".to_string()))?;

        let driver = Self {
            client,
            base_url,
            session_id,
        };

        driver
            .command(
                Method::POST,
                "timeouts",
                Some(json!({
                    "implicit": 0,
                    "pageLoad": config.page_load_timeout_ms,
                })),
            )
            .await?;

        debug!(session_id = %driver.session_id, "WebDriver session ready");
        Ok(driver)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, DriverError> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.base_url, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.base_url, self.session_id, path)
        };
        send(&self.client, method, &url, body).await
    }

    async fn find_element(&self, selector: &str) -> Result<String, DriverError> {
        let value = self
            .command(
                Method::POST,
                "element",
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await?;
        value[ELEMENT_KEY]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DriverError::ElementNotFound(selector.to_string()))
    }
}

fn capabilities(browser: BrowserType, headless: bool) -> Value {
    let mut always_match = json!({ "browserName": browser.webdriver_name() });
    if headless {
        match browser {
            BrowserType::Chromium => {
                always_match["goog:chromeOptions"] = json!({ "args": ["--headless=new"] });
            }
            BrowserType::Firefox => {
                always_match["moz:firefoxOptions"] = json!({ "args": ["-headless"] });
            }
            BrowserType::Webkit => {}
        }
    }
    json!({ "capabilities": { "alwaysMatch": always_match } })
}

async fn send(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value, DriverError> {
    debug!("Executing {} {}", method, url);

    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            DriverError::Timeout(url.to_string())
        } else {
            DriverError::Http {
                status: 0,
                message: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| DriverError::Http {
        status: status.as_u16(),
        message: e.to_string(),
    })?;

    let payload: Value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text)?
    };
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        Ok(value)
    } else {
        Err(protocol_error(status.as_u16(), &value))
    }
}

fn protocol_error(status: u16, value: &Value) -> DriverError {
    let error = value["error"].as_str().unwrap_or("unknown error");
    let message = value["message"].as_str().unwrap_or("").to_string();
    match error {
        "no such element" => DriverError::ElementNotFound(message),
        "timeout" | "script timeout" => DriverError::Timeout(message),
        "invalid session id" => DriverError::Disconnected,
        _ => DriverError::Http {
            status,
            message: format!("{}: {}", error, message),
        },
    }
}

#[async_trait]
impl WebDriver for WebDriverClient {
    fn kind(&self) -> DriverKind {
        DriverKind::Selenium
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn click_element(&self, selector: &str) -> Result<(), DriverError> {
        let element = self.find_element(selector).await?;
        self.command(
            Method::POST,
            &format!("element/{}/click", element),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let element = self.find_element(selector).await?;
        self.command(
            Method::POST,
            &format!("element/{}/clear", element),
            Some(json!({})),
        )
        .await?;
        self.command(
            Method::POST,
            &format!("element/{}/value", element),
            Some(json!({ "text": text })),
        )
        .await?;
        Ok(())
    }

    async fn is_element_present(&self, selector: &str) -> Result<bool, DriverError> {
        let value = self
            .command(
                Method::POST,
                "elements",
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await?;
        Ok(value.as_array().map(|a| !a.is_empty()).unwrap_or(false))
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_element_present(selector).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(format!(
                    "waiting for '{}' after {:?}",
                    selector, timeout
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.command(
            Method::POST,
            "execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn take_screenshot(&self, path: &Path) -> Result<(), DriverError> {
        let value = self.command(Method::GET, "screenshot", None).await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| DriverError::ServerError("No screenshot data returned".to_string()))?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| DriverError::ServerError(format!("Invalid screenshot data: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let value = self.command(Method::GET, "url", None).await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| DriverError::ServerError("No URL returned".to_string()))
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.command(Method::DELETE, "", None).await?;
        Ok(())
    }
}
