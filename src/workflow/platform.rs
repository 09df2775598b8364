//! Browser driver configuration
//!
//! This module contains the configuration types for the two driver adapters:
//! - Playwright (JSON-RPC to a Node.js server process)
//! - Selenium (W3C WebDriver over HTTP)

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Driver Kind
// ============================================================================

/// Browser driver backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Playwright via a Node.js server (default)
    #[default]
    Playwright,
    /// Any W3C WebDriver endpoint (Selenium, chromedriver, geckodriver)
    Selenium,
}

impl DriverKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "playwright" => Some(DriverKind::Playwright),
            "selenium" | "webdriver" => Some(DriverKind::Selenium),
            _ => None,
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Playwright => f.write_str("playwright"),
            DriverKind::Selenium => f.write_str("selenium"),
        }
    }
}

/// Browser types supported
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::Chromium => "chromium",
            BrowserType::Firefox => "firefox",
            BrowserType::Webkit => "webkit",
        }
    }

    /// W3C `browserName` capability for this browser
    pub fn webdriver_name(&self) -> &'static str {
        match self {
            BrowserType::Chromium => "chrome",
            BrowserType::Firefox => "firefox",
            BrowserType::Webkit => "safari",
        }
    }
}

// ============================================================================
// Driver Configuration
// ============================================================================

/// Browser driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Which adapter to use
    #[serde(default)]
    pub kind: DriverKind,

    /// Browser to launch
    #[serde(default)]
    pub browser: BrowserType,

    /// Run in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// W3C WebDriver endpoint (Selenium only)
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Path to the Playwright server script (Playwright only)
    #[serde(default = "default_server_script")]
    pub server_script: String,

    /// Node.js binary; resolved on PATH when unset (Playwright only)
    #[serde(default)]
    pub node_binary: Option<String>,

    /// Default timeout for element lookups in milliseconds
    #[serde(default = "default_element_timeout")]
    pub element_timeout_ms: u64,

    /// Page load timeout in milliseconds
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_ms: u64,
}

fn default_headless() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_server_script() -> String {
    "extensions/playwright/server.js".to_string()
}

fn default_element_timeout() -> u64 {
    10_000
}

fn default_page_load_timeout() -> u64 {
    30_000
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            kind: DriverKind::default(),
            browser: BrowserType::default(),
            headless: default_headless(),
            webdriver_url: default_webdriver_url(),
            server_script: default_server_script(),
            node_binary: None,
            element_timeout_ms: default_element_timeout(),
            page_load_timeout_ms: default_page_load_timeout(),
        }
    }
}
