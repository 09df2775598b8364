#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use autoqliq::driver::{DriverError, WebDriver};
use autoqliq::engine::StopSignal;
use autoqliq::workflow::DriverKind;
use serde_json::Value;
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_workflow(dir: &Path, filename: &str, content: &str) {
    fs::write(dir.join(filename), content).expect("Failed to write workflow file");
}

pub fn write_runner_config(dir: &Path, content: &str) {
    fs::write(dir.join("runner.yaml"), content).expect("Failed to write runner.yaml");
}

pub fn wait_only_workflow(name: &str) -> String {
    format!(
        r#"
name: {}
actions:
  - type: Wait
    name: Short pause
    duration_seconds: 0.01
"#,
        name
    )
}

/// In-memory driver that records every call
///
/// Selectors in `failing` raise `ElementNotFound`, selectors in `present`
/// report as present, and `fail_times` makes the first N clicks fail.
#[derive(Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    present: Mutex<HashSet<String>>,
    script_results: Mutex<HashMap<String, Value>>,
    fail_clicks_remaining: AtomicU32,
    stop_on: Mutex<Option<(String, StopSignal)>>,
}

impl RecordingDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_selector(&self, selector: &str) {
        self.failing.lock().unwrap().insert(selector.to_string());
    }

    pub fn set_present(&self, selector: &str) {
        self.present.lock().unwrap().insert(selector.to_string());
    }

    pub fn set_script_result(&self, script: &str, value: Value) {
        self.script_results
            .lock()
            .unwrap()
            .insert(script.to_string(), value);
    }

    /// Make the next `times` clicks fail before succeeding
    pub fn fail_clicks(&self, times: u32) {
        self.fail_clicks_remaining.store(times, Ordering::SeqCst);
    }

    /// Raise `signal` when a call with this exact log entry is made
    pub fn stop_on(&self, call: &str, signal: StopSignal) {
        *self.stop_on.lock().unwrap() = Some((call.to_string(), signal));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: String) {
        if let Some((trigger, signal)) = self.stop_on.lock().unwrap().as_ref() {
            if *trigger == call {
                signal.stop();
            }
        }
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, selector: &str) -> Result<(), DriverError> {
        if self.failing.lock().unwrap().contains(selector) {
            Err(DriverError::ElementNotFound(selector.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WebDriver for RecordingDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Playwright
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.record(format!("navigate:{}", url));
        Ok(())
    }

    async fn click_element(&self, selector: &str) -> Result<(), DriverError> {
        self.record(format!("click:{}", selector));
        self.check(selector)?;
        let remaining = self.fail_clicks_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_clicks_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(DriverError::ElementNotFound(selector.to_string()));
        }
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.record(format!("type:{}={}", selector, text));
        self.check(selector)
    }

    async fn is_element_present(&self, selector: &str) -> Result<bool, DriverError> {
        self.record(format!("present:{}", selector));
        Ok(self.present.lock().unwrap().contains(selector))
    }

    async fn wait_for_element(&self, selector: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.record(format!("wait_for:{}", selector));
        self.check(selector)
    }

    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> Result<Value, DriverError> {
        self.record(format!("script:{}", script));
        Ok(self
            .script_results
            .lock()
            .unwrap()
            .get(script)
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn take_screenshot(&self, path: &Path) -> Result<(), DriverError> {
        self.record(format!("screenshot:{}", path.display()));
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok("about:blank".to_string())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.record("quit".to_string());
        Ok(())
    }
}
