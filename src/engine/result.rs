//! Execution result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

const RETRY_KEY: &str = "retry";
const RETRY_DELAY_KEY: &str = "retry_delay_ms";

/// Outcome flag of one action execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Failure,
}

/// Result of one action execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    status: ActionStatus,
    message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    data: Map<String, Value>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Success,
            message: message.into(),
            data: Map::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ActionStatus::Failure,
            message: message.into(),
            data: Map::new(),
        }
    }

    /// Signal from a strategy asking the runner to run the action again
    pub fn retry(message: impl Into<String>, delay: Duration) -> Self {
        Self::failure(message)
            .with_data(RETRY_KEY, true)
            .with_data(RETRY_DELAY_KEY, delay.as_millis() as u64)
    }

    pub fn with_data(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn status(&self) -> ActionStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }

    pub fn is_retry_signal(&self) -> bool {
        self.data.get(RETRY_KEY).and_then(Value::as_bool) == Some(true)
    }

    /// Delay requested by a retry signal
    pub fn retry_delay(&self) -> Option<Duration> {
        if !self.is_retry_signal() {
            return None;
        }
        let millis = self
            .data
            .get(RETRY_DELAY_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Some(Duration::from_millis(millis))
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.status {
            ActionStatus::Success => "OK",
            ActionStatus::Failure => "FAIL",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// Final status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Stopped,
    CompletedWithErrors,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Stopped => "STOPPED",
            ExecutionStatus::CompletedWithErrors => "COMPLETED_WITH_ERRORS",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_actions: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

impl ReportSummary {
    pub fn from_results(results: &[ActionResult]) -> Self {
        let success_count = results.iter().filter(|r| r.is_success()).count();
        Self {
            total_actions: results.len(),
            success_count,
            failure_count: results.len() - success_count,
        }
    }
}

/// Report of one workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub run_id: String,
    pub workflow_name: String,
    pub final_status: ExecutionStatus,
    pub action_results: Vec<ActionResult>,
    pub error_message: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub summary: ReportSummary,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.final_status == ExecutionStatus::Success
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
