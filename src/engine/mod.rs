//! Workflow execution engine module
//!
//! This module contains:
//! - `runner` - The workflow runner and its stop signal
//! - `error` - Action, workflow and executor error types
//! - `result` - Action results and the execution report
//! - `strategy` - Stop, continue and retry error-handling strategies
//! - `actions` - Atomic action implementations
//! - `condition` - Condition evaluation
//! - `handlers` - Control-flow handlers
//! - `template` - Template expansion

pub mod actions;
pub mod condition;
pub mod error;
pub mod handlers;
pub mod result;
pub mod runner;
pub mod strategy;
pub mod template;

pub use error::{ActionError, ExecutorError, WorkflowError};
pub use handlers::{ControlFlowHandler, SequenceExecutor};
pub use result::{ActionResult, ActionStatus, ExecutionReport, ExecutionStatus, ReportSummary};
pub use runner::{StopSignal, WorkflowRunner};
pub use strategy::{ContinueOnError, ErrorHandlingStrategy, RetryOnError, StopOnError};
pub use template::TemplateExpander;
