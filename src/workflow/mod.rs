//! Workflow types and definitions
//!
//! This module contains all types for defining and loading workflows:
//! - `action` - Action, ActionKind and ActionType
//! - `factory` - Build actions from their dictionary form
//! - `definition` - Workflow, a named list of actions
//! - `context` - ExecutionContext for runtime state
//! - `expressions` - `{{ param }}` substitution and value comparison
//! - `loader` - Load workflows from files and directories
//! - `platform` - Browser driver configuration
//! - `runner_config` - Runner configuration file

pub mod action;
pub mod context;
pub mod definition;
pub mod expressions;
pub mod factory;
pub mod loader;
pub mod platform;
pub mod runner_config;

// Re-export all public types for convenience
pub use action::{
    parse_credential_key, Action, ActionKind, ActionType, Condition, ConditionType, LoopType,
    ValidationError, ValueType,
};
pub use context::ExecutionContext;
pub use definition::Workflow;
pub use factory::{ActionFactory, FactoryError};
pub use loader::{LoadError, WorkflowLoader};
pub use platform::{BrowserType, DriverConfig, DriverKind};
pub use runner_config::{ErrorStrategyConfig, FallbackStrategy, LimitsConfig, RunnerConfig};
