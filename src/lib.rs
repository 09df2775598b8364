//! # AutoQliq
//!
//! A browser workflow automation engine. Workflows are lists of actions
//! (navigate, click, type, wait, screenshot) with control flow on top:
//! conditionals, loops, try/catch blocks and reusable templates.
//!
//! ## Features
//!
//! - **JSON or YAML workflows** - Flat action dictionaries keyed by `type`
//! - **Control flow** - Conditionals, count/for_each/while loops, try/catch
//! - **Templates** - Stored action lists with `{{ param }}` placeholders
//! - **Error strategies** - Stop, continue, or retry with a fallback
//! - **Cooperative cancellation** - Stop a run between any two actions
//!
//! ## Drivers
//!
//! - **Playwright** (default): JSON-RPC to a Node.js Playwright server
//! - **Selenium**: any W3C WebDriver endpoint over HTTP
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use autoqliq::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let actions = ActionFactory::create_actions(&[serde_json::json!({
//!         "type": "Navigate",
//!         "name": "Open login page",
//!         "url": "https://example.com/login"
//!     })])?;
//!
//!     let driver = Arc::new(LazyDriver::new(DriverConfig::default()));
//!     let credentials = Arc::new(MemoryCredentialRepository::new());
//!     let runner = WorkflowRunner::new(driver.clone(), credentials);
//!
//!     let report = runner.run(&actions, "login").await;
//!     println!("Workflow finished: {}", report.final_status);
//!
//!     driver.quit().await?;
//!     Ok(())
//! }
//! ```

pub mod driver;
pub mod engine;
pub mod repository;
pub mod workflow;

// Re-export main types
pub use driver::{create_driver, DriverError, LazyDriver, PlaywrightDriver, WebDriver, WebDriverClient};
pub use engine::{
    ActionError, ActionResult, ActionStatus, ContinueOnError, ErrorHandlingStrategy,
    ExecutionReport, ExecutionStatus, ExecutorError, RetryOnError, StopOnError, StopSignal,
    WorkflowError, WorkflowRunner,
};
pub use repository::{
    Credential, CredentialRepository, FileCredentialRepository, FileTemplateStore,
    MemoryCredentialRepository, MemoryTemplateStore, RepositoryError, TemplateStore,
};
pub use workflow::{
    Action, ActionFactory, ActionKind, ActionType, DriverConfig, DriverKind, ErrorStrategyConfig,
    ExecutionContext, LoadError, RunnerConfig, Workflow, WorkflowLoader,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::driver::{LazyDriver, WebDriver};
    pub use crate::engine::{
        ActionResult, ErrorHandlingStrategy, ExecutionReport, ExecutionStatus, StopSignal,
        WorkflowRunner,
    };
    pub use crate::repository::{
        Credential, CredentialRepository, MemoryCredentialRepository, MemoryTemplateStore,
        TemplateStore,
    };
    pub use crate::workflow::{
        Action, ActionFactory, ActionKind, DriverConfig, ErrorStrategyConfig, ExecutionContext,
        RunnerConfig, Workflow, WorkflowLoader,
    };
}
