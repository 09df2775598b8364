//! Execution context for workflow runtime
//!
//! The context is the variable bag threaded through one run. Loop handlers
//! write iteration variables into it, conditionals read from it, and catch
//! blocks see a copy carrying the error that triggered them.

use serde_json::Value;
use std::collections::HashMap;

/// Runtime variables for one workflow run
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Workflow variables (loop counters, caller-supplied inputs, error keys)
    pub variables: HashMap<String, Value>,

    /// Run ID
    pub run_id: String,

    /// Templates currently being expanded, outermost first
    template_chain: Vec<String>,
}

impl ExecutionContext {
    /// Create a new execution context with a generated run ID
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            ..Default::default()
        }
    }

    /// Create a context seeded with variables
    pub fn with_variables(variables: HashMap<String, Value>) -> Self {
        Self {
            variables,
            ..Self::new()
        }
    }

    /// Set a variable
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.variables.insert(key.to_string(), value.into());
    }

    /// Get a variable
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Copy of this context with error metadata for a catch block
    pub fn with_error(&self, error_type: &str, message: &str) -> Self {
        let mut ctx = self.clone();
        ctx.set("error", message);
        ctx.set("error_type", error_type);
        ctx.set("error_message", message);
        ctx.set("try_block_error", true);
        ctx
    }

    /// Templates currently being expanded
    pub fn template_chain(&self) -> &[String] {
        &self.template_chain
    }

    pub fn is_expanding(&self, template_name: &str) -> bool {
        self.template_chain.iter().any(|t| t == template_name)
    }

    pub(crate) fn push_template(&mut self, template_name: &str) {
        self.template_chain.push(template_name.to_string());
    }

    pub(crate) fn pop_template(&mut self) {
        self.template_chain.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_context() {
        let ctx = ExecutionContext::new();
        assert!(!ctx.run_id.is_empty());
        assert!(ctx.variables.is_empty());
        assert!(ctx.template_chain().is_empty());
    }

    #[test]
    fn test_variables() {
        let mut ctx = ExecutionContext::new();
        ctx.set("user", "alice");
        ctx.set("count", 3);

        assert_eq!(ctx.get("user"), Some(&json!("alice")));
        assert_eq!(ctx.get("count"), Some(&json!(3)));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_with_error_leaves_original_untouched() {
        let mut ctx = ExecutionContext::new();
        ctx.set("page", "login");

        let catch_ctx = ctx.with_error("ActionError", "element not found");

        assert_eq!(catch_ctx.get("error"), Some(&json!("element not found")));
        assert_eq!(catch_ctx.get("error_type"), Some(&json!("ActionError")));
        assert_eq!(catch_ctx.get("try_block_error"), Some(&json!(true)));
        assert_eq!(catch_ctx.get("page"), Some(&json!("login")));
        assert_eq!(catch_ctx.run_id, ctx.run_id);

        assert_eq!(ctx.get("error"), None);
    }

    #[test]
    fn test_template_chain() {
        let mut ctx = ExecutionContext::new();
        ctx.push_template("login");
        ctx.push_template("fill_form");

        assert!(ctx.is_expanding("login"));
        assert_eq!(ctx.template_chain(), ["login", "fill_form"]);

        ctx.pop_template();
        assert!(!ctx.is_expanding("fill_form"));
    }
}
