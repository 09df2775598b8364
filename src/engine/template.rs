//! Template expansion
//!
//! A `Template` action names a stored action list and supplies string
//! parameters. Expansion loads the list, substitutes `{{ param }}`
//! placeholders in every string value, and rebuilds the actions through the
//! factory.

use std::sync::Arc;
use tracing::debug;

use super::error::{ActionError, ExecutorError, WorkflowError};
use crate::repository::TemplateStore;
use crate::workflow::expressions::substitute_value;
use crate::workflow::{Action, ActionFactory, ActionKind, ExecutionContext};

#[derive(Clone)]
pub struct TemplateExpander {
    store: Option<Arc<dyn TemplateStore>>,
    max_depth: usize,
}

impl TemplateExpander {
    pub fn new(store: Option<Arc<dyn TemplateStore>>, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    /// Expand a template action into the concrete actions it stands for
    ///
    /// Cycles and excessive nesting are checked against the expansion chain
    /// held in the context; the caller pushes the template name onto that
    /// chain while running the expanded actions.
    pub fn expand(
        &self,
        action: &Action,
        ctx: &ExecutionContext,
    ) -> Result<Vec<Action>, ExecutorError> {
        let ActionKind::Template {
            template_name,
            parameters,
        } = &action.kind
        else {
            return Err(WorkflowError::HandlerMismatch {
                handler: "Template",
                actual: action.action_type(),
                action_name: action.name.clone(),
            }
            .into());
        };

        if ctx.is_expanding(template_name) {
            let mut chain = ctx.template_chain().to_vec();
            chain.push(template_name.clone());
            return Err(WorkflowError::TemplateCycle(chain).into());
        }
        if ctx.template_chain().len() >= self.max_depth {
            let mut chain = ctx.template_chain().to_vec();
            chain.push(template_name.clone());
            return Err(WorkflowError::TemplateDepthExceeded {
                max_depth: self.max_depth,
                chain,
            }
            .into());
        }

        let store = self.store.as_ref().ok_or_else(|| {
            ActionError::for_action(action, "No template store is configured")
        })?;

        let raw = store.load_template(template_name).map_err(|e| {
            ActionError::from_repository(
                action,
                &format!("Failed to load template '{}'", template_name),
                e,
            )
        })?;

        let substituted: Vec<_> = raw
            .iter()
            .map(|value| substitute_value(value, parameters))
            .collect();

        let actions = ActionFactory::create_actions(&substituted).map_err(|e| {
            ActionError::for_action(
                action,
                format!("Template '{}' contains an invalid action: {}", template_name, e),
            )
            .with_cause(e)
        })?;

        for expanded in &actions {
            expanded.validate().map_err(|e| {
                ActionError::for_action(
                    action,
                    format!("Template '{}' failed validation: {}", template_name, e),
                )
                .with_cause(e)
            })?;
        }

        debug!(
            "Expanded template '{}' into {} actions",
            template_name,
            actions.len()
        );
        Ok(actions)
    }
}
