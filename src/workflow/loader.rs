//! Workflow loader
//!
//! Load workflows from JSON or YAML files. A file holds either a bare list
//! of action dictionaries, named after the file stem, or a mapping:
//!
//! ```yaml
//! name: login
//! variables:
//!   user: alice
//! actions:
//!   - type: Navigate
//!     name: Open login page
//!     url: https://example.com/login
//! ```

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use super::factory::{ActionFactory, FactoryError};
use super::Workflow;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },

    #[error("JSON parse error in {file}: {error}")]
    Json {
        file: String,
        error: serde_json::Error,
    },

    #[error("Invalid workflow in {file}: {reason}")]
    Invalid { file: String, reason: String },

    #[error("Invalid action in {file}: {error}")]
    Action { file: String, error: FactoryError },
}

pub struct WorkflowLoader;

impl WorkflowLoader {
    /// Returns true if the path looks like a workflow file
    pub fn is_workflow_file(path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str());
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        // runner.yaml is a config file, not a workflow
        if filename == "runner.yaml" || filename == "runner.yml" {
            return false;
        }

        matches!(ext, Some("json") | Some("yaml") | Some("yml"))
    }

    pub fn load_directory(dir: &Path) -> Result<Vec<Workflow>, LoadError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && Self::is_workflow_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|p| Self::load_file(p)).collect()
    }

    pub fn load_file(path: &Path) -> Result<Workflow, LoadError> {
        let content = std::fs::read_to_string(path)?;
        let file = path.display().to_string();

        let value: Value = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|error| LoadError::Json {
                file: file.clone(),
                error,
            })?,
            _ => serde_yaml::from_str(&content).map_err(|error| LoadError::Yaml {
                file: file.clone(),
                error,
            })?,
        };

        let default_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("workflow")
            .to_string();

        Self::from_value(value, &default_name).map_err(|e| match e {
            ValueError::Invalid(reason) => LoadError::Invalid { file, reason },
            ValueError::Action(error) => LoadError::Action { file, error },
        })
    }

    fn from_value(value: Value, default_name: &str) -> Result<Workflow, ValueError> {
        match value {
            Value::Array(items) => Ok(Workflow::new(
                default_name,
                ActionFactory::create_actions(&items).map_err(ValueError::Action)?,
            )),
            Value::Object(mut map) => {
                let name = match map.remove("name") {
                    Some(Value::String(name)) => name,
                    Some(_) => return Err(ValueError::Invalid("'name' must be a string".into())),
                    None => default_name.to_string(),
                };

                let variables: HashMap<String, Value> = match map.remove("variables") {
                    Some(Value::Object(vars)) => vars.into_iter().collect(),
                    Some(Value::Null) | None => HashMap::new(),
                    Some(_) => {
                        return Err(ValueError::Invalid("'variables' must be a mapping".into()))
                    }
                };

                let actions = match map.remove("actions") {
                    Some(Value::Array(items)) => {
                        ActionFactory::create_actions(&items).map_err(ValueError::Action)?
                    }
                    Some(Value::Null) | None => Vec::new(),
                    Some(_) => return Err(ValueError::Invalid("'actions' must be a list".into())),
                };

                Ok(Workflow {
                    name,
                    variables,
                    actions,
                })
            }
            _ => Err(ValueError::Invalid(
                "expected a list of actions or a mapping with 'actions'".into(),
            )),
        }
    }
}

enum ValueError {
    Invalid(String),
    Action(FactoryError),
}
