//! Credential and template stores
//!
//! The runner only needs two narrow lookups:
//! - `CredentialRepository` - resolve a named credential for `Type` actions
//! - `TemplateStore` - load the serialized actions of a named template
//!
//! Each has an in-memory implementation for tests and embedding, and a
//! file-backed one used by the CLI.

mod file;
mod memory;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use file::{FileCredentialRepository, FileTemplateStore};
pub use memory::{MemoryCredentialRepository, MemoryTemplateStore};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("IO error on {path}: {error}")]
    Io {
        path: String,
        error: std::io::Error,
    },

    #[error("Serialization error in {path}: {message}")]
    Serialization { path: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid name '{0}'")]
    InvalidName(String),
}

/// A stored login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Look up a field by the name used in credential references
    pub fn field(&self, field: &str) -> Option<&str> {
        match field {
            "username" => Some(&self.username),
            "password" => Some(&self.password),
            _ => None,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Lookup of stored credentials by name
pub trait CredentialRepository: Send + Sync {
    fn get_by_name(&self, name: &str) -> Result<Option<Credential>, RepositoryError>;

    fn list_names(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Lookup of serialized template action lists by name
pub trait TemplateStore: Send + Sync {
    /// Load the action dictionaries of a template
    fn load_template(&self, name: &str) -> Result<Vec<Value>, RepositoryError>;

    fn list_templates(&self) -> Result<Vec<String>, RepositoryError>;

    fn template_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        Ok(self.list_templates()?.iter().any(|t| t == name))
    }
}

/// Reject names that could escape a store directory
pub(crate) fn validate_name(name: &str) -> Result<(), RepositoryError> {
    let valid = !name.trim().is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_hides_password() {
        let credential = Credential::new("github", "octocat", "hunter2");
        let debug = format!("{:?}", credential);
        assert!(debug.contains("octocat"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_credential_field() {
        let credential = Credential::new("github", "octocat", "hunter2");
        assert_eq!(credential.field("username"), Some("octocat"));
        assert_eq!(credential.field("password"), Some("hunter2"));
        assert_eq!(credential.field("token"), None);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("login_flow").is_ok());
        assert!(validate_name("login-flow.v2").is_ok());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("").is_err());
    }
}
