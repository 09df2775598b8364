//! In-memory stores

use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{Credential, CredentialRepository, RepositoryError, TemplateStore};

#[derive(Debug, Default)]
pub struct MemoryCredentialRepository {
    credentials: RwLock<HashMap<String, Credential>>,
}

impl MemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: impl IntoIterator<Item = Credential>) -> Self {
        let repo = Self::new();
        for credential in credentials {
            repo.insert(credential);
        }
        repo
    }

    pub fn insert(&self, credential: Credential) {
        if let Ok(mut map) = self.credentials.write() {
            map.insert(credential.name.clone(), credential);
        }
    }
}

impl CredentialRepository for MemoryCredentialRepository {
    fn get_by_name(&self, name: &str) -> Result<Option<Credential>, RepositoryError> {
        let map = self
            .credentials
            .read()
            .map_err(|_| RepositoryError::NotFound(name.to_string()))?;
        Ok(map.get(name).cloned())
    }

    fn list_names(&self) -> Result<Vec<String>, RepositoryError> {
        let map = self
            .credentials
            .read()
            .map_err(|_| RepositoryError::NotFound("credentials".to_string()))?;
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, actions: Vec<Value>) {
        if let Ok(mut map) = self.templates.write() {
            map.insert(name.into(), actions);
        }
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load_template(&self, name: &str) -> Result<Vec<Value>, RepositoryError> {
        let map = self
            .templates
            .read()
            .map_err(|_| RepositoryError::NotFound(name.to_string()))?;
        map.get(name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("template '{}'", name)))
    }

    fn list_templates(&self) -> Result<Vec<String>, RepositoryError> {
        let map = self
            .templates
            .read()
            .map_err(|_| RepositoryError::NotFound("templates".to_string()))?;
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
