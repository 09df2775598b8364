//! File-backed stores
//!
//! Credentials live in one JSON or YAML file holding a list of
//! `{name, username, password}` entries. Templates live one per file in a
//! directory as `<name>.json`, `<name>.yaml` or `<name>.yml`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{validate_name, Credential, CredentialRepository, RepositoryError, TemplateStore};

const TEMPLATE_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, RepositoryError> {
    let content = std::fs::read_to_string(path).map_err(|error| RepositoryError::Io {
        path: path.display().to_string(),
        error,
    })?;

    let serialization = |message: String| RepositoryError::Serialization {
        path: path.display().to_string(),
        message,
    };

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| serialization(e.to_string())),
        _ => serde_yaml::from_str(&content).map_err(|e| serialization(e.to_string())),
    }
}

/// Credentials loaded from a file at construction
#[derive(Debug)]
pub struct FileCredentialRepository {
    path: PathBuf,
    credentials: HashMap<String, Credential>,
}

impl FileCredentialRepository {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        let list: Vec<Credential> = read_document(&path)?;
        let credentials = list.into_iter().map(|c| (c.name.clone(), c)).collect();
        Ok(Self { path, credentials })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialRepository for FileCredentialRepository {
    fn get_by_name(&self, name: &str) -> Result<Option<Credential>, RepositoryError> {
        Ok(self.credentials.get(name).cloned())
    }

    fn list_names(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names: Vec<String> = self.credentials.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Templates read from a directory on each lookup
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    dir: PathBuf,
}

impl FileTemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn template_path(&self, name: &str) -> Result<Option<PathBuf>, RepositoryError> {
        validate_name(name)?;
        Ok(TEMPLATE_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", name, ext)))
            .find(|p| p.is_file()))
    }
}

impl TemplateStore for FileTemplateStore {
    fn load_template(&self, name: &str) -> Result<Vec<Value>, RepositoryError> {
        let path = self
            .template_path(name)?
            .ok_or_else(|| RepositoryError::NotFound(format!("template '{}'", name)))?;

        // Either a bare list of actions or a mapping with an `actions` key
        match read_document::<Value>(&path)? {
            Value::Array(actions) => Ok(actions),
            Value::Object(mut map) => match map.remove("actions") {
                Some(Value::Array(actions)) => Ok(actions),
                _ => Err(RepositoryError::Serialization {
                    path: path.display().to_string(),
                    message: "expected an 'actions' list".to_string(),
                }),
            },
            _ => Err(RepositoryError::Serialization {
                path: path.display().to_string(),
                message: "expected a list of actions".to_string(),
            }),
        }
    }

    fn list_templates(&self) -> Result<Vec<String>, RepositoryError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|error| RepositoryError::Io {
            path: self.dir.display().to_string(),
            error,
        })?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if path.is_file() && TEMPLATE_EXTENSIONS.contains(&ext) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_credentials_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(
            &path,
            r#"[{"name": "github", "username": "octocat", "password": "hunter2"}]"#,
        )
        .unwrap();

        let repo = FileCredentialRepository::load(&path).unwrap();
        let credential = repo.get_by_name("github").unwrap().unwrap();
        assert_eq!(credential.password, "hunter2");
        assert!(repo.get_by_name("gitlab").unwrap().is_none());
    }

    #[test]
    fn test_file_credentials_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.yaml");
        fs::write(&path, "- name: github\n").unwrap();

        assert!(matches!(
            FileCredentialRepository::load(&path),
            Err(RepositoryError::Serialization { .. })
        ));
    }

    #[test]
    fn test_file_templates() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("login.yaml"),
            "- type: Navigate\n  name: Open\n  url: '{{base_url}}/login'\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("logout.json"),
            r##"{"actions": [{"type": "Click", "name": "Out", "selector": "#out"}]}"##,
        )
        .unwrap();

        let store = FileTemplateStore::new(dir.path());
        assert_eq!(store.list_templates().unwrap(), vec!["login", "logout"]);

        let login = store.load_template("login").unwrap();
        assert_eq!(login[0]["url"], "{{base_url}}/login");
        assert_eq!(store.load_template("logout").unwrap().len(), 1);
    }

    #[test]
    fn test_file_templates_missing_and_traversal() {
        let dir = tempdir().unwrap();
        let store = FileTemplateStore::new(dir.path());

        assert!(matches!(
            store.load_template("missing"),
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            store.load_template("../secrets"),
            Err(RepositoryError::InvalidName(_))
        ));
    }
}
