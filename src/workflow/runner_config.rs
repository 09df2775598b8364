//! Runner configuration
//!
//! Configuration for the workflow runner, loaded from a YAML file. Every
//! field has a default, so an empty file is a valid configuration:
//!
//! ```yaml
//! error_handling:
//!   strategy: retry
//!   max_retries: 2
//!   retry_delay_ms: 500
//!   fallback: continue
//!
//! limits:
//!   while_max_iterations: 50
//!   template_max_depth: 5
//!
//! driver:
//!   kind: selenium
//!   browser: firefox
//!   webdriver_url: http://localhost:4444
//!
//! templates_dir: ./templates
//! credentials_file: ./credentials.json
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::platform::DriverConfig;

/// What a retry strategy falls back to once retries are exhausted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FallbackStrategy {
    #[default]
    Stop,
    Continue,
}

/// Error-handling policy applied to failing actions
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ErrorStrategyConfig {
    /// Abort the run on the first failure
    #[default]
    Stop,
    /// Record failures and keep going
    Continue,
    /// Re-run a failing action before falling back
    Retry {
        #[serde(default = "default_max_retries")]
        max_retries: u32,
        #[serde(default = "default_retry_delay_ms")]
        retry_delay_ms: u64,
        #[serde(default)]
        fallback: FallbackStrategy,
    },
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl ErrorStrategyConfig {
    /// Retry policy with the default delay and a stop fallback
    pub fn retry(max_retries: u32) -> Self {
        ErrorStrategyConfig::Retry {
            max_retries,
            retry_delay_ms: default_retry_delay_ms(),
            fallback: FallbackStrategy::Stop,
        }
    }

    /// Parse a strategy name as given on the command line
    pub fn from_name(name: &str, max_retries: Option<u32>) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "stop" => Some(ErrorStrategyConfig::Stop),
            "continue" => Some(ErrorStrategyConfig::Continue),
            "retry" => Some(Self::retry(max_retries.unwrap_or_else(default_max_retries))),
            _ => None,
        }
    }
}

/// Safety limits for control flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Cap on `while` loop iterations when the action sets none
    #[serde(default = "default_while_max_iterations")]
    pub while_max_iterations: u32,

    /// Maximum nesting of template expansions
    #[serde(default = "default_template_max_depth")]
    pub template_max_depth: usize,
}

fn default_while_max_iterations() -> u32 {
    100
}

fn default_template_max_depth() -> usize {
    10
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            while_max_iterations: default_while_max_iterations(),
            template_max_depth: default_template_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    #[serde(default)]
    pub error_handling: ErrorStrategyConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub driver: DriverConfig,

    /// Directory holding `<name>.json|yaml|yml` template files
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// JSON or YAML list of credentials
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
}

impl RunnerConfig {
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, crate::workflow::LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: RunnerConfig =
            serde_yaml::from_str(&content).map_err(|e| crate::workflow::LoadError::Yaml {
                file: path.display().to_string(),
                error: e,
            })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::platform::DriverKind;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.error_handling, ErrorStrategyConfig::Stop);
        assert_eq!(config.limits.while_max_iterations, 100);
        assert_eq!(config.limits.template_max_depth, 10);
        assert_eq!(config.driver.kind, DriverKind::Playwright);
        assert!(config.templates_dir.is_none());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: RunnerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.error_handling, ErrorStrategyConfig::Stop);
        assert_eq!(config.limits, LimitsConfig::default());
    }

    #[test]
    fn test_parse_retry_strategy() {
        let yaml = r#"
error_handling:
  strategy: retry
  max_retries: 2
  fallback: continue
"#;
        let config: RunnerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.error_handling,
            ErrorStrategyConfig::Retry {
                max_retries: 2,
                retry_delay_ms: 1000,
                fallback: FallbackStrategy::Continue,
            }
        );
    }

    #[test]
    fn test_parse_continue_strategy() {
        let config: RunnerConfig =
            serde_yaml::from_str("error_handling:\n  strategy: continue").unwrap();
        assert_eq!(config.error_handling, ErrorStrategyConfig::Continue);
    }

    #[test]
    fn test_strategy_from_name() {
        assert_eq!(
            ErrorStrategyConfig::from_name("STOP", None),
            Some(ErrorStrategyConfig::Stop)
        );
        assert_eq!(
            ErrorStrategyConfig::from_name("retry", Some(5)),
            Some(ErrorStrategyConfig::retry(5))
        );
        assert_eq!(
            ErrorStrategyConfig::from_name("retry", None),
            Some(ErrorStrategyConfig::retry(3))
        );
        assert_eq!(ErrorStrategyConfig::from_name("ignore", None), None);
    }

    #[test]
    fn test_parse_limits() {
        let yaml = r#"
limits:
  while_max_iterations: 5
"#;
        let config: RunnerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.limits.while_max_iterations, 5);
        assert_eq!(config.limits.template_max_depth, 10);
    }
}
