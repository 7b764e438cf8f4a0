//! Configuration types for oas-lint.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for oas-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use ("recommended" or "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing run (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the configuration section for a rule.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    /// Resolves `fail_on`, defaulting to [`Severity::Error`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown severity name.
    pub fn fail_on_severity(&self) -> Result<Severity, ConfigError> {
        match self.fail_on.as_deref() {
            None => Ok(Severity::Error),
            Some(value) => value.parse().map_err(|()| ConfigError::UnknownSeverity {
                value: value.to_string(),
            }),
        }
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Glob patterns of API description files (relative to the root).
    #[serde(default = "default_include")]
    pub include: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec![
                "**/target/**".to_string(),
                "**/node_modules/**".to_string(),
            ],
            include: default_include(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Default include patterns: every YAML and JSON file.
#[must_use]
pub fn default_include() -> Vec<String> {
    vec![
        "**/*.yaml".to_string(),
        "**/*.yml".to_string(),
        "**/*.json".to_string(),
    ]
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Gets a string array option, or `None` when unset.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Option<Vec<String>> {
        self.options.get(key).and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A rule option holds a pattern that does not compile.
    #[error("Invalid pattern for {rule}.{key} `{pattern}`: {message}")]
    InvalidPattern {
        /// Rule name.
        rule: String,
        /// Option key.
        key: String,
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// Unknown preset name.
    #[error("Unknown preset `{value}`, expected: recommended, minimal")]
    UnknownPreset {
        /// The invalid value.
        value: String,
    },

    /// Unknown severity name.
    #[error("Unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// The invalid value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analyzer.include.len(), 3);
        assert!(config.rules.is_empty());
        assert_eq!(config.fail_on_severity().unwrap(), Severity::Error);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
fail_on = "warning"

[analyzer]
root = "./api"
exclude = ["**/generated/**"]

[rules.secure-all-endpoints-with-scopes]
enabled = true
severity = "warning"
scope_regex = "^uid$"
path_whitelist = ["/health", "^/internal/"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./api"));
        assert_eq!(config.analyzer.include, default_include());
        assert_eq!(config.fail_on_severity().unwrap(), Severity::Warning);
        assert!(config.is_rule_enabled("secure-all-endpoints-with-scopes"));
        assert_eq!(
            config.rule_severity("secure-all-endpoints-with-scopes"),
            Some(Severity::Warning)
        );

        let rule_config = config.rule("secure-all-endpoints-with-scopes").unwrap();
        assert_eq!(rule_config.get_str("scope_regex", ""), "^uid$");
        assert_eq!(
            rule_config.get_str_array("path_whitelist"),
            Some(vec!["/health".to_string(), "^/internal/".to_string()])
        );
        assert_eq!(rule_config.get_str_array("missing"), None);
    }

    #[test]
    fn disabled_rule() {
        let config = Config::parse("[rules.use-standard-http-status-codes]\nenabled = false\n")
            .unwrap();
        assert!(!config.is_rule_enabled("use-standard-http-status-codes"));
        assert!(config.is_rule_enabled("anything-else"));
    }

    #[test]
    fn unknown_fail_on() {
        let config = Config::parse("fail_on = \"fatal\"\n").unwrap();
        assert!(matches!(
            config.fail_on_severity(),
            Err(ConfigError::UnknownSeverity { .. })
        ));
    }
}
