//! Rule presets for common configurations.

use crate::{SecureAllEndpointsWithScopes, UseStandardHttpStatusCodes};
use oas_lint_core::{Config, ConfigError, RuleBox};
use std::str::FromStr;

/// Preset configurations for oas-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Every guideline rule with default options.
    #[default]
    Recommended,
    /// Security rules only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Minimal => minimal_rules(),
        }
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            Self::Recommended => &[
                crate::secure_all_endpoints_with_scopes::NAME,
                crate::use_standard_http_status_codes::NAME,
            ],
            Self::Minimal => &[crate::secure_all_endpoints_with_scopes::NAME],
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(Self::Recommended),
            "minimal" => Ok(Self::Minimal),
            other => Err(ConfigError::UnknownPreset {
                value: other.to_string(),
            }),
        }
    }
}

/// Returns the recommended set of rules.
///
/// Includes:
/// - `secure-all-endpoints-with-scopes` (OL104)
/// - `use-standard-http-status-codes` (OL150)
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    all_rules()
}

/// Returns the minimal set of rules.
///
/// Only includes `secure-all-endpoints-with-scopes` (OL104).
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    vec![Box::new(SecureAllEndpointsWithScopes::new())]
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(SecureAllEndpointsWithScopes::new()),
        Box::new(UseStandardHttpStatusCodes::new()),
    ]
}

/// Builds a rule by name with default options.
#[must_use]
pub fn rule_by_name(name: &str) -> Option<RuleBox> {
    all_rules().into_iter().find(|rule| rule.name() == name)
}

/// Builds the preset's rules with options taken from `config`.
///
/// Rule options are compiled here, once, so a bad pattern fails before any
/// document is checked. Disabled rules are left to the analyzer.
///
/// # Errors
///
/// Returns an error for an unknown preset or an uncompilable rule option.
pub fn configured_rules(config: &Config) -> Result<Vec<RuleBox>, ConfigError> {
    let preset = match config.preset.as_deref() {
        Some(name) => name.parse()?,
        None => Preset::default(),
    };

    let mut rules: Vec<RuleBox> = Vec::new();
    for name in preset.names() {
        match *name {
            crate::secure_all_endpoints_with_scopes::NAME => {
                rules.push(Box::new(SecureAllEndpointsWithScopes::from_config(config)?));
            }
            crate::use_standard_http_status_codes::NAME => {
                rules.push(Box::new(UseStandardHttpStatusCodes::new()));
            }
            other => tracing::debug!("No builder for rule {other}"),
        }
    }
    Ok(rules)
}
