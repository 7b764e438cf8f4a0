//! # oas-lint-rules
//!
//! Built-in API guideline rules for oas-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | OL104 | `secure-all-endpoints-with-scopes` | Every endpoint is secured by declared, well-named OAuth2 scopes |
//! | OL150 | `use-standard-http-status-codes` | Response codes are standardized and conventional for the method; `204` has no body |
//!
//! ## Usage
//!
//! ```ignore
//! use oas_lint_core::Analyzer;
//! use oas_lint_rules::{SecureAllEndpointsWithScopes, UseStandardHttpStatusCodes};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./api")
//!     .rule(SecureAllEndpointsWithScopes::new())
//!     .rule(UseStandardHttpStatusCodes::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod presets;
pub mod secure_all_endpoints_with_scopes;
pub mod use_standard_http_status_codes;

pub use presets::{
    all_rules, configured_rules, minimal_rules, recommended_rules, rule_by_name, Preset,
};
pub use secure_all_endpoints_with_scopes::{ScopeRuleConfig, SecureAllEndpointsWithScopes};
pub use use_standard_http_status_codes::UseStandardHttpStatusCodes;

/// Re-export core types for convenience.
pub use oas_lint_core::{Rule, Severity, Violation};
