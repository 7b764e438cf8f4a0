//! # oas-lint-core
//!
//! Core framework for checking HTTP API descriptions (Swagger 2.0 /
//! OpenAPI 3.x) against an API style guide.
//!
//! This crate provides the foundational traits and types for building
//! guideline rules. It includes:
//!
//! - [`DocumentContext`], a dialect-agnostic, read-only view of one document
//! - [`JsonPointer`] for addressing the node a finding is about
//! - [`Rule`] trait for guideline checks
//! - [`Analyzer`] for orchestrating lint execution
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use oas_lint_core::{Analyzer, DocumentContext};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./api")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod locate;
mod pointer;
mod rule;
mod types;

/// Pattern types for rule configuration.
pub mod patterns;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{default_include, AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::{
    ContextError, Dialect, DialectAdapter, DocumentContext, Method, OpenApi3Adapter, Operation,
    RequirementSet, Response, SchemeKind, ScopeNode, SecurityRequirement, SecurityScheme,
    Swagger2Adapter,
};
pub use locate::SourcePosition;
pub use pointer::{JsonPointer, PointerError};
pub use rule::{Rule, RuleBox};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
