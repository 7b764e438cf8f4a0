//! Core types for lint violations and results.

use crate::pointer::JsonPointer;
use indexmap::IndexMap;
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(()),
        }
    }
}

/// Source location of a violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path of the API description.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize) -> Self {
        Self {
            file,
            line,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A guideline violation found in an API description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "OL104").
    pub code: String,
    /// Rule name (e.g., "secure-all-endpoints-with-scopes").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Node the violation is reported against.
    pub pointer: JsonPointer,
    /// Human-readable message.
    pub message: String,
    /// Resolved source location, when the document was read from text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Optional suggestion for fixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        pointer: JsonPointer,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            pointer,
            message: message.into(),
            location: None,
            suggestion: None,
        }
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Attaches a resolved source location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Where the violation is, as `file:line` or `<document>`.
    #[must_use]
    pub fn place(&self) -> String {
        match &self.location {
            Some(loc) => format!("{}:{}", loc.file.display(), loc.line),
            None => "<document>".to_string(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {} (#{})",
            self.place(),
            self.severity,
            self.code,
            self.message,
            self.pointer
        )
    }
}

/// A violation rendered as a miette diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        let (offset, length) = v
            .location
            .as_ref()
            .map_or((0, 0), |loc| (loc.offset, loc.length));
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v.suggestion.as_ref().map(|s| s.message.clone()),
            span: SourceSpan::from((offset, length)),
            label_message: v.rule.clone(),
        }
    }
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Number of API descriptions checked.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Counts violations by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.violations
            .iter()
            .fold((0, 0, 0), |(e, w, i), v| match v.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// Groups violations by file and pointer, in order of first appearance.
    ///
    /// Violations sharing a pointer stay individual entries of the group.
    #[must_use]
    pub fn grouped_by_pointer(&self) -> IndexMap<(Option<PathBuf>, JsonPointer), Vec<&Violation>> {
        let mut groups: IndexMap<_, Vec<&Violation>> = IndexMap::new();
        for v in &self.violations {
            let file = v.location.as_ref().map(|l| l.file.clone());
            groups.entry((file, v.pointer.clone())).or_default().push(v);
        }
        groups
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(encoded: &str) -> JsonPointer {
        JsonPointer::parse(encoded).unwrap()
    }

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(
            "OL104",
            "secure-all-endpoints-with-scopes",
            severity,
            pointer("/paths/~1things/get"),
            "Endpoint is not secured by scope(s)",
        )
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn display_without_location() {
        let v = make_violation(Severity::Error);
        insta::assert_snapshot!(
            v.to_string(),
            @"<document>: error [OL104] Endpoint is not secured by scope(s) (#/paths/~1things/get)"
        );
    }

    #[test]
    fn diagnostic_uses_location_span() {
        let v = make_violation(Severity::Warning)
            .with_location(Location::new(PathBuf::from("api.yaml"), 3).with_span(20, 3));
        let diag = ViolationDiagnostic::from(&v);
        assert_eq!(diag.span, SourceSpan::from((20, 3)));
        assert_eq!(diag.to_string(), "[OL104] Endpoint is not secured by scope(s)");
    }

    #[test]
    fn grouping_keeps_shared_pointer_violations_apart() {
        let mut result = LintResult::new();
        let scopes = pointer("/securityDefinitions/oauth2/scopes");
        for name in ["Bad", "Worse"] {
            result.violations.push(Violation::new(
                "OL104",
                "secure-all-endpoints-with-scopes",
                Severity::Error,
                scopes.clone(),
                format!("scope '{name}' does not match regex 'x'"),
            ));
        }
        result.violations.push(make_violation(Severity::Error));

        let groups = result.grouped_by_pointer();
        assert_eq!(groups.len(), 2);
        let (key, first) = groups.first().unwrap();
        assert_eq!(key.1, scopes);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn has_violations_at_error_only() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning));
        assert!(!result.has_violations_at(Severity::Error));
        assert!(result.has_violations_at(Severity::Warning));
        assert!(!result.has_errors());
    }
}
