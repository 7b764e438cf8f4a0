//! Rule trait for defining guideline checks.

use crate::context::DocumentContext;
use crate::types::{Severity, Violation};

/// A guideline rule evaluated against one API description.
///
/// Rules are pure: they read the [`DocumentContext`] and return violations,
/// carry no state between runs, and may run concurrently against the same
/// context.
///
/// # Example
///
/// ```ignore
/// use oas_lint_core::{DocumentContext, Rule, Severity, Violation};
///
/// pub struct RequireOperationId;
///
/// impl Rule for RequireOperationId {
///     fn name(&self) -> &'static str { "require-operation-id" }
///     fn code(&self) -> &'static str { "OL900" }
///
///     fn check(&self, ctx: &DocumentContext) -> Vec<Violation> {
///         ctx.operations()
///             .filter(|op| op.node.get("operationId").is_none())
///             .map(|op| Violation::new(
///                 self.code(),
///                 self.name(),
///                 self.default_severity(),
///                 op.pointer,
///                 "Operation has no operationId",
///             ))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule.
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "OL104").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Checks a document and returns violations in document order.
    fn check(&self, ctx: &DocumentContext) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;

    struct OperationCounter;

    impl Rule for OperationCounter {
        fn name(&self) -> &'static str {
            "operation-counter"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "Reports every operation"
        }

        fn check(&self, ctx: &DocumentContext) -> Vec<Violation> {
            ctx.operations()
                .map(|op| {
                    Violation::new(
                        self.code(),
                        self.name(),
                        self.default_severity(),
                        op.pointer,
                        "operation",
                    )
                })
                .collect()
        }
    }

    #[test]
    fn test_rule_trait() {
        let rule = OperationCounter;
        assert_eq!(rule.name(), "operation-counter");
        assert_eq!(rule.code(), "TEST001");
        assert_eq!(rule.default_severity(), Severity::Error);

        let ctx = DocumentContext::parse(
            "openapi: 3.0.0\npaths:\n  /a:\n    get: {}\n    post: {}\n",
        )
        .unwrap();
        let violations = rule.check(&ctx);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].pointer.to_string(), "/paths/~1a/post");
    }
}
