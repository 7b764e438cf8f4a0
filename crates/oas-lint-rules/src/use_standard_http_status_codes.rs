//! Rule restricting response codes to standardized, conventional ones.
//!
//! # Checks
//!
//! - **Standardized** (Warning): every declared code other than `default`
//!   must be registered in the IANA HTTP status code registry
//! - **Well-understood** (Info): every declared code other than `default`
//!   must be conventional for the operation's method
//! - **No content** (Error): a `204` response must not declare a body
//!
//! The checks are independent and may all fire for one response. A
//! configured severity replaces the per-check defaults.

use oas_lint_core::{DocumentContext, Method, Response, Rule, Severity, Violation};

/// Rule code for use-standard-http-status-codes.
pub const CODE: &str = "OL150";

/// Rule name for use-standard-http-status-codes.
pub const NAME: &str = "use-standard-http-status-codes";

/// Message for `204` responses declaring a body.
pub const NO_CONTENT_WITH_BODY: &str = "204 No Content response must not declare a response body";

const DEFAULT_CODE: &str = "default";
const NO_CONTENT: &str = "204";

/// Codes registered in the IANA HTTP status code registry.
const STANDARDIZED: &[u16] = &[
    100, 101, 102, 103, //
    200, 201, 202, 203, 204, 205, 206, 207, 208, 226, //
    300, 301, 302, 303, 304, 305, 307, 308, //
    400, 401, 402, 403, 404, 405, 406, 407, 408, 409, 410, 411, 412, 413, 414, 415, 416, 417,
    421, 422, 423, 424, 425, 426, 428, 429, 431, 451, //
    500, 501, 502, 503, 504, 505, 506, 507, 508, 510, 511,
];

/// Codes conventional for every method.
const BASELINE: &[u16] = &[
    200, 301, 400, 401, 403, 404, 405, 406, 408, 410, 428, 429, 500, 501, 503,
];

fn method_additions(method: Method) -> &'static [u16] {
    match method {
        Method::Get => &[304],
        Method::Post => &[201, 202, 207, 303, 415],
        Method::Put => &[201, 202, 204, 303, 409, 412, 415, 423],
        Method::Patch | Method::Delete => &[202, 204, 303, 409, 412, 415, 423],
        Method::Head | Method::Options | Method::Trace => &[],
    }
}

/// Parses a response key as a three-digit status code.
fn parse_code(code: &str) -> Option<u16> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()) {
        code.parse().ok()
    } else {
        None
    }
}

/// Whether `code` is registered in the IANA HTTP status code registry.
#[must_use]
pub fn is_standardized(code: &str) -> bool {
    parse_code(code).is_some_and(|c| STANDARDIZED.contains(&c))
}

/// Whether `code` is conventional for `method`.
#[must_use]
pub fn is_well_understood(code: &str, method: Method) -> bool {
    parse_code(code)
        .is_some_and(|c| BASELINE.contains(&c) || method_additions(method).contains(&c))
}

/// Restricts response codes to standardized, conventional ones.
#[derive(Debug, Clone, Default)]
pub struct UseStandardHttpStatusCodes {
    severity: Option<Severity>,
}

impl UseStandardHttpStatusCodes {
    /// Creates a new rule with per-check default severities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses one severity for every check.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    fn violation(&self, default: Severity, response: &Response<'_>, message: String) -> Violation {
        Violation::new(
            CODE,
            NAME,
            self.severity.unwrap_or(default),
            response.pointer.clone(),
            message,
        )
    }

    /// Flags response codes missing from the IANA registry.
    #[must_use]
    pub fn check_standardized_codes(&self, ctx: &DocumentContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for op in ctx.operations() {
            for response in ctx.responses(&op) {
                if response.code != DEFAULT_CODE && !is_standardized(response.code) {
                    violations.push(self.violation(
                        Severity::Warning,
                        &response,
                        format!("{} is not a standardized response code", response.code),
                    ));
                }
            }
        }
        violations
    }

    /// Flags response codes that are unconventional for their method.
    #[must_use]
    pub fn check_well_understood_codes(&self, ctx: &DocumentContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for op in ctx.operations() {
            for response in ctx.responses(&op) {
                if response.code != DEFAULT_CODE && !is_well_understood(response.code, op.method) {
                    violations.push(self.violation(
                        Severity::Info,
                        &response,
                        format!(
                            "{} is not a well-understood response code for method {} on path {}",
                            response.code, op.method, op.path
                        ),
                    ));
                }
            }
        }
        violations
    }

    /// Flags `204` responses that declare a body.
    #[must_use]
    pub fn check_no_content_has_no_body(&self, ctx: &DocumentContext) -> Vec<Violation> {
        let mut violations = Vec::new();
        for op in ctx.operations() {
            for response in ctx.responses(&op) {
                if response.code == NO_CONTENT && ctx.response_has_body(&response) {
                    violations.push(self.violation(
                        Severity::Error,
                        &response,
                        NO_CONTENT_WITH_BODY.to_string(),
                    ));
                }
            }
        }
        violations
    }
}

impl Rule for UseStandardHttpStatusCodes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Restricts response codes to standardized codes conventional for the method"
    }

    fn default_severity(&self) -> Severity {
        self.severity.unwrap_or(Severity::Warning)
    }

    fn check(&self, ctx: &DocumentContext) -> Vec<Violation> {
        let mut violations = self.check_standardized_codes(ctx);
        violations.extend(self.check_well_understood_codes(ctx));
        violations.extend(self.check_no_content_has_no_body(ctx));
        violations
    }
}
