//! Integration test: built-in rules end-to-end via Analyzer.
//!
//! Uses fixture documents under `tests/fixtures/` to verify that discovery,
//! both dialect adapters, the rules, severity overrides and source locations
//! work together.

use oas_lint_core::{Analyzer, Config, LintResult, Severity};
use oas_lint_rules::{configured_rules, SecureAllEndpointsWithScopes, UseStandardHttpStatusCodes};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn analyze(root: PathBuf, config: Config) -> LintResult {
    let rules = configured_rules(&config).expect("rules should build");
    let mut builder = Analyzer::builder().root(root).config(config);
    for rule in rules {
        builder = builder.rule_box(rule);
    }
    let analyzer = builder.build().expect("analyzer should build");
    analyzer.analyze().expect("analysis should succeed")
}

fn lines(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Swagger 2.0 ──

#[test]
fn swagger2_document_reports_in_line_order() {
    let result = analyze(fixture("petstore.yaml"), Config::default());

    assert_eq!(result.files_checked, 1);
    insta::assert_snapshot!(lines(&result), @r"
    petstore.yaml:10: error [OL104] scope 'Pets_Admin' does not match regex '^(uid|[a-z][a-z0-9-]*\.(read|write))$' (#/securityDefinitions/oauth2/scopes)
    petstore.yaml:22: warning [OL150] 666 is not a standardized response code (#/paths/~1pets/get/responses/666)
    petstore.yaml:22: info [OL150] 666 is not a well-understood response code for method GET on path /pets (#/paths/~1pets/get/responses/666)
    petstore.yaml:25: error [OL104] Endpoint is secured by undefined OAuth2 scope(s): oauth2:pets.delete (#/paths/~1pets/post/security)
    petstore.yaml:31: error [OL104] Endpoint is not secured by scope(s) (#/paths/~1health/get)
    petstore.yaml:39: error [OL150] 204 No Content response must not declare a response body (#/paths/~1pets~1{id}/delete/responses/204)
    ");
}

#[test]
fn whitelist_and_severity_override_from_config() {
    let config = Config::parse(
        r#"
[rules.secure-all-endpoints-with-scopes]
path_whitelist = ["/health"]
scope_regex = "^[A-Za-z_]+(\\.(read|write))?$"

[rules.use-standard-http-status-codes]
severity = "error"
"#,
    )
    .expect("config should parse");

    let result = analyze(fixture("petstore.yaml"), config);

    assert!(!result
        .violations
        .iter()
        .any(|v| v.pointer.to_string() == "/paths/~1health/get"));
    assert!(!result
        .violations
        .iter()
        .any(|v| v.message.starts_with("scope '")));
    assert!(result
        .violations
        .iter()
        .filter(|v| v.code == "OL150")
        .all(|v| v.severity == Severity::Error));
}

#[test]
fn disabled_rule_is_skipped() {
    let config = Config::parse("[rules.use-standard-http-status-codes]\nenabled = false\n")
        .expect("config should parse");

    let result = analyze(fixture("petstore.yaml"), config);

    assert_eq!(result.violations.len(), 3);
    assert!(result.violations.iter().all(|v| v.code == "OL104"));
}

// ── OpenAPI 3.x ──

#[test]
fn openapi3_document_reports_undefined_scheme_and_body() {
    let analyzer = Analyzer::builder()
        .root(fixture("things.json"))
        .rule(SecureAllEndpointsWithScopes::new())
        .rule(UseStandardHttpStatusCodes::new())
        .build()
        .expect("analyzer should build");
    let result = analyzer.analyze().expect("analysis should succeed");

    insta::assert_snapshot!(lines(&result), @r"
    things.json:18: error [OL104] Endpoint is secured by undefined security scheme(s): AnotherBearerAuth (#/paths/~1things/put/security)
    things.json:24: error [OL150] 204 No Content response must not declare a response body (#/paths/~1things/put/responses/204)
    ");
}

// ── Directory discovery ──

#[test]
fn directory_skips_non_api_documents() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::copy(fixture("things.json"), dir.path().join("things.json")).expect("copy");
    std::fs::write(dir.path().join("package.json"), r#"{"name": "not-an-api"}"#)
        .expect("write");

    let result = analyze(dir.path().to_path_buf(), Config::default());

    assert_eq!(result.files_checked, 1);
    assert_eq!(result.violations.len(), 2);
    assert!(result.has_errors());
}
