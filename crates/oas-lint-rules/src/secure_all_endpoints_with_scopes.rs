//! Rule requiring every endpoint to be secured by well-formed OAuth2 scopes.
//!
//! # Rationale
//!
//! Every operation must declare which permissions it needs. Scope names follow
//! a single naming convention so that authorization policies stay readable.
//!
//! # Checks
//!
//! - Declared OAuth2 scope names must fully match `scope_regex`
//! - Every operation must have an effective security requirement, either its
//!   own or the document default; `security: []` counts as unsecured
//! - Referenced OAuth2 scopes must be declared by their scheme
//! - Referenced schemes must be declared by the document
//!
//! Alternatives in a requirement are OR-ed: one alternative whose schemes and
//! scopes are all declared secures the operation. Otherwise undeclared names
//! are reported from every alternative.
//!
//! Schemes that carry no scopes (`apiKey`, `http`, `basic`, `openIdConnect`)
//! satisfy any scope list.
//!
//! # Configuration
//!
//! - `scope_regex`: pattern every scope name must fully match
//! - `path_whitelist`: paths exempt from the "must be secured" check; entries
//!   with regex metacharacters are searched as regular expressions, others are
//!   literal prefixes

use indexmap::{IndexMap, IndexSet};
use oas_lint_core::patterns::{FullMatch, PathWhitelist};
use oas_lint_core::{
    Config, ConfigError, DocumentContext, JsonPointer, RequirementSet, Rule, RuleConfig,
    SecurityScheme, Severity, Suggestion, Violation,
};

/// Rule code for secure-all-endpoints-with-scopes.
pub const CODE: &str = "OL104";

/// Rule name for secure-all-endpoints-with-scopes.
pub const NAME: &str = "secure-all-endpoints-with-scopes";

/// Default pattern for scope names: `uid` or `<resource>.<read|write>`.
pub const DEFAULT_SCOPE_REGEX: &str = r"^(uid|[a-z][a-z0-9-]*\.(read|write))$";

/// Message for operations without an effective security requirement.
pub const NOT_SECURED: &str = "Endpoint is not secured by scope(s)";

/// Compiled options for [`SecureAllEndpointsWithScopes`].
#[derive(Debug, Clone)]
pub struct ScopeRuleConfig {
    /// Pattern every declared scope name must fully match.
    pub scope_regex: FullMatch,
    /// Paths exempt from the "must be secured" check.
    pub path_whitelist: PathWhitelist,
}

impl Default for ScopeRuleConfig {
    #[allow(clippy::expect_used)] // constant pattern
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_REGEX, Vec::<String>::new())
            .expect("default scope regex compiles")
    }
}

impl ScopeRuleConfig {
    /// Compiles the scope pattern and whitelist entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] naming the option that failed.
    pub fn new<I, S>(scope_regex: &str, path_whitelist: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scope_regex = FullMatch::new(scope_regex).map_err(|e| ConfigError::InvalidPattern {
            rule: NAME.to_string(),
            key: "scope_regex".to_string(),
            pattern: scope_regex.to_string(),
            message: e.to_string(),
        })?;
        let path_whitelist =
            PathWhitelist::new(path_whitelist).map_err(|(entry, e)| ConfigError::InvalidPattern {
                rule: NAME.to_string(),
                key: "path_whitelist".to_string(),
                pattern: entry,
                message: e.to_string(),
            })?;
        Ok(Self {
            scope_regex,
            path_whitelist,
        })
    }

    /// Reads `scope_regex` and `path_whitelist` from a rule section.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile.
    pub fn from_rule_config(config: Option<&RuleConfig>) -> Result<Self, ConfigError> {
        let Some(config) = config else {
            return Ok(Self::default());
        };
        Self::new(
            config.get_str("scope_regex", DEFAULT_SCOPE_REGEX),
            config.get_str_array("path_whitelist").unwrap_or_default(),
        )
    }
}

/// Requires every endpoint to be secured by declared, well-named scopes.
#[derive(Debug, Clone)]
pub struct SecureAllEndpointsWithScopes {
    config: ScopeRuleConfig,
    severity: Severity,
}

impl Default for SecureAllEndpointsWithScopes {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureAllEndpointsWithScopes {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ScopeRuleConfig::default(),
            severity: Severity::Error,
        }
    }

    /// Creates the rule from the `[rules.secure-all-endpoints-with-scopes]`
    /// section of a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured pattern does not compile.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new().with_config(ScopeRuleConfig::from_rule_config(config.rule(NAME))?))
    }

    /// Replaces the compiled options.
    #[must_use]
    pub fn with_config(mut self, config: ScopeRuleConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn violation(&self, pointer: JsonPointer, message: impl Into<String>) -> Violation {
        Violation::new(CODE, NAME, self.severity, pointer, message)
    }

    /// Flags declared OAuth2 scope names that do not match `scope_regex`.
    ///
    /// Each offending name is reported separately at its `scopes` node.
    #[must_use]
    pub fn check_defined_scope_format(&self, ctx: &DocumentContext) -> Vec<Violation> {
        let pattern = &self.config.scope_regex;
        let mut violations = Vec::new();
        let schemes = ctx
            .security_schemes()
            .values()
            .filter(|scheme| scheme.kind.declares_scopes());
        for node in schemes.flat_map(|scheme| &scheme.scope_nodes) {
            for scope in node.scopes.iter().filter(|scope| !pattern.is_match(scope)) {
                violations.push(self.violation(
                    node.pointer.clone(),
                    format!("scope '{scope}' does not match regex '{pattern}'"),
                ));
            }
        }
        violations
    }

    /// Flags operations that are unsecured or reference undeclared scopes or
    /// schemes.
    #[must_use]
    pub fn check_operations_are_scoped(&self, ctx: &DocumentContext) -> Vec<Violation> {
        let schemes = ctx.security_schemes();
        let default = ctx.default_security();
        let mut violations = Vec::new();

        for op in ctx.operations() {
            if self.config.path_whitelist.matches(op.path) {
                tracing::debug!("Skipping whitelisted {} {}", op.method, op.path);
                continue;
            }

            let own = ctx.operation_security(&op);
            let requirement = match own.as_ref().or(default.as_ref()) {
                Some(requirement) if requirement.alternatives.iter().any(|set| !set.is_empty()) => {
                    requirement
                }
                _ => {
                    violations.push(
                        self.violation(op.pointer.clone(), NOT_SECURED)
                            .with_suggestion(Suggestion::new(
                                "Add an OAuth2 security requirement or whitelist the path",
                            )),
                    );
                    continue;
                }
            };

            // One satisfied alternative secures the operation.
            let mut undefined_scopes = IndexSet::new();
            let mut undefined_schemes = IndexSet::new();
            let mut satisfied = false;
            for set in requirement.alternatives.iter().filter(|set| !set.is_empty()) {
                let (scopes, names) = undefined_in(set, schemes);
                satisfied |= scopes.is_empty() && names.is_empty();
                undefined_scopes.extend(scopes);
                undefined_schemes.extend(names);
            }
            if satisfied {
                continue;
            }

            // Inherited requirements are reported at the operation itself.
            let pointer = if own.is_some() {
                requirement.pointer.clone()
            } else {
                op.pointer.clone()
            };

            if !undefined_scopes.is_empty() {
                violations.push(
                    self.violation(
                        pointer.clone(),
                        format!(
                            "Endpoint is secured by undefined OAuth2 scope(s): {}",
                            join(&undefined_scopes)
                        ),
                    )
                    .with_suggestion(Suggestion::new(
                        "Declare the scope(s) on the OAuth2 security scheme",
                    )),
                );
            }
            if !undefined_schemes.is_empty() {
                violations.push(self.violation(
                    pointer,
                    format!(
                        "Endpoint is secured by undefined security scheme(s): {}",
                        join(&undefined_schemes)
                    ),
                ));
            }
        }

        violations
    }
}

/// Undeclared `scheme:scope` pairs and undeclared scheme names of one
/// alternative set.
fn undefined_in(
    set: &RequirementSet,
    schemes: &IndexMap<String, SecurityScheme>,
) -> (Vec<String>, Vec<String>) {
    let mut scopes_out = Vec::new();
    let mut schemes_out = Vec::new();
    for (scheme_name, scopes) in set.schemes() {
        match schemes.get(scheme_name) {
            None => schemes_out.push(scheme_name.to_string()),
            Some(scheme) if scheme.kind.declares_scopes() => scopes_out.extend(
                scopes
                    .iter()
                    .filter(|scope| !scheme.declares(scope))
                    .map(|scope| format!("{scheme_name}:{scope}")),
            ),
            Some(_) => {}
        }
    }
    (scopes_out, schemes_out)
}

fn join(items: &IndexSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl Rule for SecureAllEndpointsWithScopes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires every endpoint to be secured by declared, well-named OAuth2 scopes"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &DocumentContext) -> Vec<Violation> {
        let mut violations = self.check_defined_scope_format(ctx);
        violations.extend(self.check_operations_are_scoped(ctx));
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(yaml: &str) -> DocumentContext {
        DocumentContext::parse(yaml).expect("Failed to parse")
    }

    fn messages(violations: &[Violation]) -> Vec<(String, String)> {
        violations
            .iter()
            .map(|v| (v.message.clone(), v.pointer.to_string()))
            .collect()
    }

    fn rule(scope_regex: &str, whitelist: &[&str]) -> SecureAllEndpointsWithScopes {
        SecureAllEndpointsWithScopes::new()
            .with_config(ScopeRuleConfig::new(scope_regex, whitelist).unwrap())
    }

    #[test]
    fn test_unsecured_operation() {
        let doc = ctx(
            r"
openapi: 3.0.1
paths:
  /things:
    get:
      responses: {}
",
        );
        let violations = SecureAllEndpointsWithScopes::new().check_operations_are_scoped(&doc);
        assert_eq!(
            messages(&violations),
            [(NOT_SECURED.to_string(), "/paths/~1things/get".to_string())]
        );
        assert_eq!(violations[0].code, CODE);
    }

    #[test]
    fn test_undefined_scope_at_operation_security() {
        let doc = ctx(
            r"
openapi: 3.0.1
components:
  securitySchemes:
    oauth2:
      type: oauth2
      flows:
        clientCredentials:
          tokenUrl: https://auth.example.com/token
          scopes:
            defined-scope: ok
paths:
  /things:
    get:
      security:
        - oauth2: [undefined-scope]
",
        );
        let violations = SecureAllEndpointsWithScopes::new().check_operations_are_scoped(&doc);
        assert_eq!(
            messages(&violations),
            [(
                "Endpoint is secured by undefined OAuth2 scope(s): oauth2:undefined-scope"
                    .to_string(),
                "/paths/~1things/get/security".to_string()
            )]
        );
    }

    #[test]
    fn test_inherited_default_reports_at_operation() {
        let doc = ctx(
            r"
swagger: '2.0'
securityDefinitions:
  oauth2:
    type: oauth2
    flow: application
    tokenUrl: https://auth.example.com/token
    scopes:
      pets.read: read
security:
  - oauth2: [pets.read, pets.write]
paths:
  /pets:
    get: {}
    post:
      security:
        - oauth2: [pets.read]
",
        );
        let violations = SecureAllEndpointsWithScopes::new().check_operations_are_scoped(&doc);
        assert_eq!(
            messages(&violations),
            [(
                "Endpoint is secured by undefined OAuth2 scope(s): oauth2:pets.write".to_string(),
                "/paths/~1pets/get".to_string()
            )]
        );
    }

    #[test]
    fn test_explicitly_empty_security_is_unsecured() {
        let doc = ctx(
            r"
openapi: 3.0.1
components:
  securitySchemes:
    BearerAuth: {type: http, scheme: bearer}
security:
  - BearerAuth: []
paths:
  /public:
    get:
      security: []
  /health:
    get:
      security: []
",
        );
        let violations = rule(DEFAULT_SCOPE_REGEX, &["/health"]).check_operations_are_scoped(&doc);
        assert_eq!(
            messages(&violations),
            [(NOT_SECURED.to_string(), "/paths/~1public/get".to_string())]
        );
    }

    #[test]
    fn test_requirement_without_schemes_is_unsecured() {
        let doc = ctx(
            r"
openapi: 3.0.1
components:
  securitySchemes:
    BearerAuth: {type: http, scheme: bearer}
paths:
  /anonymous:
    get:
      security:
        - {}
  /optional:
    get:
      security:
        - {}
        - BearerAuth: []
",
        );
        let violations = SecureAllEndpointsWithScopes::new().check_operations_are_scoped(&doc);
        assert_eq!(
            messages(&violations),
            [(NOT_SECURED.to_string(), "/paths/~1anonymous/get".to_string())]
        );
    }

    #[test]
    fn test_scopeless_schemes_satisfy_any_scope_list() {
        let doc = ctx(
            r"
openapi: 3.0.1
components:
  securitySchemes:
    BearerAuth: {type: http, scheme: bearer}
    ApiKey: {type: apiKey, in: header, name: X-Api-Key}
paths:
  /a:
    get:
      security:
        - BearerAuth: []
  /b:
    get:
      security:
        - BearerAuth: [whatever.read]
        - ApiKey: [anything]
",
        );
        assert!(SecureAllEndpointsWithScopes::new()
            .check_operations_are_scoped(&doc)
            .is_empty());
    }

    #[test]
    fn test_undefined_scheme_is_reported() {
        let doc = ctx(
            r"
openapi: 3.0.1
components:
  securitySchemes:
    BearerAuth: {type: http, scheme: bearer}
paths:
  /things:
    get:
      security:
        - AnotherBearerAuth: []
",
        );
        let violations = SecureAllEndpointsWithScopes::new().check_operations_are_scoped(&doc);
        assert_eq!(
            messages(&violations),
            [(
                "Endpoint is secured by undefined security scheme(s): AnotherBearerAuth"
                    .to_string(),
                "/paths/~1things/get/security".to_string()
            )]
        );
    }

    #[test]
    fn test_undefined_scopes_are_aggregated_across_alternatives() {
        let doc = ctx(
            r"
swagger: '2.0'
securityDefinitions:
  oauth2:
    type: oauth2
    flow: implicit
    authorizationUrl: https://auth.example.com
    scopes:
      a.read: ''
  partner:
    type: oauth2
    flow: implicit
    authorizationUrl: https://auth.example.com
    scopes: {}
paths:
  /x:
    put:
      security:
        - oauth2: [a.read, a.write]
        - partner: [p.read]
          oauth2: [a.write]
",
        );
        let violations = SecureAllEndpointsWithScopes::new().check_operations_are_scoped(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Endpoint is secured by undefined OAuth2 scope(s): oauth2:a.write, partner:p.read"
        );
    }

    #[test]
    fn test_one_clean_alternative_secures_the_operation() {
        let doc = ctx(
            r"
openapi: 3.0.1
components:
  securitySchemes:
    oauth2:
      type: oauth2
      flows:
        clientCredentials:
          tokenUrl: https://auth.example.com/token
          scopes:
            a.read: ''
    BearerAuth: {type: http, scheme: bearer}
paths:
  /x:
    get:
      security:
        - oauth2: [a.read]
        - oauth2: [a.write]
  /y:
    get:
      security:
        - BearerAuth: []
        - AnotherBearerAuth: []
  /z:
    get:
      security:
        - AnotherBearerAuth: []
          BearerAuth: []
        - oauth2: [a.write]
",
        );
        let violations = SecureAllEndpointsWithScopes::new().check_operations_are_scoped(&doc);
        assert_eq!(
            messages(&violations),
            [
                (
                    "Endpoint is secured by undefined OAuth2 scope(s): oauth2:a.write".to_string(),
                    "/paths/~1z/get/security".to_string()
                ),
                (
                    "Endpoint is secured by undefined security scheme(s): AnotherBearerAuth"
                        .to_string(),
                    "/paths/~1z/get/security".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_clean_alternative_after_dirty_inherited_default() {
        let doc = ctx(
            r"
swagger: '2.0'
securityDefinitions:
  oauth2:
    type: oauth2
    flow: application
    tokenUrl: https://auth.example.com/token
    scopes:
      pets.read: read
security:
  - oauth2: [pets.write]
  - oauth2: [pets.read]
paths:
  /pets:
    get: {}
",
        );
        assert!(SecureAllEndpointsWithScopes::new()
            .check_operations_are_scoped(&doc)
            .is_empty());
    }

    #[test]
    fn test_whitelist_regex_and_prefix() {
        let doc = ctx(
            r"
openapi: 3.0.1
paths:
  /health/live: {get: {}}
  /internal/jobs: {get: {}}
  /api/internal: {get: {}}
",
        );
        let violations = rule(DEFAULT_SCOPE_REGEX, &["/health", "^/internal/"])
            .check_operations_are_scoped(&doc);
        assert_eq!(
            messages(&violations),
            [(NOT_SECURED.to_string(), "/paths/~1api~1internal/get".to_string())]
        );
    }

    #[test]
    fn test_scope_format_reports_each_name() {
        let doc = ctx(
            r"
swagger: '2.0'
securityDefinitions:
  oauth2:
    type: oauth2
    flow: implicit
    authorizationUrl: https://auth.example.com
    scopes:
      uid: ''
      pets.read: ''
      Pets.Write: ''
      pets_admin: ''
  key:
    type: apiKey
    in: header
    name: X-Key
paths: {}
",
        );
        let violations = SecureAllEndpointsWithScopes::new().check_defined_scope_format(&doc);
        let pointer = "/securityDefinitions/oauth2/scopes".to_string();
        assert_eq!(
            messages(&violations),
            [
                (
                    format!("scope 'Pets.Write' does not match regex '{DEFAULT_SCOPE_REGEX}'"),
                    pointer.clone()
                ),
                (
                    format!("scope 'pets_admin' does not match regex '{DEFAULT_SCOPE_REGEX}'"),
                    pointer
                ),
            ]
        );
    }

    #[test]
    fn test_custom_scope_regex_is_fully_anchored() {
        let doc = ctx(
            r"
openapi: 3.0.1
components:
  securitySchemes:
    oauth2:
      type: oauth2
      flows:
        implicit:
          authorizationUrl: https://auth.example.com
          scopes:
            read: ''
            read-all: ''
paths: {}
",
        );
        let violations = rule("read", &[]).check_defined_scope_format(&doc);
        assert_eq!(
            messages(&violations),
            [(
                "scope 'read-all' does not match regex 'read'".to_string(),
                "/components/securitySchemes/oauth2/flows/implicit/scopes".to_string()
            )]
        );
    }

    #[test]
    fn test_invalid_config_fails_at_setup() {
        let config = Config::parse(
            "[rules.secure-all-endpoints-with-scopes]\nscope_regex = \"(unclosed\"\n",
        )
        .unwrap();
        assert!(matches!(
            SecureAllEndpointsWithScopes::from_config(&config),
            Err(ConfigError::InvalidPattern { key, .. }) if key == "scope_regex"
        ));

        let config = Config::parse(
            "[rules.secure-all-endpoints-with-scopes]\npath_whitelist = [\"/ok\", \"/bad[\"]\n",
        )
        .unwrap();
        assert!(matches!(
            SecureAllEndpointsWithScopes::from_config(&config),
            Err(ConfigError::InvalidPattern { pattern, .. }) if pattern == "/bad["
        ));
    }

    #[test]
    fn test_check_is_idempotent() {
        let doc = ctx(
            r"
openapi: 3.0.1
paths:
  /a: {get: {}, post: {}}
",
        );
        let rule = SecureAllEndpointsWithScopes::new();
        assert_eq!(messages(&rule.check(&doc)), messages(&rule.check(&doc)));
    }
}
