//! Dialect adapters mapping Swagger 2.0 and OpenAPI 3.x shapes onto the
//! common query surface.

use super::security::{SchemeKind, SecurityScheme};
use crate::pointer::JsonPointer;
use indexmap::IndexMap;
use serde_json::Value;

/// Dialect-specific knowledge needed by [`DocumentContext`](super::DocumentContext).
pub trait DialectAdapter: Send + Sync {
    /// Collects the declared security schemes, in declaration order.
    fn security_schemes(&self, root: &Value) -> IndexMap<String, SecurityScheme>;

    /// Whether a (dereferenced) response object declares a body.
    fn response_has_body(&self, response: &Value) -> bool;
}

/// Swagger 2.0: `securityDefinitions`, response `schema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Swagger2Adapter;

/// OpenAPI 3.x: `components.securitySchemes`, response `content` media
/// types carrying a `schema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApi3Adapter;

impl DialectAdapter for Swagger2Adapter {
    fn security_schemes(&self, root: &Value) -> IndexMap<String, SecurityScheme> {
        let base = JsonPointer::root().append("securityDefinitions");
        collect_schemes(root.get("securityDefinitions"), &base, |name, node, pointer| {
            let kind = match node.get("type").and_then(Value::as_str) {
                Some("oauth2") => SchemeKind::OAuth2,
                Some("apiKey") => SchemeKind::ApiKey,
                Some("basic") => SchemeKind::Basic,
                other => {
                    tracing::debug!("Skipping scheme '{name}' with unknown type {other:?}");
                    return None;
                }
            };
            let mut scheme = SecurityScheme::new(kind, pointer.clone());
            if kind == SchemeKind::OAuth2 {
                if let Some(scopes) = node.get("scopes") {
                    scheme.add_scopes(pointer.append("scopes"), scopes);
                }
            }
            Some(scheme)
        })
    }

    fn response_has_body(&self, response: &Value) -> bool {
        response.get("schema").is_some_and(|s| !s.is_null())
    }
}

impl DialectAdapter for OpenApi3Adapter {
    fn security_schemes(&self, root: &Value) -> IndexMap<String, SecurityScheme> {
        let base = JsonPointer::root()
            .append("components")
            .append("securitySchemes");
        let schemes = root.get("components").and_then(|c| c.get("securitySchemes"));
        collect_schemes(schemes, &base, |name, node, pointer| {
            let kind = match node.get("type").and_then(Value::as_str) {
                Some("oauth2") => SchemeKind::OAuth2,
                Some("apiKey") => SchemeKind::ApiKey,
                Some("openIdConnect") => SchemeKind::OpenIdConnect,
                Some("http") => match node.get("scheme").and_then(Value::as_str) {
                    Some(s) if s.eq_ignore_ascii_case("basic") => SchemeKind::Basic,
                    _ => SchemeKind::Http,
                },
                other => {
                    tracing::debug!("Skipping scheme '{name}' with unknown type {other:?}");
                    return None;
                }
            };
            let mut scheme = SecurityScheme::new(kind, pointer.clone());
            if kind == SchemeKind::OAuth2 {
                let flows_ptr = pointer.append("flows");
                let flows = node.get("flows").and_then(Value::as_object);
                for (flow, body) in flows.into_iter().flatten() {
                    if let Some(scopes) = body.get("scopes") {
                        scheme.add_scopes(flows_ptr.append(flow.as_str()).append("scopes"), scopes);
                    }
                }
            }
            Some(scheme)
        })
    }

    fn response_has_body(&self, response: &Value) -> bool {
        response
            .get("content")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|content| content.values())
            .any(|media| media.get("schema").is_some_and(|s| !s.is_null()))
    }
}

fn collect_schemes<F>(
    node: Option<&Value>,
    base: &JsonPointer,
    mut build: F,
) -> IndexMap<String, SecurityScheme>
where
    F: FnMut(&str, &Value, &JsonPointer) -> Option<SecurityScheme>,
{
    let Some(map) = node.and_then(Value::as_object) else {
        return IndexMap::new();
    };

    map.iter()
        .filter_map(|(name, scheme)| {
            if !scheme.is_object() {
                tracing::debug!("Skipping non-object security scheme '{name}'");
                return None;
            }
            build(name, scheme, &base.append(name.as_str())).map(|s| (name.clone(), s))
        })
        .collect()
}
