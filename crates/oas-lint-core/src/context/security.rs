//! Security scheme and requirement types shared by both dialects.

use crate::pointer::JsonPointer;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::fmt;

/// Kind of a declared security scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    /// OAuth2 flows with declared scopes.
    OAuth2,
    /// API key in header, query or cookie.
    ApiKey,
    /// HTTP authentication (e.g. bearer).
    Http,
    /// HTTP basic authentication.
    Basic,
    /// OpenID Connect discovery.
    OpenIdConnect,
}

impl SchemeKind {
    /// Whether requirements on this kind list scopes that must be declared
    /// in the document.
    #[must_use]
    pub fn declares_scopes(self) -> bool {
        matches!(self, Self::OAuth2)
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OAuth2 => "oauth2",
            Self::ApiKey => "apiKey",
            Self::Http => "http",
            Self::Basic => "basic",
            Self::OpenIdConnect => "openIdConnect",
        };
        f.write_str(name)
    }
}

/// A `scopes` object inside a scheme declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode {
    /// Pointer to the `scopes` object.
    pub pointer: JsonPointer,
    /// Scope names in declaration order.
    pub scopes: Vec<String>,
}

/// A declared security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityScheme {
    /// Scheme kind.
    pub kind: SchemeKind,
    /// Pointer to the scheme declaration.
    pub pointer: JsonPointer,
    /// Union of all declared scope names (empty for non-OAuth2 kinds).
    pub declared_scopes: IndexSet<String>,
    /// Every `scopes` object the declaration contains.
    pub scope_nodes: Vec<ScopeNode>,
}

impl SecurityScheme {
    /// Creates a scheme of the given kind with no scopes.
    #[must_use]
    pub fn new(kind: SchemeKind, pointer: JsonPointer) -> Self {
        Self {
            kind,
            pointer,
            declared_scopes: IndexSet::new(),
            scope_nodes: Vec::new(),
        }
    }

    /// Records a `scopes` object found at `pointer`.
    pub(crate) fn add_scopes(&mut self, pointer: JsonPointer, node: &Value) {
        let Some(map) = node.as_object() else {
            tracing::debug!("Ignoring non-object scopes at {pointer}");
            return;
        };
        let scopes: Vec<String> = map.keys().cloned().collect();
        self.declared_scopes.extend(scopes.iter().cloned());
        self.scope_nodes.push(ScopeNode { pointer, scopes });
    }

    /// Whether `scope` is declared by this scheme.
    #[must_use]
    pub fn declares(&self, scope: &str) -> bool {
        self.declared_scopes.contains(scope)
    }
}

/// One alternative of a security requirement: every listed scheme must be
/// satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    entries: IndexMap<String, Vec<String>>,
}

impl RequirementSet {
    /// Builds a set from scheme name / scope list pairs.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Scheme names with their required scopes, in declaration order.
    pub fn schemes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Whether this set references no scheme at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A disjunction of [`RequirementSet`]s attached at document or operation
/// level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequirement {
    /// Pointer to the `security` node.
    pub pointer: JsonPointer,
    /// Alternatives; any satisfied set secures the operation.
    pub alternatives: Vec<RequirementSet>,
}

impl SecurityRequirement {
    /// Whether the requirement has zero alternatives (explicitly public).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Parses a `security` array. Returns `None` when the node is not an array.
    pub(crate) fn parse(node: &Value, pointer: JsonPointer) -> Option<Self> {
        let Some(items) = node.as_array() else {
            tracing::debug!("Ignoring non-array security at {pointer}");
            return None;
        };

        let alternatives = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let Some(map) = item.as_object() else {
                    tracing::debug!("Ignoring non-object requirement at {pointer}/{i}");
                    return None;
                };
                Some(RequirementSet::from_entries(
                    map.iter().map(|(name, scopes)| (name.as_str(), scope_list(scopes))),
                ))
            })
            .collect();

        Some(Self {
            pointer,
            alternatives,
        })
    }
}

fn scope_list(node: &Value) -> Vec<String> {
    node.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
