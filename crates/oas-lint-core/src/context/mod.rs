//! Dialect-agnostic view of one parsed API description.
//!
//! [`DocumentContext`] is built once per document and is read-only afterwards,
//! so rules may query it concurrently. Both Swagger 2.0 and OpenAPI 3.x are
//! exposed through the same surface; the differences live in
//! [`DialectAdapter`] implementations.

mod adapter;
mod security;

pub use adapter::{DialectAdapter, OpenApi3Adapter, Swagger2Adapter};
pub use security::{
    RequirementSet, SchemeKind, ScopeNode, SecurityRequirement, SecurityScheme,
};

use crate::locate::{locate, SourcePosition};
use crate::pointer::JsonPointer;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors building a [`DocumentContext`].
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// IO error reading a document.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The text is neither valid YAML nor JSON.
    #[error("Failed to parse document: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// The root declares neither `swagger: 2.x` nor `openapi: 3.x`.
    #[error("Not a Swagger 2.0 or OpenAPI 3.x document")]
    UnknownDialect,
}

/// API description dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Swagger 2.0.
    Swagger2,
    /// OpenAPI 3.x.
    OpenApi3,
}

impl Dialect {
    /// Detects the dialect from the root version field.
    #[must_use]
    pub fn detect(root: &Value) -> Option<Self> {
        let version = |key: &str| {
            root.get(key).and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };
        if version("swagger").is_some_and(|v| v.starts_with("2.")) {
            Some(Self::Swagger2)
        } else if version("openapi").is_some_and(|v| v.starts_with("3.")) {
            Some(Self::OpenApi3)
        } else {
            None
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swagger2 => write!(f, "swagger2"),
            Self::OpenApi3 => write!(f, "openapi3"),
        }
    }
}

/// HTTP methods that may carry an operation under a path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl Method {
    /// Parses a lower-case path item key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            "patch" => Some(Self::Patch),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Upper-case method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation: a method under a path template.
#[derive(Debug, Clone)]
pub struct Operation<'a> {
    /// Path template (e.g. `/pets/{id}`).
    pub path: &'a str,
    /// HTTP method.
    pub method: Method,
    /// Pointer to the operation object.
    pub pointer: JsonPointer,
    /// The operation object.
    pub node: &'a Value,
}

/// One declared response of an operation.
#[derive(Debug, Clone)]
pub struct Response<'a> {
    /// Status code key as written (`200`, `default`, `2XX`).
    pub code: &'a str,
    /// Pointer to the response object.
    pub pointer: JsonPointer,
    /// The response object (possibly a local `$ref`).
    pub node: &'a Value,
}

/// Read-only query surface over one API description.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    dialect: Dialect,
    root: Value,
    source: Option<String>,
    file: Option<PathBuf>,
    schemes: IndexMap<String, SecurityScheme>,
}

impl DocumentContext {
    /// Builds a context from an already parsed tree.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::UnknownDialect`] if the tree is not a
    /// Swagger 2.0 or OpenAPI 3.x document.
    pub fn from_value(root: Value) -> Result<Self, ContextError> {
        let dialect = Dialect::detect(&root).ok_or(ContextError::UnknownDialect)?;
        let schemes = adapter_for(dialect).security_schemes(&root);
        Ok(Self {
            dialect,
            root,
            source: None,
            file: None,
            schemes,
        })
    }

    /// Parses YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or is not an API
    /// description.
    pub fn parse(content: &str) -> Result<Self, ContextError> {
        let root = parse_tree(content).map_err(|e| ContextError::Parse {
            message: e.to_string(),
        })?;
        let mut ctx = Self::from_value(root)?;
        ctx.source = Some(content.to_string());
        Ok(ctx)
    }

    /// Reads and parses a document file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ContextError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContextError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut ctx = Self::parse(&content)?;
        ctx.file = Some(path.to_path_buf());
        Ok(ctx)
    }

    /// Sets the file this context is reported against.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// The document dialect.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The parsed document tree.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The file this context was read from, if any.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// All operations in declaration order.
    ///
    /// Malformed path items and operations are skipped. The iterator is lazy
    /// and may be recreated any number of times.
    pub fn operations(&self) -> impl Iterator<Item = Operation<'_>> + '_ {
        let paths_ptr = JsonPointer::root().append("paths");
        let paths = self.root.get("paths").and_then(Value::as_object);

        paths
            .into_iter()
            .flatten()
            .filter_map(|(path, item)| match item {
                Value::Object(map) if map.contains_key("$ref") => {
                    tracing::debug!("Skipping referenced path item {path}");
                    None
                }
                Value::Object(map) => Some((path.as_str(), map)),
                _ => {
                    tracing::debug!("Skipping malformed path item {path}");
                    None
                }
            })
            .flat_map(move |(path, item)| {
                let item_ptr = paths_ptr.append(path);
                item.iter().filter_map(move |(key, node)| {
                    let method = Method::from_key(key)?;
                    if !node.is_object() {
                        tracing::debug!("Skipping malformed operation {method} {path}");
                        return None;
                    }
                    Some(Operation {
                        path,
                        method,
                        pointer: item_ptr.append(key.as_str()),
                        node,
                    })
                })
            })
    }

    /// Declared security schemes by name, in declaration order.
    #[must_use]
    pub fn security_schemes(&self) -> &IndexMap<String, SecurityScheme> {
        &self.schemes
    }

    /// The document-level security requirement, if declared.
    #[must_use]
    pub fn default_security(&self) -> Option<SecurityRequirement> {
        let node = self.root.get("security")?;
        SecurityRequirement::parse(node, JsonPointer::root().append("security"))
    }

    /// The operation's own security requirement.
    ///
    /// `None` means the operation inherits the document default; an empty
    /// requirement means the operation is explicitly public.
    #[must_use]
    pub fn operation_security(&self, operation: &Operation<'_>) -> Option<SecurityRequirement> {
        let node = operation.node.get("security")?;
        SecurityRequirement::parse(node, operation.pointer.append("security"))
    }

    /// Responses declared by an operation, in declaration order.
    pub fn responses<'a>(
        &'a self,
        operation: &Operation<'a>,
    ) -> impl Iterator<Item = Response<'a>> + 'a {
        let responses_ptr = operation.pointer.append("responses");
        operation
            .node
            .get("responses")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .map(move |(code, node)| Response {
                code: code.as_str(),
                pointer: responses_ptr.append(code.as_str()),
                node,
            })
    }

    /// Whether a response declares a body, following local `$ref`s.
    #[must_use]
    pub fn response_has_body(&self, response: &Response<'_>) -> bool {
        adapter_for(self.dialect).response_has_body(self.deref_local(response.node))
    }

    /// Follows a local (`#/...`) `$ref`, returning the node itself otherwise.
    ///
    /// Reference chains are followed a bounded number of times.
    #[must_use]
    pub fn deref_local<'a>(&'a self, mut node: &'a Value) -> &'a Value {
        for _ in 0..8 {
            let Some(target) = node
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|r| r.strip_prefix('#'))
                .and_then(|r| JsonPointer::parse(r).ok())
                .and_then(|p| p.resolve(&self.root))
            else {
                break;
            };
            node = target;
        }
        node
    }

    /// Whether `pointer` addresses a node of this document.
    #[must_use]
    pub fn contains(&self, pointer: &JsonPointer) -> bool {
        pointer.resolve(&self.root).is_some()
    }

    /// Resolves a pointer to its position in the source text.
    #[must_use]
    pub fn line_for(&self, pointer: &JsonPointer) -> Option<SourcePosition> {
        let source = self.source.as_deref()?;
        Some(locate(source, &self.root, pointer))
    }
}

fn adapter_for(dialect: Dialect) -> &'static dyn DialectAdapter {
    match dialect {
        Dialect::Swagger2 => &Swagger2Adapter,
        Dialect::OpenApi3 => &OpenApi3Adapter,
    }
}

/// Parses YAML (and therefore JSON) text into a JSON tree.
///
/// Mapping keys are stringified so that `200:` and `'200':` address the
/// same node.
pub(crate) fn parse_tree(content: &str) -> Result<Value, serde_yaml::Error> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(yaml_to_json(yaml))
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                if let Some(key) = yaml_key(key) {
                    map.insert(key, yaml_to_json(value));
                }
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            tracing::debug!("Skipping non-scalar mapping key");
            None
        }
    }
}
