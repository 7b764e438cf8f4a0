//! JSON Pointer values addressing nodes of an API description.
//!
//! A [`JsonPointer`] is an immutable sequence of unescaped tokens. Extending a
//! pointer always produces a new value, so a pointer captured inside a
//! [`Violation`](crate::Violation) is never affected by later traversal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Errors produced when parsing the canonical pointer encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    /// Non-empty pointer that does not start with `/`.
    #[error("json pointer must be empty or start with '/': {0}")]
    InvalidPrefix(String),

    /// A `~` not followed by `0` or `1`.
    #[error("json pointer contains invalid escape (only ~0 and ~1 are allowed): {0}")]
    InvalidEscape(String),
}

/// An RFC 6901 pointer into a document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    /// Pointer to the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a pointer from unescaped tokens.
    #[must_use]
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new pointer with `token` appended.
    #[must_use]
    pub fn append(&self, token: impl Into<String>) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend(self.tokens.iter().cloned());
        tokens.push(token.into());
        Self { tokens }
    }

    /// Returns a new pointer with an array index appended.
    #[must_use]
    pub fn append_index(&self, index: usize) -> Self {
        self.append(index.to_string())
    }

    /// The unescaped tokens of this pointer.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether this pointer addresses the document root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Pointer to the parent node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.tokens.split_last()?;
        Some(Self {
            tokens: rest.to_vec(),
        })
    }

    /// Parses the canonical `/a/b~1c` encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is non-empty without a leading `/`,
    /// or contains an escape other than `~0` / `~1`.
    pub fn parse(encoded: &str) -> Result<Self, PointerError> {
        if encoded.is_empty() {
            return Ok(Self::root());
        }
        let Some(body) = encoded.strip_prefix('/') else {
            return Err(PointerError::InvalidPrefix(encoded.to_string()));
        };

        let tokens = body
            .split('/')
            .map(unescape)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| PointerError::InvalidEscape(encoded.to_string()))?;
        Ok(Self { tokens })
    }

    /// Resolves this pointer against a JSON value.
    #[must_use]
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.tokens.iter().try_fold(root, |node, token| match node {
            Value::Object(map) => map.get(token),
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(ch);
        }
    }
    Some(out)
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", escape(token))?;
        }
        Ok(())
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::parse(&encoded).map_err(serde::de::Error::custom)
    }
}
