//! Pattern types used by rule configuration.
//!
//! Patterns are compiled once when a rule is configured; a bad pattern is a
//! setup error, never a per-document violation.

use regex::Regex;
use std::fmt;

/// Characters that make a whitelist entry a regular expression rather than a
/// literal path prefix.
const REGEX_META: &[char] = &[
    '\\', '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '^', '$', '|',
];

/// A regular expression that must match the whole input.
#[derive(Debug, Clone)]
pub struct FullMatch {
    source: String,
    regex: Regex,
}

impl FullMatch {
    /// Compiles `pattern` anchored at both ends.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Whether `input` matches entirely.
    #[must_use]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// The pattern as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for FullMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One path whitelist entry.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    /// Regular expression searched anywhere in the path.
    Regex(Regex),
    /// Literal path prefix.
    Prefix(String),
}

impl PathMatcher {
    /// Parses an entry. Entries containing regex metacharacters are compiled
    /// as regular expressions; anything else is a literal prefix.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error.
    pub fn new(entry: &str) -> Result<Self, regex::Error> {
        if entry.contains(REGEX_META) {
            Regex::new(entry).map(Self::Regex)
        } else {
            Ok(Self::Prefix(entry.to_string()))
        }
    }

    /// Whether `path` is matched.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Regex(regex) => regex.is_match(path),
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// Paths exempted from a rule.
#[derive(Debug, Clone, Default)]
pub struct PathWhitelist {
    matchers: Vec<PathMatcher>,
}

impl PathWhitelist {
    /// Compiles every entry.
    ///
    /// # Errors
    ///
    /// Returns the offending entry with its compilation error.
    pub fn new<I, S>(entries: I) -> Result<Self, (String, regex::Error)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matchers = entries
            .into_iter()
            .map(|e| PathMatcher::new(e.as_ref()).map_err(|err| (e.as_ref().to_string(), err)))
            .collect::<Result<_, _>>()?;
        Ok(Self { matchers })
    }

    /// Whether any entry matches `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether the whitelist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
