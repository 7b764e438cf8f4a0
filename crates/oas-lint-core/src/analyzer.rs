//! Core analyzer for orchestrating lint execution.

use crate::config::{default_include, Config};
use crate::context::{ContextError, DocumentContext};
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Location, Violation};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error building a document context.
    #[error("Failed to load {path}: {source}")]
    Context {
        /// Path to the document that failed to load.
        path: PathBuf,
        /// Underlying context error.
        source: ContextError,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds an include glob pattern, relative to the root.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on unparsable documents (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let root = self
            .root
            .or_else(|| self.config.as_ref().map(|c| c.analyzer.root.clone()))
            .unwrap_or_else(|| PathBuf::from("."));

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        // Merge patterns from config
        let mut exclude_patterns = self.exclude_patterns;
        let mut include_patterns = self.include_patterns;
        if let Some(ref config) = self.config {
            exclude_patterns.extend(config.analyzer.exclude.clone());
            if include_patterns.is_empty() {
                include_patterns.extend(config.analyzer.include.clone());
            }
        }

        if exclude_patterns.is_empty() {
            exclude_patterns.extend([
                "**/target/**".to_string(),
                "**/node_modules/**".to_string(),
            ]);
        }
        if include_patterns.is_empty() {
            include_patterns = default_include();
        }

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude_patterns,
            include_patterns,
            config: self.config.unwrap_or_default(),
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Config,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Analyzes every API description under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, or if a document cannot be
    /// parsed and `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        if self.root.is_file() {
            return self.analyze_files(std::slice::from_ref(&self.root));
        }

        info!("Starting analysis at {:?}", self.root);
        let files = self.discover_files()?;
        info!("Found {} candidate files", files.len());
        self.analyze_files(&files)
    }

    fn analyze_files(&self, files: &[PathBuf]) -> Result<LintResult, AnalyzerError> {
        let mut result = LintResult::new();

        for path in files {
            match DocumentContext::from_file(path) {
                Ok(ctx) => {
                    let ctx = ctx.with_file(self.display_path(path));
                    result.violations.extend(self.check_document(&ctx));
                    result.files_checked += 1;
                }
                Err(ContextError::UnknownDialect) => {
                    debug!("Skipping non-API file: {}", path.display());
                }
                Err(e @ ContextError::Io { .. }) => {
                    return Err(AnalyzerError::Context {
                        path: path.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Context {
                            path: path.clone(),
                            source: e,
                        });
                    }
                }
            }
        }

        // Stable: keeps each rule's document order within a line.
        result.violations.sort_by(|a, b| {
            let key = |v: &Violation| v.location.as_ref().map(|l| (l.file.clone(), l.line));
            key(a).cmp(&key(b))
        });

        info!(
            "Analysis complete: {} violations in {} documents",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs every enabled rule against one document.
    ///
    /// Severity overrides from the configuration are applied and each
    /// violation gets a source location when the context has source text.
    #[must_use]
    pub fn check_document(&self, ctx: &DocumentContext) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let rule_violations = rule.check(ctx);
            debug_assert!(
                rule_violations.iter().all(|v| ctx.contains(&v.pointer)),
                "rule {} reported a pointer outside the document",
                rule.name()
            );
            let rule_violations = self.apply_severity_override(rule.name(), rule_violations);
            violations.extend(rule_violations);
        }

        violations
            .into_iter()
            .map(|v| attach_location(ctx, v))
            .collect()
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers candidate API description files.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut files = Vec::new();

        for include in &self.include_patterns {
            let pattern = format!("{}/{}", self.root.display(), include);
            for entry in glob::glob(&pattern)? {
                let path = entry.map_err(|e| AnalyzerError::Io(e.into_error()))?;

                if self.should_exclude(&path) {
                    debug!("Excluding: {}", path.display());
                    continue;
                }

                if !files.contains(&path) {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
            }

            // Also check as substring for patterns like "**/target/**"
            let normalized_pattern = pattern.replace("**", "");
            if !normalized_pattern.is_empty() && path_str.contains(&normalized_pattern) {
                return true;
            }
        }

        false
    }

    fn display_path(&self, path: &Path) -> PathBuf {
        let base = if self.root.is_file() {
            self.root.parent().unwrap_or(&self.root)
        } else {
            &self.root
        };
        path.strip_prefix(base)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }
}

fn attach_location(ctx: &DocumentContext, violation: Violation) -> Violation {
    let (Some(file), Some(position)) = (ctx.file(), ctx.line_for(&violation.pointer)) else {
        return violation;
    };
    let location =
        Location::new(file.to_path_buf(), position.line).with_span(position.offset, position.length);
    violation.with_location(location)
}
