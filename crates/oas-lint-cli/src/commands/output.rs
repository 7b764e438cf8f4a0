//! Shared output formatting for lint results.

use anyhow::Result;
use miette::{NamedSource, Report};
use oas_lint_core::{LintResult, Severity, ViolationDiagnostic};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the analyzed file or directory; violation locations are
/// relative to it.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn print_text(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    for ((_, pointer), violations) in result.grouped_by_pointer() {
        if let Some(first) = violations.first() {
            println!("{} (#{})", first.place(), pointer);
        }
        for violation in violations {
            println!(
                "  {} [{}] {}",
                severity_indicator(violation.severity),
                violation.code,
                violation.message
            );
            if let Some(suggestion) = &violation.suggestion {
                println!("    = help: {}", suggestion.message);
            }
        }
        println!();
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, root: &Path) {
    let base = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };
    let mut sources: HashMap<PathBuf, Option<String>> = HashMap::new();

    for violation in &result.violations {
        let diagnostic = ViolationDiagnostic::from(violation);
        let source = violation.location.as_ref().and_then(|loc| {
            sources
                .entry(loc.file.clone())
                .or_insert_with(|| std::fs::read_to_string(base.join(&loc.file)).ok())
                .clone()
                .map(|text| NamedSource::new(loc.file.display().to_string(), text))
        });
        let report = match source {
            Some(source) => Report::new(diagnostic).with_source_code(source),
            None => Report::new(diagnostic),
        };
        eprintln!("{} (#{})", severity_indicator(violation.severity), violation.pointer);
        eprintln!("{report:?}");
    }

    let (errors, warnings, infos) = result.count_by_severity();
    eprintln!(
        "Found {} error(s), {} warning(s), {} info(s) in {} file(s)",
        errors, warnings, infos, result.files_checked
    );
}
