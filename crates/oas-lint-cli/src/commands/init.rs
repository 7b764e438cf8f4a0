//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# oas-lint configuration

# Rule preset: "recommended" (default) or "minimal"
# preset = "recommended"

# Lowest severity that fails the run: "error" (default), "warning" or "info"
# fail_on = "error"

[analyzer]
# File or directory to analyze (default: current directory)
# root = "./api"

# Glob patterns of API descriptions, relative to the root
# include = ["**/*.yaml", "**/*.yml", "**/*.json"]

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/node_modules/**",
]

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.secure-all-endpoints-with-scopes]
enabled = true
# severity = "warning"  # Override default severity
scope_regex = "^(uid|[a-z][a-z0-9-]*\\.(read|write))$"
# Paths exempt from the security requirement; entries with regex
# metacharacters are regular expressions, others are path prefixes
path_whitelist = []

[rules.use-standard-http-status-codes]
enabled = true
"#;

const CONFIG_FILE: &str = "oas-lint.toml";

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: oas-lint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
