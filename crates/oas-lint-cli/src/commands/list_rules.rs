//! List rules command implementation.

use oas_lint_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<36} Description", "Code", "Name");
    println!("{}", "-".repeat(100));

    for rule in all_rules() {
        println!(
            "{:<8} {:<36} {}",
            rule.code(),
            rule.name(),
            rule.description()
        );
    }

    println!("\nPresets:");
    println!("  recommended  - OL104, OL150 (default)");
    println!("  minimal      - OL104 only (for gradual adoption)");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  oas-lint check --rules secure-all-endpoints-with-scopes");
    println!("  oas-lint check --rules OL150");
}
