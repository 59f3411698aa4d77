use crate::support::{LoadedSheet, Workspace, or_exit, print_json, sheets_of};
use colored::Colorize;
use pantry_governance::{RuleSet, Severity, Violation, ViolationCounts, check_governance};
use serde_json::json;

/// Governance violations over every loaded token file.
pub fn violations(workspace: &Workspace, loaded: &[LoadedSheet]) -> Vec<Violation> {
    let rules = or_exit(
        RuleSet::new(&workspace.config.governance),
        "invalid governance rules",
    );
    check_governance(&sheets_of(loaded), &rules)
}

pub fn print_violations(violations: &[Violation]) {
    for violation in violations {
        let label = match violation.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!(
            "  - {label} [{}] {}: {}",
            violation.rule, violation.file, violation.message
        );
    }
}

pub fn run(workspace: &Workspace, json_output: bool) {
    let loaded = workspace.load_token_sheets();
    let violations = violations(workspace, &loaded);
    let counts = ViolationCounts::of(&violations);
    let tokens: usize = loaded.iter().map(|entry| entry.sheet.len()).sum();

    if json_output {
        let result = if counts.errors == 0 {
            "accepted"
        } else {
            "rejected"
        };
        let files: Vec<&str> = loaded.iter().map(|entry| entry.logical.as_str()).collect();
        let payload = json!({
            "result": result,
            "files": files,
            "tokens": tokens,
            "counts": counts,
            "violations": violations,
        });
        print_json(&payload, "governance");
    } else if counts.errors == 0 {
        println!(
            "{} (files={}, tokens={tokens}, warnings={})",
            "[governance] OK".green(),
            loaded.len(),
            counts.warnings
        );
        print_violations(&violations);
    } else {
        println!(
            "{} (errors={}, warnings={})",
            "[governance] FAIL".red(),
            counts.errors,
            counts.warnings
        );
        print_violations(&violations);
    }

    if counts.errors > 0 {
        std::process::exit(1);
    }
}
