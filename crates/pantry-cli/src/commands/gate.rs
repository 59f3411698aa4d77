use crate::commands::{coverage, governance, schema_validate};
use crate::support::{Workspace, or_exit, print_json, timestamp};
use colored::Colorize;
use pantry_governance::ViolationCounts;
use pantry_report::{
    CheckStatus, GateStatus, coverage_check, evaluate_gate, governance_check, schema_check,
    unused_tokens_check, write_json,
};
use std::path::PathBuf;

pub const REPORT_FILE: &str = "quality-gate-report.json";

pub fn run(workspace: &Workspace, output: Option<PathBuf>, json_output: bool) {
    let loaded = workspace.load_token_sheets();
    let violations = governance::violations(workspace, &loaded);
    let coverage = coverage::build(workspace, &loaded);
    let schema = schema_validate::build(workspace);

    let checks = vec![
        governance_check(ViolationCounts::of(&violations)),
        coverage_check(&coverage),
        unused_tokens_check(&coverage),
        schema_check(&schema),
    ];
    let report = evaluate_gate(checks, timestamp());

    let out_dir = workspace.output_path(output, &workspace.config.output.report_dir);
    or_exit(
        write_json(&out_dir.join(REPORT_FILE), &report),
        "failed to write quality gate report",
    );

    if json_output {
        print_json(&report, "gate");
    } else {
        let line = format!("[gate] {}", report.status.as_str());
        let line = match report.status {
            GateStatus::Pass => line.green(),
            GateStatus::PassWithWarnings | GateStatus::ConditionalPass => line.yellow(),
            GateStatus::Fail => line.red(),
        };
        println!(
            "{line} ({}; successRate={:.1}%)",
            report.message, report.summary.success_rate
        );
        for check in &report.checks {
            let status = match check.status {
                CheckStatus::Pass => "pass".green(),
                CheckStatus::Warning => "warning".yellow(),
                CheckStatus::Fail => "fail".red(),
            };
            println!("  - {} [{status}] {}", check.id, check.details.join("; "));
        }
    }

    if report.status == GateStatus::Fail {
        std::process::exit(1);
    }
}
