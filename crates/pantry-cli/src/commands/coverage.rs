use crate::support::{LoadedSheet, Workspace, or_exit, print_json, sheets_of, timestamp};
use colored::Colorize;
use pantry_report::{
    CoverageReport, build_coverage_report, render_coverage_markdown, write_json, write_text,
};
use pantry_tokens::merge_sheets;
use std::path::PathBuf;

pub const JSON_REPORT: &str = "token-analysis-report.json";
pub const MARKDOWN_REPORT: &str = "token-coverage-report.md";

pub fn build(workspace: &Workspace, loaded: &[LoadedSheet]) -> CoverageReport {
    let defined = merge_sheets(&sheets_of(loaded));
    let scans = workspace.scan_sources();
    build_coverage_report(
        &defined,
        &scans,
        workspace.config.coverage.threshold,
        timestamp(),
    )
}

fn print_summary(report: &CoverageReport) {
    println!(
        "{} (defined={}, used={}, usageRate={:.1}%, coverage={:.1}%)",
        "[coverage] OK".green(),
        report.tokens_defined,
        report.tokens_used,
        report.usage_rate,
        report.coverage_rate
    );
    for (category, stats) in &report.categories {
        if stats.defined > 0 {
            println!("  {category}: {}/{} used", stats.used, stats.defined);
        }
    }
    if !report.problem_files.is_empty() {
        println!(
            "  {}",
            format!(
                "{} files below {:.1}% coverage:",
                report.problem_files.len(),
                report.threshold
            )
            .yellow()
        );
        for file in &report.problem_files {
            println!("    - {} ({:.1}%)", file.file, file.coverage);
        }
    }
    for item in &report.recommendations {
        println!("  * {item}");
    }
}

pub fn run(workspace: &Workspace, json_output: bool, output: Option<PathBuf>) {
    let loaded = workspace.load_token_sheets();
    let report = build(workspace, &loaded);

    let out_dir = workspace.output_path(output, &workspace.config.output.report_dir);
    or_exit(
        write_json(&out_dir.join(JSON_REPORT), &report),
        "failed to write coverage report",
    );
    or_exit(
        write_text(&out_dir.join(MARKDOWN_REPORT), &render_coverage_markdown(&report)),
        "failed to write coverage report",
    );

    if json_output {
        print_json(&report, "coverage");
    } else {
        print_summary(&report);
        println!("  reports: {}", out_dir.display());
    }
}
