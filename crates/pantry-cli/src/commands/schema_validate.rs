use crate::support::{Workspace, or_exit, print_json, timestamp};
use colored::Colorize;
use pantry_governance::{
    EntityStatus, SchemaValidationReport, render_schema_report, validate_schema_mappings,
};
use pantry_report::write_text;
use std::fs;
use std::path::PathBuf;

pub fn build(workspace: &Workspace) -> SchemaValidationReport {
    validate_schema_mappings(&workspace.config.schema.entities, |relative| {
        let path = workspace.resolve(relative);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "schema source unreadable");
                None
            }
        }
    })
}

pub fn run(workspace: &Workspace, report_path: Option<PathBuf>, json_output: bool) {
    let report = build(workspace);
    let path = workspace.output_path(report_path, &workspace.config.schema.report_path);
    or_exit(
        write_text(&path, &render_schema_report(&report, &timestamp())),
        "failed to write schema report",
    );

    if json_output {
        print_json(&report, "schema-validate");
    } else {
        let summary = format!(
            "(entities={}, passed={}, partial={}, failed={}, critical={})",
            report.entities.len(),
            report.count(EntityStatus::Passed),
            report.count(EntityStatus::Partial),
            report.count(EntityStatus::Failed),
            report.critical_issues.len()
        );
        if report.passed {
            println!("{} {summary}", "[schema-validate] OK".green());
        } else {
            println!("{} {summary}", "[schema-validate] FAIL".red());
        }
        for entity in &report.entities {
            for error in &entity.errors {
                println!("  - {} {}: {error}", "error".red().bold(), entity.entity);
            }
            for warning in &entity.warnings {
                println!("  - {} {}: {warning}", "warning".yellow().bold(), entity.entity);
            }
        }
        for issue in &report.critical_issues {
            println!("  - {} {issue}", "critical".red().bold());
        }
        println!("  report: {}", path.display());
    }

    if !report.passed {
        std::process::exit(1);
    }
}
