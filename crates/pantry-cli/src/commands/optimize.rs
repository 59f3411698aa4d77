use crate::cli::ModeArg;
use crate::support::{Workspace, or_exit, print_json, timestamp};
use colored::Colorize;
use pantry_report::{OptimizationReport, OptimizeMode, shake_sheet, write_json, write_optimized};
use pantry_tokens::UsageSite;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const REPORT_FILE: &str = "optimization-report.json";

pub fn run(workspace: &Workspace, mode: ModeArg, output: Option<PathBuf>, json_output: bool) {
    let mode = match mode {
        ModeArg::Analyze => OptimizeMode::Analyze,
        ModeArg::Optimize => OptimizeMode::Optimize,
    };

    let sites: Vec<UsageSite> = workspace
        .scan_sources()
        .into_iter()
        .flat_map(|scan| scan.usages)
        .collect();
    let used = pantry_tokens::used_token_names(&sites);
    let preserve: BTreeSet<String> = workspace.config.optimizer.preserve.iter().cloned().collect();

    let outcomes: Vec<_> = workspace
        .load_token_sheets()
        .iter()
        .map(|loaded| shake_sheet(&loaded.logical, &loaded.text, &used, &preserve))
        .collect();

    let out_dir = workspace.output_path(output, &workspace.config.optimizer.output_dir);
    if mode == OptimizeMode::Optimize {
        or_exit(
            write_optimized(&out_dir, &workspace.root, &outcomes),
            "failed to write optimized token files",
        );
    }
    let report = OptimizationReport::new(mode, outcomes, timestamp());
    if mode == OptimizeMode::Optimize {
        or_exit(
            write_json(&out_dir.join(REPORT_FILE), &report),
            "failed to write optimization report",
        );
    }

    if json_output {
        print_json(&report, "optimize");
        return;
    }

    println!(
        "{} (mode={}, files={}, removed={}, savings={:.1}%)",
        "[optimize] OK".green(),
        mode.as_str(),
        report.files.len(),
        report.total_removed,
        report.savings_percent
    );
    for file in &report.files {
        println!(
            "  - {}: used={}, preserved={}, removed={}, {} -> {} bytes",
            file.file, file.used, file.preserved, file.removed, file.bytes_before, file.bytes_after
        );
        if !file.removed_tokens.is_empty() {
            let names: Vec<String> = file
                .removed_tokens
                .iter()
                .map(|name| format!("--{name}"))
                .collect();
            println!("    {}", names.join(", ").dimmed());
        }
    }
    if mode == OptimizeMode::Optimize {
        println!("  output: {}", out_dir.display());
    }
}
