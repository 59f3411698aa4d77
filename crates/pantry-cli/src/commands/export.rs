use crate::commands::governance::{print_violations, violations};
use crate::support::{Workspace, or_exit, sheets_of, timestamp};
use colored::Colorize;
use pantry_governance::ViolationCounts;
use pantry_report::{
    CSS_FILE, DesignTokensDocument, JSON_FILE, SCSS_FILE, render_css, render_scss, write_json,
    write_text,
};
use pantry_tokens::merge_sheets;
use std::path::PathBuf;

pub fn run(workspace: &Workspace, output: Option<PathBuf>, validate_only: bool) {
    let loaded = workspace.load_token_sheets();
    let violations = violations(workspace, &loaded);
    let counts = ViolationCounts::of(&violations);
    if counts.errors > 0 {
        println!(
            "{} (errors={}, warnings={})",
            "[export] FAIL".red(),
            counts.errors,
            counts.warnings
        );
        print_violations(&violations);
        std::process::exit(1);
    }

    let tokens = merge_sheets(&sheets_of(&loaded));
    if validate_only {
        println!(
            "{} (validate-only, tokens={}, warnings={})",
            "[export] OK".green(),
            tokens.len(),
            counts.warnings
        );
        return;
    }

    let out_dir = workspace.output_path(output, &workspace.config.output.export_dir);
    let document = DesignTokensDocument::new(&tokens, timestamp());
    or_exit(
        write_json(&out_dir.join(JSON_FILE), &document),
        "failed to write token export",
    );
    or_exit(
        write_text(&out_dir.join(CSS_FILE), &render_css(&tokens)),
        "failed to write token export",
    );
    or_exit(
        write_text(&out_dir.join(SCSS_FILE), &render_scss(&tokens)),
        "failed to write token export",
    );

    println!(
        "{} (tokens={}, digest={}, dir={})",
        "[export] OK".green(),
        document.token_count,
        document.digest,
        out_dir.display()
    );
}
