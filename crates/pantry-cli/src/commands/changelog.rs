use crate::support::{Workspace, fail, or_exit};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use pantry_history::{GitHistory, HistoryError};
use pantry_report::{
    diff_against_history, insert_changelog_section, read_or_empty, render_changelog_section,
    write_text,
};

fn parse_date(date: Option<String>) -> NaiveDate {
    match date {
        None => Local::now().date_naive(),
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .unwrap_or_else(|err| fail(format!("invalid --date {raw:?}: {err}"))),
    }
}

pub fn run(workspace: &Workspace, revision: Option<String>, date: Option<String>) {
    let date = parse_date(date);
    let revision = revision.unwrap_or_else(|| workspace.config.changelog.revision.clone());
    let history = GitHistory::new(&workspace.root, revision.as_str());

    let mut diffs = Vec::new();
    for loaded in workspace.load_token_sheets() {
        match diff_against_history(&loaded.path, &loaded.logical, &loaded.text, &history) {
            Ok(Some(diff)) => diffs.push(diff),
            Ok(None) => {}
            Err(HistoryError::NotInstalled) => {
                tracing::info!(file = %loaded.logical, "git unavailable; recording zero changes");
            }
            Err(err) => fail(format!("failed to read {} at {revision}: {err}", loaded.logical)),
        }
    }

    let added: usize = diffs.iter().map(|diff| diff.added.len()).sum();
    let removed: usize = diffs.iter().map(|diff| diff.removed.len()).sum();

    let Some(section) = render_changelog_section(date, &diffs) else {
        println!(
            "{} (no token changes since {revision})",
            "[changelog] OK".green()
        );
        return;
    };

    let path = workspace.resolve(&workspace.config.changelog.path);
    let existing = or_exit(read_or_empty(&path), "failed to read changelog");
    or_exit(
        write_text(&path, &insert_changelog_section(&existing, &section)),
        "failed to write changelog",
    );
    println!(
        "{} (date={}, files={}, added={added}, removed={removed}, path={})",
        "[changelog] OK".green(),
        date.format("%Y-%m-%d"),
        diffs.iter().filter(|diff| !diff.is_empty()).count(),
        path.display()
    );
}
