//! Markdown changelog maintenance.
//!
//! Sections are dated and newest-first: a new section goes directly under
//! the title block, ahead of every earlier `## ` heading.

use crate::diff::{TokenDiff, TokenEntry};
use chrono::NaiveDate;
use std::fmt::Write as _;

pub const DEFAULT_TITLE: &str = "# Design Token Changelog\n\nAll notable changes to the KitchenPantry design tokens are recorded here, newest first.\n";

fn push_entries(out: &mut String, heading: &str, entries: &[TokenEntry]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "**{heading}**");
    let _ = writeln!(out);
    for entry in entries {
        let _ = writeln!(out, "- `--{}`: `{}`", entry.name, entry.value);
    }
    let _ = writeln!(out);
}

/// Render one dated section; `None` when no diff carries changes.
pub fn render_changelog_section(date: NaiveDate, diffs: &[TokenDiff]) -> Option<String> {
    let changed: Vec<&TokenDiff> = diffs.iter().filter(|diff| !diff.is_empty()).collect();
    if changed.is_empty() {
        return None;
    }
    let mut out = String::new();
    let _ = writeln!(out, "## {}", date.format("%Y-%m-%d"));
    let _ = writeln!(out);
    for diff in changed {
        let _ = writeln!(out, "### {}", diff.file);
        let _ = writeln!(out);
        push_entries(&mut out, "Added", &diff.added);
        push_entries(&mut out, "Removed", &diff.removed);
    }
    Some(out)
}

/// Insert `section` ahead of the first existing `## ` section.
pub fn insert_changelog_section(existing: &str, section: &str) -> String {
    let base = if existing.trim().is_empty() {
        DEFAULT_TITLE
    } else {
        existing
    };

    let mut offset = 0;
    let mut split_at = None;
    for line in base.split_inclusive('\n') {
        if line.starts_with("## ") {
            split_at = Some(offset);
            break;
        }
        offset += line.len();
    }

    let (head, tail) = base.split_at(split_at.unwrap_or(base.len()));
    let mut out = head.trim_end().to_string();
    out.push_str("\n\n");
    out.push_str(section.trim_end());
    out.push('\n');
    if !tail.is_empty() {
        out.push('\n');
        out.push_str(tail);
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
