//! Tree-shaking of token definition files.
//!
//! A declaration survives when its name was seen at a usage site or is on
//! the preserve list. Everything else is cut out of the text together with
//! trailing same-line whitespace and a trailing `/* ... */` comment. A
//! standalone comment line heading a run of declarations goes too once every
//! declaration in that run is gone.

use crate::artifacts::write_text;
use crate::error::ReportError;
use pantry_tokens::declarations;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeMode {
    Analyze,
    Optimize,
}

impl OptimizeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizeMode::Analyze => "analyze",
            OptimizeMode::Optimize => "optimize",
        }
    }
}

/// Result of shaking one token file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShakeOutcome {
    pub file: String,
    #[serde(skip)]
    pub text: String,
    pub used: usize,
    pub preserved: usize,
    pub removed: usize,
    pub removed_tokens: Vec<String>,
    pub bytes_before: usize,
    pub bytes_after: usize,
}

impl ShakeOutcome {
    pub fn savings_percent(&self) -> f64 {
        if self.bytes_before == 0 {
            return 0.0;
        }
        let saved = self.bytes_before.saturating_sub(self.bytes_after) as f64;
        (saved / self.bytes_before as f64 * 1000.0).round() / 10.0
    }
}

pub fn shake_sheet(
    file: &str,
    text: &str,
    used: &BTreeSet<String>,
    preserve: &BTreeSet<String>,
) -> ShakeOutcome {
    let mut outcome = ShakeOutcome {
        file: file.to_string(),
        text: String::new(),
        used: 0,
        preserved: 0,
        removed: 0,
        removed_tokens: Vec::new(),
        bytes_before: text.len(),
        bytes_after: 0,
    };

    let mut spans = Vec::new();
    for decl in declarations(text) {
        let keep = if used.contains(&decl.name) {
            outcome.used += 1;
            true
        } else if preserve.contains(&decl.name) {
            outcome.preserved += 1;
            true
        } else {
            outcome.removed += 1;
            if !outcome.removed_tokens.contains(&decl.name) {
                outcome.removed_tokens.push(decl.name.clone());
            }
            false
        };
        spans.push((decl.span, keep));
    }

    let mut doomed: Vec<Range<usize>> = spans
        .iter()
        .filter(|(_, keep)| !keep)
        .map(|(span, _)| span.clone())
        .collect();
    doomed.extend(orphaned_comments(text, &spans));
    doomed.sort_by_key(|span| span.start);

    let mut shaken = text.to_string();
    // Back to front so earlier spans stay valid.
    for span in doomed.into_iter().rev() {
        let range = removal_range(&shaken, span.start, span.end);
        shaken.replace_range(range, "");
    }
    outcome.text = collapse_blank_lines(&shaken);
    outcome.bytes_after = outcome.text.len();
    outcome
}

/// Trimmed `/* ... */` lines whose following declarations are all removed.
///
/// A heading's run ends at the next standalone comment, at a line holding a
/// brace, or at the end of the text. Headings over no declarations stay.
fn orphaned_comments(text: &str, spans: &[(Range<usize>, bool)]) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    let mut orphaned = Vec::new();
    for (idx, (line_start, line)) in lines.iter().enumerate() {
        let Some(comment) = standalone_comment(line) else {
            continue;
        };
        let run_start = line_start + line.len();
        let run_end = lines[idx + 1..]
            .iter()
            .find(|(_, next)| standalone_comment(next).is_some() || next.contains(['{', '}']))
            .map_or(text.len(), |(start, _)| *start);
        let mut run = spans
            .iter()
            .filter(|(span, _)| span.start >= run_start && span.start < run_end)
            .peekable();
        if run.peek().is_some() && run.all(|(_, keep)| !keep) {
            orphaned.push(line_start + comment.start..line_start + comment.end);
        }
    }
    orphaned
}

/// Byte range of the comment if `line` holds nothing else.
fn standalone_comment(line: &str) -> Option<Range<usize>> {
    let trimmed = line.trim();
    let body = trimmed.strip_prefix("/*")?.strip_suffix("*/")?;
    if body.contains("*/") {
        return None;
    }
    let start = line.len() - line.trim_start().len();
    Some(start..start + trimmed.len())
}

fn removal_range(text: &str, start: usize, end: usize) -> Range<usize> {
    let line_start = text[..start].rfind('\n').map_or(0, |idx| idx + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |idx| end + idx);

    let mut cut_end = end;
    let rest = &text[cut_end..line_end];
    cut_end += rest.len() - rest.trim_start_matches([' ', '\t']).len();
    if text[cut_end..line_end].starts_with("/*")
        && let Some(close) = text[cut_end..line_end].find("*/")
    {
        cut_end += close + 2;
        let rest = &text[cut_end..line_end];
        cut_end += rest.len() - rest.trim_start_matches([' ', '\t']).len();
    }

    let before_blank = text[line_start..start].trim().is_empty();
    let after_blank = text[cut_end..line_end].trim().is_empty();
    if before_blank && after_blank {
        let through = if line_end < text.len() {
            line_end + 1
        } else {
            line_end
        };
        return line_start..through;
    }
    start..cut_end
}

/// Limit runs of blank lines to two.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationReport {
    pub generated_at: String,
    pub mode: OptimizeMode,
    pub files: Vec<ShakeOutcome>,
    pub total_removed: usize,
    pub bytes_before: usize,
    pub bytes_after: usize,
    pub savings_percent: f64,
}

impl OptimizationReport {
    pub fn new(mode: OptimizeMode, files: Vec<ShakeOutcome>, generated_at: String) -> Self {
        let bytes_before = files.iter().map(|file| file.bytes_before).sum();
        let bytes_after = files.iter().map(|file| file.bytes_after).sum();
        let total_removed = files.iter().map(|file| file.removed).sum();
        let totals = ShakeOutcome {
            file: String::new(),
            text: String::new(),
            used: 0,
            preserved: 0,
            removed: total_removed,
            removed_tokens: Vec::new(),
            bytes_before,
            bytes_after,
        };
        Self {
            generated_at,
            mode,
            savings_percent: totals.savings_percent(),
            files,
            total_removed,
            bytes_before,
            bytes_after,
        }
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// `file` with root, prefix and `..` components dropped.
fn relative_destination(file: &str) -> PathBuf {
    Path::new(file)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Write shaken copies into `out_dir`, keeping each file's root-relative path.
///
/// Fails without writing anything if a destination is a source file or two
/// files map to the same destination.
pub fn write_optimized(
    out_dir: &Path,
    root: &Path,
    outcomes: &[ShakeOutcome],
) -> Result<Vec<PathBuf>, ReportError> {
    let mut planned = Vec::with_capacity(outcomes.len());
    let mut seen = BTreeSet::new();
    for outcome in outcomes {
        let source = root.join(&outcome.file);
        let dest = out_dir.join(relative_destination(&outcome.file));
        if same_location(&dest, &source) {
            return Err(ReportError::InPlaceWrite {
                path: source.display().to_string(),
            });
        }
        if !seen.insert(dest.clone()) {
            return Err(ReportError::OutputCollision {
                path: dest.display().to_string(),
            });
        }
        planned.push((dest, outcome));
    }

    let mut written = Vec::with_capacity(planned.len());
    for (dest, outcome) in planned {
        write_text(&dest, &outcome.text)?;
        tracing::info!(
            file = %outcome.file,
            dest = %dest.display(),
            removed = outcome.removed,
            "wrote optimized token file"
        );
        written.push(dest);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn unused_declarations_are_removed_with_their_lines() {
        let text = ":root {\n  --primary: #111;\n  --unused: 1px; /* legacy */\n  --radius: 4px;\n}\n";
        let outcome = shake_sheet("t.css", text, &set(&["primary"]), &set(&["radius"]));
        assert_eq!(outcome.text, ":root {\n  --primary: #111;\n  --radius: 4px;\n}\n");
        assert_eq!(
            (outcome.used, outcome.preserved, outcome.removed),
            (1, 1, 1)
        );
        assert_eq!(outcome.removed_tokens, vec!["unused".to_string()]);
        assert!(outcome.bytes_after < outcome.bytes_before);
    }

    #[test]
    fn removal_within_a_shared_line_keeps_neighbours() {
        let text = ".a { --keep: 1; --drop: 2; --also-keep: 3; }\n";
        let outcome = shake_sheet("t.css", text, &set(&["keep", "also-keep"]), &set(&[]));
        assert_eq!(outcome.text, ".a { --keep: 1; --also-keep: 3; }\n");
    }

    #[test]
    fn preserved_tokens_survive_without_usage() {
        let text = "--background: #fff;\n--foreground: #000;\n";
        let preserve = set(&["background", "foreground"]);
        let outcome = shake_sheet("t.css", text, &set(&[]), &preserve);
        assert_eq!(outcome.text, text);
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.savings_percent(), 0.0);
    }

    #[test]
    fn blank_runs_collapse_to_two() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb\n"), "a\n\n\nb\n");
        assert_eq!(collapse_blank_lines("a\n\nb\n"), "a\n\nb\n");
    }

    #[test]
    fn in_place_writes_are_refused() {
        let outcome = shake_sheet("tokens.css", "--a: 1;", &set(&[]), &set(&[]));
        let root = Path::new("project");
        let err = write_optimized(root, root, &[outcome]).expect_err("same directory");
        assert!(matches!(err, ReportError::InPlaceWrite { .. }));
    }

    #[test]
    fn section_comment_goes_with_its_last_declaration() {
        let text = ":root {\n  /* Legacy */\n  --old-a: 1;\n  --old-b: 2;\n\n  /* Core */\n  --primary: #111;\n}\n";
        let outcome = shake_sheet("t.css", text, &set(&["primary"]), &set(&[]));
        assert_eq!(outcome.text, ":root {\n\n  /* Core */\n  --primary: #111;\n}\n");
        assert_eq!(outcome.removed, 2);
    }

    #[test]
    fn section_comment_stays_while_any_declaration_survives() {
        let text = "/* Mixed */\n--keep: 1;\n--drop: 2;\n";
        let outcome = shake_sheet("t.css", text, &set(&["keep"]), &set(&[]));
        assert_eq!(outcome.text, "/* Mixed */\n--keep: 1;\n");
    }

    #[test]
    fn comment_without_declarations_is_left_alone() {
        let text = ".a {\n  /* nothing here yet */\n}\n--drop: 1;\n";
        let outcome = shake_sheet("t.css", text, &set(&[]), &set(&[]));
        assert_eq!(outcome.text, ".a {\n  /* nothing here yet */\n}\n");
    }

    #[test]
    fn same_named_files_keep_their_directories() {
        let root = std::env::temp_dir().join(format!(
            "pantry-report-optimize-{}-{}",
            std::process::id(),
            line!()
        ));
        let out_dir = root.join("dist");
        let a = shake_sheet("a/tokens.css", "--a: 1;\n", &set(&["a"]), &set(&[]));
        let b = shake_sheet("./b/tokens.css", "--b: 2;\n", &set(&["b"]), &set(&[]));

        let written = write_optimized(&out_dir, &root, &[a, b]).expect("distinct destinations");
        assert_eq!(
            written,
            vec![out_dir.join("a/tokens.css"), out_dir.join("b/tokens.css")]
        );
        let first = std::fs::read_to_string(&written[0]).expect("first copy");
        let second = std::fs::read_to_string(&written[1]).expect("second copy");
        let _ = std::fs::remove_dir_all(&root);
        assert_eq!(first, "--a: 1;\n");
        assert_eq!(second, "--b: 2;\n");
    }

    #[test]
    fn colliding_destinations_are_refused() {
        let a = shake_sheet("x/tokens.css", "--a: 1;", &set(&[]), &set(&[]));
        let b = shake_sheet("../x/tokens.css", "--b: 1;", &set(&[]), &set(&[]));
        let err = write_optimized(Path::new("out"), Path::new("project"), &[a, b])
            .expect_err("both map to out/x/tokens.css");
        assert!(matches!(err, ReportError::OutputCollision { .. }));
    }

    #[test]
    fn report_totals_sum_files() {
        let a = shake_sheet("a.css", "--a: 1;\n--b: 2;\n", &set(&["a"]), &set(&[]));
        let b = shake_sheet("b.css", "--c: 3;\n", &set(&["c"]), &set(&[]));
        let report = OptimizationReport::new(OptimizeMode::Analyze, vec![a, b], "now".into());
        assert_eq!(report.total_removed, 1);
        assert_eq!(report.bytes_before, 24);
        assert_eq!(report.bytes_after, 16);
        assert_eq!(report.savings_percent, 33.3);
    }
}
