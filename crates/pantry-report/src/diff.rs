//! Token set differences between a prior revision and the working tree.

use pantry_history::{HistoryError, HistoryProvider};
use pantry_tokens::{TokenSheet, extract_tokens};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenEntry {
    pub name: String,
    pub value: String,
}

/// Added and removed `(name, value)` pairs for one token file.
///
/// A value change shows up as one removal and one addition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDiff {
    pub file: String,
    pub added: Vec<TokenEntry>,
    pub removed: Vec<TokenEntry>,
}

impl TokenDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

fn entries(sheet: &TokenSheet) -> BTreeSet<TokenEntry> {
    sheet
        .token_map()
        .into_values()
        .map(|token| TokenEntry {
            name: token.name,
            value: token.value,
        })
        .collect()
}

/// Compare two sheets; a missing `before` diffs against an empty set.
pub fn diff_sheets(file: &str, before: Option<&TokenSheet>, after: &TokenSheet) -> TokenDiff {
    let before = before.map(entries).unwrap_or_default();
    let after = entries(after);
    TokenDiff {
        file: file.to_string(),
        added: after.difference(&before).cloned().collect(),
        removed: before.difference(&after).cloned().collect(),
    }
}

/// Diff the current `text` of `path` against its prior revision.
///
/// Returns `None` when the file has no prior revision; the caller records
/// zero changes for it.
pub fn diff_against_history(
    path: &Path,
    logical: &str,
    text: &str,
    history: &dyn HistoryProvider,
) -> Result<Option<TokenDiff>, HistoryError> {
    let Some(previous) = history.previous_revision_content(path)? else {
        tracing::info!(
            file = logical,
            revision = history.revision(),
            "no prior revision; recording zero changes"
        );
        return Ok(None);
    };
    let before = extract_tokens(logical, &previous);
    let after = extract_tokens(logical, text);
    Ok(Some(diff_sheets(logical, Some(&before), &after)))
}
