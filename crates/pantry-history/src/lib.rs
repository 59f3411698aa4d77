//! Prior-revision content for token diffs.
//!
//! The changelog stage asks one question of version control: what did this
//! file contain at the previous revision? `HistoryProvider` is that question.
//! `GitHistory` shells out to `git` for it; `MemoryHistory` answers from a
//! map so diff logic can be exercised without a checkout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Errors from reading repository history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("git executable is not available in PATH")]
    NotInstalled,

    #[error("git command failed: git {args} ({message})")]
    CommandFailed { args: String, message: String },
}

/// Source of file content at a fixed earlier revision.
pub trait HistoryProvider {
    /// Revision label used in logs and reports.
    fn revision(&self) -> &str;

    /// Content of `path` at the earlier revision, or `None` if the file did
    /// not exist there (new file, shallow history, first commit).
    fn previous_revision_content(&self, path: &Path) -> Result<Option<String>, HistoryError>;
}

/// Thin client around the `git` CLI, rooted at the project directory.
#[derive(Debug, Clone)]
pub struct GitHistory {
    root: PathBuf,
    revision: String,
}

impl GitHistory {
    pub fn new(root: impl AsRef<Path>, revision: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            revision: revision.into(),
        }
    }
}

impl HistoryProvider for GitHistory {
    fn revision(&self) -> &str {
        &self.revision
    }

    fn previous_revision_content(&self, path: &Path) -> Result<Option<String>, HistoryError> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let object = format!(
            "{}:./{}",
            self.revision,
            relative.to_string_lossy().replace('\\', "/")
        );
        match run_git(&self.root, &["show", &object]) {
            Ok(content) => Ok(Some(content)),
            Err(HistoryError::CommandFailed { message, .. }) if is_missing_object(&message) => {
                tracing::debug!(
                    path = %relative.display(),
                    revision = %self.revision,
                    "no prior revision"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// In-memory history keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    revision: String,
    files: BTreeMap<PathBuf, String>,
}

impl MemoryHistory {
    pub fn new(revision: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl HistoryProvider for MemoryHistory {
    fn revision(&self) -> &str {
        &self.revision
    }

    fn previous_revision_content(&self, path: &Path) -> Result<Option<String>, HistoryError> {
        Ok(self.files.get(path).cloned())
    }
}

const MISSING_OBJECT_MARKERS: [&str; 6] = [
    "does not exist in",
    "not a git repository",
    "exists on disk, but not in",
    "invalid object name",
    "unknown revision",
    "bad revision",
];

fn is_missing_object(message: &str) -> bool {
    MISSING_OBJECT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

fn run_git(cwd: &Path, args: &[&str]) -> Result<String, HistoryError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                HistoryError::NotInstalled
            } else {
                HistoryError::CommandFailed {
                    args: args.join(" "),
                    message: err.to_string(),
                }
            }
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            "unknown error".to_string()
        } else {
            stderr
        };
        Err(HistoryError::CommandFailed {
            args: args.join(" "),
            message,
        })
    }
}
