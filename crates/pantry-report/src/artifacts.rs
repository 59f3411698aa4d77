//! Writing report artifacts to disk.

use crate::error::ReportError;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Write `text` to `path`, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }
    fs::write(path, text).map_err(|source| ReportError::WriteFile {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote artifact");
    Ok(())
}

/// Pretty-printed JSON with a trailing newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|source| ReportError::Json {
        path: path.display().to_string(),
        source,
    })?;
    write_text(path, &format!("{rendered}\n"))
}

/// Read `path`, treating a missing file as empty.
pub fn read_or_empty(path: &Path) -> Result<String, ReportError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ReportError::ReadFile {
            path: path.display().to_string(),
            source,
        }),
    }
}
