use chrono::{SecondsFormat, Utc};
use pantry_governance::{DEFAULT_CONFIG_FILE, ToolchainConfig, normalize_path};
use pantry_report::{SourceScan, scan_source};
use pantry_tokens::{TokenSheet, extract_tokens};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

/// Project root plus the loaded toolchain config.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: ToolchainConfig,
}

/// One token-definition file as read from disk.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub path: PathBuf,
    pub logical: String,
    pub text: String,
    pub sheet: TokenSheet,
}

impl Workspace {
    pub fn load_or_exit(root: &Path, config: Option<&Path>) -> Self {
        let config_path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join(DEFAULT_CONFIG_FILE));
        if config.is_some() && !config_path.exists() {
            fail(format!("config file not found: {}", config_path.display()));
        }
        let config = or_exit(
            ToolchainConfig::load_or_default(&config_path),
            "failed to load config",
        );
        tracing::debug!(
            root = %root.display(),
            config = %config_path.display(),
            token_files = config.token_files.len(),
            "workspace loaded"
        );
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// `override_path` as given, else `default` under the root.
    pub fn output_path(&self, override_path: Option<PathBuf>, default: &str) -> PathBuf {
        override_path.unwrap_or_else(|| self.resolve(default))
    }

    pub fn logical_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        normalize_path(&relative.to_string_lossy())
    }

    /// Configured token files in order; missing or unreadable ones are skipped.
    pub fn load_token_sheets(&self) -> Vec<LoadedSheet> {
        let mut sheets = Vec::new();
        for file in &self.config.token_files {
            let logical = normalize_path(file);
            let path = self.resolve(&logical);
            match fs::read_to_string(&path) {
                Ok(text) => {
                    let sheet = extract_tokens(&logical, &text);
                    tracing::debug!(file = %logical, tokens = sheet.len(), "extracted tokens");
                    sheets.push(LoadedSheet {
                        path,
                        logical,
                        text,
                        sheet,
                    });
                }
                Err(err) => {
                    tracing::warn!(file = %logical, error = %err, "skipping unreadable token file");
                }
            }
        }
        sheets
    }

    /// Source files matched by the configured globs, sorted and de-duplicated.
    pub fn source_files(&self) -> Vec<PathBuf> {
        let mut files = BTreeSet::new();
        for pattern in &self.config.source_globs {
            let full = self.resolve(pattern);
            let full = full.to_string_lossy();
            let entries = match glob::glob(&full) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(pattern = %pattern, error = %err, "skipping invalid source glob");
                    continue;
                }
            };
            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() => {
                        files.insert(path);
                    }
                    Ok(_) => {}
                    Err(err) => tracing::warn!(error = %err, "skipping unreadable glob entry"),
                }
            }
        }
        files.into_iter().collect()
    }

    pub fn scan_sources(&self) -> Vec<SourceScan> {
        let mut scans = Vec::new();
        for path in self.source_files() {
            let logical = self.logical_path(&path);
            match fs::read_to_string(&path) {
                Ok(text) => scans.push(scan_source(&logical, &text)),
                Err(err) => {
                    tracing::warn!(file = %logical, error = %err, "skipping unreadable source file");
                }
            }
        }
        tracing::debug!(files = scans.len(), "scanned sources");
        scans
    }
}

pub fn sheets_of(loaded: &[LoadedSheet]) -> Vec<TokenSheet> {
    loaded.iter().map(|entry| entry.sheet.clone()).collect()
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn fail(message: impl Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

pub fn or_exit<T, E: Display>(result: Result<T, E>, context: &str) -> T {
    result.unwrap_or_else(|err| fail(format!("{context}: {err}")))
}

pub fn print_json<T: Serialize>(value: &T, what: &str) {
    let rendered = serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| fail(format!("failed to render {what} payload: {err}")));
    println!("{rendered}");
}
