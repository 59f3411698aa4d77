//! Reporting stages of the token toolchain.
//!
//! Each stage takes already-extracted data plus explicit settings and returns
//! a serializable report; writing artifacts is a separate step so the CLI
//! decides where outputs land.

pub mod artifacts;
pub mod changelog;
pub mod coverage;
pub mod diff;
pub mod error;
pub mod export;
pub mod gate;
pub mod optimize;

pub use artifacts::{read_or_empty, write_json, write_text};
pub use changelog::{DEFAULT_TITLE, insert_changelog_section, render_changelog_section};
pub use coverage::{
    CategoryStats, CoverageReport, FileCoverage, SourceScan, build_coverage_report,
    coverage_rate, render_coverage_markdown, scan_source, usage_rate,
};
pub use diff::{TokenDiff, TokenEntry, diff_against_history, diff_sheets};
pub use error::ReportError;
pub use export::{CSS_FILE, DesignTokensDocument, JSON_FILE, SCSS_FILE, render_css, render_scss};
pub use gate::{
    CheckStatus, GateCheck, GateLevel, GateReport, GateStatus, GateSummary, coverage_check,
    evaluate_gate, governance_check, schema_check, unused_tokens_check,
};
pub use optimize::{
    OptimizationReport, OptimizeMode, ShakeOutcome, collapse_blank_lines, shake_sheet,
    write_optimized,
};
