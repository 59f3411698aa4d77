//! Quality gate over the governance, coverage and schema stages.

use crate::coverage::{CoverageReport, percentage};
use pantry_governance::{SchemaValidationReport, ViolationCounts};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateLevel {
    Critical,
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateCheck {
    pub id: String,
    pub level: GateLevel,
    pub status: CheckStatus,
    pub details: Vec<String>,
}

impl GateCheck {
    fn new(id: &str, level: GateLevel, status: CheckStatus, details: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            level,
            status,
            details,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Pass,
    PassWithWarnings,
    ConditionalPass,
    Fail,
}

impl GateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GateStatus::Pass => "PASS",
            GateStatus::PassWithWarnings => "PASS_WITH_WARNINGS",
            GateStatus::ConditionalPass => "CONDITIONAL_PASS",
            GateStatus::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub critical_failures: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateReport {
    pub generated_at: String,
    pub status: GateStatus,
    pub message: String,
    pub summary: GateSummary,
    pub checks: Vec<GateCheck>,
}

pub fn governance_check(counts: ViolationCounts) -> GateCheck {
    let details = vec![format!(
        "{} errors, {} warnings",
        counts.errors, counts.warnings
    )];
    let status = if counts.errors > 0 {
        CheckStatus::Fail
    } else if counts.warnings > 0 {
        CheckStatus::Warning
    } else {
        CheckStatus::Pass
    };
    GateCheck::new("token-governance", GateLevel::Critical, status, details)
}

pub fn coverage_check(report: &CoverageReport) -> GateCheck {
    let mut details = vec![format!(
        "coverage {:.1}% (threshold {:.1}%)",
        report.coverage_rate, report.threshold
    )];
    let status = if report.coverage_rate < report.threshold {
        CheckStatus::Fail
    } else if !report.problem_files.is_empty() {
        details.push(format!(
            "{} files below threshold",
            report.problem_files.len()
        ));
        CheckStatus::Warning
    } else {
        CheckStatus::Pass
    };
    GateCheck::new("token-coverage", GateLevel::High, status, details)
}

pub fn unused_tokens_check(report: &CoverageReport) -> GateCheck {
    let status = if report.unused_tokens.is_empty() {
        CheckStatus::Pass
    } else {
        CheckStatus::Warning
    };
    GateCheck::new(
        "unused-tokens",
        GateLevel::Medium,
        status,
        vec![format!("{} unused tokens", report.unused_tokens.len())],
    )
}

pub fn schema_check(report: &SchemaValidationReport) -> GateCheck {
    let mut details: Vec<String> = report
        .entities
        .iter()
        .map(|entity| format!("{}: {}", entity.entity, entity.status.as_str()))
        .collect();
    details.extend(report.critical_issues.iter().cloned());
    let status = if report.passed {
        CheckStatus::Pass
    } else {
        CheckStatus::Fail
    };
    GateCheck::new("schema-mapping", GateLevel::High, status, details)
}

/// Any failed critical check fails the gate; other failures make it conditional.
pub fn evaluate_gate(checks: Vec<GateCheck>, generated_at: String) -> GateReport {
    let count = |status: CheckStatus| checks.iter().filter(|c| c.status == status).count();
    let passed = count(CheckStatus::Pass);
    let failed = count(CheckStatus::Fail);
    let warnings = count(CheckStatus::Warning);
    let critical_failures = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Fail && c.level == GateLevel::Critical)
        .count();

    let (status, message) = if critical_failures > 0 {
        (
            GateStatus::Fail,
            format!("Gate failed: {critical_failures} critical failures"),
        )
    } else if failed > 0 {
        (
            GateStatus::ConditionalPass,
            format!("Gate passed with conditions: {failed} non-critical failures"),
        )
    } else if warnings > 0 {
        (
            GateStatus::PassWithWarnings,
            format!("Gate passed: {warnings} warnings"),
        )
    } else {
        (
            GateStatus::Pass,
            "Gate passed: all checks successful".to_string(),
        )
    };

    GateReport {
        generated_at,
        status,
        message,
        summary: GateSummary {
            total: checks.len(),
            passed,
            failed,
            warnings,
            critical_failures,
            success_rate: percentage(passed, checks.len(), 0.0),
        },
        checks,
    }
}
