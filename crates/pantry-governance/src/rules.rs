//! Governance rule checking over extracted token sheets.
//!
//! Per file, in order:
//! 1. primitive-looking names outside the primitives file (error);
//! 2. names outside a file's allowed prefixes (warning);
//! 3. direct self-references, `--x: var(--x)` (error);
//! 4. names declared more than once in the file (error).
//!
//! Only direct self-reference is detected; `--a: var(--b); --b: var(--a);`
//! passes. Malformed CSS never fails the check; it just yields fewer tokens.

use crate::config::{ConfigError, GovernanceRules, compile_pattern, normalize_path};
use pantry_tokens::{TokenSheet, UsageKind, scan_usages};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    PrimitivesOnly,
    ComponentPrefix,
    CircularReference,
    DuplicateDefinition,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::PrimitivesOnly => "primitives-only",
            RuleKind::ComponentPrefix => "component-prefix",
            RuleKind::CircularReference => "circular-reference",
            RuleKind::DuplicateDefinition => "duplicate-definition",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A breach of a token-authoring policy. Recomputed every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub file: String,
    pub token: String,
    pub rule: RuleKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Governance rules with their patterns compiled.
#[derive(Debug, Clone)]
pub struct RuleSet {
    primitives_file: String,
    primitive_pattern: Regex,
    prefixes: BTreeMap<String, Vec<String>>,
    exemptions: BTreeSet<String>,
}

impl RuleSet {
    pub fn new(rules: &GovernanceRules) -> Result<Self, ConfigError> {
        let primitive_pattern =
            compile_pattern("governance.primitive_pattern", &rules.primitive_pattern)?;
        let prefixes = rules
            .prefix_rules
            .iter()
            .map(|rule| (normalize_path(&rule.file), rule.allowed_prefixes.clone()))
            .collect();
        Ok(Self {
            primitives_file: normalize_path(&rules.primitives_file),
            primitive_pattern,
            prefixes,
            exemptions: rules.exemptions.iter().cloned().collect(),
        })
    }

    fn is_primitives_file(&self, file: &str) -> bool {
        normalize_path(file) == self.primitives_file
    }

    fn allowed_prefixes(&self, file: &str) -> Option<&[String]> {
        self.prefixes.get(&normalize_path(file)).map(Vec::as_slice)
    }
}

/// Check every sheet against the rule set, in input order.
pub fn check_governance(sheets: &[TokenSheet], rules: &RuleSet) -> Vec<Violation> {
    sheets
        .iter()
        .flat_map(|sheet| check_sheet(sheet, rules))
        .collect()
}

/// Check one sheet. Each distinct name is reported at most once per rule.
pub fn check_sheet(sheet: &TokenSheet, rules: &RuleSet) -> Vec<Violation> {
    let mut violations = Vec::new();
    let names = sheet.distinct_names();
    let violation = |token: &str, rule: RuleKind, severity: Severity, message: String| Violation {
        file: sheet.file.clone(),
        token: token.to_string(),
        rule,
        severity,
        message,
        count: None,
    };

    if !rules.is_primitives_file(&sheet.file) {
        for name in names
            .iter()
            .filter(|name| rules.primitive_pattern.is_match(name))
        {
            violations.push(violation(
                name,
                RuleKind::PrimitivesOnly,
                Severity::Error,
                format!(
                    "primitive token --{name} must be defined in {}",
                    rules.primitives_file
                ),
            ));
        }
    }

    if let Some(prefixes) = rules.allowed_prefixes(&sheet.file) {
        for name in names.iter().filter(|name| {
            !rules.exemptions.contains(**name)
                && !prefixes.iter().any(|prefix| name.starts_with(prefix.as_str()))
        }) {
            violations.push(violation(
                name,
                RuleKind::ComponentPrefix,
                Severity::Warning,
                format!(
                    "token --{name} does not use an allowed prefix ({})",
                    prefixes.join(", ")
                ),
            ));
        }
    }

    let mut circular = BTreeSet::new();
    for token in &sheet.definitions {
        let self_referencing = scan_usages(&sheet.file, &token.value)
            .iter()
            .any(|site| site.kind == UsageKind::Reference && site.token == token.name);
        if self_referencing && circular.insert(token.name.as_str()) {
            violations.push(violation(
                &token.name,
                RuleKind::CircularReference,
                Severity::Error,
                format!("token --{} references itself", token.name),
            ));
        }
    }

    let occurrences = sheet.occurrences();
    for name in &names {
        let count = occurrences.get(*name).copied().unwrap_or(0);
        if count > 1 {
            let mut duplicate = violation(
                name,
                RuleKind::DuplicateDefinition,
                Severity::Error,
                format!("token --{name} is defined {count} times"),
            );
            duplicate.count = Some(count);
            violations.push(duplicate);
        }
    }

    tracing::debug!(
        file = %sheet.file,
        tokens = names.len(),
        violations = violations.len(),
        "checked token sheet"
    );
    violations
}

pub fn has_errors(violations: &[Violation]) -> bool {
    violations
        .iter()
        .any(|violation| violation.severity == Severity::Error)
}

/// Error and warning totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationCounts {
    pub errors: usize,
    pub warnings: usize,
}

impl ViolationCounts {
    pub fn of(violations: &[Violation]) -> Self {
        let errors = violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        Self {
            errors,
            warnings: violations.len() - errors,
        }
    }
}
