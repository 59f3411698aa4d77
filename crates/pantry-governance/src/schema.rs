//! Schema-to-table field mapping validation.
//!
//! For every configured entity the validator reads two sources, the form
//! schema (yup/zod object) and the table column definitions, pulls field
//! identifiers out of each, and checks them against the hand-maintained
//! `EntityExpectation`. The expectation is never modified.

use crate::config::{EntityExpectation, FieldConstraint, compile_pattern};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::LazyLock;

static SCHEMA_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?P<field>[A-Za-z_][A-Za-z0-9_]*)\s*:\s*(?:yup|z)\s*\.")
        .expect("schema field regex should compile")
});

static BLOCK_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\}").expect("block end regex should compile"));

static TABLE_COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:accessorKey|key|field)\s*:\s*['"](?P<field>[A-Za-z0-9_.]+)['"]"#)
        .expect("table column regex should compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Passed,
    Partial,
    Failed,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Passed => "passed",
            EntityStatus::Partial => "partial",
            EntityStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFlags {
    pub schema_exists: bool,
    pub required_fields: bool,
    pub optional_fields: bool,
    pub transforms: bool,
    pub constraints: bool,
    pub business_rules: bool,
}

impl ValidationFlags {
    pub fn all(&self) -> bool {
        self.schema_exists
            && self.required_fields
            && self.optional_fields
            && self.transforms
            && self.constraints
            && self.business_rules
    }

    fn rows(&self) -> [(&'static str, bool); 6] {
        [
            ("schemaExists", self.schema_exists),
            ("requiredFields", self.required_fields),
            ("optionalFields", self.optional_fields),
            ("transforms", self.transforms),
            ("constraints", self.constraints),
            ("businessRules", self.business_rules),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityValidation {
    pub entity: String,
    pub schema_file: String,
    pub table_file: String,
    pub status: EntityStatus,
    pub flags: ValidationFlags,
    pub schema_fields: Vec<String>,
    pub table_columns: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaValidationReport {
    pub passed: bool,
    pub entities: Vec<EntityValidation>,
    pub critical_issues: Vec<String>,
}

impl SchemaValidationReport {
    pub fn count(&self, status: EntityStatus) -> usize {
        self.entities.iter().filter(|e| e.status == status).count()
    }
}

/// Field identifiers declared in a schema source, each with its validator chain.
pub fn extract_schema_fields(text: &str) -> BTreeMap<String, String> {
    let matches: Vec<_> = SCHEMA_FIELD_RE.captures_iter(text).collect();
    let mut fields = BTreeMap::new();
    for (idx, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(field)) = (caps.get(0), caps.name("field")) else {
            continue;
        };
        let next_field = matches
            .get(idx + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let block_end = BLOCK_END_RE
            .find_at(text, whole.end())
            .map_or(text.len(), |m| m.start());
        let end = next_field.min(block_end).max(whole.end());
        fields
            .entry(field.as_str().to_string())
            .or_insert_with(|| text[whole.start()..end].to_string());
    }
    fields
}

/// Column field identifiers referenced by a table source, in first-seen order.
pub fn extract_table_columns(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    TABLE_COLUMN_RE
        .captures_iter(text)
        .filter_map(|caps| caps.name("field").map(|m| m.as_str().to_string()))
        .filter(|field| seen.insert(field.clone()))
        .collect()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

fn chain_calls(chain: &str, method: &str, argument: &str) -> bool {
    let pattern = format!(
        r"\.{}\(\s*{}\s*[,)]",
        regex::escape(method),
        regex::escape(argument)
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(chain))
}

fn missing_constraints(chain: &str, constraint: &FieldConstraint) -> Vec<String> {
    let mut missing = Vec::new();
    if let Some(limit) = constraint.max_length
        && !chain_calls(chain, "max", &limit.to_string())
    {
        missing.push(format!("max length {limit}"));
    }
    if let Some(min) = constraint.min
        && !chain_calls(chain, "min", &format_number(min))
    {
        missing.push(format!("min {}", format_number(min)));
    }
    if let Some(max) = constraint.max
        && !chain_calls(chain, "max", &format_number(max))
    {
        missing.push(format!("max {}", format_number(max)));
    }
    missing
}

/// Validate one entity. `None` sources mean the file could not be read.
pub fn validate_entity(
    expectation: &EntityExpectation,
    schema_text: Option<&str>,
    table_text: Option<&str>,
) -> EntityValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut flags = ValidationFlags {
        schema_exists: schema_text.is_some(),
        required_fields: true,
        optional_fields: true,
        transforms: true,
        constraints: true,
        business_rules: true,
    };

    let schema_fields = schema_text.map(extract_schema_fields).unwrap_or_default();
    let table_columns = table_text.map(extract_table_columns).unwrap_or_default();

    match schema_text {
        None => {
            errors.push(format!("schema file not found: {}", expectation.schema_file));
            flags.required_fields = false;
            flags.optional_fields = false;
            flags.transforms = false;
            flags.constraints = false;
            flags.business_rules = false;
        }
        Some(schema) => {
            for field in &expectation.required_fields {
                if !schema_fields.contains_key(field) {
                    flags.required_fields = false;
                    errors.push(format!("required field `{field}` missing from schema"));
                }
            }
            for field in &expectation.optional_fields {
                if !schema_fields.contains_key(field) {
                    flags.optional_fields = false;
                    warnings.push(format!("optional field `{field}` missing from schema"));
                }
            }
            for (field, transform) in &expectation.transforms {
                let applied = schema_fields
                    .get(field)
                    .is_some_and(|chain| chain.contains(transform.as_str()));
                if !applied {
                    flags.transforms = false;
                    warnings.push(format!("field `{field}` does not apply transform `{transform}`"));
                }
            }
            for (field, constraint) in &expectation.constraints {
                let missing = match schema_fields.get(field) {
                    Some(chain) => missing_constraints(chain, constraint),
                    None => vec!["field not declared".to_string()],
                };
                if !missing.is_empty() {
                    flags.constraints = false;
                    warnings.push(format!(
                        "field `{field}` constraint not enforced: {}",
                        missing.join(", ")
                    ));
                }
            }
            for rule in &expectation.business_rules {
                let field = format!("business rule {}", rule.name);
                match compile_pattern(&field, &rule.pattern) {
                    Ok(re) if re.is_match(schema) => {}
                    Ok(_) => {
                        flags.business_rules = false;
                        warnings.push(format!("business rule `{}` not satisfied", rule.name));
                    }
                    Err(err) => {
                        flags.business_rules = false;
                        errors.push(err.to_string());
                    }
                }
            }
        }
    }

    match table_text {
        None => warnings.push(format!("table file not found: {}", expectation.table_file)),
        Some(_) => {
            let expected: BTreeSet<&str> = expectation
                .required_fields
                .iter()
                .chain(&expectation.optional_fields)
                .map(String::as_str)
                .collect();
            let known = |field: &str| expected.contains(field) || schema_fields.contains_key(field);
            for column in &table_columns {
                // `organization.name` is a relation accessor backed by `organization_id`
                let mapped = match column.split_once('.') {
                    Some((relation, _)) => known(relation) || known(&format!("{relation}_id")),
                    None => known(column),
                };
                if !mapped {
                    warnings.push(format!("table column `{column}` is not mapped to a schema field"));
                }
            }
        }
    }

    let status = if !errors.is_empty() {
        EntityStatus::Failed
    } else if flags.all() {
        EntityStatus::Passed
    } else {
        EntityStatus::Partial
    };

    EntityValidation {
        entity: expectation.name.clone(),
        schema_file: expectation.schema_file.clone(),
        table_file: expectation.table_file.clone(),
        status,
        flags,
        schema_fields: schema_fields.into_keys().collect(),
        table_columns,
        errors,
        warnings,
    }
}

/// Validate every entity; `read` returns a source file's text, if readable.
pub fn validate_schema_mappings<F>(
    expectations: &[EntityExpectation],
    read: F,
) -> SchemaValidationReport
where
    F: Fn(&str) -> Option<String>,
{
    let entities: Vec<EntityValidation> = expectations
        .iter()
        .map(|expectation| {
            let schema = read(&expectation.schema_file);
            let table = read(&expectation.table_file);
            validate_entity(expectation, schema.as_deref(), table.as_deref())
        })
        .collect();

    let critical_issues = cross_entity_issues(expectations, &entities);
    let passed = critical_issues.is_empty()
        && entities
            .iter()
            .all(|entity| entity.status == EntityStatus::Passed);

    SchemaValidationReport {
        passed,
        entities,
        critical_issues,
    }
}

fn cross_entity_issues(
    expectations: &[EntityExpectation],
    entities: &[EntityValidation],
) -> Vec<String> {
    let mut issues = Vec::new();

    let mut seen = BTreeSet::new();
    for expectation in expectations {
        if !seen.insert(expectation.name.as_str()) {
            issues.push(format!("entity `{}` is configured more than once", expectation.name));
        }
    }

    let schema_present: BTreeMap<&str, bool> = entities
        .iter()
        .map(|entity| (entity.entity.as_str(), entity.flags.schema_exists))
        .collect();
    for expectation in expectations {
        for field in expectation
            .required_fields
            .iter()
            .chain(&expectation.optional_fields)
        {
            let Some(target) = field.strip_suffix("_id") else {
                continue;
            };
            if schema_present.get(target) == Some(&false) {
                issues.push(format!(
                    "{}.{field} references `{target}` whose schema is missing",
                    expectation.name
                ));
            }
        }
    }

    issues
}

fn mark(ok: bool) -> &'static str {
    if ok { "✅" } else { "❌" }
}

/// Markdown report for human review, written whatever the outcome.
pub fn render_schema_report(report: &SchemaValidationReport, generated_at: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Schema Mapping Validation Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {generated_at}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "**Overall status:** {}",
        if report.passed { "PASSED" } else { "FAILED" }
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "| Entity | Status | Errors | Warnings |");
    let _ = writeln!(out, "|--------|--------|--------|----------|");
    for entity in &report.entities {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            entity.entity,
            entity.status.as_str(),
            entity.errors.len(),
            entity.warnings.len()
        );
    }

    if !report.critical_issues.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Critical Issues");
        let _ = writeln!(out);
        for issue in &report.critical_issues {
            let _ = writeln!(out, "- {issue}");
        }
    }

    for entity in &report.entities {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}", entity.entity);
        let _ = writeln!(out);
        let _ = writeln!(out, "- Schema: `{}`", entity.schema_file);
        let _ = writeln!(out, "- Table: `{}`", entity.table_file);
        let _ = writeln!(out, "- Status: **{}**", entity.status.as_str());
        let _ = writeln!(out);
        let _ = writeln!(out, "| Check | Result |");
        let _ = writeln!(out, "|-------|--------|");
        for (name, ok) in entity.flags.rows() {
            let _ = writeln!(out, "| {name} | {} |", mark(ok));
        }
        if !entity.errors.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "### Errors");
            let _ = writeln!(out);
            for error in &entity.errors {
                let _ = writeln!(out, "- {error}");
            }
        }
        if !entity.warnings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "### Warnings");
            let _ = writeln!(out);
            for warning in &entity.warnings {
                let _ = writeln!(out, "- {warning}");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusinessRule;

    const CONTACT_SCHEMA: &str = r#"
import * as yup from 'yup'
import { FormTransforms } from '@/lib/form-transforms'

export const contactSchema = yup.object({
  first_name: yup.string().required('First name is required').max(100),
  last_name: yup.string().required().max(100),
  organization_id: yup.string().uuid().required(),
  email: yup.string().email().nullable().transform(FormTransforms.nullableEmail),
  decision_authority: yup
    .string()
    .oneOf(['Decision Maker', 'Influencer', 'End User'])
    .required(),
})
"#;

    const CONTACT_TABLE: &str = r#"
const columns = [
  { accessorKey: 'first_name', header: 'First' },
  { accessorKey: 'email', header: 'Email' },
  { accessorKey: 'organization.name', header: 'Organization' },
  { accessorKey: 'legacy_code', header: 'Legacy' },
]
"#;

    fn contact_expectation() -> EntityExpectation {
        EntityExpectation {
            name: "contact".to_string(),
            schema_file: "contact.types.ts".to_string(),
            table_file: "ContactsTable.tsx".to_string(),
            required_fields: vec![
                "first_name".to_string(),
                "last_name".to_string(),
                "organization_id".to_string(),
            ],
            optional_fields: vec!["email".to_string()],
            transforms: BTreeMap::from([("email".to_string(), "nullableEmail".to_string())]),
            constraints: BTreeMap::from([(
                "first_name".to_string(),
                FieldConstraint {
                    max_length: Some(100),
                    ..FieldConstraint::default()
                },
            )]),
            business_rules: vec![BusinessRule {
                name: "authority-enum".to_string(),
                pattern: r"decision_authority:\s*yup[\s\S]*?\.oneOf\(".to_string(),
            }],
        }
    }

    #[test]
    fn extracts_schema_fields_with_multiline_chains() {
        let fields = extract_schema_fields(CONTACT_SCHEMA);
        assert_eq!(
            fields.keys().cloned().collect::<Vec<_>>(),
            vec![
                "decision_authority",
                "email",
                "first_name",
                "last_name",
                "organization_id"
            ]
        );
        assert!(fields["decision_authority"].contains(".oneOf("));
        assert!(!fields["first_name"].contains("last_name"));
    }

    #[test]
    fn extracts_table_columns_in_order() {
        assert_eq!(
            extract_table_columns(CONTACT_TABLE),
            vec!["first_name", "email", "organization.name", "legacy_code"]
        );
    }

    #[test]
    fn complete_entity_passes_with_unmapped_column_warning() {
        let result = validate_entity(
            &contact_expectation(),
            Some(CONTACT_SCHEMA),
            Some(CONTACT_TABLE),
        );
        assert_eq!(result.status, EntityStatus::Passed, "{result:?}");
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("legacy_code"));
    }

    #[test]
    fn missing_required_field_fails() {
        let mut expectation = contact_expectation();
        expectation.required_fields.push("purchase_influence".to_string());
        let result = validate_entity(&expectation, Some(CONTACT_SCHEMA), Some(CONTACT_TABLE));
        assert_eq!(result.status, EntityStatus::Failed);
        assert!(!result.flags.required_fields);
    }

    #[test]
    fn unenforced_constraint_is_partial() {
        let mut expectation = contact_expectation();
        expectation.constraints.insert(
            "last_name".to_string(),
            FieldConstraint {
                max_length: Some(50),
                ..FieldConstraint::default()
            },
        );
        let result = validate_entity(&expectation, Some(CONTACT_SCHEMA), Some(CONTACT_TABLE));
        assert_eq!(result.status, EntityStatus::Partial);
        assert!(!result.flags.constraints);
        assert!(result.flags.transforms);
    }

    #[test]
    fn constraint_match_requires_exact_number() {
        assert!(chain_calls(".max(100)", "max", "100"));
        assert!(chain_calls(".max( 100, 'too long')", "max", "100"));
        assert!(!chain_calls(".max(1000)", "max", "100"));
    }

    #[test]
    fn missing_schema_fails_and_raises_foreign_key_issue() {
        let organization = EntityExpectation {
            name: "organization".to_string(),
            schema_file: "organization.types.ts".to_string(),
            table_file: "OrganizationsTable.tsx".to_string(),
            required_fields: vec!["name".to_string()],
            ..EntityExpectation::default()
        };
        let expectations = vec![organization, contact_expectation()];
        let report = validate_schema_mappings(&expectations, |path| match path {
            "contact.types.ts" => Some(CONTACT_SCHEMA.to_string()),
            "ContactsTable.tsx" => Some(CONTACT_TABLE.to_string()),
            _ => None,
        });
        assert!(!report.passed);
        assert_eq!(report.entities[0].status, EntityStatus::Failed);
        assert!(!report.entities[0].flags.schema_exists);
        assert_eq!(report.entities[1].status, EntityStatus::Passed);
        assert_eq!(report.critical_issues.len(), 1);
        assert!(report.critical_issues[0].starts_with("contact.organization_id"));
    }

    #[test]
    fn duplicate_entity_is_critical_even_when_entities_pass() {
        let expectations = vec![contact_expectation(), contact_expectation()];
        let report = validate_schema_mappings(&expectations, |path| match path {
            "contact.types.ts" => Some(CONTACT_SCHEMA.to_string()),
            "ContactsTable.tsx" => Some(CONTACT_TABLE.to_string()),
            _ => None,
        });
        assert_eq!(report.count(EntityStatus::Passed), 2);
        assert!(!report.passed);
    }

    #[test]
    fn markdown_report_lists_every_entity() {
        let report = validate_schema_mappings(&[contact_expectation()], |_| None);
        let markdown = render_schema_report(&report, "2026-10-19T00:00:00Z");
        assert!(markdown.starts_with("# Schema Mapping Validation Report"));
        assert!(markdown.contains("**Overall status:** FAILED"));
        assert!(markdown.contains("| contact | failed | 1 | 1 |"));
        assert!(markdown.contains("| schemaExists | ❌ |"));
    }
}
