//! Token-authoring policy and schema mapping checks.
//!
//! Policy violations are returned as data; only configuration problems
//! (unreadable TOML, bad patterns) are errors.

pub mod config;
pub mod rules;
pub mod schema;

pub use config::{
    BusinessRule, ConfigError, DEFAULT_CONFIG_FILE, EntityExpectation, FieldConstraint,
    GovernanceRules, PrefixRule, ToolchainConfig, normalize_path,
};
pub use rules::{
    RuleKind, RuleSet, Severity, Violation, ViolationCounts, check_governance, check_sheet,
    has_errors,
};
pub use schema::{
    EntityStatus, EntityValidation, SchemaValidationReport, ValidationFlags,
    extract_schema_fields, extract_table_columns, render_schema_report, validate_entity,
    validate_schema_mappings,
};
