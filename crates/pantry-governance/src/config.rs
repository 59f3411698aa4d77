//! Toolchain configuration.
//!
//! Every stage receives the parts of `ToolchainConfig` it needs as explicit
//! arguments. The TOML file is optional and every field is defaulted, so an
//! absent or partial file falls back to the KitchenPantry layout.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "pantry-tokens.toml";
pub const DEFAULT_PRIMITIVES_FILE: &str = "src/styles/tokens/primitives.css";
pub const DEFAULT_PRIMITIVE_PATTERN: &str =
    r"^(?:brand|primary|secondary|accent|gray|neutral|spacing|space|font|shadow)(?:-[a-z]+)*-\d+$";
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 70.0;

const DEFAULT_TOKEN_FILES: [&str; 3] = [
    DEFAULT_PRIMITIVES_FILE,
    "src/styles/tokens/semantic.css",
    "src/styles/tokens/components.css",
];
const DEFAULT_SOURCE_GLOBS: [&str; 3] = ["src/**/*.tsx", "src/**/*.ts", "src/**/*.css"];
const DEFAULT_COMPONENT_PREFIXES: [&str; 13] = [
    "btn-", "button-", "card-", "input-", "select-", "dialog-", "table-", "badge-", "form-",
    "nav-", "sidebar-", "toast-", "tooltip-",
];
const DEFAULT_PREFIX_EXEMPTIONS: [&str; 6] = [
    "radius",
    "ring",
    "border",
    "input",
    "background",
    "foreground",
];
const DEFAULT_PRESERVE: [&str; 16] = [
    "background",
    "foreground",
    "primary",
    "primary-foreground",
    "secondary",
    "secondary-foreground",
    "muted",
    "muted-foreground",
    "accent",
    "accent-foreground",
    "destructive",
    "destructive-foreground",
    "border",
    "input",
    "ring",
    "radius",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid pattern in {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

/// Files allowed to define only names under the listed prefixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub file: String,
    pub allowed_prefixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceRules {
    /// The only file allowed to define primitive tokens.
    pub primitives_file: String,
    /// Names matching this pattern are primitives.
    pub primitive_pattern: String,
    pub prefix_rules: Vec<PrefixRule>,
    /// Names exempt from prefix rules.
    pub exemptions: Vec<String>,
}

impl Default for GovernanceRules {
    fn default() -> Self {
        Self {
            primitives_file: DEFAULT_PRIMITIVES_FILE.to_string(),
            primitive_pattern: DEFAULT_PRIMITIVE_PATTERN.to_string(),
            prefix_rules: vec![PrefixRule {
                file: "src/styles/tokens/components.css".to_string(),
                allowed_prefixes: to_strings(&DEFAULT_COMPONENT_PREFIXES),
            }],
            exemptions: to_strings(&DEFAULT_PREFIX_EXEMPTIONS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageSettings {
    /// Per-file coverage percentage below which a file needs migration.
    pub threshold: f64,
}

impl Default for CoverageSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_COVERAGE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Tokens never removed, whatever the usage scan says.
    pub preserve: Vec<String>,
    pub output_dir: String,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            preserve: to_strings(&DEFAULT_PRESERVE),
            output_dir: "dist/optimized-tokens".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogSettings {
    pub path: String,
    pub revision: String,
}

impl Default for ChangelogSettings {
    fn default() -> Self {
        Self {
            path: "docs/design-token-changelog.md".to_string(),
            revision: "HEAD~1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// JSON and Markdown analysis reports.
    pub report_dir: String,
    /// Generated `design-tokens.json`, CSS and SCSS files.
    pub export_dir: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            report_dir: "reports".to_string(),
            export_dir: "dist/tokens".to_string(),
        }
    }
}

/// Numeric bounds a schema field is expected to enforce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConstraint {
    pub max_length: Option<u64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A named pattern that must occur in the entity's schema source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    pub name: String,
    pub pattern: String,
}

/// Hand-authored expectation for one CRM entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityExpectation {
    pub name: String,
    pub schema_file: String,
    pub table_file: String,
    pub required_fields: Vec<String>,
    pub optional_fields: Vec<String>,
    pub transforms: BTreeMap<String, String>,
    pub constraints: BTreeMap<String, FieldConstraint>,
    pub business_rules: Vec<BusinessRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    pub report_path: String,
    pub entities: Vec<EntityExpectation>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            report_path: "docs/schema-validation-report.md".to_string(),
            entities: default_entities(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Token-definition files, relative to the project root.
    pub token_files: Vec<String>,
    /// Globs, relative to the project root, scanned for usages.
    pub source_globs: Vec<String>,
    pub governance: GovernanceRules,
    pub coverage: CoverageSettings,
    pub optimizer: OptimizerSettings,
    pub changelog: ChangelogSettings,
    pub output: OutputSettings,
    pub schema: SchemaSettings,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            token_files: to_strings(&DEFAULT_TOKEN_FILES),
            source_globs: to_strings(&DEFAULT_SOURCE_GLOBS),
            governance: GovernanceRules::default(),
            coverage: CoverageSettings::default(),
            optimizer: OptimizerSettings::default(),
            changelog: ChangelogSettings::default(),
            output: OutputSettings::default(),
            schema: SchemaSettings::default(),
        }
    }
}

impl ToolchainConfig {
    pub fn from_toml_str(text: &str, path: &str) -> Result<Self, ConfigError> {
        let config: ToolchainConfig =
            toml::from_str(text).map_err(|source| ConfigError::ParseToml {
                path: path.to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Compile every configured pattern once so bad regexes fail at load.
    pub fn validate(&self) -> Result<(), ConfigError> {
        compile_pattern("governance.primitive_pattern", &self.governance.primitive_pattern)?;
        for entity in &self.schema.entities {
            for rule in &entity.business_rules {
                compile_pattern(
                    &format!("schema.entities.{}.business_rules.{}", entity.name, rule.name),
                    &rule.pattern,
                )?;
            }
        }
        Ok(())
    }
}

pub(crate) fn compile_pattern(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        field: field.to_string(),
        source,
    })
}

/// Canonical relative form used to compare configured and scanned paths.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn entity(
    name: &str,
    schema_file: &str,
    table_file: &str,
    required: &[&str],
    optional: &[&str],
) -> EntityExpectation {
    EntityExpectation {
        name: name.to_string(),
        schema_file: schema_file.to_string(),
        table_file: table_file.to_string(),
        required_fields: to_strings(required),
        optional_fields: to_strings(optional),
        ..EntityExpectation::default()
    }
}

fn max_length(limit: u64) -> FieldConstraint {
    FieldConstraint {
        max_length: Some(limit),
        ..FieldConstraint::default()
    }
}

fn range(min: Option<f64>, max: Option<f64>) -> FieldConstraint {
    FieldConstraint {
        min,
        max,
        ..FieldConstraint::default()
    }
}

fn rule(name: &str, pattern: &str) -> BusinessRule {
    BusinessRule {
        name: name.to_string(),
        pattern: pattern.to_string(),
    }
}

fn default_entities() -> Vec<EntityExpectation> {
    let mut organization = entity(
        "organization",
        "src/types/organization.types.ts",
        "src/components/organizations/OrganizationsTable.tsx",
        &["name", "priority", "segment", "is_principal", "is_distributor"],
        &[
            "email",
            "phone",
            "website",
            "address_line_1",
            "city",
            "state_province",
            "postal_code",
            "notes",
        ],
    );
    organization.transforms = BTreeMap::from([
        ("email".to_string(), "nullableEmail".to_string()),
        ("website".to_string(), "nullableUrl".to_string()),
        ("phone".to_string(), "nullablePhone".to_string()),
    ]);
    organization.constraints = BTreeMap::from([
        ("name".to_string(), max_length(255)),
        ("notes".to_string(), max_length(500)),
    ]);
    organization.business_rules = vec![rule("priority-enum", r"priority:\s*yup[\s\S]*?\.oneOf\(")];

    let mut contact = entity(
        "contact",
        "src/types/contact.types.ts",
        "src/components/contacts/ContactsTable.tsx",
        &[
            "first_name",
            "last_name",
            "organization_id",
            "purchase_influence",
            "decision_authority",
        ],
        &["email", "title", "phone", "mobile_phone", "department", "notes"],
    );
    contact.transforms = BTreeMap::from([
        ("email".to_string(), "nullableEmail".to_string()),
        ("phone".to_string(), "nullablePhone".to_string()),
    ]);
    contact.constraints = BTreeMap::from([
        ("first_name".to_string(), max_length(100)),
        ("last_name".to_string(), max_length(100)),
    ]);
    contact.business_rules = vec![rule(
        "decision-authority-enum",
        r"decision_authority:\s*yup[\s\S]*?\.oneOf\(",
    )];

    let mut opportunity = entity(
        "opportunity",
        "src/types/opportunity.types.ts",
        "src/components/opportunities/OpportunitiesTable.tsx",
        &["name", "organization_id", "stage", "estimated_value"],
        &[
            "contact_id",
            "estimated_close_date",
            "probability",
            "description",
            "notes",
        ],
    );
    opportunity.constraints = BTreeMap::from([
        ("probability".to_string(), range(Some(0.0), Some(100.0))),
        ("estimated_value".to_string(), range(Some(0.0), None)),
    ]);
    opportunity.business_rules = vec![rule("stage-enum", r"stage:\s*yup[\s\S]*?\.oneOf\(")];

    let mut interaction = entity(
        "interaction",
        "src/types/interaction.types.ts",
        "src/components/interactions/InteractionsTable.tsx",
        &["type", "subject", "interaction_date", "opportunity_id"],
        &[
            "description",
            "duration_minutes",
            "follow_up_required",
            "follow_up_date",
        ],
    );
    interaction.constraints = BTreeMap::from([
        ("subject".to_string(), max_length(255)),
        ("duration_minutes".to_string(), range(Some(0.0), None)),
    ]);
    interaction.business_rules = vec![rule(
        "follow-up-date-conditional",
        r"follow_up_date:[\s\S]*?\.when\(",
    )];

    vec![organization, contact, opportunity, interaction]
}
