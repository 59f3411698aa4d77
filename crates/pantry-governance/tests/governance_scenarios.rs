//! End-to-end governance scenarios over several token files.

use pantry_governance::{
    GovernanceRules, RuleKind, RuleSet, Severity, ToolchainConfig, check_governance, has_errors,
};
use pantry_tokens::extract_tokens;

fn default_rule_set() -> RuleSet {
    RuleSet::new(&GovernanceRules::default()).expect("default rules should compile")
}

#[test]
fn duplicated_primitive_outside_primitives_file() {
    let sheet = extract_tokens(
        "src/styles/tokens/semantic.css",
        "--primary-500: #ff0000; --primary-500: #00ff00;",
    );
    let violations = check_governance(&[sheet], &default_rule_set());

    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].rule, RuleKind::PrimitivesOnly);
    assert_eq!(violations[0].severity, Severity::Error);
    assert_eq!(violations[1].rule, RuleKind::DuplicateDefinition);
    assert_eq!(violations[1].count, Some(2));
    assert!(has_errors(&violations));
}

#[test]
fn clean_layered_token_set_has_no_violations() {
    let primitives = extract_tokens(
        "src/styles/tokens/primitives.css",
        ":root { --brand-500: #1a7f37; --spacing-4: 1rem; --font-size-14: 0.875rem; }",
    );
    let semantic = extract_tokens(
        "src/styles/tokens/semantic.css",
        ":root { --primary: var(--brand-500); --primary-foreground: #fff; }",
    );
    let components = extract_tokens(
        "src/styles/tokens/components.css",
        ":root { --btn-primary-bg: var(--primary); --card-padding: var(--spacing-4); --radius: 0.5rem; }",
    );
    let violations = check_governance(&[primitives, semantic, components], &default_rule_set());
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn violations_are_grouped_by_file_in_input_order() {
    let a = extract_tokens("src/styles/tokens/semantic.css", "--x: var(--x);");
    let b = extract_tokens("src/styles/tokens/components.css", "--hero-bg: red;");
    let violations = check_governance(&[a, b], &default_rule_set());
    let files: Vec<&str> = violations.iter().map(|v| v.file.as_str()).collect();
    assert_eq!(
        files,
        vec!["src/styles/tokens/semantic.css", "src/styles/tokens/components.css"]
    );
    assert_eq!(violations[1].rule, RuleKind::ComponentPrefix);
}

#[test]
fn configured_rules_replace_defaults() {
    let config = ToolchainConfig::from_toml_str(
        r#"
[governance]
primitives_file = "tokens/base.css"
primitive_pattern = '^blue-\d+$'
prefix_rules = []
"#,
        "pantry-tokens.toml",
    )
    .expect("config should parse");
    let rules = RuleSet::new(&config.governance).expect("rules should compile");

    let base = extract_tokens("tokens/base.css", "--blue-100: #eef;");
    let theme = extract_tokens("tokens/theme.css", "--blue-200: #ccf; --primary-500: #00f;");
    let violations = check_governance(&[base, theme], &rules);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].token, "blue-200");
}
