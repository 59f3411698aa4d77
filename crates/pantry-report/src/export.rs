//! Generated token artifacts: `design-tokens.json`, `tokens.css`, `_tokens.scss`.

use pantry_tokens::{Token, TokenCategory, TokenDigest};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

pub const JSON_FILE: &str = "design-tokens.json";
pub const CSS_FILE: &str = "tokens.css";
pub const SCSS_FILE: &str = "_tokens.scss";

static VAR_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var\(\s*--([A-Za-z0-9_-]+)\s*\)").expect("var reference regex should compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedToken {
    pub value: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTokensDocument {
    pub generated_at: String,
    pub token_count: usize,
    pub digest: TokenDigest,
    pub categories: BTreeMap<TokenCategory, BTreeMap<String, ExportedToken>>,
}

impl DesignTokensDocument {
    pub fn new(tokens: &BTreeMap<String, Token>, generated_at: String) -> Self {
        let mut categories: BTreeMap<TokenCategory, BTreeMap<String, ExportedToken>> =
            BTreeMap::new();
        for (name, token) in tokens {
            categories.entry(token.category).or_default().insert(
                name.clone(),
                ExportedToken {
                    value: token.value.clone(),
                    file: token.file.clone(),
                },
            );
        }
        Self {
            generated_at,
            token_count: tokens.len(),
            digest: TokenDigest::of_tokens(tokens),
            categories,
        }
    }
}

fn by_category(tokens: &BTreeMap<String, Token>) -> Vec<&Token> {
    let mut ordered: Vec<&Token> = tokens.values().collect();
    ordered.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
    ordered
}

pub fn render_css(tokens: &BTreeMap<String, Token>) -> String {
    let mut out = String::from(":root {\n");
    for token in by_category(tokens) {
        let _ = writeln!(out, "  --{}: {};", token.name, token.value);
    }
    out.push_str("}\n");
    out
}

/// SCSS variables; `var(--x)` references become `$x`.
pub fn render_scss(tokens: &BTreeMap<String, Token>) -> String {
    let mut out = String::new();
    for token in by_category(tokens) {
        let value = VAR_REFERENCE_RE.replace_all(&token.value, "$$$1");
        let _ = writeln!(out, "${}: {};", token.name, value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_tokens::extract_tokens;

    fn tokens() -> BTreeMap<String, Token> {
        extract_tokens(
            "semantic.css",
            "--spacing-4: 1rem; --primary: var(--brand-500); --brand-500: #1a7f37; --radius: 0.5rem;",
        )
        .token_map()
    }

    #[test]
    fn css_is_sorted_by_category_then_name() {
        insta::assert_snapshot!(render_css(&tokens()).trim_end(), @r"
        :root {
          --brand-500: #1a7f37;
          --primary: var(--brand-500);
          --spacing-4: 1rem;
          --radius: 0.5rem;
        }
        ");
    }

    #[test]
    fn scss_rewrites_var_references() {
        insta::assert_snapshot!(render_scss(&tokens()).trim_end(), @r"
        $brand-500: #1a7f37;
        $primary: $brand-500;
        $spacing-4: 1rem;
        $radius: 0.5rem;
        ");
    }

    #[test]
    fn json_document_groups_tokens_by_category() {
        let doc = DesignTokensDocument::new(&tokens(), "2024-01-01T00:00:00Z".to_string());
        let value = serde_json::to_value(&doc).expect("document should serialize");
        assert_eq!(value["tokenCount"], 4);
        assert_eq!(value["categories"]["color"]["primary"]["value"], "var(--brand-500)");
        assert_eq!(value["categories"]["border"]["radius"]["file"], "semantic.css");
        assert_eq!(value["digest"].as_str().map(str::len), Some(64));
    }
}
