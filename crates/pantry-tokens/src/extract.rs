//! Token extraction from CSS-like text.
//!
//! Declarations have the custom-property form `--name: value;`. The match is
//! applied to the whole text rather than line by line so that a value spread
//! over several lines still resolves to one value ending at the first `;`.

use crate::text::{LineIndex, normalize_whitespace};
use crate::token::{Token, TokenSheet, categorize};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--(?P<name>[A-Za-z0-9_-]+)\s*:\s*(?P<value>[^;{}]+?)\s*;")
        .expect("declaration regex should compile")
});

static PROPERTY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--[A-Za-z0-9_-]+").expect("property-name regex should compile")
});

/// A raw declaration with its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub line: usize,
    /// From the leading `--` through the terminating `;`.
    pub span: Range<usize>,
}

/// All custom-property declarations in `text`, in source order.
pub fn declarations(text: &str) -> Vec<Declaration> {
    let lines = LineIndex::new(text);
    DECLARATION_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.name("name")?.as_str();
            let value = caps.name("value")?.as_str();
            Some(Declaration {
                name: name.to_string(),
                value: normalize_whitespace(value),
                line: lines.line_of(whole.start()),
                span: whole.range(),
            })
        })
        .collect()
}

/// Byte spans of every `--name` in `text`, declared or referenced.
///
/// The scanners skip matches that start inside these spans: a class-like
/// fragment of a custom-property name is neither a usage nor a literal.
pub fn property_name_spans(text: &str) -> Vec<Range<usize>> {
    PROPERTY_NAME_RE.find_iter(text).map(|m| m.range()).collect()
}

/// Extract the token sheet of one file. `file` is provenance only.
pub fn extract_tokens(file: &str, text: &str) -> TokenSheet {
    let definitions = declarations(text)
        .into_iter()
        .map(|decl| Token {
            category: categorize(&decl.name),
            name: decl.name,
            value: decl.value,
            file: file.to_string(),
            line: decl.line,
        })
        .collect();
    TokenSheet {
        file: file.to_string(),
        definitions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenCategory;

    #[test]
    fn extracts_simple_declarations_with_categories() {
        let css = ":root {\n  --primary-500: #ff0000;\n  --spacing-4: 1rem;\n}\n";
        let sheet = extract_tokens("primitives.css", css);
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.definitions[0].name, "primary-500");
        assert_eq!(sheet.definitions[0].value, "#ff0000");
        assert_eq!(sheet.definitions[0].line, 2);
        assert_eq!(sheet.definitions[0].category, TokenCategory::Color);
        assert_eq!(sheet.definitions[1].category, TokenCategory::Spacing);
    }

    #[test]
    fn multiline_value_stops_at_first_semicolon() {
        let css = "--shadow-md:\n    0 4px 6px -1px rgb(0 0 0 / 0.1),\n    0 2px 4px -2px rgb(0 0 0 / 0.1);\n--next: 1;";
        let sheet = extract_tokens("a.css", css);
        assert_eq!(sheet.len(), 2);
        assert_eq!(
            sheet.definitions[0].value,
            "0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1)"
        );
        assert_eq!(sheet.definitions[1].line, 4);
    }

    #[test]
    fn references_inside_values_are_not_declarations() {
        let css = "--btn-bg: var(--primary-500);\n.x { color: var(--btn-bg); }";
        let names: Vec<String> = declarations(css).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["btn-bg".to_string()]);
    }

    #[test]
    fn malformed_text_yields_no_tokens() {
        let sheet = extract_tokens("broken.css", "--missing-semicolon: red\n}");
        assert!(sheet.is_empty());
    }

    #[test]
    fn span_covers_name_through_semicolon() {
        let css = "  --a: 1;  ";
        let decl = &declarations(css)[0];
        assert_eq!(&css[decl.span.clone()], "--a: 1;");
    }

    #[test]
    fn property_name_spans_cover_declared_and_referenced_names() {
        let css = "--text-sm: var(--font-size-2);";
        let spans: Vec<&str> = property_name_spans(css)
            .into_iter()
            .map(|span| &css[span])
            .collect();
        assert_eq!(spans, vec!["--text-sm", "--font-size-2"]);
    }
}
