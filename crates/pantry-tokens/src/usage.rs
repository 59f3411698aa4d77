//! Usage scanning: where are tokens consumed?
//!
//! Two pattern families are matched and unioned:
//! - explicit references, `var(--name)` with or without a fallback;
//! - utility classes built on a semantic color role (`bg-primary-500`),
//!   translated into the candidate token name after the utility prefix.
//!
//! The second family is a heuristic. It over-reports (any class that happens
//! to look like a role counts), which is fine for coverage estimates and not
//! fine for anything that gates correctness.
//!
//! Matches starting inside a `--name` are skipped in both families: the
//! declaration `--text-accent: ...;` is a definition, not a `text-accent`
//! utility class consuming `accent`.

use crate::extract::property_name_spans;
use crate::text::{LineIndex, within};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var\(\s*--(?P<name>[A-Za-z0-9_-]+)").expect("reference regex should compile")
});

static UTILITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:bg|text|border|ring|fill|stroke|outline|shadow|from|via|to)-(?P<name>(?:primary|secondary|accent|muted|destructive|success|warning|info|card|popover|background|foreground|brand|input)(?:-[a-z0-9]+)*)\b",
    )
    .expect("utility regex should compile")
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    Reference,
    Utility,
}

/// One textual reference to a token outside its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSite {
    pub file: String,
    pub line: usize,
    pub raw_match: String,
    pub token: String,
    pub kind: UsageKind,
}

/// Scan one file for token usages, ordered by line with references first.
pub fn scan_usages(file: &str, text: &str) -> Vec<UsageSite> {
    let lines = LineIndex::new(text);
    let names = property_name_spans(text);
    let mut found: Vec<(usize, UsageKind, usize, UsageSite)> = Vec::new();

    for (kind, re) in [
        (UsageKind::Reference, &*REFERENCE_RE),
        (UsageKind::Utility, &*UTILITY_RE),
    ] {
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
                continue;
            };
            if within(&names, whole.start()) {
                continue;
            }
            let line = lines.line_of(whole.start());
            found.push((
                line,
                kind,
                whole.start(),
                UsageSite {
                    file: file.to_string(),
                    line,
                    raw_match: whole.as_str().to_string(),
                    token: name.as_str().to_string(),
                    kind,
                },
            ));
        }
    }

    found.sort_by_key(|(line, kind, start, _)| (*line, *kind, *start));
    found.into_iter().map(|(_, _, _, site)| site).collect()
}

/// Distinct candidate token names across a set of usage sites.
pub fn used_token_names(sites: &[UsageSite]) -> BTreeSet<String> {
    sites.iter().map(|site| site.token.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_var_references_with_and_without_fallback() {
        let text = ".a { color: var(--primary-500); }\n.b { gap: var( --spacing-4, 1rem); }";
        let sites = scan_usages("a.css", text);
        let names: Vec<&str> = sites.iter().map(|s| s.token.as_str()).collect();
        assert_eq!(names, vec!["primary-500", "spacing-4"]);
        assert_eq!(sites[1].line, 2);
        assert!(sites.iter().all(|s| s.kind == UsageKind::Reference));
    }

    #[test]
    fn translates_semantic_utility_classes() {
        let text = r#"<div className="bg-primary-500 hover:text-muted-foreground p-4" />"#;
        let sites = scan_usages("Card.tsx", text);
        let names: Vec<&str> = sites.iter().map(|s| s.token.as_str()).collect();
        assert_eq!(names, vec!["primary-500", "muted-foreground"]);
        assert_eq!(sites[0].raw_match, "bg-primary-500");
        assert!(sites.iter().all(|s| s.kind == UsageKind::Utility));
    }

    #[test]
    fn references_sort_before_utilities_on_the_same_line() {
        let text = r#"<a className="bg-accent" style={{ color: "var(--brand-600)" }} />"#;
        let sites = scan_usages("Link.tsx", text);
        assert_eq!(sites[0].kind, UsageKind::Reference);
        assert_eq!(sites[1].kind, UsageKind::Utility);
    }

    #[test]
    fn palette_utilities_are_not_token_usages() {
        assert!(scan_usages("x.tsx", r#"className="bg-blue-500 text-sm""#).is_empty());
    }

    #[test]
    fn utility_shaped_property_names_are_not_usages() {
        let text = "--text-accent-glow: #f0f;\n--accent-glow: #0f0;\n.a { color: var(--bg-primary); }";
        let sites = scan_usages("x.css", text);
        let names: Vec<&str> = sites.iter().map(|s| s.token.as_str()).collect();
        assert_eq!(names, vec!["bg-primary"]);
    }

    #[test]
    fn used_names_are_deduplicated() {
        let text = "var(--a) var(--a) var(--b)";
        let names = used_token_names(&scan_usages("x.css", text));
        assert_eq!(names.len(), 2);
    }
}
