//! Design tokens and their categories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coarse family a token belongs to, derived from its name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    Color,
    Spacing,
    Typography,
    Shadow,
    Border,
    Other,
}

impl TokenCategory {
    pub const ALL: [TokenCategory; 6] = [
        TokenCategory::Color,
        TokenCategory::Spacing,
        TokenCategory::Typography,
        TokenCategory::Shadow,
        TokenCategory::Border,
        TokenCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TokenCategory::Color => "color",
            TokenCategory::Spacing => "spacing",
            TokenCategory::Typography => "typography",
            TokenCategory::Shadow => "shadow",
            TokenCategory::Border => "border",
            TokenCategory::Other => "other",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Checked in order; the first category with a matching keyword wins.
const CATEGORY_KEYWORDS: [(TokenCategory, &[&str]); 5] = [
    (
        TokenCategory::Color,
        &[
            "color",
            "bg",
            "background",
            "foreground",
            "primary",
            "secondary",
            "accent",
            "muted",
            "destructive",
            "success",
            "warning",
            "error",
            "info",
            "brand",
            "gray",
            "neutral",
        ],
    ),
    (
        TokenCategory::Spacing,
        &["spacing", "space", "gap", "padding", "margin", "inset"],
    ),
    (
        TokenCategory::Typography,
        &[
            "font",
            "text",
            "line-height",
            "letter-spacing",
            "leading",
            "tracking",
        ],
    ),
    (TokenCategory::Shadow, &["shadow", "elevation"]),
    (TokenCategory::Border, &["border", "radius", "ring", "outline"]),
];

/// Assign a category by keyword matching on `-`-separated name segments.
pub fn categorize(name: &str) -> TokenCategory {
    let segments: Vec<&str> = name
        .split('-')
        .filter(|segment| !segment.is_empty())
        .collect();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords
            .iter()
            .any(|keyword| contains_segment_run(&segments, keyword))
        {
            return category;
        }
    }
    TokenCategory::Other
}

fn contains_segment_run(segments: &[&str], keyword: &str) -> bool {
    let needle: Vec<&str> = keyword.split('-').collect();
    if needle.len() > segments.len() {
        return false;
    }
    segments
        .windows(needle.len())
        .any(|window| window.iter().zip(&needle).all(|(a, b)| a.eq_ignore_ascii_case(b)))
}

/// One custom-property declaration found in a token-definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub name: String,
    pub value: String,
    pub file: String,
    pub line: usize,
    pub category: TokenCategory,
}

/// Every declaration extracted from one file, in source order.
///
/// Repeated names are kept so duplicate definitions stay observable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSheet {
    pub file: String,
    pub definitions: Vec<Token>,
}

impl TokenSheet {
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Collapse to one token per name; the last declaration wins.
    pub fn token_map(&self) -> BTreeMap<String, Token> {
        let mut map = BTreeMap::new();
        for token in &self.definitions {
            map.insert(token.name.clone(), token.clone());
        }
        map
    }

    /// Number of declarations per name.
    pub fn occurrences(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for token in &self.definitions {
            *counts.entry(token.name.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct names in first-appearance order.
    pub fn distinct_names(&self) -> Vec<&str> {
        let mut seen = std::collections::BTreeSet::new();
        self.definitions
            .iter()
            .filter(|token| seen.insert(token.name.as_str()))
            .map(|token| token.name.as_str())
            .collect()
    }
}

/// Merge several sheets into one name-keyed map; later sheets win.
pub fn merge_sheets(sheets: &[TokenSheet]) -> BTreeMap<String, Token> {
    let mut merged = BTreeMap::new();
    for sheet in sheets {
        merged.extend(sheet.token_map());
    }
    merged
}
