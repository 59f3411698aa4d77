//! Hardcoded styling values that bypass the token layer.
//!
//! These are the counterweight to usage sites when computing coverage: a
//! palette utility such as `bg-blue-500`, a numeric spacing utility such as
//! `p-4`, a typography scale class, an arbitrary `[...]` value, or a raw hex
//! literal. Hex literals inside `var(...)` fallbacks, inside arbitrary values,
//! or inside custom-property declarations are not counted. Nothing that
//! starts inside a `--name` counts either, so `--text-sm: 0.875rem;` is a
//! token, not a typography literal.

use crate::extract::{declarations, property_name_spans};
use crate::text::{LineIndex, within};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

static PALETTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:bg|text|border|ring|fill|stroke|outline|from|via|to|divide|placeholder)-(?:(?:slate|gray|zinc|neutral|stone|red|orange|amber|yellow|lime|green|emerald|teal|cyan|sky|blue|indigo|violet|purple|fuchsia|pink|rose)-\d{2,3}|white|black)\b",
    )
    .expect("palette regex should compile")
});

static SPACING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:p|px|py|pt|pr|pb|pl|m|mx|my|mt|mr|mb|ml|gap|gap-x|gap-y|space-x|space-y)-\d+(?:\.5)?\b",
    )
    .expect("spacing regex should compile")
});

static TYPOGRAPHY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:text-(?:xs|sm|base|lg|xl|[2-9]xl)|font-(?:thin|light|normal|medium|semibold|bold|extrabold))\b",
    )
    .expect("typography regex should compile")
});

static ARBITRARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-z][a-z-]*-\[[^\]\s]+\]").expect("arbitrary-value regex should compile")
});

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4})\b")
        .expect("hex regex should compile")
});

static VAR_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\([^)]*\)").expect("var-call regex should compile"));

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HardcodedKind {
    Color,
    Spacing,
    Typography,
    Arbitrary,
}

/// One literal styling value found in source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardcodedValue {
    pub file: String,
    pub line: usize,
    pub raw_match: String,
    pub kind: HardcodedKind,
}

/// Scan one file for hardcoded styling values, in source order.
pub fn scan_hardcoded(file: &str, text: &str) -> Vec<HardcodedValue> {
    let lines = LineIndex::new(text);
    let names = property_name_spans(text);
    let mut found: Vec<(usize, HardcodedValue)> = Vec::new();
    let mut push = |start: usize, raw: &str, kind: HardcodedKind| {
        if within(&names, start) {
            return;
        }
        found.push((
            start,
            HardcodedValue {
                file: file.to_string(),
                line: lines.line_of(start),
                raw_match: raw.to_string(),
                kind,
            },
        ));
    };

    for (kind, re) in [
        (HardcodedKind::Color, &*PALETTE_RE),
        (HardcodedKind::Spacing, &*SPACING_RE),
        (HardcodedKind::Typography, &*TYPOGRAPHY_RE),
    ] {
        for m in re.find_iter(text) {
            push(m.start(), m.as_str(), kind);
        }
    }

    let mut shielded: Vec<Range<usize>> = Vec::new();
    for m in ARBITRARY_RE.find_iter(text) {
        push(m.start(), m.as_str(), HardcodedKind::Arbitrary);
        shielded.push(m.range());
    }
    shielded.extend(VAR_CALL_RE.find_iter(text).map(|m| m.range()));
    shielded.extend(declarations(text).into_iter().map(|decl| decl.span));

    for m in HEX_RE.find_iter(text) {
        if within(&shielded, m.start()) {
            continue;
        }
        // HTML numeric entities such as `&#123;`
        if m.start() > 0 && text.as_bytes()[m.start() - 1] == b'&' {
            continue;
        }
        push(m.start(), m.as_str(), HardcodedKind::Color);
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, value)| value).collect()
}
