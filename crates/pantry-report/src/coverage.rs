//! Token usage and migration coverage.
//!
//! Two ratios are reported:
//! - usage rate: defined tokens with at least one usage site, over all
//!   defined tokens;
//! - coverage rate: usage sites over usage sites plus hardcoded values,
//!   overall and per source file.
//!
//! Files whose coverage falls below the threshold are flagged for migration.

use pantry_tokens::{
    HardcodedValue, Token, TokenCategory, UsageSite, scan_hardcoded, scan_usages,
    used_token_names,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// Usage and hardcoded-value findings for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceScan {
    pub file: String,
    pub usages: Vec<UsageSite>,
    pub hardcoded: Vec<HardcodedValue>,
}

pub fn scan_source(file: &str, text: &str) -> SourceScan {
    SourceScan {
        file: file.to_string(),
        usages: scan_usages(file, text),
        hardcoded: scan_hardcoded(file, text),
    }
}

/// Percentage rounded to one decimal; `empty` when the denominator is zero.
pub fn percentage(numerator: usize, denominator: usize, empty: f64) -> f64 {
    if denominator == 0 {
        return empty;
    }
    let raw = numerator as f64 / denominator as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

pub fn usage_rate(tokens_used: usize, tokens_defined: usize) -> f64 {
    percentage(tokens_used, tokens_defined, 0.0)
}

pub fn coverage_rate(usage_sites: usize, hardcoded_values: usize) -> f64 {
    percentage(usage_sites, usage_sites + hardcoded_values, 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    pub file: String,
    pub token_usages: usize,
    pub hardcoded_values: usize,
    pub coverage: f64,
    pub needs_migration: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub defined: usize,
    pub used: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub generated_at: String,
    pub tokens_defined: usize,
    pub tokens_used: usize,
    pub usage_sites: usize,
    pub hardcoded_values: usize,
    pub usage_rate: f64,
    pub coverage_rate: f64,
    pub threshold: f64,
    pub categories: BTreeMap<TokenCategory, CategoryStats>,
    pub files: Vec<FileCoverage>,
    pub problem_files: Vec<FileCoverage>,
    pub unused_tokens: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn build_coverage_report(
    defined: &BTreeMap<String, Token>,
    scans: &[SourceScan],
    threshold: f64,
    generated_at: String,
) -> CoverageReport {
    let all_sites: Vec<UsageSite> = scans
        .iter()
        .flat_map(|scan| scan.usages.iter().cloned())
        .collect();
    let referenced = used_token_names(&all_sites);
    let used: BTreeSet<&str> = defined
        .keys()
        .filter(|name| referenced.contains(name.as_str()))
        .map(String::as_str)
        .collect();

    let mut categories: BTreeMap<TokenCategory, CategoryStats> = TokenCategory::ALL
        .iter()
        .map(|category| (*category, CategoryStats::default()))
        .collect();
    for (name, token) in defined {
        let stats = categories.entry(token.category).or_default();
        stats.defined += 1;
        if used.contains(name.as_str()) {
            stats.used += 1;
        }
    }

    let hardcoded_values: usize = scans.iter().map(|scan| scan.hardcoded.len()).sum();

    let files: Vec<FileCoverage> = scans
        .iter()
        .filter(|scan| !scan.usages.is_empty() || !scan.hardcoded.is_empty())
        .map(|scan| {
            let coverage = coverage_rate(scan.usages.len(), scan.hardcoded.len());
            FileCoverage {
                file: scan.file.clone(),
                token_usages: scan.usages.len(),
                hardcoded_values: scan.hardcoded.len(),
                coverage,
                needs_migration: coverage < threshold,
            }
        })
        .collect();

    let mut problem_files: Vec<FileCoverage> = files
        .iter()
        .filter(|file| file.needs_migration)
        .cloned()
        .collect();
    problem_files.sort_by(|a, b| {
        a.coverage
            .total_cmp(&b.coverage)
            .then_with(|| a.file.cmp(&b.file))
    });

    let unused_tokens: Vec<String> = defined
        .keys()
        .filter(|name| !used.contains(name.as_str()))
        .cloned()
        .collect();

    let mut report = CoverageReport {
        generated_at,
        tokens_defined: defined.len(),
        tokens_used: used.len(),
        usage_sites: all_sites.len(),
        hardcoded_values,
        usage_rate: usage_rate(used.len(), defined.len()),
        coverage_rate: coverage_rate(all_sites.len(), hardcoded_values),
        threshold,
        categories,
        files,
        problem_files,
        unused_tokens,
        recommendations: Vec::new(),
    };
    report.recommendations = recommendations(&report);
    report
}

fn recommendations(report: &CoverageReport) -> Vec<String> {
    let mut out = Vec::new();
    if !report.unused_tokens.is_empty() {
        out.push(format!(
            "Remove or document {} unused tokens (see `pantry optimize analyze`)",
            report.unused_tokens.len()
        ));
    }
    if let Some(worst) = report.problem_files.first() {
        out.push(format!(
            "Migrate {} files below {:.1}% token coverage, starting with {} ({:.1}%)",
            report.problem_files.len(),
            report.threshold,
            worst.file,
            worst.coverage
        ));
    }
    if report.tokens_defined > 0 && report.usage_rate < 50.0 {
        out.push(format!(
            "Token usage rate is {:.1}%; prefer semantic tokens over hardcoded utilities",
            report.usage_rate
        ));
    }
    if report.hardcoded_values > 0 && report.coverage_rate < report.threshold {
        out.push(format!(
            "Replace {} hardcoded styling values with design tokens",
            report.hardcoded_values
        ));
    }
    out
}

/// Markdown rendering of the coverage report.
pub fn render_coverage_markdown(report: &CoverageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Design Token Coverage Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {}", report.generated_at);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|--------|-------|");
    let _ = writeln!(out, "| Tokens defined | {} |", report.tokens_defined);
    let _ = writeln!(out, "| Tokens used | {} |", report.tokens_used);
    let _ = writeln!(out, "| Usage rate | {:.1}% |", report.usage_rate);
    let _ = writeln!(out, "| Usage sites | {} |", report.usage_sites);
    let _ = writeln!(out, "| Hardcoded values | {} |", report.hardcoded_values);
    let _ = writeln!(out, "| Coverage | {:.1}% |", report.coverage_rate);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Categories");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Category | Defined | Used |");
    let _ = writeln!(out, "|----------|---------|------|");
    for (category, stats) in &report.categories {
        if stats.defined == 0 {
            continue;
        }
        let _ = writeln!(out, "| {category} | {} | {} |", stats.defined, stats.used);
    }

    if !report.problem_files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "## Files Below {:.1}% Coverage",
            report.threshold
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "| File | Coverage | Token usages | Hardcoded |");
        let _ = writeln!(out, "|------|----------|--------------|-----------|");
        for file in &report.problem_files {
            let _ = writeln!(
                out,
                "| `{}` | {:.1}% | {} | {} |",
                file.file, file.coverage, file.token_usages, file.hardcoded_values
            );
        }
    }

    if !report.unused_tokens.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Unused Tokens");
        let _ = writeln!(out);
        for name in &report.unused_tokens {
            let _ = writeln!(out, "- `--{name}`");
        }
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Recommendations");
        let _ = writeln!(out);
        for item in &report.recommendations {
            let _ = writeln!(out, "- {item}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_tokens::extract_tokens;

    fn ten_tokens() -> BTreeMap<String, Token> {
        let css = (0..10)
            .map(|idx| format!("--token-{idx}: {idx}px;"))
            .collect::<Vec<_>>()
            .join("\n");
        extract_tokens("tokens.css", &css).token_map()
    }

    #[test]
    fn usage_rate_is_rounded_to_one_decimal() {
        assert_eq!(usage_rate(3, 10), 30.0);
        assert_eq!(usage_rate(1, 3), 33.3);
        assert_eq!(usage_rate(2, 3), 66.7);
        assert_eq!(usage_rate(0, 0), 0.0);
        assert_eq!(coverage_rate(0, 0), 100.0);
    }

    #[test]
    fn three_usages_of_ten_tokens_is_thirty_percent() {
        let scan = scan_source(
            "src/App.tsx",
            "var(--token-0) var(--token-1) var(--token-2)",
        );
        let report = build_coverage_report(&ten_tokens(), &[scan], 70.0, "now".to_string());
        assert_eq!(report.tokens_defined, 10);
        assert_eq!(report.usage_sites, 3);
        assert_eq!(report.tokens_used, 3);
        assert_eq!(report.usage_rate, 30.0);
        assert_eq!(format!("{:.1}%", report.usage_rate), "30.0%");
        assert_eq!(report.unused_tokens.len(), 7);
    }

    #[test]
    fn repeated_sites_of_one_token_count_once_toward_usage_rate() {
        let scan = scan_source(
            "src/App.tsx",
            "var(--token-0) var(--token-0) var(--token-0)",
        );
        let report = build_coverage_report(&ten_tokens(), &[scan], 70.0, "now".to_string());
        assert_eq!(report.usage_sites, 3);
        assert_eq!(report.tokens_used, 1);
        assert_eq!(report.usage_rate, 10.0);
        assert_eq!(report.coverage_rate, 100.0);
        assert_eq!(report.unused_tokens.len(), 9);
    }

    #[test]
    fn files_below_threshold_are_problem_files_sorted_ascending() {
        let scans = vec![
            scan_source("a.tsx", r#"className="p-4 m-2 text-sm bg-primary""#),
            scan_source("b.tsx", r#"className="p-4 bg-primary""#),
            scan_source("c.tsx", r#"className="bg-primary text-accent""#),
            scan_source("d.tsx", "export const noop = () => null;"),
        ];
        let report = build_coverage_report(&BTreeMap::new(), &scans, 70.0, "now".to_string());
        let problem: Vec<(&str, f64)> = report
            .problem_files
            .iter()
            .map(|f| (f.file.as_str(), f.coverage))
            .collect();
        assert_eq!(problem, vec![("a.tsx", 25.0), ("b.tsx", 50.0)]);
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.coverage_rate, 50.0);
    }

    #[test]
    fn category_breakdown_counts_defined_and_used() {
        let defined = extract_tokens(
            "tokens.css",
            "--primary: red; --spacing-4: 1rem; --shadow-lg: none;",
        )
        .token_map();
        let scan = scan_source("x.css", ".a { color: var(--primary); }");
        let report = build_coverage_report(&defined, &[scan], 70.0, "now".to_string());
        assert_eq!(
            report.categories[&TokenCategory::Color],
            CategoryStats {
                defined: 1,
                used: 1
            }
        );
        assert_eq!(report.categories[&TokenCategory::Spacing].used, 0);
        assert_eq!(report.categories[&TokenCategory::Other].defined, 0);
    }

    #[test]
    fn markdown_contains_summary_and_problem_files() {
        let scans = vec![scan_source("a.tsx", r#"className="p-4 text-sm""#)];
        let report = build_coverage_report(&ten_tokens(), &scans, 70.0, "now".to_string());
        let markdown = render_coverage_markdown(&report);
        assert!(markdown.contains("| Usage rate | 0.0% |"));
        assert!(markdown.contains("## Files Below 70.0% Coverage"));
        assert!(markdown.contains("| `a.tsx` | 0.0% | 0 | 2 |"));
        assert!(markdown.contains("## Recommendations"));
    }

    #[test]
    fn report_serializes_category_keys_as_strings() {
        let report = build_coverage_report(&ten_tokens(), &[], 70.0, "now".to_string());
        let value = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(value["categories"]["other"]["defined"], 10);
        assert_eq!(value["usageRate"], 0.0);
    }
}
