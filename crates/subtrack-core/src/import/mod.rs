//! Statement parsers
//!
//! Two front ends produce the same flat transaction list:
//! - `tabular` for delimited exports with arbitrary bank column layouts
//! - `text` for free-form text extracted from PDF statements
//!
//! Neither fails on malformed data. An unreadable statement yields an empty
//! list, which callers report as "no transactions found".

pub mod tabular;
pub mod text;

use crate::catalog::Catalog;
use crate::models::{StatementKind, Transaction};

pub use tabular::parse_csv_universal;
pub use text::parse_statement_text;

/// Parser tuning knobs
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Data rows sampled when sniffing column roles
    pub sniff_rows: usize,
    /// Date/money hits in the sample needed to claim a column
    pub sniff_min_hits: usize,
    /// Total sampled text length needed to claim a merchant column
    pub merchant_min_text: usize,
    /// Fall back to the longest free-text cell when a row has no merchant
    pub infer_merchant_from_row: bool,
    /// Plausible amount range for known-service matches in statement text
    pub keyword_min_amount: f64,
    pub keyword_max_amount: f64,
    /// How far past a service name to look for its amount (bytes)
    pub keyword_window: usize,
    /// Ceiling for the generic description + amount fallback
    pub fallback_max_amount: f64,
    /// Lowercase phrases that mark administrative statement lines
    pub admin_keywords: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sniff_rows: 10,
            sniff_min_hits: 5,
            merchant_min_text: 50,
            infer_merchant_from_row: false,
            keyword_min_amount: 0.99,
            keyword_max_amount: 500.0,
            keyword_window: 80,
            fallback_max_amount: 5000.0,
            admin_keywords: [
                "balance",
                "statement",
                "page",
                "account",
                "routing",
                "credit union",
                "total",
                "member",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ImportConfig {
    /// True if the text contains any administrative keyword
    pub fn is_administrative(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.admin_keywords
            .iter()
            .any(|k| !k.is_empty() && lower.contains(k.as_str()))
    }
}

/// Parse statement text with the parser matching its kind
///
/// PDF statements must already be reduced to text; both `Pdf` and `Text`
/// go through the free-form parser.
pub fn parse_statement(
    kind: StatementKind,
    text: &str,
    config: &ImportConfig,
    catalog: &Catalog,
) -> Vec<Transaction> {
    match kind {
        StatementKind::Csv => tabular::parse_with(text, config),
        StatementKind::Pdf | StatementKind::Text => text::parse_with(text, config, catalog),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_administrative() {
        let config = ImportConfig::default();
        assert!(config.is_administrative("Ending Balance 1,234.56"));
        assert!(config.is_administrative("ABC CREDIT UNION"));
        assert!(config.is_administrative("Page 2 of 4"));
        assert!(!config.is_administrative("NETFLIX.COM"));
    }

    #[test]
    fn test_parse_statement_routes_by_kind() {
        let config = ImportConfig::default();
        let catalog = Catalog::default();
        let csv = "Date,Description,Amount\n01/15/2024,NETFLIX.COM,15.99";

        let from_csv = parse_statement(StatementKind::Csv, csv, &config, &catalog);
        assert_eq!(from_csv.len(), 1);

        let text = "01/15 NETFLIX.COM 15.99";
        let from_text = parse_statement(StatementKind::Text, text, &config, &catalog);
        assert!(!from_text.is_empty());
        assert_eq!(from_text[0].amount, 15.99);
    }
}
