//! End-to-end statement analysis
//!
//! Statements are parsed one after another, their transactions concatenated,
//! and detection runs once over the merged list. Each call is self-contained.

use std::path::Path;

use tracing::{debug, info};

use crate::detect::{calculate_total_annual_cost, DetectionStats, SubscriptionDetector};
use crate::error::Result;
use crate::extract::TextExtractor;
use crate::import::parse_statement;
use crate::models::{StatementKind, Subscription, Transaction};
use crate::settings::Settings;

/// One statement, already reduced to text
#[derive(Debug, Clone)]
pub struct Statement {
    /// File name or other label, used in logs
    pub name: String,
    pub kind: StatementKind,
    pub text: String,
}

impl Statement {
    pub fn new(name: impl Into<String>, kind: StatementKind, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            text: text.into(),
        }
    }

    /// Build from raw file contents, extracting text from PDFs
    pub fn from_bytes(
        path: &Path,
        bytes: &[u8],
        extractor: &dyn TextExtractor,
    ) -> Result<Self> {
        let kind = StatementKind::from_path(path);
        let text = match kind {
            StatementKind::Pdf => extractor.extract_text(bytes)?,
            StatementKind::Csv | StatementKind::Text => String::from_utf8_lossy(bytes).into_owned(),
        };

        Ok(Self::new(path.display().to_string(), kind, text))
    }

    pub fn transactions(&self, settings: &Settings) -> Vec<Transaction> {
        let transactions = parse_statement(self.kind, &self.text, &settings.import, &settings.catalog);
        debug!(
            "{} ({}): {} transactions",
            self.name,
            self.kind,
            transactions.len()
        );
        transactions
    }
}

/// Result of one analysis run
#[derive(Debug, Clone)]
pub struct Analysis {
    pub transactions_found: usize,
    /// Sorted by annual cost, highest first
    pub subscriptions: Vec<Subscription>,
    pub total_annual_cost: f64,
    pub stats: DetectionStats,
}

impl Analysis {
    pub fn monthly_cost(&self) -> f64 {
        self.total_annual_cost / 12.0
    }

    /// No statement yielded a single transaction
    pub fn is_empty_input(&self) -> bool {
        self.transactions_found == 0
    }

    pub fn has_subscriptions(&self) -> bool {
        !self.subscriptions.is_empty()
    }
}

/// Parse every statement and detect subscriptions across all of them
pub fn analyze(statements: &[Statement], settings: &Settings) -> Analysis {
    let transactions: Vec<Transaction> = statements
        .iter()
        .flat_map(|s| s.transactions(settings))
        .collect();

    analyze_transactions(&transactions, settings)
}

/// Detect subscriptions in an already merged transaction list
pub fn analyze_transactions(transactions: &[Transaction], settings: &Settings) -> Analysis {
    let detector = SubscriptionDetector::with_config(&settings.catalog, settings.detection.clone());
    let (subscriptions, stats) = detector.detect_with_stats(transactions);
    let total_annual_cost = calculate_total_annual_cost(&subscriptions);

    info!(
        "Analyzed {} transactions: {} subscriptions, ${:.2}/yr",
        transactions.len(),
        subscriptions.len(),
        total_annual_cost
    );

    Analysis {
        transactions_found: transactions.len(),
        subscriptions,
        total_annual_cost,
        stats,
    }
}

/// Detect subscriptions with the built-in settings
pub fn detect_subscriptions(transactions: &[Transaction]) -> Vec<Subscription> {
    let settings = Settings::builtin();
    SubscriptionDetector::with_config(&settings.catalog, settings.detection.clone())
        .detect(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extract::UnsupportedExtractor;

    fn settings() -> Settings {
        let mut settings = Settings::builtin().clone();
        settings.detection.default_year = Some(2024);
        settings
    }

    #[test]
    fn test_analyze_merges_statements() {
        let january = Statement::new(
            "jan.csv",
            StatementKind::Csv,
            "Date,Description,Amount\n01/05/2024,HULU,17.99\n01/09/2024,CORNER DELI,8.40",
        );
        let february = Statement::new(
            "feb.csv",
            StatementKind::Csv,
            "Date,Description,Amount\n02/05/2024,HULU,17.99",
        );

        let analysis = analyze(&[january, february], &settings());
        assert_eq!(analysis.transactions_found, 3);
        assert_eq!(analysis.subscriptions.len(), 1);
        assert_eq!(analysis.subscriptions[0].merchant, "HULU");
        assert_eq!(analysis.subscriptions[0].charge_count(), 2);
        assert!(analysis.has_subscriptions());
        assert!(!analysis.is_empty_input());
    }

    #[test]
    fn test_analyze_empty_input() {
        let statement = Statement::new("empty.csv", StatementKind::Csv, "");
        let analysis = analyze(&[statement], &settings());
        assert!(analysis.is_empty_input());
        assert!(!analysis.has_subscriptions());
        assert_eq!(analysis.total_annual_cost, 0.0);
        assert_eq!(analysis.monthly_cost(), 0.0);
    }

    #[test]
    fn test_analyze_transactions_without_subscriptions() {
        let txs = vec![
            Transaction::new("01/01/2024", "CORNER DELI", 8.40),
            Transaction::new("01/09/2024", "HARDWARE BARN", 31.15),
        ];
        let analysis = analyze_transactions(&txs, &settings());
        assert!(!analysis.is_empty_input());
        assert!(!analysis.has_subscriptions());
        assert_eq!(analysis.stats.insufficient_evidence, 2);
    }

    #[test]
    fn test_monthly_cost() {
        let txs = vec![
            Transaction::new("01/15/2024", "SPOTIFY USA", 10.99),
            Transaction::new("02/14/2024", "SPOTIFY USA", 10.99),
        ];
        let analysis = analyze_transactions(&txs, &settings());
        assert!((analysis.total_annual_cost - 131.88).abs() < 1e-6);
        assert!((analysis.monthly_cost() - 10.99).abs() < 1e-6);
    }

    #[test]
    fn test_statement_from_bytes() {
        let csv = Statement::from_bytes(
            Path::new("Export.CSV"),
            b"Date,Description,Amount\n",
            &UnsupportedExtractor,
        )
        .unwrap();
        assert_eq!(csv.kind, StatementKind::Csv);
        assert_eq!(csv.name, "Export.CSV");

        let text = Statement::from_bytes(Path::new("dump.txt"), b"01/15 HULU 17.99", &UnsupportedExtractor)
            .unwrap();
        assert_eq!(text.kind, StatementKind::Text);

        let pdf = Statement::from_bytes(Path::new("march.pdf"), b"%PDF-1.4", &UnsupportedExtractor);
        assert!(matches!(pdf, Err(Error::Extraction(_))));
    }

    #[test]
    fn test_tab_separated_statement_reads_as_text() {
        let statement = Statement::from_bytes(
            Path::new("export.tsv"),
            b"Date\tDescription\tAmount\n01/15/2024\tNETFLIX.COM\t15.99\n02/15/2024\tNETFLIX.COM\t15.99\n",
            &UnsupportedExtractor,
        )
        .unwrap();
        assert_eq!(statement.kind, StatementKind::Text);

        let txs = statement.transactions(&settings());
        assert!(!txs.is_empty());
        for tx in &txs {
            assert_eq!(tx.amount, 15.99);
            assert!(!tx.merchant.contains('\t'));
            assert!(!tx.date.contains('\t'));
        }
        assert!(txs.iter().any(|t| t.date == "01/15/2024" && t.merchant == "NETFLIX.COM"));
    }

    #[test]
    fn test_detect_subscriptions_uses_builtin_catalog() {
        let txs = vec![Transaction::new("", "NETFLIX.COM", 15.49)];
        let subs = detect_subscriptions(&txs);
        assert_eq!(subs.len(), 1);
        assert!((subs[0].confidence - 0.5).abs() < 1e-9);
    }
}
