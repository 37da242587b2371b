//! Domain models for subtrack

use std::path::Path;

use serde::{Deserialize, Serialize};

/// One purchase event recovered from a statement
///
/// `date` is the raw token as it appeared in the source (`1/15/2024`,
/// `2024-01-15`, `01-15`, or empty when the parser could not find one).
/// `amount` is always a positive magnitude; credits never make it this far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub merchant: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(date: impl Into<String>, merchant: impl Into<String>, amount: f64) -> Self {
        Self {
            date: date.into(),
            merchant: merchant.into(),
            amount,
        }
    }
}

/// Inferred billing cadence of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    /// Short period label for display (`$9.99/mo`)
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::Monthly => "mo",
            Self::Quarterly => "qtr",
            Self::Annual => "yr",
        }
    }

    /// Number of charges per year at this cadence
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Self::Monthly => 12.0,
            Self::Quarterly => 4.0,
            Self::Annual => 1.0,
        }
    }

    /// Project a single charge to a yearly figure
    pub fn annualize(&self, amount: f64) -> f64 {
        amount * self.periods_per_year()
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Frequency guess plus how sure the detector is about it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyEstimate {
    pub frequency: Frequency,
    pub confidence: f64,
}

/// A detected recurring charge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Display name, taken from the first transaction in the group
    pub merchant: String,
    /// Mean charge across the group
    pub amount: f64,
    pub frequency: Frequency,
    pub annual_cost: f64,
    /// Heuristic certainty in `[0, 1]`
    pub confidence: f64,
    /// Every transaction backing this inference, in encounter order
    pub transactions: Vec<Transaction>,
}

impl Subscription {
    pub fn monthly_cost(&self) -> f64 {
        self.annual_cost / 12.0
    }

    pub fn charge_count(&self) -> usize {
        self.transactions.len()
    }
}

/// Kind of statement file, which selects the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Delimited export (header row + data rows)
    Csv,
    /// PDF statement; needs text extraction before parsing
    Pdf,
    /// Text already extracted from a PDF, or any other free-form dump
    Text,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }

    /// Pick the kind from a file extension; anything unrecognized is free text
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("csv") => Self::Csv,
            Some("pdf") => Self::Pdf,
            _ => Self::Text,
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where to go to cancel a known service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelLink {
    /// Lookup key; matched as a substring of the normalized merchant name
    pub merchant: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// What to show a user who wants to cancel a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelAction {
    Link(CancelLink),
    /// No known cancel page; suggest a web search instead
    Search { query: String },
}

impl CancelAction {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Link(link) => Some(&link.url),
            Self::Search { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_frequency_annualize() {
        assert!((Frequency::Monthly.annualize(10.99) - 131.88).abs() < 1e-9);
        assert_eq!(Frequency::Quarterly.annualize(25.0), 100.0);
        assert_eq!(Frequency::Annual.annualize(99.0), 99.0);
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("yearly".parse::<Frequency>().unwrap(), Frequency::Annual);
        assert!("weekly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_serializes_lowercase() {
        let json = serde_json::to_string(&Frequency::Quarterly).unwrap();
        assert_eq!(json, "\"quarterly\"");
    }

    #[test]
    fn test_subscription_serializes_camel_case() {
        let sub = Subscription {
            merchant: "SPOTIFY USA".to_string(),
            amount: 10.99,
            frequency: Frequency::Monthly,
            annual_cost: 131.88,
            confidence: 0.95,
            transactions: vec![],
        };
        let value = serde_json::to_value(&sub).unwrap();
        assert_eq!(value["annualCost"], 131.88);
        assert_eq!(value["frequency"], "monthly");
    }

    #[test]
    fn test_statement_kind_from_path() {
        assert_eq!(
            StatementKind::from_path(&PathBuf::from("export.CSV")),
            StatementKind::Csv
        );
        assert_eq!(
            StatementKind::from_path(&PathBuf::from("statement.pdf")),
            StatementKind::Pdf
        );
        assert_eq!(
            StatementKind::from_path(&PathBuf::from("dump.txt")),
            StatementKind::Text
        );
        assert_eq!(
            StatementKind::from_path(&PathBuf::from("no_extension")),
            StatementKind::Text
        );
        // Only comma-delimited exports go to the tabular parser
        assert_eq!(
            StatementKind::from_path(&PathBuf::from("export.tsv")),
            StatementKind::Text
        );
    }
}
