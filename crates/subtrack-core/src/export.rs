//! Subscription export (JSON and CSV)

use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::models::Subscription;
use crate::money::round_cents;

/// Output format for detected subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Human-readable report
    #[default]
    Table,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(Error::InvalidData(format!(
                "Unknown format '{}' (expected table, json, or csv)",
                other
            ))),
        }
    }
}

/// One CSV row per subscription
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    merchant: &'a str,
    frequency: &'static str,
    amount: f64,
    annual_cost: f64,
    confidence: f64,
    charges: usize,
    cancel_url: &'a str,
}

/// Write subscriptions as a pretty-printed JSON array
pub fn write_json<W: Write>(subscriptions: &[Subscription], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, subscriptions)?;
    writeln!(writer)?;
    Ok(())
}

/// Write subscriptions as CSV, with cancel links where known
pub fn write_csv<W: Write>(
    subscriptions: &[Subscription],
    catalog: &Catalog,
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for sub in subscriptions {
        let link = catalog.lookup(&sub.merchant);
        wtr.serialize(ExportRow {
            merchant: &sub.merchant,
            frequency: sub.frequency.as_str(),
            amount: round_cents(sub.amount),
            annual_cost: round_cents(sub.annual_cost),
            confidence: (sub.confidence * 100.0).round() / 100.0,
            charges: sub.charge_count(),
            cancel_url: link.map(|l| l.url.as_str()).unwrap_or(""),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
