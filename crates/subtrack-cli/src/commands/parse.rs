//! Parse command implementation

use std::path::Path;

use anyhow::Result;
use subtrack_core::Settings;
use tracing::warn;

use super::{read_statement, truncate};

pub fn cmd_parse(settings: &Settings, file: &Path, limit: usize, json: bool) -> Result<()> {
    let statement = read_statement(file)?;
    let transactions = statement.transactions(settings);

    if json {
        let shown = &transactions[..transactions.len().min(limit)];
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if transactions.is_empty() {
        warn!("{} yielded no transactions", file.display());
        println!("No transactions found in {}", file.display());
        println!("Try --verbose to see which columns were recognized.");
        return Ok(());
    }

    println!();
    println!(
        "📄 {} ({}): {} transactions",
        file.display(),
        statement.kind,
        transactions.len()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        let date = if tx.date.is_empty() { "?" } else { &tx.date };
        println!(
            "   {:12} │ {:36} │ {:>10}",
            date,
            truncate(&tx.merchant, 36),
            format!("${:.2}", tx.amount)
        );
    }

    if transactions.len() > limit {
        println!("   ... and {} more", transactions.len() - limit);
    }

    Ok(())
}
