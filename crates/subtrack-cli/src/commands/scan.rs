//! Scan command implementation

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use subtrack_core::export::{write_csv, write_json};
use subtrack_core::{analyze, Analysis, CancelAction, Catalog, ExportFormat, Settings};

use super::{read_statement, truncate};

pub fn cmd_scan(
    settings: &Settings,
    files: &[PathBuf],
    format: &str,
    output: Option<&Path>,
    all: bool,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;

    let statements = files
        .iter()
        .map(|path| read_statement(path))
        .collect::<Result<Vec<_>>>()?;

    let analysis = analyze(&statements, settings);

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_report(&analysis, &settings.catalog, format, all, &mut writer)?;
            writer.flush()?;

            println!(
                "✅ Wrote {} subscriptions to {}",
                analysis.subscriptions.len(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            write_report(&analysis, &settings.catalog, format, all, stdout.lock())?;
        }
    }

    Ok(())
}

/// Render an analysis in the requested format
pub fn write_report<W: Write>(
    analysis: &Analysis,
    catalog: &Catalog,
    format: ExportFormat,
    all: bool,
    mut out: W,
) -> Result<()> {
    match format {
        ExportFormat::Json => write_json(&analysis.subscriptions, out)?,
        ExportFormat::Csv => write_csv(&analysis.subscriptions, catalog, out)?,
        ExportFormat::Table => write_table(analysis, catalog, all, &mut out)?,
    }
    Ok(())
}

fn write_table<W: Write>(
    analysis: &Analysis,
    catalog: &Catalog,
    all: bool,
    out: &mut W,
) -> io::Result<()> {
    if analysis.is_empty_input() {
        writeln!(out, "No transactions found in the statements.")?;
        writeln!(
            out,
            "Check that each file is a CSV export or a PDF/text statement from your bank."
        )?;
        return Ok(());
    }

    if !analysis.has_subscriptions() {
        writeln!(
            out,
            "No recurring charges detected in {} transactions.",
            analysis.transactions_found
        )?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(
        out,
        "💳 Subscriptions ({} found in {} transactions)",
        analysis.subscriptions.len(),
        analysis.transactions_found
    )?;
    writeln!(
        out,
        "   ─────────────────────────────────────────────────────────────"
    )?;

    for sub in &analysis.subscriptions {
        writeln!(
            out,
            "   {:24} │ {:>9}/{:<3} │ {:>9}/yr │ {:>3.0}%",
            truncate(&sub.merchant, 24),
            format!("${:.2}", sub.amount),
            sub.frequency.short_label(),
            format!("${:.2}", sub.annual_cost),
            sub.confidence * 100.0
        )?;

        match catalog.cancel_action(&sub.merchant) {
            CancelAction::Link(link) => writeln!(out, "     ↳ cancel: {}", link.url)?,
            CancelAction::Search { query } => writeln!(out, "     ↳ search: \"{}\"", query)?,
        }

        if all {
            for tx in &sub.transactions {
                let date = if tx.date.is_empty() { "?" } else { &tx.date };
                writeln!(out, "       {:12} ${:.2}", date, tx.amount)?;
            }
        }
    }

    writeln!(
        out,
        "   ─────────────────────────────────────────────────────────────"
    )?;
    writeln!(
        out,
        "   💰 Total: ${:.2}/yr (${:.2}/mo)",
        analysis.total_annual_cost,
        analysis.monthly_cost()
    )?;

    Ok(())
}
