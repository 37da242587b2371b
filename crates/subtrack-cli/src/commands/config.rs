//! Config command implementations

use std::path::Path;

use anyhow::Result;
use subtrack_core::settings::default_config_path;
use subtrack_core::{CadenceWindow, Settings};

pub fn cmd_config_path(explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    match path {
        Some(path) => {
            let state = if path.exists() { "found" } else { "not present" };
            println!("{} ({})", path.display(), state);
        }
        None => println!("No config directory on this platform; using built-in defaults"),
    }

    Ok(())
}

pub fn cmd_config_show(settings: &Settings) -> Result<()> {
    let d = &settings.detection;
    let i = &settings.import;

    println!();
    println!("⚙️  Settings");
    match &settings.source {
        Some(path) => println!("   Override: {}", path.display()),
        None => println!("   Override: none (built-in defaults)"),
    }

    println!();
    println!("   Detection");
    println!(
        "   Mean amount range:     ${:.2} - ${:.2}",
        d.min_average_amount, d.max_average_amount
    );
    println!(
        "   Amount tolerance:      {:.0}%",
        d.amount_tolerance * 100.0
    );
    println!("   Minimum confidence:    {:.2}", d.min_confidence);
    println!(
        "   Known-service boost:   +{:.2} (max {:.2})",
        d.known_service_boost, d.max_confidence
    );
    println!("   Monthly window:        {}", window(&d.monthly));
    println!("   Quarterly window:      {}", window(&d.quarterly));
    println!("   Annual window:         {}", window(&d.annual));
    println!(
        "   Irregular / no gap:    {:.2} / {:.2}",
        d.irregular_confidence, d.no_gap_confidence
    );
    println!(
        "   Grouping key tokens:   {}",
        d.group_key_tokens
            .map(|n| n.to_string())
            .unwrap_or_else(|| "all".to_string())
    );
    println!(
        "   Yearless dates:        {}",
        d.default_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "current year".to_string())
    );

    println!();
    println!("   Import");
    println!(
        "   Column sniffing:       {} rows, {} hits, {} chars of text",
        i.sniff_rows, i.sniff_min_hits, i.merchant_min_text
    );
    println!(
        "   Known-service amounts: ${:.2} - ${:.2} within {} chars",
        i.keyword_min_amount, i.keyword_max_amount, i.keyword_window
    );
    println!("   Fallback ceiling:      ${:.2}", i.fallback_max_amount);
    println!(
        "   Row merchant fallback: {}",
        if i.infer_merchant_from_row { "on" } else { "off" }
    );
    println!("   Admin keywords:        {}", i.admin_keywords.join(", "));

    println!();
    println!("   Catalog");
    println!(
        "   Known services:        {}",
        settings.catalog.known_services().len()
    );
    println!(
        "   Statement merchants:   {}",
        settings.catalog.statement_merchants().len()
    );
    println!(
        "   Cancel links:          {}",
        settings.catalog.cancel_links().len()
    );

    Ok(())
}

fn window(w: &CadenceWindow) -> String {
    format!(
        "{:.0}-{:.0} days → {:.2}",
        w.min_gap_days, w.max_gap_days, w.confidence
    )
}
