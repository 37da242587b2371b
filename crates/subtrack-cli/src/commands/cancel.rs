//! Cancel command implementation

use anyhow::{bail, Result};
use subtrack_core::{CancelAction, Settings};

pub fn cmd_cancel(settings: &Settings, merchant: &str) -> Result<()> {
    if merchant.trim().is_empty() {
        bail!("Merchant name is empty");
    }

    match settings.catalog.cancel_action(merchant) {
        CancelAction::Link(link) => {
            println!("🔗 Cancel {}: {}", merchant.trim(), link.url);
            if let Some(instructions) = &link.instructions {
                println!("   {}", instructions);
            }
        }
        CancelAction::Search { query } => {
            println!("No cancel page on file for {}.", merchant.trim());
            println!("   Search: \"{}\"", query);
        }
    }

    Ok(())
}
