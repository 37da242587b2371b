//! CLI command implementations
//!
//! Commands are organized by task:
//! - `scan` - Full pipeline over one or more statements, plus report output
//! - `parse` - Extracted transactions for a single statement
//! - `cancel` - Cancel link lookup
//! - `config` - Settings path and effective values

pub mod cancel;
pub mod config;
pub mod parse;
pub mod scan;

// Re-export command functions for main.rs
pub use cancel::*;
pub use config::*;
pub use parse::*;
pub use scan::*;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use subtrack_core::{default_extractor, Settings, Statement};
use tracing::info;

/// Load settings, layering the override file over the built-in defaults
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    Settings::load(config).context("Failed to load settings")
}

/// Read one statement file, extracting text from PDFs
pub fn read_statement(path: &Path) -> Result<Statement> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read statement: {}", path.display()))?;

    let extractor = default_extractor();
    let statement = Statement::from_bytes(path, &bytes, extractor.as_ref())
        .with_context(|| format!("Failed to read statement: {}", path.display()))?;

    info!(
        "Read {} as {} ({} bytes)",
        path.display(),
        statement.kind,
        bytes.len()
    );
    Ok(statement)
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
