//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Subtrack - Find the subscriptions hiding in your bank statements
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(about = "Detect recurring subscriptions in bank and card statements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to ~/.config/subtrack/subtrack.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan statements and report recurring subscriptions
    Scan {
        /// Statement files (.csv exports, .pdf statements, or extracted .txt)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List every charge behind each subscription (table format)
        #[arg(long)]
        all: bool,
    },

    /// Show the transactions extracted from one statement
    ///
    /// Useful for checking how an unfamiliar bank layout is read.
    Parse {
        /// Statement file
        file: PathBuf,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Print transactions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how to cancel a subscription
    Cancel {
        /// Merchant name as it appears on the statement
        merchant: String,
    },

    /// Inspect settings (path, show)
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the settings override path
    Path,
    /// Print the effective settings
    Show,
}
