//! Subtrack CLI - Recurring subscription finder
//!
//! Usage:
//!   subtrack scan statement.csv         Detect subscriptions
//!   subtrack scan jan.pdf feb.pdf       Merge several statements
//!   subtrack parse statement.csv        Show extracted transactions
//!   subtrack cancel "NETFLIX.COM"       Find the cancel page

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so JSON/CSV reports on stdout stay clean
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Scan {
            files,
            format,
            output,
            all,
        } => {
            let settings = commands::load_settings(config)?;
            commands::cmd_scan(&settings, &files, &format, output.as_deref(), all)
        }
        Commands::Parse { file, limit, json } => {
            let settings = commands::load_settings(config)?;
            commands::cmd_parse(&settings, &file, limit, json)
        }
        Commands::Cancel { merchant } => {
            let settings = commands::load_settings(config)?;
            commands::cmd_cancel(&settings, &merchant)
        }
        Commands::Config { action } => match action {
            Some(ConfigAction::Path) => commands::cmd_config_path(config),
            None | Some(ConfigAction::Show) => {
                let settings = commands::load_settings(config)?;
                commands::cmd_config_show(&settings)
            }
        },
    }
}
