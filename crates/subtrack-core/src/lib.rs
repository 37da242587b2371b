//! Subtrack Core Library
//!
//! Finds recurring subscriptions in bank and credit card statements:
//! - Delimited export parser that adapts to arbitrary bank column layouts
//! - Free-form statement text parser (PDF extraction output)
//! - Merchant normalization for grouping
//! - Recurrence detection from day gaps and amount consistency
//! - Service catalog with cancel links
//! - Layered TOML settings
//! - JSON and CSV export of results

pub mod analysis;
pub mod catalog;
pub mod dates;
pub mod detect;
pub mod error;
pub mod export;
pub mod extract;
pub mod import;
pub mod merchant;
pub mod models;
pub mod money;
pub mod settings;

pub use analysis::{analyze, analyze_transactions, detect_subscriptions, Analysis, Statement};
pub use catalog::{Catalog, MerchantRule, RawMerchantRule};
pub use detect::{
    calculate_total_annual_cost, CadenceWindow, DetectionConfig, DetectionStats,
    SubscriptionDetector,
};
pub use error::{Error, Result};
pub use export::ExportFormat;
#[cfg(feature = "pdf")]
pub use extract::PdfTextExtractor;
pub use extract::{default_extractor, TextExtractor, UnsupportedExtractor};
pub use import::{parse_csv_universal, parse_statement, parse_statement_text, ImportConfig};
pub use merchant::normalize;
pub use models::{
    CancelAction, CancelLink, Frequency, FrequencyEstimate, StatementKind, Subscription,
    Transaction,
};
pub use settings::Settings;
