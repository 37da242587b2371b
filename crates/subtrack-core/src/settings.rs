//! Settings loading
//!
//! Settings come from up to two TOML layers:
//! 1. Embedded defaults (`config/default.toml`, compiled into the binary)
//! 2. One override file: an explicit path, or
//!    `<config dir>/subtrack/subtrack.toml` when it exists
//!
//! Scalar keys in the override replace the defaults. Catalog lists
//! (`services.known`, `statement_merchants`, `cancel_links`) are appended to
//! the built-in lists, so an override can add services without repeating
//! the whole table.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::debug;

use crate::catalog::{Catalog, RawMerchantRule};
use crate::detect::{CadenceWindow, DetectionConfig};
use crate::error::{Error, Result};
use crate::import::ImportConfig;
use crate::models::CancelLink;

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Everything the pipeline is tuned by
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub detection: DetectionConfig,
    pub import: ImportConfig,
    pub catalog: Catalog,
    /// Override file that was applied on top of the defaults, if any
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Load defaults plus the override layer
    ///
    /// An explicit path must exist. Without one, the user config file is
    /// applied only when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = Self::builtin().clone();

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(path) = path {
            debug!("Applying config override from {}", path.display());
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            settings.apply(&content)?;
            settings.source = Some(path);
        }

        Ok(settings)
    }

    /// Parse a single TOML layer on top of the hardcoded defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut settings = Self::default();
        settings.apply(content)?;
        Ok(settings)
    }

    /// Embedded defaults, parsed once
    pub fn builtin() -> &'static Settings {
        static BUILTIN: OnceLock<Settings> = OnceLock::new();
        BUILTIN.get_or_init(|| Self::from_toml(DEFAULT_CONFIG).expect("valid embedded config"))
    }

    fn apply(&mut self, content: &str) -> Result<()> {
        let raw: RawSettings = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(detection) = raw.detection {
            detection.apply_to(&mut self.detection);
        }
        if let Some(import) = raw.import {
            import.apply_to(&mut self.import);
        }

        let known = raw.services.and_then(|s| s.known).unwrap_or_default();
        let rules = raw.statement_merchants.unwrap_or_default();
        let links = raw.cancel_links.unwrap_or_default();
        debug!(
            "Catalog layer: {} known services, {} statement merchants, {} cancel links",
            known.len(),
            rules.len(),
            links.len()
        );
        self.catalog.extend(Catalog::new(known, links, &rules)?);

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("subtrack").join("subtrack.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    detection: Option<RawDetection>,
    import: Option<RawImport>,
    services: Option<RawServices>,
    statement_merchants: Option<Vec<RawMerchantRule>>,
    cancel_links: Option<Vec<CancelLink>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDetection {
    min_average_amount: Option<f64>,
    max_average_amount: Option<f64>,
    amount_tolerance: Option<f64>,
    min_confidence: Option<f64>,
    known_service_boost: Option<f64>,
    max_confidence: Option<f64>,
    no_gap_confidence: Option<f64>,
    irregular_confidence: Option<f64>,
    group_key_tokens: Option<usize>,
    default_year: Option<i32>,
    monthly: Option<RawWindow>,
    quarterly: Option<RawWindow>,
    annual: Option<RawWindow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWindow {
    min_gap_days: Option<f64>,
    max_gap_days: Option<f64>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawImport {
    sniff_rows: Option<usize>,
    sniff_min_hits: Option<usize>,
    merchant_min_text: Option<usize>,
    infer_merchant_from_row: Option<bool>,
    keyword_min_amount: Option<f64>,
    keyword_max_amount: Option<f64>,
    keyword_window: Option<usize>,
    fallback_max_amount: Option<f64>,
    admin_keywords: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServices {
    known: Option<Vec<String>>,
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl RawDetection {
    fn apply_to(self, config: &mut DetectionConfig) {
        set(&mut config.min_average_amount, self.min_average_amount);
        set(&mut config.max_average_amount, self.max_average_amount);
        set(&mut config.amount_tolerance, self.amount_tolerance);
        set(&mut config.min_confidence, self.min_confidence);
        set(&mut config.known_service_boost, self.known_service_boost);
        set(&mut config.max_confidence, self.max_confidence);
        set(&mut config.no_gap_confidence, self.no_gap_confidence);
        set(&mut config.irregular_confidence, self.irregular_confidence);

        // 0 tokens means "no truncation"
        if let Some(tokens) = self.group_key_tokens {
            config.group_key_tokens = (tokens > 0).then_some(tokens);
        }
        if let Some(year) = self.default_year {
            config.default_year = Some(year);
        }

        if let Some(window) = self.monthly {
            window.apply_to(&mut config.monthly);
        }
        if let Some(window) = self.quarterly {
            window.apply_to(&mut config.quarterly);
        }
        if let Some(window) = self.annual {
            window.apply_to(&mut config.annual);
        }
    }
}

impl RawWindow {
    fn apply_to(self, window: &mut CadenceWindow) {
        set(&mut window.min_gap_days, self.min_gap_days);
        set(&mut window.max_gap_days, self.max_gap_days);
        set(&mut window.confidence, self.confidence);
    }
}

impl RawImport {
    fn apply_to(self, config: &mut ImportConfig) {
        set(&mut config.sniff_rows, self.sniff_rows);
        set(&mut config.sniff_min_hits, self.sniff_min_hits);
        set(&mut config.merchant_min_text, self.merchant_min_text);
        set(&mut config.infer_merchant_from_row, self.infer_merchant_from_row);
        set(&mut config.keyword_min_amount, self.keyword_min_amount);
        set(&mut config.keyword_max_amount, self.keyword_max_amount);
        set(&mut config.keyword_window, self.keyword_window);
        set(&mut config.fallback_max_amount, self.fallback_max_amount);
        if let Some(keywords) = self.admin_keywords {
            config.admin_keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        }
    }
}
