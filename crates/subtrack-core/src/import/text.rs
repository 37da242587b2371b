//! Free-form statement text (PDF extraction output)
//!
//! Text extraction loses column alignment, so no single pattern recovers every
//! row. Three independent passes run over the same text and their results are
//! concatenated:
//!
//! 1. dated lines ending in one or two amounts (amount + running balance)
//! 2. known service names from the catalog, paired with the next nearby amount
//! 3. a loose "short description followed by an amount" fallback
//!
//! Passes overlap and may report the same charge twice. Detection averages
//! and consistency checks absorb that, so nothing is deduplicated here.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::ImportConfig;
use crate::catalog::Catalog;
use crate::models::Transaction;
use crate::money::parse_amount;

const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

fn dated_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?)\s+(.+?)\s+(-?\$?\d[\d,]*\.\d{2})(?:\s+-?\$?\d[\d,]*\.\d{2})?\s*$",
        )
        .expect("valid regex")
    })
}

fn nearby_amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$?(\d{1,3}(?:,\d{3})*\.\d{2}|\d+\.\d{2})\b").expect("valid regex")
    })
}

fn date_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?\b").expect("valid regex")
    })
}

fn description_amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:(\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?)[ \t]+)?\b([A-Za-z][\w&'.*#/-]*(?:[ \t]+[\w&'.*#/-]+){0,5}?)[ \t]+\$?(\d{1,3}(?:,\d{3})*\.\d{2}|\d+\.\d{2})\s+\d",
        )
        .expect("valid regex")
    })
}

fn admin_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?:pos\s+debit\s*-?\s*debit\s+card\s*[#x*]*\d{4}\s*|pos\s+(?:purchase|debit)\s*-?\s*|debit\s+card\s+(?:purchase|debit)\s*-?\s*(?:[#x*]*\d{4}\s*)?|recurring\s+(?:payment|debit|charge)\s*-?\s*|ach\s+debit\s*-?\s*|purchase\s+authorized\s+on\s+\d{1,2}/\d{1,2}\s*)",
        )
        .expect("valid regex")
    })
}

fn card_fragment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:\bcard\s*)?(?:#\s*|x{2,}|\*{2,})\d{4}\b|\bcard\s+\d{4}\b")
            .expect("valid regex")
    })
}

fn phone_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\+?1[\s.-]?)?(?:\(\d{3}\)\s?|\b\d{3}[\s.-]?)\d{3}[\s.-]?\d{4}\b")
            .expect("valid regex")
    })
}

/// Parse statement text with default settings
pub fn parse_statement_text(text: &str, catalog: &Catalog) -> Vec<Transaction> {
    parse_with(text, &ImportConfig::default(), catalog)
}

/// Parse statement text, running every extraction pass
pub fn parse_with(text: &str, config: &ImportConfig, catalog: &Catalog) -> Vec<Transaction> {
    let mut transactions = scan_dated_lines(text, config);
    let line_hits = transactions.len();

    let known = scan_known_services(text, config, catalog);
    let known_hits = known.len();
    transactions.extend(known);

    let fallback = scan_description_amounts(text, config);
    let fallback_hits = fallback.len();
    transactions.extend(fallback);

    debug!(
        "Statement text: {} dated lines, {} known services, {} fallback matches",
        line_hits, known_hits, fallback_hits
    );
    transactions
}

/// Pass 1: `DATE description AMOUNT [BALANCE]` lines
fn scan_dated_lines(text: &str, config: &ImportConfig) -> Vec<Transaction> {
    let mut out = Vec::new();

    for line in text.lines() {
        if config.is_administrative(line) {
            continue;
        }
        let Some(caps) = dated_line().captures(line) else {
            continue;
        };

        let amount = parse_amount(&caps[3]);
        if amount <= 0.0 {
            continue;
        }

        // A second leading date is the posting date; the first one wins
        let description = caps[2].trim();
        let description = match description.split_once(char::is_whitespace) {
            Some((first, rest)) if is_date_token(first) => rest,
            _ => description,
        };

        let merchant = clean_merchant(description);
        if merchant.is_empty() {
            continue;
        }
        out.push(Transaction::new(&caps[1], merchant, amount));
    }

    out
}

/// Pass 2: known service names followed by an amount within the window
fn scan_known_services(text: &str, config: &ImportConfig, catalog: &Catalog) -> Vec<Transaction> {
    let mut out = Vec::new();

    for rule in catalog.statement_merchants() {
        for found in rule.regex().find_iter(text) {
            let end = floor_char_boundary(text, found.end() + config.keyword_window);
            let window = &text[found.end()..end];

            let Some(caps) = nearby_amount().captures(window) else {
                continue;
            };
            let amount = parse_amount(&caps[1]);
            if amount < config.keyword_min_amount || amount > config.keyword_max_amount {
                continue;
            }

            let line_start = text[..found.start()].rfind('\n').map_or(0, |i| i + 1);
            let date = date_token()
                .find_iter(&text[line_start..found.start()])
                .last()
                .map_or("", |m| m.as_str());

            out.push(Transaction::new(date, rule.name.clone(), amount));
            break;
        }
    }

    out
}

/// Pass 3: loose `description AMOUNT` runs followed by another number
fn scan_description_amounts(text: &str, config: &ImportConfig) -> Vec<Transaction> {
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(caps) = description_amount().captures_at(text, pos) else {
            break;
        };
        let (Some(description), Some(amount_match)) = (caps.get(2), caps.get(3)) else {
            break;
        };
        pos = amount_match.end();

        let amount = parse_amount(amount_match.as_str());
        if amount <= 0.0 || amount > config.fallback_max_amount {
            continue;
        }

        let mut date = caps.get(1).map_or("", |m| m.as_str());
        let mut description = description.as_str();
        if let Some(inner) = date_token().find_iter(description).last() {
            date = inner.as_str();
            description = &description[inner.end()..];
        }

        if config.is_administrative(description) {
            continue;
        }

        let merchant = clean_merchant(description);
        if merchant.is_empty() {
            continue;
        }
        out.push(Transaction::new(date, merchant, amount));
    }

    out
}

fn is_date_token(s: &str) -> bool {
    date_token().find(s).is_some_and(|m| m.as_str() == s)
}

/// Strip statement noise from a raw description
///
/// Removes bank prefixes ("POS Debit- Debit Card 1234"), masked card numbers,
/// phone numbers, and a trailing US state code when other text remains.
pub fn clean_merchant(raw: &str) -> String {
    let stripped = admin_prefix().replace(raw, "");
    let stripped = card_fragment().replace_all(&stripped, " ");
    let stripped = phone_number().replace_all(&stripped, " ");

    let mut tokens: Vec<&str> = stripped.split_whitespace().collect();
    if tokens.len() > 1 && tokens.last().is_some_and(|t| US_STATES.contains(t)) {
        tokens.pop();
    }

    tokens
        .join(" ")
        .trim_end_matches(|c: char| c == '-' || c == '*' || c.is_whitespace())
        .to_string()
}

/// Largest char boundary at or below `index`, clamped to the text length
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
