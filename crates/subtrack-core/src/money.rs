//! Currency string helpers
//!
//! Statement amounts show up as `$1,234.56`, `-15.99`, `(100.00)` or with a
//! stray currency symbol. Everything here is total: a string that does not
//! hold a usable number yields `0.0` (or `false`) instead of an error.

use regex::Regex;
use std::sync::OnceLock;

fn money_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+\.?\d*$").expect("valid regex"))
}

fn leading_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)").expect("valid regex"))
}

/// Drop currency symbols, thousands separators and whitespace
fn strip_currency(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',') && !c.is_whitespace())
        .collect()
}

/// True if the cell looks like a plain monetary value (`$12.34`, `-5`, `1,200.00`)
pub fn is_money(s: &str) -> bool {
    if s.trim().is_empty() {
        return false;
    }
    money_shape().is_match(&strip_currency(s))
}

/// Parse a currency string into a positive magnitude
///
/// Sign is discarded, accounting-style parentheses are accepted, and any
/// trailing text after the leading number is ignored. Returns `0.0` when no
/// number can be read, which callers treat as "no usable amount".
pub fn parse_amount(s: &str) -> f64 {
    let cleaned = strip_currency(s);
    let cleaned = cleaned.trim_start_matches('(').trim_end_matches(')');

    leading_number()
        .find(cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(f64::abs)
        .unwrap_or(0.0)
}

/// Round a currency value to whole cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
