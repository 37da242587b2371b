//! Statement date tokens
//!
//! Parsers keep dates as the raw token they found; only the detector needs a
//! calendar date, to measure the gap between two charges.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Full-token shapes accepted as a date column value
fn date_shapes() -> &'static [Regex; 3] {
    static RE: OnceLock<[Regex; 3]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"^\d{1,2}/\d{1,2}/\d{2,4}$").expect("valid regex"),
            Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"),
            Regex::new(r"^\d{1,2}-\d{1,2}-\d{2,4}$").expect("valid regex"),
        ]
    })
}

fn month_first() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[/-](\d{1,2})(?:[/-](\d{2}|\d{4}))?$").expect("valid regex")
    })
}

fn year_first() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid regex"))
}

/// True if the cell looks like a full date (`1/15/2024`, `2024-01-15`, `01-15-24`)
pub fn is_date(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && date_shapes().iter().any(|re| re.is_match(s))
}

/// Resolve a raw date token to a calendar date
///
/// Month-first tokens (`M/D/YYYY`, `M/D/YY`, `M-D-YYYY`) and ISO dates are
/// accepted. Yearless tokens (`M/D`, `M-D`) as printed on many PDF statements
/// take `default_year`. Two-digit years are 20xx.
pub fn resolve_date(s: &str, default_year: i32) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = year_first().captures(s) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let caps = month_first().captures(s)?;
    let month = caps[1].parse().ok()?;
    let day = caps[2].parse().ok()?;
    let year = match caps.get(3) {
        Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().ok()?,
        Some(y) => y.as_str().parse().ok()?,
        None => default_year,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_is_date() {
        assert!(is_date("1/15/2024"));
        assert!(is_date("01/15/24"));
        assert!(is_date("2024-01-15"));
        assert!(is_date("1-15-2024"));
        assert!(!is_date(""));
        assert!(!is_date("01/15"));
        assert!(!is_date("15.99"));
        assert!(!is_date("NETFLIX"));
    }

    #[test]
    fn test_resolve_date_formats() {
        assert_eq!(resolve_date("01/15/2024", 2000), Some(ymd(2024, 1, 15)));
        assert_eq!(resolve_date("1/5/24", 2000), Some(ymd(2024, 1, 5)));
        assert_eq!(resolve_date("2024-03-01", 2000), Some(ymd(2024, 3, 1)));
        assert_eq!(resolve_date("12-31-2023", 2000), Some(ymd(2023, 12, 31)));
    }

    #[test]
    fn test_resolve_yearless_uses_default_year() {
        assert_eq!(resolve_date("03/14", 2025), Some(ymd(2025, 3, 14)));
        assert_eq!(resolve_date("3-14", 2025), Some(ymd(2025, 3, 14)));
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert_eq!(resolve_date("", 2024), None);
        assert_eq!(resolve_date("13/45/2024", 2024), None);
        assert_eq!(resolve_date("1/15/202", 2024), None);
        assert_eq!(resolve_date("Jan 15", 2024), None);
    }
}
