//! Merchant name normalization
//!
//! Turns a raw statement description into a grouping key. The key is only
//! used for identity; display names always come from the raw description.

/// Canonicalize a raw merchant description
///
/// Lowercases, drops every character outside `[a-z0-9]` and whitespace,
/// collapses whitespace runs to one space and trims. Idempotent.
pub fn normalize(raw: &str) -> String {
    let kept: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grouping key for a merchant, optionally cut to its leading tokens
///
/// Truncation merges suffix variation such as store or order numbers
/// (`netflixcom 12345` and `netflixcom 67890` both become `netflixcom`
/// with `Some(1)`).
pub fn merchant_key(raw: &str, max_tokens: Option<usize>) -> String {
    let normalized = normalize(raw);
    match max_tokens {
        Some(n) if n > 0 => normalized
            .split(' ')
            .take(n)
            .collect::<Vec<_>>()
            .join(" "),
        _ => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("NETFLIX.COM"), "netflixcom");
        assert_eq!(normalize("  Spotify   USA  "), "spotify usa");
        assert_eq!(normalize("AMZN Mktp US*2K4"), "amzn mktp us2k4");
        assert_eq!(normalize("Café Nero #12"), "caf nero 12");
        assert_eq!(normalize("***"), "");
    }

    #[test]
    fn test_normalize_case_insensitive_and_idempotent() {
        let a = normalize("NETFLIX.COM");
        let b = normalize("netflix.com");
        let c = normalize(&normalize("Netflix.Com"));
        assert_eq!(a, b);
        assert_eq!(b, c);

        for raw in ["HULU  *  LLC", "Apple.com/Bill\tCA", "7-ELEVEN 1234"] {
            assert_eq!(normalize(&normalize(raw)), normalize(raw));
        }
    }

    #[test]
    fn test_merchant_key_truncation() {
        assert_eq!(merchant_key("NETFLIX.COM 12345", None), "netflixcom 12345");
        assert_eq!(merchant_key("NETFLIX.COM 12345", Some(1)), "netflixcom");
        assert_eq!(
            merchant_key("SQ *BLUE BOTTLE COFFEE 0042", Some(3)),
            "sq blue bottle"
        );
        assert_eq!(merchant_key("SPOTIFY", Some(3)), "spotify");
        assert_eq!(merchant_key("SPOTIFY USA", Some(0)), "spotify usa");
    }
}
