//! Static service tables
//!
//! Three read-only lookups that detection and presentation consult:
//! - known subscription name fragments (evidence override + confidence boost)
//! - cancel links for well-known services
//! - statement merchant rules used to spot services in PDF text
//!
//! Built once from settings and shared; nothing here mutates after load.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::Result;
use crate::merchant::normalize;
use crate::models::{CancelAction, CancelLink};

/// Raw statement merchant rule as written in settings
#[derive(Debug, Clone, Deserialize)]
pub struct RawMerchantRule {
    /// Case-insensitive regex (a plain name works as a substring match)
    pub pattern: String,
    /// Canonical display name for matches
    pub name: String,
}

/// Compiled statement merchant rule
#[derive(Debug, Clone)]
pub struct MerchantRule {
    pub name: String,
    pattern: Regex,
}

impl MerchantRule {
    pub fn new(pattern: &str, name: impl Into<String>) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            name: name.into(),
            pattern,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.pattern
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    known_services: Vec<String>,
    cancel_links: Vec<CancelLink>,
    statement_merchants: Vec<MerchantRule>,
}

impl Catalog {
    pub fn new(
        known_services: Vec<String>,
        cancel_links: Vec<CancelLink>,
        rules: &[RawMerchantRule],
    ) -> Result<Self> {
        let statement_merchants = rules
            .iter()
            .map(|r| MerchantRule::new(&r.pattern, r.name.clone()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            known_services: known_services.iter().map(|s| normalize(s)).collect(),
            cancel_links: cancel_links
                .into_iter()
                .map(|link| CancelLink {
                    merchant: normalize(&link.merchant),
                    ..link
                })
                .collect(),
            statement_merchants,
        })
    }

    /// Append another catalog's entries after this one's
    pub fn extend(&mut self, other: Catalog) {
        self.known_services.extend(other.known_services);
        self.cancel_links.extend(other.cancel_links);
        self.statement_merchants.extend(other.statement_merchants);
    }

    /// True if a merchant key contains any known subscription fragment
    pub fn is_known_service(&self, key: &str) -> bool {
        let key = normalize(key);
        self.known_services
            .iter()
            .any(|fragment| !fragment.is_empty() && key.contains(fragment.as_str()))
    }

    /// Cancel link for a merchant, first table entry wins
    pub fn lookup(&self, merchant: &str) -> Option<&CancelLink> {
        let normalized = normalize(merchant);
        self.cancel_links
            .iter()
            .find(|link| !link.merchant.is_empty() && normalized.contains(&link.merchant))
    }

    /// Cancel link if known, otherwise a search suggestion
    pub fn cancel_action(&self, merchant: &str) -> CancelAction {
        match self.lookup(merchant) {
            Some(link) => CancelAction::Link(link.clone()),
            None => CancelAction::Search {
                query: format!("{} cancel subscription", merchant.trim()),
            },
        }
    }

    pub fn known_services(&self) -> &[String] {
        &self.known_services
    }

    pub fn cancel_links(&self) -> &[CancelLink] {
        &self.cancel_links
    }

    pub fn statement_merchants(&self) -> &[MerchantRule] {
        &self.statement_merchants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(
            vec!["netflix".into(), "hello fresh".into(), "Disney+".into()],
            vec![
                CancelLink {
                    merchant: "amazon prime".into(),
                    url: "https://www.amazon.com/mc".into(),
                    instructions: None,
                },
                CancelLink {
                    merchant: "netflix".into(),
                    url: "https://www.netflix.com/cancelplan".into(),
                    instructions: Some("Sign in and click Cancel Membership".into()),
                },
            ],
            &[RawMerchantRule {
                pattern: r"disney\s*(\+|plus)".into(),
                name: "Disney+".into(),
            }],
        )
        .unwrap()
    }

    #[test]
    fn test_is_known_service() {
        let catalog = sample();
        assert!(catalog.is_known_service("netflix com"));
        assert!(catalog.is_known_service("NETFLIX.COM"));
        assert!(catalog.is_known_service("hello fresh meals"));
        assert!(catalog.is_known_service("disney plus"));
        assert!(!catalog.is_known_service("corner bakery"));
    }

    #[test]
    fn test_lookup() {
        let catalog = sample();
        let link = catalog.lookup("NETFLIX.COM 866-579-7172").unwrap();
        assert_eq!(link.url, "https://www.netflix.com/cancelplan");
        assert!(catalog.lookup("Amazon Prime*1A2B3").is_some());
        assert!(catalog.lookup("AMAZON MKTPLACE").is_none());
    }

    #[test]
    fn test_cancel_action_search_fallback() {
        let catalog = sample();
        assert_eq!(
            catalog.cancel_action(" PLANET FITNESS "),
            CancelAction::Search {
                query: "PLANET FITNESS cancel subscription".into()
            }
        );
        assert!(catalog.cancel_action("netflix").url().is_some());
    }

    #[test]
    fn test_rule_is_case_insensitive() {
        let catalog = sample();
        let rule = &catalog.statement_merchants()[0];
        assert!(rule.regex().is_match("DISNEY PLUS 800-123"));
        assert!(rule.regex().is_match("disney+"));
    }

    #[test]
    fn test_invalid_rule_is_an_error() {
        let result = Catalog::new(
            vec![],
            vec![],
            &[RawMerchantRule {
                pattern: "(unclosed".into(),
                name: "Broken".into(),
            }],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_extend_keeps_builtin_first() {
        let mut catalog = sample();
        let extra = Catalog::new(
            vec!["planet fitness".into()],
            vec![CancelLink {
                merchant: "netflix".into(),
                url: "https://example.com/other".into(),
                instructions: None,
            }],
            &[],
        )
        .unwrap();
        catalog.extend(extra);

        assert!(catalog.is_known_service("PLANET FITNESS #1"));
        assert_eq!(
            catalog.lookup("netflix").unwrap().url,
            "https://www.netflix.com/cancelplan"
        );
    }
}
