//! Recurring charge detection
//!
//! Groups transactions by merchant key and decides which groups are
//! subscriptions. Filters run cheapest first:
//! 1. mean amount inside the plausible range
//! 2. enough evidence (two charges, or a known service)
//! 3. cadence from the mean day gap (monthly, quarterly, annual)
//! 4. every charge close to the mean
//! 5. known-service boost, then the minimum confidence cutoff
//!
//! Amount consistency is checked after cadence on purpose: a regular bill
//! with a drifting price (utilities) is still not a subscription.

use chrono::{Datelike, NaiveDate, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::dates::resolve_date;
use crate::merchant::merchant_key;
use crate::models::{Frequency, FrequencyEstimate, Subscription, Transaction};

/// Mean-gap window that identifies one billing cadence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceWindow {
    pub min_gap_days: f64,
    pub max_gap_days: f64,
    /// Confidence assigned when the mean gap falls inside the window
    pub confidence: f64,
}

impl CadenceWindow {
    pub fn contains(&self, gap_days: f64) -> bool {
        gap_days >= self.min_gap_days && gap_days <= self.max_gap_days
    }
}

/// Detection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Groups whose mean charge is below this are dropped
    pub min_average_amount: f64,
    /// Groups whose mean charge is above this are dropped
    pub max_average_amount: f64,
    /// Allowed deviation of any charge from the mean (0.20 = 20%)
    pub amount_tolerance: f64,
    /// Minimum final confidence to report a subscription
    pub min_confidence: f64,
    /// Added to the confidence of known services
    pub known_service_boost: f64,
    /// Cap applied together with the known-service boost
    pub max_confidence: f64,
    /// Confidence when no usable day gap exists
    pub no_gap_confidence: f64,
    /// Confidence when the mean gap matches no cadence
    pub irregular_confidence: f64,
    pub monthly: CadenceWindow,
    pub quarterly: CadenceWindow,
    pub annual: CadenceWindow,
    /// Truncate grouping keys to their first N tokens
    pub group_key_tokens: Option<usize>,
    /// Year for yearless dates; current year when unset
    pub default_year: Option<i32>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_average_amount: 1.0,
            max_average_amount: 500.0,
            amount_tolerance: 0.20,
            min_confidence: 0.3,
            known_service_boost: 0.2,
            max_confidence: 0.95,
            no_gap_confidence: 0.3,
            irregular_confidence: 0.4,
            monthly: CadenceWindow {
                min_gap_days: 25.0,
                max_gap_days: 35.0,
                confidence: 0.9,
            },
            quarterly: CadenceWindow {
                min_gap_days: 80.0,
                max_gap_days: 100.0,
                confidence: 0.85,
            },
            annual: CadenceWindow {
                min_gap_days: 340.0,
                max_gap_days: 380.0,
                confidence: 0.85,
            },
            group_key_tokens: None,
            default_year: None,
        }
    }
}

impl DetectionConfig {
    fn reference_year(&self) -> i32 {
        self.default_year.unwrap_or_else(|| Utc::now().year())
    }
}

/// Why groups were kept or dropped during one detection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionStats {
    pub merchant_groups: usize,
    pub amount_out_of_range: usize,
    pub insufficient_evidence: usize,
    pub inconsistent_amounts: usize,
    pub low_confidence: usize,
    pub subscriptions_found: usize,
}

/// All transactions sharing one merchant key, in encounter order
#[derive(Debug)]
struct MerchantGroup<'t> {
    key: String,
    transactions: Vec<&'t Transaction>,
}

impl MerchantGroup<'_> {
    fn amounts(&self) -> impl Iterator<Item = f64> + '_ {
        self.transactions.iter().map(|t| t.amount)
    }

    fn average_amount(&self) -> f64 {
        self.amounts().sum::<f64>() / self.transactions.len() as f64
    }

    fn max_deviation(&self, mean: f64) -> f64 {
        self.amounts().map(|a| (a - mean).abs()).fold(0.0, f64::max)
    }
}

/// Recurring charge detector
pub struct SubscriptionDetector<'a> {
    catalog: &'a Catalog,
    config: DetectionConfig,
}

impl<'a> SubscriptionDetector<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(catalog: &'a Catalog, config: DetectionConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect subscriptions, sorted by annual cost (highest first)
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<Subscription> {
        self.detect_with_stats(transactions).0
    }

    /// Detect subscriptions and report how each merchant group was handled
    pub fn detect_with_stats(
        &self,
        transactions: &[Transaction],
    ) -> (Vec<Subscription>, DetectionStats) {
        let groups = self.group_by_merchant(transactions);
        let mut stats = DetectionStats {
            merchant_groups: groups.len(),
            ..Default::default()
        };

        let mut subscriptions = Vec::new();

        for group in groups {
            let avg_amount = group.average_amount();

            if avg_amount < self.config.min_average_amount
                || avg_amount > self.config.max_average_amount
            {
                debug!("Skipping {} - mean ${:.2} out of range", group.key, avg_amount);
                stats.amount_out_of_range += 1;
                continue;
            }

            let known = self.catalog.is_known_service(&group.key);
            if group.transactions.len() < 2 && !known {
                debug!("Skipping {} - single charge, unknown service", group.key);
                stats.insufficient_evidence += 1;
                continue;
            }

            let estimate = self.detect_frequency(&group.transactions);

            let max_dev = group.max_deviation(avg_amount);
            if max_dev > avg_amount * self.config.amount_tolerance {
                debug!(
                    "Skipping {} - amounts drift ${:.2} from mean ${:.2}",
                    group.key, max_dev, avg_amount
                );
                stats.inconsistent_amounts += 1;
                continue;
            }

            let confidence = if known {
                (estimate.confidence + self.config.known_service_boost)
                    .min(self.config.max_confidence)
            } else {
                estimate.confidence
            };

            if confidence < self.config.min_confidence {
                debug!(
                    "Skipping {} - confidence {:.2} below cutoff",
                    group.key, confidence
                );
                stats.low_confidence += 1;
                continue;
            }

            let Some(first) = group.transactions.first() else {
                continue;
            };

            debug!(
                "Found subscription: {} @ ${:.2}/{} (confidence {:.2})",
                group.key, avg_amount, estimate.frequency, confidence
            );

            subscriptions.push(Subscription {
                merchant: first.merchant.clone(),
                amount: avg_amount,
                frequency: estimate.frequency,
                annual_cost: estimate.frequency.annualize(avg_amount),
                confidence,
                transactions: group.transactions.iter().map(|t| (*t).clone()).collect(),
            });
        }

        // Stable sort: ties keep first-encounter order
        subscriptions.sort_by(|a, b| b.annual_cost.total_cmp(&a.annual_cost));
        stats.subscriptions_found = subscriptions.len();

        info!(
            "Detection complete: {} subscriptions from {} merchants ({} out of range, {} single unknown, {} inconsistent, {} low confidence)",
            stats.subscriptions_found,
            stats.merchant_groups,
            stats.amount_out_of_range,
            stats.insufficient_evidence,
            stats.inconsistent_amounts,
            stats.low_confidence
        );

        (subscriptions, stats)
    }

    /// Infer billing cadence from the day gaps between charges
    ///
    /// Charges are ordered by resolved date; unresolvable dates sort last and
    /// contribute no gap, and same-day repeats are ignored. Without any usable
    /// gap the result is a weak monthly guess.
    pub fn detect_frequency(&self, transactions: &[&Transaction]) -> FrequencyEstimate {
        let year = self.config.reference_year();
        let mut dates: Vec<NaiveDate> = transactions
            .iter()
            .filter_map(|t| resolve_date(&t.date, year))
            .collect();
        dates.sort();

        let gaps: Vec<i64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .filter(|&days| days > 0)
            .collect();

        if gaps.is_empty() {
            return FrequencyEstimate {
                frequency: Frequency::Monthly,
                confidence: self.config.no_gap_confidence,
            };
        }

        let avg_gap = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

        let cadences = [
            (Frequency::Monthly, self.config.monthly),
            (Frequency::Quarterly, self.config.quarterly),
            (Frequency::Annual, self.config.annual),
        ];

        cadences
            .iter()
            .find(|(_, window)| window.contains(avg_gap))
            .map(|(frequency, window)| FrequencyEstimate {
                frequency: *frequency,
                confidence: window.confidence,
            })
            .unwrap_or(FrequencyEstimate {
                frequency: Frequency::Monthly,
                confidence: self.config.irregular_confidence,
            })
    }

    /// Group transactions by merchant key, keeping first-encounter order
    fn group_by_merchant<'t>(&self, transactions: &'t [Transaction]) -> Vec<MerchantGroup<'t>> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<MerchantGroup<'t>> = Vec::new();

        for tx in transactions {
            let key = merchant_key(&tx.merchant, self.config.group_key_tokens);
            match index.get(&key) {
                Some(&i) => groups[i].transactions.push(tx),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(MerchantGroup {
                        key,
                        transactions: vec![tx],
                    });
                }
            }
        }

        groups
    }
}

/// Sum of annual costs across subscriptions
pub fn calculate_total_annual_cost(subscriptions: &[Subscription]) -> f64 {
    subscriptions.iter().map(|s| s.annual_cost).sum()
}
