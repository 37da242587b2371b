//! Delimited statement exports with unknown column layouts
//!
//! Every bank names its columns differently (`Transaction Date`, `Posted`,
//! `Payee`, `Debit`...). Columns are resolved by header name first, then by
//! sniffing the content of the first data rows for whatever is still missing.

use tracing::debug;

use super::ImportConfig;
use crate::dates::is_date;
use crate::models::Transaction;
use crate::money::{is_money, parse_amount};

/// A column needs fewer than this many date/money hits to count as free text
const SNIFF_NOISE_LIMIT: usize = 2;

const DATE_HEADERS: &[&str] = &["date", "posted"];
const AMOUNT_HEADERS: &[&str] = &["amount", "debit"];
/// Merchant header keywords, best first: a `Memo` column only wins when
/// nothing better is present (Chase exports carry both)
const MERCHANT_HEADERS: &[&[&str]] = &[&["description", "merchant", "payee"], &["memo"]];

/// Parse a delimited export with default settings
pub fn parse_csv_universal(text: &str) -> Vec<Transaction> {
    parse_with(text, &ImportConfig::default())
}

/// Parse a delimited export
pub fn parse_with(text: &str, config: &ImportConfig) -> Vec<Transaction> {
    let lines: Vec<&str> = text
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        debug!("Delimited input has {} lines, need header + data", lines.len());
        return Vec::new();
    }

    let rows: Vec<Vec<String>> = lines.iter().map(|line| split_fields(line)).collect();
    let (header, data) = match rows.split_first() {
        Some((header, data)) => (header, data),
        None => return Vec::new(),
    };

    let mut columns = ColumnMap::from_header(header);
    if !columns.is_complete() {
        columns.sniff(header.len(), data, config);
    }

    debug!(
        "Resolved columns: date={:?} merchant={:?} amount={:?}",
        columns.date, columns.merchant, columns.amount
    );

    if columns.is_ambiguous() {
        debug!("Date and amount resolved to the same column, skipping input");
        return Vec::new();
    }

    let transactions: Vec<Transaction> = data
        .iter()
        .filter_map(|row| columns.extract(row, config))
        .collect();

    debug!(
        "Parsed {} transactions from {} data rows",
        transactions.len(),
        data.len()
    );
    transactions
}

/// Split one line on commas, honoring double-quoted fields
///
/// A quote toggles the in-quotes state and is itself dropped; escaped quotes
/// inside quoted fields are not supported. Fields are trimmed.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Column index for each transaction role
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct ColumnMap {
    date: Option<usize>,
    merchant: Option<usize>,
    amount: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let lowered: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();
        let find = |keywords: &[&str]| {
            lowered
                .iter()
                .position(|h| keywords.iter().any(|k| h.contains(k)))
        };

        Self {
            date: find(DATE_HEADERS),
            merchant: MERCHANT_HEADERS.iter().find_map(|rank| find(rank)),
            amount: find(AMOUNT_HEADERS),
        }
    }

    /// Date and amount share a column, so the input was not split into fields
    fn is_ambiguous(&self) -> bool {
        self.date.is_some() && self.date == self.amount
    }

    fn is_complete(&self) -> bool {
        self.date.is_some() && self.merchant.is_some() && self.amount.is_some()
    }

    /// Fill unresolved roles from the content of the first data rows
    fn sniff(&mut self, column_count: usize, data: &[Vec<String>], config: &ImportConfig) {
        let sample = &data[..data.len().min(config.sniff_rows)];

        for col in 0..column_count {
            let mut dates = 0;
            let mut money = 0;
            let mut text_len = 0;

            for row in sample {
                let value = row.get(col).map(String::as_str).unwrap_or("");
                if is_date(value) {
                    dates += 1;
                }
                if is_money(value) {
                    money += 1;
                }
                text_len += value.chars().count();
            }

            if self.date.is_none() && dates >= config.sniff_min_hits {
                self.date = Some(col);
            }
            if self.amount.is_none() && money >= config.sniff_min_hits {
                self.amount = Some(col);
            }
            if self.merchant.is_none()
                && dates < SNIFF_NOISE_LIMIT
                && money < SNIFF_NOISE_LIMIT
                && text_len > config.merchant_min_text
            {
                self.merchant = Some(col);
            }
        }
    }

    /// Build a transaction from one data row, or skip it
    fn extract(&self, row: &[String], config: &ImportConfig) -> Option<Transaction> {
        let cell = |col: Option<usize>| col.and_then(|c| row.get(c)).map(String::as_str);

        let amount = cell(self.amount).map(parse_amount).unwrap_or(0.0);
        if amount <= 0.0 {
            return None;
        }

        let mut merchant = cell(self.merchant).unwrap_or("");
        if merchant.is_empty() && config.infer_merchant_from_row {
            merchant = longest_text_cell(row).unwrap_or("");
        }

        let merchant: String = merchant.chars().filter(|c| *c != '"' && *c != '\'').collect();
        let merchant = merchant.trim();
        if merchant.is_empty() {
            return None;
        }

        let date = cell(self.date).unwrap_or("");
        Some(Transaction::new(date, merchant, amount))
    }
}

/// Longest cell that is neither a date nor an amount
fn longest_text_cell(row: &[String]) -> Option<&str> {
    row.iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty() && !is_date(v) && !is_money(v))
        .fold(None, |best: Option<&str>, v| match best {
            Some(b) if b.len() >= v.len() => Some(b),
            _ => Some(v),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_fields_respects_quotes() {
        assert_eq!(
            split_fields(r#"01/15/2024,"NETFLIX, INC.", 15.99 "#),
            vec!["01/15/2024", "NETFLIX, INC.", "15.99"]
        );
        assert_eq!(split_fields("a,,b"), vec!["a", "", "b"]);
        assert_eq!(split_fields(r#""$1,200.00""#), vec!["$1,200.00"]);
    }

    #[test]
    fn test_parse_simple() {
        let csv = "Date,Description,Amount\n\
                   01/15/2024,NETFLIX.COM,-15.99\n\
                   01/16/2024,STARBUCKS,5.50";

        let txs = parse_csv_universal(csv);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0], Transaction::new("01/15/2024", "NETFLIX.COM", 15.99));
        assert_eq!(txs[1].amount, 5.50);
    }

    #[test]
    fn test_parse_needs_header_and_data() {
        assert!(parse_csv_universal("").is_empty());
        assert!(parse_csv_universal("Date,Description,Amount").is_empty());
        assert!(parse_csv_universal("\n\n  \nDate,Description,Amount\n\n").is_empty());
    }

    #[test]
    fn test_parse_chase_prefers_description_over_memo() {
        let csv = "Transaction Date,Post Date,Description,Category,Type,Amount,Memo\n\
                   01/15/2024,01/16/2024,NETFLIX.COM,Entertainment,Sale,-15.99,\n\
                   01/14/2024,01/15/2024,STARBUCKS,Food & Drink,Sale,-5.50,";

        let txs = parse_csv_universal(csv);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].merchant, "NETFLIX.COM");
        assert_eq!(txs[0].date, "01/15/2024");
        assert_eq!(txs[0].amount, 15.99);
    }

    #[test]
    fn test_parse_memo_only_layout() {
        let csv = "Posted,Memo,Debit\n2024-01-05,Gym membership,40.00";
        let txs = parse_csv_universal(csv);
        assert_eq!(txs, vec![Transaction::new("2024-01-05", "Gym membership", 40.0)]);
    }

    #[test]
    fn test_parse_debit_credit_layout_drops_credits() {
        let csv = "Transaction Date,Posted Date,Card No.,Description,Category,Debit,Credit\n\
                   2024-01-15,2024-01-16,1234,SPOTIFY USA,Entertainment,10.99,\n\
                   2024-01-20,2024-01-21,1234,PAYMENT THANK YOU,Payment,,500.00";

        let txs = parse_csv_universal(csv);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].merchant, "SPOTIFY USA");
        assert_eq!(txs[0].date, "2024-01-15");
    }

    #[test]
    fn test_parse_quoted_amounts_and_merchants() {
        let csv = "Date,Payee,Amount\n\
                   01/02/2024,\"ADOBE, INC.\",\"$1,054.99\"\n\
                   01/03/2024,O'REILLY MEDIA,$49.00";

        let txs = parse_csv_universal(csv);
        assert_eq!(txs[0].merchant, "ADOBE, INC.");
        assert_eq!(txs[0].amount, 1054.99);
        assert_eq!(txs[1].merchant, "OREILLY MEDIA");
    }

    #[test]
    fn test_parse_sniffs_unlabeled_columns() {
        let csv = "c1,c2,c3\n\
                   01/01/2024,Neighborhood Coffee Roasters,4.50\n\
                   01/02/2024,Neighborhood Coffee Roasters,4.50\n\
                   01/03/2024,Evergreen Hardware Supply,12.00\n\
                   01/04/2024,Riverside Farmers Market,22.10\n\
                   01/05/2024,Metro Transit Authority,2.75\n\
                   01/06/2024,Neighborhood Coffee Roasters,4.50";

        let txs = parse_csv_universal(csv);
        assert_eq!(txs.len(), 6);
        assert_eq!(txs[2], Transaction::new("01/03/2024", "Evergreen Hardware Supply", 12.0));
    }

    #[test]
    fn test_parse_sniff_below_threshold_skips_rows() {
        // Too few rows to sniff the amount column; nothing is emitted
        let csv = "When,What,HowMuch\n01/01/2024,NETFLIX.COM,15.99\n02/01/2024,NETFLIX.COM,15.99";
        assert!(parse_csv_universal(csv).is_empty());
    }

    #[test]
    fn test_parse_zero_and_garbage_amounts_dropped() {
        let csv = "Date,Description,Amount\n\
                   01/15/2024,NETFLIX.COM,0.00\n\
                   01/16/2024,HULU,N/A\n\
                   01/17/2024,,9.99\n\
                   01/18/2024,SPOTIFY,10.99";

        let txs = parse_csv_universal(csv);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].merchant, "SPOTIFY");
    }

    #[test]
    fn test_parse_short_rows_are_skipped() {
        let csv = "Date,Description,Amount\n01/15/2024,NETFLIX.COM\n01/16/2024,HULU,17.99";
        let txs = parse_csv_universal(csv);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].merchant, "HULU");
    }

    #[test]
    fn test_infer_merchant_from_row() {
        let csv = "Date,Amount,Ref,Note\n01/15/2024,15.99,X1,NETFLIX.COM STREAMING";

        assert!(parse_csv_universal(csv).is_empty());

        let config = ImportConfig {
            infer_merchant_from_row: true,
            ..Default::default()
        };
        let txs = parse_with(csv, &config);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].merchant, "NETFLIX.COM STREAMING");
    }

    #[test]
    fn test_crlf_input() {
        let csv = "Date,Description,Amount\r\n01/15/2024,NETFLIX.COM,15.99\r\n";
        let txs = parse_csv_universal(csv);
        assert_eq!(txs, vec![Transaction::new("01/15/2024", "NETFLIX.COM", 15.99)]);
    }

    #[test]
    fn test_count_bounded_by_rows_and_amounts_positive() {
        let csv = "Date,Description,Amount\n\
                   01/01/2024,A,1.00\n\
                   01/02/2024,B,-2.00\n\
                   01/03/2024,C,\n\
                   01/04/2024,D,(4.00)";

        let txs = parse_csv_universal(csv);
        assert!(txs.len() <= 4);
        assert_eq!(txs.len(), 3);
        assert!(txs.iter().all(|t| t.amount > 0.0));
    }

    #[test]
    fn test_tab_separated_input_yields_nothing() {
        let tsv = "Date\tDescription\tAmount\n\
                   01/15/2024\tNETFLIX.COM\t15.99\n\
                   02/15/2024\tNETFLIX.COM\t15.99\n";

        let header = split_fields("Date\tDescription\tAmount");
        let columns = ColumnMap::from_header(&header);
        assert_eq!(columns.date, Some(0));
        assert!(columns.is_ambiguous());

        assert!(parse_csv_universal(tsv).is_empty());
    }
}
