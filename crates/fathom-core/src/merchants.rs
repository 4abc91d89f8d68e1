//! Merchant rollups
//!
//! Groups flow by merchant, preferring the recorded counterparty and falling
//! back to pattern extraction from the free-text description. Feeds the
//! top-merchant insight and merchant-level reporting.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// How many merchants the rollup keeps
const TOP_MERCHANTS: usize = 50;

/// Aggregated flow for one merchant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantSummary {
    pub name: String,
    pub total_spent: f64,
    pub total_received: f64,
    pub transaction_count: u64,
    pub avg_amount: f64,
    /// Absolute flow per category
    pub categories: BTreeMap<String, f64>,
    /// Timestamp of the most recent transaction
    pub last_transaction: Option<String>,
}

fn merchant_patterns() -> [Regex; 3] {
    [
        // Capitalized run at the start of the description
        Regex::new(r"(?i)^([A-Z][A-Z\s&]+?)\s").expect("valid regex"),
        // "at MERCHANT"
        Regex::new(r"(?i)at\s+([A-Z][A-Z\s&]+?)(?:\s|$)").expect("valid regex"),
        // "from MERCHANT"
        Regex::new(r"(?i)from\s+([A-Z][A-Z\s&]+?)(?:\s|$)").expect("valid regex"),
    ]
}

fn extract_merchant(tx: &Transaction, patterns: &[Regex]) -> Option<String> {
    let description = tx.description.as_deref()?;
    if let Some(person) = tx.person_company.as_deref() {
        return Some(person.to_string());
    }
    for pattern in patterns {
        if let Some(captures) = pattern.captures(description) {
            if let Some(name) = captures.get(1) {
                return Some(name.as_str().trim().to_string());
            }
        }
    }
    Some(description.to_string())
}

/// Roll up spending and income per merchant, sorted by combined volume
/// descending and truncated to the top 50. Transfers, excluded transactions
/// and descriptionless transactions are skipped.
pub fn analyze_merchants(transactions: &[Transaction]) -> Vec<MerchantSummary> {
    let patterns = merchant_patterns();
    let mut merchants: BTreeMap<String, MerchantSummary> = BTreeMap::new();

    for tx in transactions {
        if tx.excluded || tx.is_transfer() || tx.description.is_none() {
            continue;
        }
        let Some(name) = extract_merchant(tx, &patterns) else {
            continue;
        };

        let merchant = merchants.entry(name.clone()).or_insert_with(|| MerchantSummary {
            name,
            ..Default::default()
        });

        let amount = tx.converted_amount.abs();
        match tx.kind {
            Some(TransactionType::Expense) => merchant.total_spent += amount,
            Some(TransactionType::Income) => merchant.total_received += amount,
            _ => {}
        }
        merchant.transaction_count += 1;

        let category = tx.category.clone().unwrap_or_else(|| "Uncategorized".to_string());
        *merchant.categories.entry(category).or_default() += amount;

        if merchant
            .last_transaction
            .as_deref()
            .is_none_or(|last| tx.date_iso.as_str() > last)
        {
            merchant.last_transaction = Some(tx.date_iso.clone());
        }
    }

    let mut summaries: Vec<MerchantSummary> = merchants.into_values().collect();
    for merchant in &mut summaries {
        if merchant.transaction_count > 0 {
            merchant.avg_amount = (merchant.total_spent + merchant.total_received)
                / merchant.transaction_count as f64;
        }
    }
    summaries.sort_by(|a, b| {
        (b.total_spent + b.total_received)
            .partial_cmp(&(a.total_spent + a.total_received))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries.truncate(TOP_MERCHANTS);
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType::*;
    use crate::test_utils::TransactionBuilder;

    #[test]
    fn test_counterparty_preferred_over_description() {
        let txs = vec![TransactionBuilder::new(1, "2024-05-01T00:00:00.000Z")
            .kind(Expense)
            .category("Food")
            .description("card payment 1234")
            .person("Corner Cafe")
            .amount(12.0)
            .build()];
        let merchants = analyze_merchants(&txs);
        assert_eq!(merchants.len(), 1);
        assert_eq!(merchants[0].name, "Corner Cafe");
        assert_eq!(merchants[0].total_spent, 12.0);
    }

    #[test]
    fn test_extraction_from_description() {
        let txs = vec![
            TransactionBuilder::new(1, "2024-05-01T00:00:00.000Z")
                .kind(Expense)
                .category("Shopping")
                .description("ACME STORE purchase")
                .amount(30.0)
                .build(),
            TransactionBuilder::new(2, "2024-05-08T00:00:00.000Z")
                .kind(Expense)
                .category("Shopping")
                .description("ACME STORE purchase")
                .amount(20.0)
                .build(),
        ];
        let merchants = analyze_merchants(&txs);
        assert_eq!(merchants.len(), 1);
        // The lazy leading-capitalized-run pattern stops at the first
        // whitespace boundary
        assert_eq!(merchants[0].name, "ACME");
        assert_eq!(merchants[0].transaction_count, 2);
        assert_eq!(merchants[0].avg_amount, 25.0);
        assert_eq!(merchants[0].categories["Shopping"], 50.0);
        assert_eq!(
            merchants[0].last_transaction.as_deref(),
            Some("2024-05-08T00:00:00.000Z")
        );
    }

    #[test]
    fn test_sorted_by_combined_volume() {
        let txs = vec![
            TransactionBuilder::new(1, "2024-05-01T00:00:00.000Z")
                .kind(Expense)
                .description("small shop")
                .person("Small")
                .amount(10.0)
                .build(),
            TransactionBuilder::new(2, "2024-05-01T00:00:00.000Z")
                .kind(Expense)
                .description("big shop")
                .person("Big")
                .amount(500.0)
                .build(),
        ];
        let merchants = analyze_merchants(&txs);
        assert_eq!(merchants[0].name, "Big");
        assert_eq!(merchants[1].name, "Small");
    }

    #[test]
    fn test_transfers_skipped() {
        let txs = vec![TransactionBuilder::new(1, "2024-05-01T00:00:00.000Z")
            .kind(Transfer)
            .description("to savings")
            .amount(500.0)
            .build()];
        assert!(analyze_merchants(&txs).is_empty());
    }
}
