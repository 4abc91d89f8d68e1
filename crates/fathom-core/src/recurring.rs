//! Recurring-charge detection
//!
//! Groups transactions by (category, normalized description) and flags
//! groups whose amounts and intervals are both regular. Real recurring
//! charges have consistent pricing and a steady cadence; variable amounts or
//! erratic gaps indicate ordinary repeat shopping instead.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Transaction;

/// Recurring detection configuration
#[derive(Debug, Clone)]
pub struct RecurringConfig {
    /// Minimum occurrences before a group can qualify
    pub min_occurrences: usize,
    /// Allowed deviation of each amount from the group mean (fraction)
    pub amount_tolerance: f64,
    /// Allowed deviation of each gap from the mean gap (days)
    pub interval_tolerance_days: f64,
    /// Mean gap at or under this is classified weekly
    pub weekly_max_days: f64,
    /// Mean gap at or under this is classified monthly
    pub monthly_max_days: f64,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 2,
            amount_tolerance: 0.10,
            interval_tolerance_days: 5.0,
            weekly_max_days: 7.0,
            monthly_max_days: 35.0,
        }
    }
}

/// Inferred cadence class of a recurring charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyClass {
    Weekly,
    Monthly,
    Other,
}

impl FrequencyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Other => "other",
        }
    }
}

/// A detected recurring charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringPattern {
    pub category: Option<String>,
    /// Normalized (lowercased, trimmed) description key
    pub description: String,
    /// Mean amount in the reporting currency
    pub amount: f64,
    /// Unconverted amount of the most recent occurrence
    pub original_amount: f64,
    /// Currency of the most recent occurrence
    pub currency: String,
    /// Rounded mean gap between occurrences
    pub frequency_days: i64,
    pub frequency_class: FrequencyClass,
    pub count: usize,
    pub last_date: NaiveDate,
    pub next_expected: NaiveDate,
}

/// Detect recurring charges, sorted by mean amount descending.
///
/// A group qualifies when it has at least `min_occurrences` members, every
/// amount is within `amount_tolerance` of the group mean, and every
/// consecutive day-gap is within `interval_tolerance_days` of the mean gap.
/// Transfers, excluded transactions and descriptionless transactions never
/// participate.
pub fn detect_recurring(
    transactions: &[Transaction],
    config: &RecurringConfig,
) -> Vec<RecurringPattern> {
    let mut groups: HashMap<(Option<String>, String), Vec<&Transaction>> = HashMap::new();

    for tx in transactions {
        if tx.excluded || tx.category.as_deref() == Some("Transfer") {
            continue;
        }
        let Some(description) = tx.description.as_deref() else {
            continue;
        };
        let key = description.to_lowercase().trim().to_string();
        if key.is_empty() {
            continue;
        }
        groups
            .entry((tx.category.clone(), key))
            .or_default()
            .push(tx);
    }

    let mut patterns = Vec::new();

    for ((category, description), mut group) in groups {
        if group.len() < config.min_occurrences {
            continue;
        }

        let amounts: Vec<f64> = group.iter().map(|t| t.converted_amount).collect();
        let mean_amount = amounts.iter().sum::<f64>() / amounts.len() as f64;
        if mean_amount.abs() < f64::EPSILON {
            continue;
        }
        let amounts_regular = amounts
            .iter()
            .all(|a| ((a - mean_amount) / mean_amount).abs() < config.amount_tolerance);
        if !amounts_regular {
            continue;
        }

        group.sort_by(|a, b| a.date_iso.cmp(&b.date_iso));

        // Every occurrence needs a parseable date to measure gaps
        let dates: Vec<NaiveDate> = match group.iter().map(|t| t.date()).collect() {
            Some(dates) => dates,
            None => continue,
        };

        let gaps: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
        if gaps.is_empty() {
            continue;
        }
        let mean_gap = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
        let intervals_regular = gaps
            .iter()
            .all(|g| (*g as f64 - mean_gap).abs() <= config.interval_tolerance_days);
        if !intervals_regular {
            continue;
        }

        let frequency_class = if mean_gap <= config.weekly_max_days {
            FrequencyClass::Weekly
        } else if mean_gap <= config.monthly_max_days {
            FrequencyClass::Monthly
        } else {
            FrequencyClass::Other
        };

        let last = group.last().expect("group has at least two members");
        let last_date = *dates.last().expect("dates match the group");

        patterns.push(RecurringPattern {
            category,
            description,
            amount: mean_amount,
            original_amount: last.amount,
            currency: last.currency.clone(),
            frequency_days: mean_gap.round() as i64,
            frequency_class,
            count: group.len(),
            last_date,
            next_expected: last_date + Duration::days(mean_gap.round() as i64),
        });
    }

    patterns.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(patterns = patterns.len(), "recurring detection complete");
    patterns
}
