//! Day/time spending patterns
//!
//! Buckets regular (non-transfer) flow by day of week, time of month and
//! hour of day. The insight generator consumes these to surface habitual
//! spending outliers.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTH_PERIODS: [&str; 4] = ["1-7", "8-14", "15-21", "22-31"];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PatternBucket {
    pub income: f64,
    pub expense: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBucket {
    /// Day name, Sunday first
    pub day: String,
    pub income: f64,
    pub expense: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodBucket {
    /// Day-of-month span label, e.g. "8-14"
    pub period: String,
    pub income: f64,
    pub expense: f64,
    pub count: u64,
}

/// Spending bucketed by when it happens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingPatterns {
    /// Seven entries, Sunday first
    pub by_day_of_week: Vec<DayBucket>,
    /// Four entries covering the days of the month
    pub by_time_of_month: Vec<PeriodBucket>,
    /// Twenty-four entries, midnight first
    pub by_hour: Vec<PatternBucket>,
}

/// Bucket regular transactions by day of week, time of month and hour.
/// Transfers, excluded transactions and unparseable dates are skipped.
pub fn spending_patterns(transactions: &[Transaction]) -> SpendingPatterns {
    let mut days = [PatternBucket::default(); 7];
    let mut periods = [PatternBucket::default(); 4];
    let mut hours = [PatternBucket::default(); 24];

    for tx in transactions {
        if tx.excluded || tx.is_transfer() {
            continue;
        }
        let Some(datetime) = tx.datetime() else {
            continue;
        };

        let day_index = datetime.weekday().num_days_from_sunday() as usize;
        let period_index = match datetime.day() {
            1..=7 => 0,
            8..=14 => 1,
            15..=21 => 2,
            _ => 3,
        };
        let hour_index = datetime.hour() as usize;
        let amount = tx.converted_amount;

        for bucket in [
            &mut days[day_index],
            &mut periods[period_index],
            &mut hours[hour_index],
        ] {
            match tx.kind {
                Some(TransactionType::Income) => bucket.income += amount,
                Some(TransactionType::Expense) => bucket.expense += amount,
                _ => {}
            }
            bucket.count += 1;
        }
    }

    SpendingPatterns {
        by_day_of_week: days
            .iter()
            .zip(DAY_NAMES)
            .map(|(b, day)| DayBucket {
                day: day.to_string(),
                income: b.income,
                expense: b.expense,
                count: b.count,
            })
            .collect(),
        by_time_of_month: periods
            .iter()
            .zip(MONTH_PERIODS)
            .map(|(b, period)| PeriodBucket {
                period: period.to_string(),
                income: b.income,
                expense: b.expense,
                count: b.count,
            })
            .collect(),
        by_hour: hours.to_vec(),
    }
}
