//! Spending trend helpers
//!
//! Small derived views over the analytics snapshot: average spend per
//! day/week/month, spending velocity with a burn-rate estimate, and a
//! year-over-year comparison.

use serde::{Deserialize, Serialize};

use crate::analytics::{Analytics, DailyAverages};
use crate::models::Transaction;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AverageFlow {
    pub income: f64,
    pub expense: f64,
}

/// Average flow at the daily/weekly/monthly grain plus the burn rate
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpendingTrends {
    pub daily_average: DailyAverages,
    pub weekly_average: AverageFlow,
    pub monthly_average: AverageFlow,
    /// Expense per day over the covered range
    pub spending_velocity: f64,
    /// Days until the net balance reaches zero at the current velocity
    pub burn_rate_days: Option<i64>,
}

/// Derive average-flow figures from a snapshot
pub fn spending_trends(analytics: &Analytics) -> SpendingTrends {
    let daily = analytics.daily_averages;
    let months = analytics.monthly_trends.len();

    let monthly_average = if months > 0 {
        AverageFlow {
            income: analytics.total_income / months as f64,
            expense: analytics.total_expense / months as f64,
        }
    } else {
        AverageFlow::default()
    };

    let burn_rate_days = if daily.expense > 0.0 && analytics.net_balance > 0.0 {
        Some((analytics.net_balance / daily.expense).ceil() as i64)
    } else {
        None
    };

    SpendingTrends {
        daily_average: daily,
        weekly_average: AverageFlow {
            income: daily.income * 7.0,
            expense: daily.expense * 7.0,
        },
        monthly_average,
        spending_velocity: daily.expense,
        burn_rate_days,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VelocityTrend {
    Accelerating,
    Decelerating,
    Stable,
}

impl VelocityTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accelerating => "accelerating",
            Self::Decelerating => "decelerating",
            Self::Stable => "stable",
        }
    }
}

/// How fast spending is moving and in which direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpendingVelocity {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub trend: VelocityTrend,
    /// Expense change over the last three months, percent
    pub acceleration: f64,
    pub burn_rate_days: Option<i64>,
    /// Coarse 0-100 rating of the trend direction
    pub velocity_score: u8,
}

/// Classify spending velocity from the last three months of the trend series.
/// A change of more than 5% either way counts as acceleration/deceleration.
pub fn spending_velocity(analytics: &Analytics) -> SpendingVelocity {
    let daily = analytics.daily_averages.expense;

    let mut trend = VelocityTrend::Stable;
    let mut acceleration = 0.0;
    let months = &analytics.monthly_trends;
    if months.len() >= 3 {
        let recent = &months[months.len() - 3..];
        let first = recent[0].expense;
        let last = recent[2].expense;
        if first > 0.0 {
            acceleration = (last - first) / first * 100.0;
            if acceleration > 5.0 {
                trend = VelocityTrend::Accelerating;
            } else if acceleration < -5.0 {
                trend = VelocityTrend::Decelerating;
            }
        }
    }

    let burn_rate_days = if daily > 0.0 && analytics.net_balance > 0.0 {
        Some((analytics.net_balance / daily).ceil() as i64)
    } else {
        None
    };

    SpendingVelocity {
        daily,
        weekly: daily * 7.0,
        monthly: daily * 30.0,
        trend,
        acceleration,
        burn_rate_days,
        velocity_score: match trend {
            VelocityTrend::Stable => 75,
            VelocityTrend::Decelerating => 85,
            VelocityTrend::Accelerating => 60,
        },
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct YearTotals {
    pub income: f64,
    pub expense: f64,
    pub transaction_count: u64,
}

/// Comparison of a year against the one before it
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct YearOverYear {
    pub current_year: YearTotals,
    pub last_year: YearTotals,
    /// Percent change, 0 when the prior year had no flow
    pub income_change_pct: f64,
    pub expense_change_pct: f64,
    pub net_change: f64,
}

/// Compare `current_year` against the year before over regular,
/// non-transfer flow.
pub fn year_over_year(transactions: &[Transaction], current_year: i32) -> YearOverYear {
    let mut current = YearTotals::default();
    let mut previous = YearTotals::default();

    for tx in transactions {
        if tx.excluded || tx.is_transfer() {
            continue;
        }
        let Some(year) = tx
            .date_iso
            .get(..4)
            .and_then(|y| y.parse::<i32>().ok())
        else {
            continue;
        };
        let bucket = if year == current_year {
            &mut current
        } else if year == current_year - 1 {
            &mut previous
        } else {
            continue;
        };
        if tx.is_income() {
            bucket.income += tx.converted_amount;
        } else if tx.is_expense() {
            bucket.expense += tx.converted_amount;
        }
        bucket.transaction_count += 1;
    }

    let mut comparison = YearOverYear {
        current_year: current,
        last_year: previous,
        ..Default::default()
    };
    if previous.income > 0.0 {
        comparison.income_change_pct =
            (current.income - previous.income) / previous.income * 100.0;
    }
    if previous.expense > 0.0 {
        comparison.expense_change_pct =
            (current.expense - previous.expense) / previous.expense * 100.0;
    }
    comparison.net_change =
        (current.income - current.expense) - (previous.income - previous.expense);
    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::calculate_analytics;
    use crate::models::TransactionType::*;
    use crate::test_utils::TransactionBuilder;

    fn expense(id: i64, date: &str, amount: f64) -> Transaction {
        TransactionBuilder::new(id, date)
            .kind(Expense)
            .category("Food")
            .amount(amount)
            .build()
    }

    #[test]
    fn test_spending_trends_averages() {
        let txs = vec![
            TransactionBuilder::new(1, "2024-01-01T00:00:00.000Z")
                .kind(Income)
                .category("Salary")
                .amount(3000.0)
                .build(),
            expense(2, "2024-01-31T00:00:00.000Z", 900.0),
        ];
        let analytics = calculate_analytics(&txs, None, None);
        let trends = spending_trends(&analytics);
        assert!((trends.daily_average.expense - 30.0).abs() < 1e-9);
        assert!((trends.weekly_average.expense - 210.0).abs() < 1e-9);
        assert_eq!(trends.monthly_average.expense, 900.0);
        assert_eq!(trends.burn_rate_days, Some(70));
    }

    #[test]
    fn test_velocity_classification() {
        let accelerating = calculate_analytics(
            &[
                expense(1, "2024-01-10T00:00:00.000Z", 100.0),
                expense(2, "2024-02-10T00:00:00.000Z", 120.0),
                expense(3, "2024-03-10T00:00:00.000Z", 180.0),
            ],
            None,
            None,
        );
        assert_eq!(
            spending_velocity(&accelerating).trend,
            VelocityTrend::Accelerating
        );

        let stable = calculate_analytics(
            &[
                expense(1, "2024-01-10T00:00:00.000Z", 100.0),
                expense(2, "2024-02-10T00:00:00.000Z", 101.0),
                expense(3, "2024-03-10T00:00:00.000Z", 102.0),
            ],
            None,
            None,
        );
        let velocity = spending_velocity(&stable);
        assert_eq!(velocity.trend, VelocityTrend::Stable);
        assert_eq!(velocity.velocity_score, 75);
    }

    #[test]
    fn test_year_over_year() {
        let txs = vec![
            TransactionBuilder::new(1, "2023-03-01T00:00:00.000Z")
                .kind(Income)
                .amount(1000.0)
                .build(),
            expense(2, "2023-04-01T00:00:00.000Z", 400.0),
            TransactionBuilder::new(3, "2024-03-01T00:00:00.000Z")
                .kind(Income)
                .amount(1500.0)
                .build(),
            expense(4, "2024-04-01T00:00:00.000Z", 300.0),
        ];
        let yoy = year_over_year(&txs, 2024);
        assert_eq!(yoy.current_year.income, 1500.0);
        assert_eq!(yoy.last_year.expense, 400.0);
        assert!((yoy.income_change_pct - 50.0).abs() < 1e-9);
        assert!((yoy.expense_change_pct - (-25.0)).abs() < 1e-9);
        assert_eq!(yoy.net_change, (1500.0 - 300.0) - (1000.0 - 400.0));
    }
}
