//! Financial health scoring
//!
//! Combines savings rate, expense volatility, emergency-fund coverage,
//! spending velocity and the forecast outlook into a 0-100 score with a
//! letter grade. Each factor is scored independently against fixed tiers on
//! top of a base of 50.

use serde::{Deserialize, Serialize};

use crate::analytics::Analytics;
use crate::forecast::{std_dev, Forecast};

/// Letter grade for a health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Self::APlus,
            80..=89 => Self::A,
            75..=79 => Self::BPlus,
            70..=74 => Self::B,
            65..=69 => Self::CPlus,
            60..=64 => Self::C,
            50..=59 => Self::D,
            _ => Self::F,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityAssessment {
    Good,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityAssessment {
    Stable,
    Accelerating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlookAssessment {
    Positive,
    Negative,
}

/// Factor diagnostics backing the score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthBreakdown {
    /// Savings rate as a rounded percentage of income
    pub savings_rate_pct: f64,
    /// Emergency-fund coverage in months of expenses, one decimal
    pub months_of_expenses: f64,
    pub expense_stability: StabilityAssessment,
    pub spending_velocity: VelocityAssessment,
    pub future_outlook: OutlookAssessment,
}

/// The composite health score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthScore {
    /// Clamped to 0-100
    pub score: u8,
    pub grade: Grade,
    pub breakdown: HealthBreakdown,
}

/// Score the snapshot against the forecast outlook.
pub fn calculate_health_score(analytics: &Analytics, forecast: &Forecast) -> HealthScore {
    let mut score: f64 = 50.0;

    // Savings rate: up to 25 points, penalized when negative
    let savings_rate = if analytics.total_income > 0.0 {
        analytics.net_balance / analytics.total_income
    } else {
        0.0
    };
    score += if savings_rate >= 0.2 {
        25.0
    } else if savings_rate >= 0.1 {
        15.0
    } else if savings_rate >= 0.05 {
        10.0
    } else if savings_rate >= 0.0 {
        5.0
    } else {
        -10.0
    };

    // Expense stability: coefficient of variation over the monthly series
    let months = analytics.monthly_trends.len();
    if months >= 3 {
        let expenses: Vec<f64> = analytics.monthly_trends.iter().map(|m| m.expense).collect();
        let avg = expenses.iter().sum::<f64>() / expenses.len() as f64;
        let cov = if avg > 0.0 { std_dev(&expenses) / avg } else { 0.0 };
        score += if cov < 0.1 {
            15.0
        } else if cov < 0.2 {
            10.0
        } else if cov < 0.3 {
            5.0
        } else {
            0.0
        };
    }

    // Emergency fund: months of expenses the net balance covers
    let monthly_expense = analytics.total_expense / months.max(1) as f64;
    let months_of_expenses = if monthly_expense > 0.0 {
        analytics.net_balance / monthly_expense
    } else {
        0.0
    };
    score += if months_of_expenses >= 6.0 {
        20.0
    } else if months_of_expenses >= 3.0 {
        15.0
    } else if months_of_expenses >= 1.0 {
        10.0
    } else if months_of_expenses >= 0.0 {
        5.0
    } else {
        0.0
    };

    // Spending velocity: daily-rate projection vs actual monthly spend
    let monthly_projection = analytics.daily_averages.expense * 30.0;
    let velocity_ratio = if monthly_expense > 0.0 {
        monthly_projection / monthly_expense
    } else {
        1.0
    };
    score += if velocity_ratio < 1.1 {
        15.0
    } else if velocity_ratio < 1.2 {
        10.0
    } else if velocity_ratio < 1.3 {
        5.0
    } else {
        -5.0
    };

    if analytics.net_balance < 0.0 {
        score -= 20.0;
    }

    // Future outlook from the forecast's next-month net
    let future_net = forecast.next_month.net;
    score += if future_net > 0.0 {
        15.0
    } else if future_net > -monthly_expense * 0.1 {
        10.0
    } else if future_net > -monthly_expense * 0.2 {
        5.0
    } else {
        -10.0
    };

    let score = score.clamp(0.0, 100.0).round() as u8;

    HealthScore {
        score,
        grade: Grade::from_score(score),
        breakdown: HealthBreakdown {
            savings_rate_pct: (savings_rate * 100.0).round(),
            months_of_expenses: (months_of_expenses * 10.0).round() / 10.0,
            expense_stability: if months >= 3 {
                StabilityAssessment::Good
            } else {
                StabilityAssessment::InsufficientData
            },
            spending_velocity: if velocity_ratio < 1.1 {
                VelocityAssessment::Stable
            } else {
                VelocityAssessment::Accelerating
            },
            future_outlook: if future_net > 0.0 {
                OutlookAssessment::Positive
            } else {
                OutlookAssessment::Negative
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::calculate_analytics;
    use crate::forecast::{generate_forecast, ForecastConfig};
    use crate::models::{Transaction, TransactionType::*};
    use crate::test_utils::TransactionBuilder;

    fn fixture(income_per_month: f64, expense_per_month: f64, months: usize) -> Analytics {
        let mut txs: Vec<Transaction> = Vec::new();
        for i in 0..months {
            let date = format!("2024-{:02}-10T00:00:00.000Z", i + 1);
            txs.push(
                TransactionBuilder::new((i * 2) as i64, &date)
                    .kind(Income)
                    .category("Salary")
                    .amount(income_per_month)
                    .build(),
            );
            txs.push(
                TransactionBuilder::new((i * 2 + 1) as i64, &date)
                    .kind(Expense)
                    .category("Food")
                    .amount(expense_per_month)
                    .build(),
            );
        }
        calculate_analytics(&txs, None, None)
    }

    fn score_for(income: f64, expense: f64, months: usize) -> HealthScore {
        let analytics = fixture(income, expense, months);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        calculate_health_score(&analytics, &forecast)
    }

    #[test]
    fn test_healthy_profile_scores_high() {
        // 60% savings rate, stable expenses, months of runway, positive outlook
        let health = score_for(5000.0, 2000.0, 6);
        assert!(health.score >= 90, "score was {}", health.score);
        assert_eq!(health.grade, Grade::APlus);
        assert_eq!(health.breakdown.savings_rate_pct, 60.0);
        assert_eq!(
            health.breakdown.expense_stability,
            StabilityAssessment::Good
        );
        assert_eq!(
            health.breakdown.future_outlook,
            OutlookAssessment::Positive
        );
    }

    #[test]
    fn test_negative_balance_penalized() {
        let healthy = score_for(3000.0, 2000.0, 4);
        let drowning = score_for(1000.0, 2000.0, 4);
        assert!(drowning.score < healthy.score);
        assert_eq!(
            drowning.breakdown.future_outlook,
            OutlookAssessment::Negative
        );
    }

    #[test]
    fn test_score_monotonic_in_savings_rate() {
        // Fixed expenses, rising income: the score never decreases
        let mut previous = 0;
        for income in [1000, 2100, 2200, 2500, 4000, 10000] {
            let health = score_for(income as f64, 2000.0, 4);
            assert!(
                health.score >= previous,
                "score regressed at income {}: {} < {}",
                income,
                health.score,
                previous
            );
            previous = health.score;
        }
    }

    #[test]
    fn test_score_clamped() {
        let health = score_for(100.0, 5000.0, 4);
        assert!(health.score <= 100);
        let rich = score_for(100_000.0, 100.0, 6);
        assert!(rich.score <= 100);
    }

    #[test]
    fn test_grade_ladder() {
        assert_eq!(Grade::from_score(95), Grade::APlus);
        assert_eq!(Grade::from_score(90), Grade::APlus);
        assert_eq!(Grade::from_score(85), Grade::A);
        assert_eq!(Grade::from_score(77), Grade::BPlus);
        assert_eq!(Grade::from_score(72), Grade::B);
        assert_eq!(Grade::from_score(67), Grade::CPlus);
        assert_eq!(Grade::from_score(62), Grade::C);
        assert_eq!(Grade::from_score(55), Grade::D);
        assert_eq!(Grade::from_score(30), Grade::F);
    }
}
