//! Forecasting engine
//!
//! Consumes monthly aggregates to produce next-period projections with 95%
//! confidence bands, scenario planning, and a 12-month cash-flow projection.
//! Trend estimation blends exponential smoothing with an ordinary
//! least-squares regression over the recent monthly series.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::Analytics;

/// Forecasting configuration
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// How many recent months feed the trend estimators
    pub window_months: usize,
    /// Exponential smoothing factor
    pub smoothing_alpha: f64,
    /// Weight of the smoothing trend in the combined trend
    pub smoothing_weight: f64,
    /// Weight of the regression slope in the combined trend
    pub regression_weight: f64,
    /// Confidence band width in standard deviations (1.96 = 95%)
    pub confidence_multiplier: f64,
    /// Average weeks per month, used for the weekly horizon
    pub weeks_per_month: f64,
    /// Length of the cash-flow projection
    pub projection_months: u32,
    /// Categories considered reducible when estimating savings potential
    pub discretionary_categories: Vec<String>,
    /// Assumed achievable reduction of discretionary spend
    pub discretionary_reduction: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_months: 6,
            smoothing_alpha: 0.3,
            smoothing_weight: 0.4,
            regression_weight: 0.6,
            confidence_multiplier: 1.96,
            weeks_per_month: 4.33,
            projection_months: 12,
            discretionary_categories: [
                "Food",
                "Shopping",
                "Entertainment",
                "Wheels",
                "Personal",
                "Transport",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            discretionary_reduction: 0.18,
        }
    }
}

/// How much history backs the forecast. Driven strictly by the number of
/// distinct months with data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    /// No transaction history at all
    #[default]
    Insufficient,
    /// Under two distinct months; projections fall back to daily rates
    Limited,
    Fair,
    Good,
    Excellent,
}

impl DataQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insufficient => "insufficient",
            Self::Limited => "limited",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// An income/expense/net projection for one horizon
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FlowProjection {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

impl FlowProjection {
    fn new(income: f64, expense: f64) -> Self {
        Self {
            income,
            expense,
            net: income - expense,
        }
    }

    fn scaled(&self, factor: f64) -> Self {
        Self::new(self.income * factor, self.expense * factor)
    }
}

/// Next-month projection with its 95% confidence band
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MonthProjection {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub income_min: f64,
    pub income_max: f64,
    pub expense_min: f64,
    pub expense_max: f64,
    pub confidence: Confidence,
}

/// Best/likely/worst scenario triple. Best pairs the income upper bound with
/// the expense lower bound; worst is the inverse.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Scenarios {
    pub best: FlowProjection,
    pub likely: FlowProjection,
    pub worst: FlowProjection,
}

/// One month of the forward cash-flow projection
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CashFlowMonth {
    /// 1-based month offset from now
    pub month: u32,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub projected_balance: f64,
}

/// Flat per-category projection for the top expense categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryProjection {
    pub next_month: f64,
    pub confidence: Confidence,
}

/// The derived forecast
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub next_week: FlowProjection,
    pub next_month: MonthProjection,
    pub next_3_months: FlowProjection,
    pub next_year: FlowProjection,
    pub scenarios: Scenarios,
    pub category_projections: BTreeMap<String, CategoryProjection>,
    /// Estimated reducible monthly spend across discretionary categories
    pub savings_potential: f64,
    /// Months until the net balance hits zero at the projected burn
    pub months_until_zero: Option<i64>,
    /// Same, under the worst-case expense bound
    pub months_until_zero_worst: Option<i64>,
    pub cash_flow_projection: Vec<CashFlowMonth>,
    pub data_quality: DataQuality,
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for fewer than two samples
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Exponential smoothing: S1 = v1, Si = a*vi + (1-a)*S(i-1).
/// Returns the trend between the last two smoothed values.
fn smoothing_trend(values: &[f64], alpha: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut smoothed = values[0];
    let mut previous = smoothed;
    for v in &values[1..] {
        previous = smoothed;
        smoothed = alpha * v + (1.0 - alpha) * smoothed;
    }
    smoothed - previous
}

/// Ordinary least-squares slope of value against index
fn regression_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, v) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (v - y_mean);
        denominator += dx * dx;
    }
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Generate the forecast from an analytics snapshot.
///
/// With fewer than two distinct months of data the monthly estimators are
/// meaningless; the projection falls back to scaled daily averages with
/// `limited` quality, or returns an all-zero `insufficient` forecast when
/// there is no history at all.
pub fn generate_forecast(analytics: &Analytics, config: &ForecastConfig) -> Forecast {
    let trends = &analytics.monthly_trends;

    if trends.len() < 2 {
        if analytics.regular_transactions() == 0 {
            return Forecast::default();
        }

        let daily = analytics.daily_averages;
        let month = FlowProjection::new(daily.income * 30.0, daily.expense * 30.0);
        let mut forecast = Forecast {
            next_week: FlowProjection::new(daily.income * 7.0, daily.expense * 7.0),
            next_month: MonthProjection {
                income: month.income,
                expense: month.expense,
                net: month.net,
                confidence: Confidence::Low,
                ..Default::default()
            },
            data_quality: DataQuality::Limited,
            ..Default::default()
        };
        if month.expense > 0.0 && analytics.net_balance > 0.0 {
            forecast.months_until_zero =
                Some((analytics.net_balance / month.expense).ceil() as i64);
        }
        return forecast;
    }

    let data_quality = if trends.len() >= 6 {
        DataQuality::Excellent
    } else if trends.len() >= 3 {
        DataQuality::Good
    } else {
        DataQuality::Fair
    };
    let confidence = match data_quality {
        DataQuality::Excellent => Confidence::High,
        DataQuality::Good => Confidence::Medium,
        _ => Confidence::Low,
    };

    let window = &trends[trends.len().saturating_sub(config.window_months)..];
    let incomes: Vec<f64> = window.iter().map(|m| m.income).collect();
    let expenses: Vec<f64> = window.iter().map(|m| m.expense).collect();

    let income_mean = mean(&incomes);
    let expense_mean = mean(&expenses);
    let income_sd = std_dev(&incomes);
    let expense_sd = std_dev(&expenses);

    let income_trend = config.smoothing_weight * smoothing_trend(&incomes, config.smoothing_alpha)
        + config.regression_weight * regression_slope(&incomes);
    let expense_trend = config.smoothing_weight * smoothing_trend(&expenses, config.smoothing_alpha)
        + config.regression_weight * regression_slope(&expenses);

    let base_income = income_mean + income_trend;
    let base_expense = expense_mean + expense_trend;

    let band = config.confidence_multiplier;
    let next_month = MonthProjection {
        income: base_income.max(0.0),
        expense: base_expense.max(0.0),
        net: base_income.max(0.0) - base_expense.max(0.0),
        income_min: (base_income - income_sd * band).max(0.0),
        income_max: base_income + income_sd * band,
        expense_min: (base_expense - expense_sd * band).max(0.0),
        expense_max: base_expense + expense_sd * band,
        confidence,
    };

    let likely = FlowProjection::new(next_month.income, next_month.expense);
    let scenarios = Scenarios {
        likely,
        best: FlowProjection::new(next_month.income_max, next_month.expense_min),
        worst: FlowProjection::new(next_month.income_min, next_month.expense_max),
    };

    // Flat projection for the biggest expense categories: the historical
    // monthly average over the full trend window
    let mut category_projections = BTreeMap::new();
    let category_confidence = if trends.len() >= 3 {
        Confidence::Medium
    } else {
        Confidence::Low
    };
    for (category, total) in analytics.top_expense_categories.iter().take(5) {
        category_projections.insert(
            category.clone(),
            CategoryProjection {
                next_month: total / trends.len() as f64,
                confidence: category_confidence,
            },
        );
    }

    // Forward projection: the combined trend compounds linearly per month,
    // and the running balance starts from the current net balance
    let mut cash_flow_projection = Vec::with_capacity(config.projection_months as usize);
    let mut projected_balance = analytics.net_balance;
    for i in 1..=config.projection_months {
        let income = base_income + income_trend * i as f64;
        let expense = base_expense + expense_trend * i as f64;
        projected_balance += income - expense;
        cash_flow_projection.push(CashFlowMonth {
            month: i,
            income,
            expense,
            net: income - expense,
            projected_balance,
        });
    }

    let savings_potential: f64 = config
        .discretionary_categories
        .iter()
        .filter_map(|category| {
            analytics
                .top_expense_categories
                .iter()
                .find(|(c, _)| c == category)
        })
        .map(|(_, total)| (total / trends.len() as f64) * config.discretionary_reduction)
        .sum();

    let mut months_until_zero = None;
    let mut months_until_zero_worst = None;
    if next_month.expense > 0.0 && analytics.net_balance > 0.0 {
        months_until_zero = Some((analytics.net_balance / next_month.expense).ceil() as i64);
        if scenarios.worst.expense > 0.0 {
            months_until_zero_worst =
                Some((analytics.net_balance / scenarios.worst.expense).ceil() as i64);
        }
    }

    debug!(
        months = trends.len(),
        quality = data_quality.as_str(),
        "forecast generated"
    );

    Forecast {
        next_week: likely.scaled(1.0 / config.weeks_per_month),
        next_month,
        next_3_months: likely.scaled(3.0),
        next_year: likely.scaled(12.0),
        scenarios,
        category_projections,
        savings_potential,
        months_until_zero,
        months_until_zero_worst,
        cash_flow_projection,
        data_quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::calculate_analytics;
    use crate::models::TransactionType::*;
    use crate::test_utils::TransactionBuilder;

    fn monthly_fixture(months: usize, income: f64, expense: f64) -> Analytics {
        let mut txs = Vec::new();
        for i in 0..months {
            let date = format!("2024-{:02}-05T00:00:00.000Z", i + 1);
            txs.push(
                TransactionBuilder::new((i * 2) as i64, &date)
                    .kind(Income)
                    .category("Salary")
                    .amount(income)
                    .build(),
            );
            txs.push(
                TransactionBuilder::new((i * 2 + 1) as i64, &date)
                    .kind(Expense)
                    .category("Food")
                    .amount(expense)
                    .build(),
            );
        }
        calculate_analytics(&txs, None, None)
    }

    #[test]
    fn test_insufficient_without_history() {
        let analytics = calculate_analytics(&[], None, None);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        assert_eq!(forecast.data_quality, DataQuality::Insufficient);
        assert_eq!(forecast.next_month.income, 0.0);
        assert!(forecast.cash_flow_projection.is_empty());
    }

    #[test]
    fn test_limited_single_month_uses_daily_rates() {
        let analytics = monthly_fixture(1, 3000.0, 1500.0);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        assert_eq!(forecast.data_quality, DataQuality::Limited);
        assert_eq!(forecast.next_month.confidence, Confidence::Low);
        let daily = analytics.daily_averages;
        assert!((forecast.next_week.income - daily.income * 7.0).abs() < 1e-9);
        assert!((forecast.next_month.expense - daily.expense * 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_data_quality_tiers() {
        let config = ForecastConfig::default();
        assert_eq!(
            generate_forecast(&monthly_fixture(2, 100.0, 50.0), &config).data_quality,
            DataQuality::Fair
        );
        assert_eq!(
            generate_forecast(&monthly_fixture(3, 100.0, 50.0), &config).data_quality,
            DataQuality::Good
        );
        assert_eq!(
            generate_forecast(&monthly_fixture(6, 100.0, 50.0), &config).data_quality,
            DataQuality::Excellent
        );
    }

    #[test]
    fn test_constant_series_projects_the_mean() {
        let analytics = monthly_fixture(6, 3000.0, 1200.0);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        // No variance: trend 0, bands collapse to the mean
        assert!((forecast.next_month.income - 3000.0).abs() < 1e-6);
        assert!((forecast.next_month.expense - 1200.0).abs() < 1e-6);
        assert!((forecast.next_month.income_min - 3000.0).abs() < 1e-6);
        assert!((forecast.next_month.income_max - 3000.0).abs() < 1e-6);
        assert_eq!(forecast.next_month.confidence, Confidence::High);
    }

    #[test]
    fn test_scenario_pairing() {
        let analytics = monthly_fixture(4, 2000.0, 900.0);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        assert_eq!(forecast.scenarios.best.income, forecast.next_month.income_max);
        assert_eq!(forecast.scenarios.best.expense, forecast.next_month.expense_min);
        assert_eq!(forecast.scenarios.worst.income, forecast.next_month.income_min);
        assert_eq!(forecast.scenarios.worst.expense, forecast.next_month.expense_max);
    }

    #[test]
    fn test_horizon_scaling() {
        let analytics = monthly_fixture(6, 3000.0, 1200.0);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        assert!((forecast.next_3_months.income - forecast.next_month.income * 3.0).abs() < 1e-9);
        assert!((forecast.next_year.expense - forecast.next_month.expense * 12.0).abs() < 1e-9);
        assert!((forecast.next_week.income - forecast.next_month.income / 4.33).abs() < 1e-9);
    }

    #[test]
    fn test_cash_flow_projection_runs_twelve_months() {
        let analytics = monthly_fixture(6, 3000.0, 1200.0);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        assert_eq!(forecast.cash_flow_projection.len(), 12);
        // Constant series: each month adds the same net to the running balance
        let net = 3000.0 - 1200.0;
        let first = &forecast.cash_flow_projection[0];
        assert!((first.projected_balance - (analytics.net_balance + net)).abs() < 1e-6);
        let last = &forecast.cash_flow_projection[11];
        assert!((last.projected_balance - (analytics.net_balance + net * 12.0)).abs() < 1e-4);
    }

    #[test]
    fn test_months_until_zero() {
        // Expenses only: net balance negative, no burn estimate
        let analytics = monthly_fixture(3, 0.0, 500.0);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        assert_eq!(forecast.months_until_zero, None);

        let analytics = monthly_fixture(3, 2000.0, 500.0);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        let expected = (analytics.net_balance / forecast.next_month.expense).ceil() as i64;
        assert_eq!(forecast.months_until_zero, Some(expected));
    }

    #[test]
    fn test_savings_potential_counts_discretionary_only() {
        let mut txs = Vec::new();
        for (i, month) in ["2024-01", "2024-02", "2024-03"].iter().enumerate() {
            let date = format!("{}-05T00:00:00.000Z", month);
            txs.push(
                TransactionBuilder::new(i as i64 * 2, &date)
                    .kind(Expense)
                    .category("Food")
                    .amount(600.0)
                    .build(),
            );
            txs.push(
                TransactionBuilder::new(i as i64 * 2 + 1, &date)
                    .kind(Expense)
                    .category("Utilities")
                    .amount(300.0)
                    .build(),
            );
        }
        let analytics = calculate_analytics(&txs, None, None);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        // Only Food is discretionary: 600/month * 18%
        assert!((forecast.savings_potential - 600.0 * 0.18).abs() < 1e-9);
    }

    #[test]
    fn test_category_projections_cover_top_expenses() {
        let analytics = monthly_fixture(4, 2000.0, 800.0);
        let forecast = generate_forecast(&analytics, &ForecastConfig::default());
        let food = forecast.category_projections.get("Food").unwrap();
        assert!((food.next_month - 800.0).abs() < 1e-9);
        assert_eq!(food.confidence, Confidence::Medium);
    }

    #[test]
    fn test_stat_helpers() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
        assert_eq!(std_dev(&[5.0]), 0.0);
        // Population standard deviation of [2, 4] is 1
        assert!((std_dev(&[2.0, 4.0]) - 1.0).abs() < 1e-9);
        // Slope of a perfect line
        assert!((regression_slope(&[1.0, 3.0, 5.0]) - 2.0).abs() < 1e-9);
        // Rising series has a positive smoothing trend
        assert!(smoothing_trend(&[1.0, 2.0, 3.0], 0.3) > 0.0);
    }
}
