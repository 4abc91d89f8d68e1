//! Day-of-week and time-of-month spending outliers

use super::engine::{InsightContext, InsightRule};
use super::types::{Finding, Impact, InsightKind};

/// Flags the weekday whose spending runs well above the weekly average
pub struct DayOfWeekInsight;

impl InsightRule for DayOfWeekInsight {
    fn name(&self) -> &'static str {
        "day_of_week"
    }

    fn analyze(&self, ctx: &InsightContext<'_>) -> Vec<Finding> {
        let buckets = &ctx.patterns.by_day_of_week;
        let Some(top) = buckets
            .iter()
            .max_by(|a, b| a.expense.total_cmp(&b.expense))
        else {
            return vec![];
        };
        let average = buckets.iter().map(|b| b.expense).sum::<f64>() / buckets.len() as f64;
        if average <= 0.0 || top.expense <= average * ctx.config.day_of_week_multiplier {
            return vec![];
        }

        let above_pct = (top.expense / average - 1.0) * 100.0;
        vec![Finding::new(
            InsightKind::SpendingPattern,
            Impact::Medium,
            "Spending Patterns",
            format!("You spend {:.0}% more on {}s", above_pct, top.day),
            format!(
                "Your average spending on {} runs {:.0}% of your weekly average. \
                 Worth reviewing what usually happens on {}s.",
                top.day,
                top.expense / average * 100.0,
                top.day
            ),
        )]
    }
}

/// Flags the span of the month where spending concentrates
pub struct TimeOfMonthInsight;

impl InsightRule for TimeOfMonthInsight {
    fn name(&self) -> &'static str {
        "time_of_month"
    }

    fn analyze(&self, ctx: &InsightContext<'_>) -> Vec<Finding> {
        let buckets = &ctx.patterns.by_time_of_month;
        let Some(top) = buckets
            .iter()
            .max_by(|a, b| a.expense.total_cmp(&b.expense))
        else {
            return vec![];
        };
        let average = buckets.iter().map(|b| b.expense).sum::<f64>() / buckets.len() as f64;
        if average <= 0.0 || top.expense <= average * ctx.config.time_of_month_multiplier {
            return vec![];
        }

        let week_name = match top.period.as_str() {
            "1-7" => "first",
            "8-14" => "second",
            "15-21" => "third",
            _ => "last",
        };
        vec![Finding::new(
            InsightKind::TimePattern,
            Impact::Low,
            "Spending Patterns",
            format!("Higher spending in days {} of the month", top.period),
            format!(
                "You tend to spend more during the {} week of the month.",
                week_name
            ),
        )]
    }
}
