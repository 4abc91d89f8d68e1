//! Month-over-month expense anomaly detection

use crate::forecast::{mean, std_dev};

use super::engine::{InsightContext, InsightRule};
use super::types::{Finding, Impact, InsightKind, Severity};

/// Flags the latest month when its spend deviates from the trailing series
/// by more than the configured z-score
pub struct MonthlyAnomalyInsight;

impl InsightRule for MonthlyAnomalyInsight {
    fn name(&self) -> &'static str {
        "monthly_anomaly"
    }

    fn analyze(&self, ctx: &InsightContext<'_>) -> Vec<Finding> {
        let trends = &ctx.analytics.monthly_trends;
        if trends.len() < 3 {
            return vec![];
        }

        let expenses: Vec<f64> = trends.iter().map(|m| m.expense).collect();
        let average = mean(&expenses);
        let sd = std_dev(&expenses);
        let last = *expenses.last().expect("series has at least three entries");
        let z_score = if sd > 0.0 { (last - average) / sd } else { 0.0 };

        if z_score.abs() <= ctx.config.anomaly_z_threshold {
            return vec![];
        }

        let severity = if z_score.abs() > ctx.config.anomaly_high_z {
            Severity::High
        } else {
            Severity::Medium
        };

        let (title, message, impact) = if z_score > 0.0 {
            (
                "Unusually high spending detected",
                format!(
                    "Last month's spending came in at {:.0}, well above your usual {:.0}. \
                     Review the month's transactions to find what drove it.",
                    last, average
                ),
                Impact::High,
            )
        } else {
            (
                "Unusually low spending detected",
                format!(
                    "Last month's spending of {:.0} was far below your usual {:.0}. Nice work.",
                    last, average
                ),
                Impact::Low,
            )
        };

        vec![Finding::new(
            InsightKind::Anomaly,
            impact,
            "Anomaly Detection",
            title,
            message,
        )
        .with_severity(severity)
        .with_data(serde_json::json!({
            "zScore": z_score,
            "lastMonthExpense": last,
            "averageExpense": average,
        }))]
    }
}
