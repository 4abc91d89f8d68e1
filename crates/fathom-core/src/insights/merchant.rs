//! Top-merchant summary insight

use super::engine::{InsightContext, InsightRule};
use super::types::{Finding, Impact, InsightKind};

/// Summarizes where the most money goes
pub struct TopMerchantInsight;

impl InsightRule for TopMerchantInsight {
    fn name(&self) -> &'static str {
        "top_merchant"
    }

    fn analyze(&self, ctx: &InsightContext<'_>) -> Vec<Finding> {
        let Some(top) = ctx.merchants.first() else {
            return vec![];
        };
        if top.total_spent <= 0.0 {
            return vec![];
        }

        let months = ctx.analytics.monthly_trends.len().max(1) as f64;
        let monthly_average = top.total_spent / months;

        vec![Finding::new(
            InsightKind::Merchant,
            Impact::Low,
            "Merchant Analysis",
            format!("Top merchant: {}", top.name),
            format!(
                "You've spent an average of {:.0} per month at {} across {} transactions.",
                monthly_average, top.name, top.transaction_count
            ),
        )
        .with_data(serde_json::json!({
            "merchant": top.name,
            "totalSpent": top.total_spent,
            "transactionCount": top.transaction_count,
        }))]
    }
}
