//! Actionable recommendations: savings rate and dominant categories

use super::engine::{InsightContext, InsightRule};
use super::types::{Finding, Impact, InsightKind};

/// Recommends raising a low savings rate
pub struct SavingsRateInsight;

impl InsightRule for SavingsRateInsight {
    fn name(&self) -> &'static str {
        "savings_rate"
    }

    fn analyze(&self, ctx: &InsightContext<'_>) -> Vec<Finding> {
        let analytics = ctx.analytics;
        if analytics.total_income <= 0.0 {
            return vec![];
        }
        let savings_rate = analytics.net_balance / analytics.total_income;
        if savings_rate >= ctx.config.low_savings_rate {
            return vec![];
        }

        vec![Finding::new(
            InsightKind::Recommendation,
            Impact::High,
            "Recommendations",
            "Increase your savings rate",
            format!(
                "Your current savings rate is {:.1}%. Aim for at least {:.0}% to build \
                 a strong financial foundation.",
                savings_rate * 100.0,
                ctx.config.target_savings_rate * 100.0
            ),
        )
        .with_action(
            "Review your top expense categories and identify areas to reduce spending.",
        )]
    }
}

/// Recommends reviewing a category that dominates total expenses
pub struct DominantCategoryInsight;

impl InsightRule for DominantCategoryInsight {
    fn name(&self) -> &'static str {
        "dominant_category"
    }

    fn analyze(&self, ctx: &InsightContext<'_>) -> Vec<Finding> {
        let analytics = ctx.analytics;
        let Some((category, amount)) = analytics.top_expense_categories.first() else {
            return vec![];
        };
        if analytics.total_expense <= 0.0 {
            return vec![];
        }
        let share = amount / analytics.total_expense;
        if share <= ctx.config.dominant_category_share {
            return vec![];
        }

        vec![Finding::new(
            InsightKind::Recommendation,
            Impact::High,
            "Recommendations",
            format!("Focus on {} spending", category),
            format!(
                "{} accounts for {:.1}% of your expenses. Consider reviewing this \
                 category for optimization opportunities.",
                category,
                share * 100.0
            ),
        )
        .with_action(format!(
            "Review your {} transactions and identify ways to reduce spending.",
            category
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::calculate_analytics;
    use crate::forecast::Forecast;
    use crate::insights::engine::InsightConfig;
    use crate::models::{Transaction, TransactionType::*};
    use crate::patterns::spending_patterns;
    use crate::test_utils::TransactionBuilder;

    fn run_rules(txs: &[Transaction]) -> (Vec<Finding>, Vec<Finding>) {
        let analytics = calculate_analytics(txs, None, None);
        let patterns = spending_patterns(txs);
        let forecast = Forecast::default();
        let config = InsightConfig::default();
        let ctx = InsightContext {
            analytics: &analytics,
            forecast: &forecast,
            patterns: &patterns,
            merchants: &[],
            config: &config,
        };
        (
            SavingsRateInsight.analyze(&ctx),
            DominantCategoryInsight.analyze(&ctx),
        )
    }

    #[test]
    fn test_low_savings_rate_triggers() {
        let txs = vec![
            TransactionBuilder::new(1, "2024-05-01T00:00:00.000Z")
                .kind(Income)
                .category("Salary")
                .amount(1000.0)
                .build(),
            TransactionBuilder::new(2, "2024-05-10T00:00:00.000Z")
                .kind(Expense)
                .category("Food")
                .amount(950.0)
                .build(),
        ];
        let (savings, _) = run_rules(&txs);
        assert_eq!(savings.len(), 1);
        assert_eq!(savings[0].impact, Impact::High);
        assert!(savings[0].message.contains("5.0%"));
        assert!(savings[0].action.is_some());
    }

    #[test]
    fn test_healthy_savings_rate_not_flagged() {
        let txs = vec![
            TransactionBuilder::new(1, "2024-05-01T00:00:00.000Z")
                .kind(Income)
                .category("Salary")
                .amount(1000.0)
                .build(),
            TransactionBuilder::new(2, "2024-05-10T00:00:00.000Z")
                .kind(Expense)
                .category("Food")
                .amount(500.0)
                .build(),
        ];
        let (savings, _) = run_rules(&txs);
        assert!(savings.is_empty());
    }

    #[test]
    fn test_dominant_category_flagged() {
        let txs = vec![
            TransactionBuilder::new(1, "2024-05-01T00:00:00.000Z")
                .kind(Expense)
                .category("Rent")
                .amount(900.0)
                .build(),
            TransactionBuilder::new(2, "2024-05-10T00:00:00.000Z")
                .kind(Expense)
                .category("Food")
                .amount(100.0)
                .build(),
        ];
        let (_, dominant) = run_rules(&txs);
        assert_eq!(dominant.len(), 1);
        assert!(dominant[0].title.contains("Rent"));
        assert!(dominant[0].message.contains("90.0%"));
    }

    #[test]
    fn test_balanced_categories_not_flagged() {
        let txs: Vec<Transaction> = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, cat)| {
                TransactionBuilder::new(i as i64, "2024-05-01T00:00:00.000Z")
                    .kind(Expense)
                    .category(cat)
                    .amount(100.0)
                    .build()
            })
            .collect();
        let (_, dominant) = run_rules(&txs);
        assert!(dominant.is_empty());
    }
}
