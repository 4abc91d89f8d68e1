//! Savings tips
//!
//! Heuristic suggestions derived from the analytics snapshot. The reduction
//! percentages are rough planning figures, configurable rather than baked in.

use serde::{Deserialize, Serialize};

use crate::analytics::Analytics;
use crate::insights::Impact;

/// Tunable thresholds and assumed reduction rates for the tips
#[derive(Debug, Clone)]
pub struct TipsConfig {
    /// Savings rate worth aiming for
    pub target_savings_rate: f64,
    /// Monthly food spend above this triggers the food tip
    pub food_monthly_threshold: f64,
    pub food_reduction: f64,
    /// Monthly transport spend above this triggers the transport tip
    pub transport_monthly_threshold: f64,
    pub transport_reduction: f64,
    pub shopping_reduction: f64,
    /// Average daily expense above this triggers the daily-habits tip
    pub daily_expense_threshold: f64,
    pub daily_reduction: f64,
    /// Share of total expense above which a category gets its own tip
    pub dominant_category_share: f64,
    pub dominant_reduction: f64,
    /// Emergency-fund coverage to aim for, in months of expenses
    pub emergency_fund_months: f64,
}

impl Default for TipsConfig {
    fn default() -> Self {
        Self {
            target_savings_rate: 0.20,
            food_monthly_threshold: 500.0,
            food_reduction: 0.15,
            transport_monthly_threshold: 200.0,
            transport_reduction: 0.10,
            shopping_reduction: 0.20,
            daily_expense_threshold: 100.0,
            daily_reduction: 0.15,
            dominant_category_share: 0.30,
            dominant_reduction: 0.10,
            emergency_fund_months: 3.0,
        }
    }
}

/// One savings suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsTip {
    pub category: String,
    pub title: String,
    pub message: String,
    pub impact: Impact,
    pub potential_savings: f64,
}

fn category_total(analytics: &Analytics, category: &str) -> f64 {
    analytics
        .top_expense_categories
        .iter()
        .find(|(c, _)| c == category)
        .map(|(_, total)| *total)
        .unwrap_or(0.0)
}

/// Generate savings tips from the snapshot, sorted by impact descending.
pub fn generate_savings_tips(analytics: &Analytics, config: &TipsConfig) -> Vec<SavingsTip> {
    let mut tips = Vec::new();
    let months = analytics.monthly_trends.len().max(1) as f64;

    let savings_rate = if analytics.total_income > 0.0 {
        analytics.net_balance / analytics.total_income
    } else {
        0.0
    };
    if analytics.total_income > 0.0 && savings_rate < config.target_savings_rate {
        tips.push(SavingsTip {
            category: "General".to_string(),
            title: "Increase Your Savings Rate".to_string(),
            message: format!(
                "You're currently saving {:.1}% of your income. Aim for at least {:.0}% \
                 to build a strong financial foundation.",
                savings_rate * 100.0,
                config.target_savings_rate * 100.0
            ),
            impact: Impact::High,
            potential_savings: analytics.total_income * config.target_savings_rate
                - analytics.net_balance,
        });
    }

    let food_spending = category_total(analytics, "Food");
    if food_spending > 0.0 {
        let monthly_food = food_spending / months;
        if monthly_food > config.food_monthly_threshold {
            tips.push(SavingsTip {
                category: "Food".to_string(),
                title: "Optimize Food Spending".to_string(),
                message: format!(
                    "You're spending {:.0} per month on food. Meal planning, buying in \
                     bulk and fewer restaurant visits can trim {:.0}%.",
                    monthly_food,
                    config.food_reduction * 100.0
                ),
                impact: Impact::Medium,
                potential_savings: food_spending * config.food_reduction,
            });
        }
    }

    let wheels_spending = category_total(analytics, "Wheels");
    if wheels_spending > 0.0 {
        let monthly_wheels = wheels_spending / months;
        if monthly_wheels > config.transport_monthly_threshold {
            tips.push(SavingsTip {
                category: "Transportation".to_string(),
                title: "Review Transportation Costs".to_string(),
                message: format!(
                    "Transportation costs are {:.0} per month. Carpooling, public \
                     transport or walking short distances would bring them down.",
                    monthly_wheels
                ),
                impact: Impact::Medium,
                potential_savings: wheels_spending * config.transport_reduction,
            });
        }
    }

    let shopping_spending = category_total(analytics, "Shopping");
    if shopping_spending > 0.0 {
        tips.push(SavingsTip {
            category: "Shopping".to_string(),
            title: "Reduce Impulse Purchases".to_string(),
            message: format!(
                "You've spent {:.0} on shopping. Try the 24-hour rule: wait a day \
                 before making non-essential purchases.",
                shopping_spending
            ),
            impact: Impact::Low,
            potential_savings: shopping_spending * config.shopping_reduction,
        });
    }

    let daily_expense = analytics.daily_averages.expense;
    if daily_expense > config.daily_expense_threshold {
        tips.push(SavingsTip {
            category: "Daily Habits".to_string(),
            title: "Track Daily Spending".to_string(),
            message: format!(
                "Your average daily expense is {:.0}. Small purchases add up quickly; \
                 track every purchase for a week to spot the unnecessary ones.",
                daily_expense
            ),
            impact: Impact::Medium,
            potential_savings: daily_expense * config.daily_reduction * 30.0,
        });
    }

    if let Some((category, amount)) = analytics.top_expense_categories.first() {
        if analytics.total_expense > 0.0
            && *amount > analytics.total_expense * config.dominant_category_share
        {
            tips.push(SavingsTip {
                category: category.clone(),
                title: format!("Focus on {} Spending", category),
                message: format!(
                    "{} accounts for {:.1}% of your expenses. Review this category for \
                     optimization opportunities.",
                    category,
                    amount / analytics.total_expense * 100.0
                ),
                impact: Impact::High,
                potential_savings: amount * config.dominant_reduction,
            });
        }
    }

    if analytics.net_balance > 0.0 {
        let monthly_expense = analytics.total_expense / months;
        if monthly_expense > 0.0 {
            let months_covered = analytics.net_balance / monthly_expense;
            if months_covered < config.emergency_fund_months {
                tips.push(SavingsTip {
                    category: "Emergency Fund".to_string(),
                    title: "Build Emergency Fund".to_string(),
                    message: format!(
                        "You have {:.1} months of expenses saved. Aim for {:.0}-6 months \
                         as an emergency fund.",
                        months_covered, config.emergency_fund_months
                    ),
                    impact: Impact::High,
                    potential_savings: 0.0,
                });
            }
        }
    }

    tips.sort_by(|a, b| b.impact.priority().cmp(&a.impact.priority()));
    tips
}
