//! Insight engine - orchestrates the built-in analyzers

use crate::analytics::Analytics;
use crate::forecast::Forecast;
use crate::merchants::MerchantSummary;
use crate::patterns::SpendingPatterns;

use super::anomaly::MonthlyAnomalyInsight;
use super::merchant::TopMerchantInsight;
use super::recommendations::{DominantCategoryInsight, SavingsRateInsight};
use super::spending_patterns::{DayOfWeekInsight, TimeOfMonthInsight};
use super::types::Finding;

/// Insight thresholds
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// A day counts as an outlier above this multiple of the weekly average
    pub day_of_week_multiplier: f64,
    /// A month span counts as an outlier above this multiple of the average
    pub time_of_month_multiplier: f64,
    /// Absolute z-score that flags a monthly expense anomaly
    pub anomaly_z_threshold: f64,
    /// Absolute z-score that escalates the anomaly to high severity
    pub anomaly_high_z: f64,
    /// Savings rate below this triggers the recommendation
    pub low_savings_rate: f64,
    /// Savings rate the recommendation suggests aiming for
    pub target_savings_rate: f64,
    /// Share of total expense above which a category dominates
    pub dominant_category_share: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            day_of_week_multiplier: 1.2,
            time_of_month_multiplier: 1.15,
            anomaly_z_threshold: 2.0,
            anomaly_high_z: 3.0,
            low_savings_rate: 0.10,
            target_savings_rate: 0.20,
            dominant_category_share: 0.30,
        }
    }
}

/// Everything the analyzers read from
pub struct InsightContext<'a> {
    pub analytics: &'a Analytics,
    pub forecast: &'a Forecast,
    pub patterns: &'a SpendingPatterns,
    pub merchants: &'a [MerchantSummary],
    pub config: &'a InsightConfig,
}

/// One rule-based or statistical analyzer
pub trait InsightRule: Send + Sync {
    /// Stable identifier for logging
    fn name(&self) -> &'static str;

    /// Inspect the context and produce zero or more findings
    fn analyze(&self, ctx: &InsightContext<'_>) -> Vec<Finding>;
}

/// The main insight engine
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in analyzers registered
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };
        engine.register(Box::new(DayOfWeekInsight));
        engine.register(Box::new(TimeOfMonthInsight));
        engine.register(Box::new(TopMerchantInsight));
        engine.register(Box::new(MonthlyAnomalyInsight));
        engine.register(Box::new(SavingsRateInsight));
        engine.register(Box::new(DominantCategoryInsight));
        engine
    }

    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Run every analyzer and collect findings, ranked high > medium > low
    pub fn analyze_all(&self, ctx: &InsightContext<'_>) -> Vec<Finding> {
        let mut findings = vec![];

        for rule in &self.rules {
            let produced = rule.analyze(ctx);
            tracing::debug!(
                rule = rule.name(),
                count = produced.len(),
                "insight analysis complete"
            );
            findings.extend(produced);
        }

        findings.sort_by(|a, b| b.impact.priority().cmp(&a.impact.priority()));
        findings
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}
