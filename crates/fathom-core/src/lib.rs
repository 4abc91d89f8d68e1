//! Fathom Core Library
//!
//! The analytics and alerting engine for the Fathom personal finance tool:
//! - Normalization of raw stored/imported records into canonical transactions
//! - Single-pass aggregation into the analytics snapshot
//! - Multi-horizon forecasting with confidence bands and scenario planning
//! - Recurring-charge detection
//! - Composite financial health scoring
//! - Rule-based and statistical insight generation
//! - Stateful threshold-alert evaluation with per-period suppression
//!
//! Everything except the alert evaluator is a pure, re-entrant function over
//! an in-memory transaction list. The evaluator talks to an alert state
//! store and a notification sink through async collaborator traits; its
//! suppression updates go through a conditional compare-and-set so a
//! threshold crossing notifies at most once per accounting period, even
//! under concurrent transaction creation.

pub mod alerts;
pub mod analytics;
pub mod counterparty;
pub mod error;
pub mod forecast;
pub mod health;
pub mod insights;
pub mod merchants;
pub mod models;
pub mod normalize;
pub mod patterns;
pub mod recurring;
pub mod tips;
pub mod trends;

/// Test utilities: transaction builders and in-memory alert collaborators
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use alerts::{
    AlertEvaluator, AlertKind, AlertPayload, AlertStore, NotificationSink, TransactionEvent,
};
pub use analytics::{calculate_analytics, category_trends, cash_flow_calendar, Analytics};
pub use counterparty::{analyze_loans, debt_by_person, expenses_by_person, LoansReport};
pub use error::{Error, Result};
pub use forecast::{generate_forecast, Confidence, DataQuality, Forecast, ForecastConfig};
pub use health::{calculate_health_score, Grade, HealthScore};
pub use insights::{Finding, Impact, InsightConfig, InsightContext, InsightEngine, InsightKind};
pub use merchants::{analyze_merchants, MerchantSummary};
pub use models::{
    AlertPeriod, AlertRule, CategoryFilter, RawRecord, RuleType, Suppression, Transaction,
    TransactionType,
};
pub use normalize::{normalize, normalize_all, truthy_flag};
pub use patterns::{spending_patterns, SpendingPatterns};
pub use recurring::{detect_recurring, FrequencyClass, RecurringConfig, RecurringPattern};
pub use tips::{generate_savings_tips, SavingsTip, TipsConfig};
pub use trends::{spending_trends, spending_velocity, year_over_year};
