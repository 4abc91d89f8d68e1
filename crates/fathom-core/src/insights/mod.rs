//! Insight generation
//!
//! Rule-based and statistical analyzers that turn the analytics snapshot,
//! forecast, spending patterns and merchant rollups into ranked
//! human-readable findings:
//! - Day-of-week and time-of-month spending outliers
//! - Top-merchant summary
//! - Month-over-month expense anomalies (z-score)
//! - Savings-rate and dominant-category recommendations

pub mod anomaly;
pub mod engine;
pub mod merchant;
pub mod recommendations;
pub mod spending_patterns;
pub mod types;

pub use anomaly::MonthlyAnomalyInsight;
pub use engine::{InsightConfig, InsightContext, InsightEngine, InsightRule};
pub use merchant::TopMerchantInsight;
pub use recommendations::{DominantCategoryInsight, SavingsRateInsight};
pub use spending_patterns::{DayOfWeekInsight, TimeOfMonthInsight};
pub use types::{Finding, Impact, InsightKind, Severity};
