//! Domain models for Fathom

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Transaction flow direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Transfer => "Transfer",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Income" => Ok(Self::Income),
            "Expense" => Ok(Self::Expense),
            "Transfer" => Ok(Self::Transfer),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A canonical financial transaction, immutable once normalized.
///
/// `date_iso` is the authoritative ordering key: an ISO-8601 timestamp whose
/// lexical order is chronological. Month buckets and date-range filters
/// operate on its `YYYY-MM` / `YYYY-MM-DD` prefixes; the accessor methods
/// below expose those plus lenient `chrono` parses for day-gap and weekday
/// math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// ISO-8601 timestamp; empty when the source record had no usable date
    pub date_iso: String,
    /// Account name ("Unknown" when the source record had none)
    pub account: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    /// Signed amount in the original currency
    pub amount: f64,
    /// Original currency code
    pub currency: String,
    /// Amount in the shared reporting currency, converted upstream
    pub converted_amount: f64,
    /// None when the stored type string was not one of Income/Expense/Transfer
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// Counterparty (person or company)
    pub person_company: Option<String>,
    pub description: Option<String>,
    /// Logging-only transaction: tallied in shadow totals, never in the
    /// regular flow used for forecasting or alerting
    pub excluded: bool,
}

impl Transaction {
    /// The `YYYY-MM-DD` portion of the timestamp (the whole string when shorter)
    pub fn date_part(&self) -> &str {
        self.date_iso.get(..10).unwrap_or(&self.date_iso)
    }

    /// The `YYYY-MM` month bucket key, or None when the date is missing
    pub fn month_key(&self) -> Option<&str> {
        self.date_iso.get(..7)
    }

    /// Calendar date of the transaction, if the timestamp parses
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_part(), "%Y-%m-%d").ok()
    }

    /// Full timestamp, falling back to midnight for date-only values
    pub fn datetime(&self) -> Option<NaiveDateTime> {
        chrono::DateTime::parse_from_rfc3339(&self.date_iso)
            .map(|dt| dt.naive_utc())
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(&self.date_iso, "%Y-%m-%dT%H:%M:%S").ok())
            .or_else(|| self.date().and_then(|d| d.and_hms_opt(0, 0, 0)))
    }

    pub fn is_income(&self) -> bool {
        self.kind == Some(TransactionType::Income)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == Some(TransactionType::Expense)
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == Some(TransactionType::Transfer)
    }
}

/// A raw stored or imported record, before normalization.
///
/// Fields arrive with whatever types the upstream store or import file used:
/// amounts may be numbers or strings, boolean-ish flags may be `true`, `1`,
/// `"true"` or `"1"`. The normalizer coerces all of it into [`Transaction`]
/// and never fails.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRecord {
    pub id: Option<i64>,
    pub date_iso: Option<String>,
    pub account: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub amount: serde_json::Value,
    pub currency: Option<String>,
    pub converted_amount: serde_json::Value,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub person_company: Option<String>,
    pub description: Option<String>,
    /// Exclude flag on the transaction itself
    pub exclude_from_reports: serde_json::Value,
    /// Exclude flag inherited from the transaction's category
    pub category_exclude_from_reports: serde_json::Value,
}

/// Alert rule trigger condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    LargeTransaction,
    BudgetLimit,
    MonthlyLimit,
    AccountBalance,
    RecurringDetection,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LargeTransaction => "LARGE_TRANSACTION",
            Self::BudgetLimit => "BUDGET_LIMIT",
            Self::MonthlyLimit => "MONTHLY_LIMIT",
            Self::AccountBalance => "ACCOUNT_BALANCE",
            Self::RecurringDetection => "RECURRING_DETECTION",
        }
    }
}

impl std::str::FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "LARGE_TRANSACTION" => Ok(Self::LargeTransaction),
            "BUDGET_LIMIT" => Ok(Self::BudgetLimit),
            "MONTHLY_LIMIT" => Ok(Self::MonthlyLimit),
            "ACCOUNT_BALANCE" => Ok(Self::AccountBalance),
            "RECURRING_DETECTION" => Ok(Self::RecurringDetection),
            _ => Err(format!("Unknown rule type: {}", s)),
        }
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accounting window granularity for threshold-based alert rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl AlertPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// First day of the accounting window containing `today`.
    /// Weekly windows start on the ISO Monday.
    pub fn period_start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => today,
            Self::Weekly => {
                today - Duration::days(today.weekday().num_days_from_monday() as i64)
            }
            Self::Monthly => today.with_day(1).expect("day 1 is always valid"),
            Self::Yearly => {
                NaiveDate::from_ymd_opt(today.year(), 1, 1).expect("Jan 1 is always valid")
            }
        }
    }

    /// Opaque identifier naming the accounting window containing `today`
    /// (`YYYY-MM-DD`, ISO `YYYY-Www`, `YYYY-MM`, `YYYY`). Used only for
    /// equality comparison when deduplicating alerts.
    pub fn period_id(&self, today: NaiveDate) -> String {
        match self {
            Self::Daily => today.format("%Y-%m-%d").to_string(),
            Self::Weekly => {
                let week = today.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Monthly => today.format("%Y-%m").to_string(),
            Self::Yearly => today.format("%Y").to_string(),
        }
    }
}

impl std::fmt::Display for AlertPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category scope of an alert rule.
///
/// Collapses the legacy single-id and multi-id rule fields into one filter
/// over canonical category names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    Any,
    OneOf(HashSet<String>),
}

impl CategoryFilter {
    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::OneOf(names) => category.is_some_and(|c| names.contains(c)),
        }
    }
}

/// Per-rule alert suppression state.
///
/// Lifecycle: created as `(0, "")`, advanced to `(90, P)` then `(100, P)` as
/// spending crosses thresholds within period `P`. It is never reset
/// explicitly: a rule is armed for a threshold level whenever the stored
/// period differs from the current one, regardless of the stored percentage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Suppression {
    /// Highest threshold already alerted in `period`: 0, 90 or 100
    pub percentage: u8,
    /// Opaque period identifier the percentage applies to, "" initially
    pub period: String,
}

impl Suppression {
    pub fn new(percentage: u8, period: impl Into<String>) -> Self {
        Self {
            percentage,
            period: period.into(),
        }
    }

    /// Whether an alert at `level` (90 or 100) may still fire for
    /// `current_period`. A new period always re-arms both levels.
    pub fn armed_for(&self, level: u8, current_period: &str) -> bool {
        self.period != current_period || self.percentage < level
    }
}

/// A persisted, externally-owned alert rule.
///
/// The engine mutates only `suppression`, and only through the store's
/// conditional update (see [`crate::alerts::AlertStore`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: i64,
    pub name: String,
    pub rule_type: RuleType,
    pub threshold: f64,
    /// Currency the threshold is expressed in (reporting currency)
    pub currency: String,
    pub categories: CategoryFilter,
    /// Optional account-name scope
    pub account: Option<String>,
    pub period: AlertPeriod,
    pub enabled: bool,
    pub suppression: Suppression,
}

impl AlertRule {
    /// Create a rule with default scope (any category, any account, monthly
    /// period, enabled, fresh suppression state). A negative threshold is a
    /// caller contract violation, not a data-quality condition.
    pub fn new(id: i64, rule_type: RuleType, threshold: f64) -> Result<Self> {
        let rule = Self {
            id,
            name: String::new(),
            rule_type,
            threshold,
            currency: String::new(),
            categories: CategoryFilter::Any,
            account: None,
            period: AlertPeriod::Monthly,
            enabled: true,
            suppression: Suppression::default(),
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_categories(mut self, categories: CategoryFilter) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_period(mut self, period: AlertPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold < 0.0 {
            return Err(Error::InvalidRule(format!(
                "rule {} has negative threshold {}",
                self.id, self.threshold
            )));
        }
        Ok(())
    }
}
