//! Aggregation engine
//!
//! Single-pass reduction of a transaction set into the analytics snapshot:
//! totals, per-category/account/month/currency breakdowns, blended
//! conversion rates, daily averages and date-range bookkeeping. Excluded
//! (logging-only) transactions are partitioned out first and tallied into
//! shadow totals; they never reach the aggregates consumed by forecasting,
//! scoring or alerting.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Transaction, TransactionType};

/// Per-category income/expense totals (reporting currency)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub income: f64,
    pub expense: f64,
}

/// Per-account totals plus the running balance.
/// Transfers apply to the balance by their signed amount; income adds,
/// expense subtracts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AccountTotals {
    pub income: f64,
    pub expense: f64,
    pub transfers: f64,
    pub balance: f64,
    pub transaction_count: u64,
}

/// Per-month totals
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MonthTotals {
    pub income: f64,
    pub expense: f64,
    pub transfers: f64,
    pub transaction_count: u64,
}

/// Per-currency totals in the original currency, alongside their converted
/// counterparts. The blended conversion rate is converted/original over all
/// flow in that currency, None when the original total is not positive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyTotals {
    pub income: f64,
    pub expense: f64,
    pub transfers: f64,
    pub income_converted: f64,
    pub expense_converted: f64,
    pub transfers_converted: f64,
    pub transaction_count: u64,
    pub conversion_rate: Option<f64>,
}

/// Per-account, per-currency sub-balances in the original currency.
/// Transfers are tracked but do not move these balances.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AccountCurrencyTotals {
    pub balance: f64,
    pub income: f64,
    pub expense: f64,
    pub transfers: f64,
}

/// One point of the ordered monthly trend series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM` month key
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub transfers: f64,
    pub net: f64,
    pub transaction_count: u64,
}

/// Date range actually covered by the aggregated transactions (ISO timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// The caller-requested date filter, date-only strings, inclusive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DailyAverages {
    pub income: f64,
    pub expense: f64,
}

/// The derived analytics snapshot. Ephemeral: recomputed per request,
/// suitable for direct serialization by an outer layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analytics {
    pub total_transactions: u64,
    pub total_income: f64,
    pub total_expense: f64,
    /// Signed sum of transfer amounts (account movements, not real flow)
    pub total_transfers: f64,
    pub net_balance: f64,
    /// Shadow totals for excluded (logging-only) transactions
    pub excluded_income: f64,
    pub excluded_expenses: f64,
    pub excluded_transactions: u64,
    /// Keyed `"category"` or `"category - subcategory"`
    pub by_category: BTreeMap<String, CategoryTotals>,
    pub by_account: BTreeMap<String, AccountTotals>,
    /// Keyed `YYYY-MM`; dateless transactions land under "Unknown"
    pub by_month: BTreeMap<String, MonthTotals>,
    pub by_currency: BTreeMap<String, CurrencyTotals>,
    pub account_currencies: BTreeMap<String, BTreeMap<String, AccountCurrencyTotals>>,
    /// (category, total) sorted descending; transfers and excluded never appear
    pub top_expense_categories: Vec<(String, f64)>,
    pub top_income_categories: Vec<(String, f64)>,
    /// Ascending by month key, one entry per distinct month present
    pub monthly_trends: Vec<MonthlyTrend>,
    pub date_range: Option<DateRange>,
    pub filter_range: FilterRange,
    pub daily_averages: DailyAverages,
}

impl Analytics {
    /// Count of regular (non-excluded) transactions in the snapshot
    pub fn regular_transactions(&self) -> u64 {
        self.total_transactions - self.excluded_transactions
    }

    /// Number of distinct months with data
    pub fn month_count(&self) -> usize {
        self.monthly_trends.len()
    }
}

fn in_range(tx: &Transaction, start: Option<&str>, end: Option<&str>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    if tx.date_iso.is_empty() {
        return false;
    }
    let date = tx.date_part();
    if start.is_some_and(|s| date < s) {
        return false;
    }
    if end.is_some_and(|e| date > e) {
        return false;
    }
    true
}

/// Number of whole days spanned by the covered range, at least 1
fn span_days(range: &DateRange) -> Option<f64> {
    let parse = |iso: &str| {
        chrono::DateTime::parse_from_rfc3339(iso)
            .map(|dt| dt.naive_utc())
            .ok()
            .or_else(|| {
                chrono::NaiveDate::parse_from_str(iso.get(..10).unwrap_or(iso), "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    };
    let start = parse(&range.start)?;
    let end = parse(&range.end)?;
    let days = (end - start).num_seconds() as f64 / 86_400.0;
    Some(days.ceil().max(1.0))
}

/// Compute the analytics snapshot over `transactions`, optionally restricted
/// to an inclusive `[start_date, end_date]` filter compared on the
/// `YYYY-MM-DD` portion of each timestamp. Single linear pass.
pub fn calculate_analytics(
    transactions: &[Transaction],
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Analytics {
    let filtered: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| in_range(t, start_date, end_date))
        .collect();

    // Partition before any totals: excluded transactions only ever feed the
    // shadow totals.
    let (excluded, regular): (Vec<&Transaction>, Vec<&Transaction>) =
        filtered.iter().copied().partition(|t| t.excluded);

    let mut analytics = Analytics {
        total_transactions: filtered.len() as u64,
        excluded_transactions: excluded.len() as u64,
        filter_range: FilterRange {
            start: start_date.map(str::to_string),
            end: end_date.map(str::to_string),
        },
        ..Default::default()
    };

    // Actual covered range, from all filtered transactions (excluded included)
    let mut range: Option<DateRange> = None;
    for tx in &filtered {
        if tx.date_iso.is_empty() {
            continue;
        }
        match &mut range {
            None => {
                range = Some(DateRange {
                    start: tx.date_iso.clone(),
                    end: tx.date_iso.clone(),
                })
            }
            Some(r) => {
                if tx.date_iso < r.start {
                    r.start = tx.date_iso.clone();
                }
                if tx.date_iso > r.end {
                    r.end = tx.date_iso.clone();
                }
            }
        }
    }
    analytics.date_range = range;

    for tx in &excluded {
        match tx.kind {
            Some(TransactionType::Income) => analytics.excluded_income += tx.converted_amount,
            Some(TransactionType::Expense) => analytics.excluded_expenses += tx.converted_amount,
            // Transfers never count toward the shadow totals
            _ => {}
        }
    }

    let mut top_expense: BTreeMap<String, f64> = BTreeMap::new();
    let mut top_income: BTreeMap<String, f64> = BTreeMap::new();

    for tx in &regular {
        let amount = tx.converted_amount;

        // Global totals. Transfers are account movements, tracked separately
        // and excluded from net income/expense. Unrecognized types count only
        // toward transaction counts.
        match tx.kind {
            Some(TransactionType::Transfer) => analytics.total_transfers += amount,
            Some(TransactionType::Income) => analytics.total_income += amount,
            Some(TransactionType::Expense) => analytics.total_expense += amount,
            None => {}
        }

        if let (Some(category), Some(kind)) = (tx.category.as_deref(), tx.kind) {
            if kind != TransactionType::Transfer {
                let key = match tx.subcategory.as_deref() {
                    Some(sub) => format!("{} - {}", category, sub),
                    None => category.to_string(),
                };
                let entry = analytics.by_category.entry(key).or_default();
                match kind {
                    TransactionType::Income => {
                        entry.income += amount;
                        *top_income.entry(category.to_string()).or_default() += amount;
                    }
                    TransactionType::Expense => {
                        entry.expense += amount;
                        *top_expense.entry(category.to_string()).or_default() += amount;
                    }
                    TransactionType::Transfer => {}
                }
            }
        }

        let account = analytics.by_account.entry(tx.account.clone()).or_default();
        match tx.kind {
            Some(TransactionType::Transfer) => {
                account.transfers += amount.abs();
                account.balance += amount;
            }
            Some(TransactionType::Income) => {
                account.income += amount;
                account.balance += amount;
            }
            Some(TransactionType::Expense) => {
                account.expense += amount;
                account.balance -= amount;
            }
            None => {}
        }
        account.transaction_count += 1;

        let month = tx.month_key().unwrap_or("Unknown").to_string();
        let month_totals = analytics.by_month.entry(month).or_default();
        match tx.kind {
            Some(TransactionType::Transfer) => month_totals.transfers += amount.abs(),
            Some(TransactionType::Income) => month_totals.income += amount,
            Some(TransactionType::Expense) => month_totals.expense += amount,
            None => {}
        }
        month_totals.transaction_count += 1;

        if !tx.currency.is_empty() {
            let currency = analytics.by_currency.entry(tx.currency.clone()).or_default();
            match tx.kind {
                Some(TransactionType::Transfer) => {
                    currency.transfers += tx.amount;
                    currency.transfers_converted += tx.converted_amount;
                }
                Some(TransactionType::Income) => {
                    currency.income += tx.amount;
                    currency.income_converted += tx.converted_amount;
                }
                Some(TransactionType::Expense) => {
                    currency.expense += tx.amount;
                    currency.expense_converted += tx.converted_amount;
                }
                None => {}
            }
            currency.transaction_count += 1;

            let sub = analytics
                .account_currencies
                .entry(tx.account.clone())
                .or_default()
                .entry(tx.currency.clone())
                .or_default();
            match tx.kind {
                Some(TransactionType::Transfer) => sub.transfers += tx.amount,
                Some(TransactionType::Income) => {
                    sub.income += tx.amount;
                    sub.balance += tx.amount;
                }
                Some(TransactionType::Expense) => {
                    sub.expense += tx.amount;
                    sub.balance -= tx.amount;
                }
                None => {}
            }
        }
    }

    analytics.net_balance = analytics.total_income - analytics.total_expense;

    if let Some(range) = &analytics.date_range {
        if let Some(days) = span_days(range) {
            analytics.daily_averages.income = analytics.total_income / days;
            analytics.daily_averages.expense = analytics.total_expense / days;
        }
    }

    // Blended conversion rate per currency, guarded against a non-positive
    // original-currency denominator
    for currency in analytics.by_currency.values_mut() {
        let original = currency.income + currency.expense + currency.transfers;
        let converted =
            currency.income_converted + currency.expense_converted + currency.transfers_converted;
        if original > 0.0 {
            currency.conversion_rate = Some(converted / original);
        }
    }

    let descending = |a: &(String, f64), b: &(String, f64)| {
        b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal)
    };
    analytics.top_expense_categories = top_expense.into_iter().collect();
    analytics.top_expense_categories.sort_by(descending);
    analytics.top_income_categories = top_income.into_iter().collect();
    analytics.top_income_categories.sort_by(descending);

    // BTreeMap iteration gives ascending month keys
    analytics.monthly_trends = analytics
        .by_month
        .iter()
        .map(|(month, totals)| MonthlyTrend {
            month: month.clone(),
            income: totals.income,
            expense: totals.expense,
            transfers: totals.transfers,
            net: totals.income - totals.expense,
            transaction_count: totals.transaction_count,
        })
        .collect();

    debug!(
        total = analytics.total_transactions,
        excluded = analytics.excluded_transactions,
        months = analytics.monthly_trends.len(),
        "analytics pass complete"
    );

    analytics
}

/// Ordered monthly expense series for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub category: String,
    pub monthly: Vec<MonthAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthAmount {
    pub month: String,
    pub amount: f64,
}

/// Per-category spending over time: regular, non-transfer expenses grouped
/// by category and month
pub fn category_trends(transactions: &[Transaction]) -> Vec<CategoryTrend> {
    let mut by_category: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

    for tx in transactions {
        if tx.excluded || !tx.is_expense() {
            continue;
        }
        let Some(category) = tx.category.as_deref() else {
            continue;
        };
        if category == "Transfer" {
            continue;
        }
        let month = tx.month_key().unwrap_or("Unknown").to_string();
        *by_category
            .entry(category.to_string())
            .or_default()
            .entry(month)
            .or_default() += tx.converted_amount;
    }

    by_category
        .into_iter()
        .map(|(category, months)| CategoryTrend {
            category,
            monthly: months
                .into_iter()
                .map(|(month, amount)| MonthAmount { month, amount })
                .collect(),
        })
        .collect()
}

/// One day of the cash-flow calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
    pub transaction_count: u64,
    pub transactions: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: i64,
    pub description: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
}

/// Daily income/expense breakdown over the covered (or requested) range,
/// with every day in the range present even when empty. Transfers and
/// excluded transactions are skipped.
pub fn cash_flow_calendar(
    transactions: &[Transaction],
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Vec<CalendarDay> {
    let parse = |s: &str| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();

    let mut start = start_date.and_then(parse);
    let mut end = end_date.and_then(parse);
    if start.is_none() || end.is_none() {
        for tx in transactions {
            let Some(date) = tx.date() else { continue };
            if start.is_none_or(|s| date < s) {
                start = Some(date);
            }
            if end.is_none_or(|e| date > e) {
                end = Some(date);
            }
        }
    }
    let (Some(start), Some(end)) = (start, end) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    let mut calendar: BTreeMap<String, CalendarDay> = BTreeMap::new();
    let mut current = start;
    while current <= end {
        let key = current.format("%Y-%m-%d").to_string();
        calendar.insert(
            key.clone(),
            CalendarDay {
                date: key,
                income: 0.0,
                expense: 0.0,
                net: 0.0,
                transaction_count: 0,
                transactions: Vec::new(),
            },
        );
        current += chrono::Duration::days(1);
    }

    for tx in transactions {
        if tx.excluded || tx.is_transfer() || tx.date_iso.is_empty() {
            continue;
        }
        let Some(day) = calendar.get_mut(tx.date_part()) else {
            continue;
        };
        let amount = tx.converted_amount;
        match tx.kind {
            Some(TransactionType::Income) => day.income += amount,
            Some(TransactionType::Expense) => day.expense += amount,
            _ => {}
        }
        day.net = day.income - day.expense;
        day.transaction_count += 1;
        day.transactions.push(CalendarEntry {
            id: tx.id,
            description: tx.description.clone(),
            amount,
            kind: tx.kind,
            category: tx.category.clone(),
        });
    }

    calendar.into_values().collect()
}
