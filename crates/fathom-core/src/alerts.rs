//! Alert rule evaluation
//!
//! Invoked synchronously whenever a new transaction is persisted. Each
//! enabled rule is checked against the transaction and the current-period
//! spend; threshold-based rules carry suppression state so a crossing fires
//! at most once per accounting period.
//!
//! The suppression state is the one piece of mutable shared state in the
//! engine. Two transactions committed concurrently can both observe the
//! pre-update state and both decide to fire, so the read-check-write
//! sequence is serialized through the store's compare-and-set: a rule only
//! notifies after its CAS succeeds, and a failed CAS re-reads the fresh
//! state and re-decides.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{AlertPeriod, AlertRule, RuleType, Suppression, Transaction};
use crate::recurring::RecurringPattern;

/// Warning threshold, percent of the rule's limit
pub const WARNING_LEVEL: u8 = 90;
/// Exceeded threshold, percent of the rule's limit
pub const EXCEEDED_LEVEL: u8 = 100;

/// Bound on CAS retries when racing other writers
const MAX_CAS_ATTEMPTS: u32 = 8;

/// What kind of notification is being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LargeTransaction,
    BudgetWarning,
    BudgetExceeded,
    MonthlyLimitWarning,
    MonthlyLimitExceeded,
    AccountBalance,
    RecurringCharge,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LargeTransaction => "large_transaction",
            Self::BudgetWarning => "budget_warning",
            Self::BudgetExceeded => "budget_exceeded",
            Self::MonthlyLimitWarning => "monthly_limit_warning",
            Self::MonthlyLimitExceeded => "monthly_limit_exceeded",
            Self::AccountBalance => "account_balance",
            Self::RecurringCharge => "recurring_charge",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a notification sink needs to render an alert
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertPayload {
    pub rule_id: i64,
    pub rule_name: String,
    pub transaction_id: Option<i64>,
    pub description: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub category: Option<String>,
    pub account: Option<String>,
    /// Spend accumulated in the current period, for threshold rules
    pub spent: Option<f64>,
    pub threshold: f64,
    /// Spend as a percentage of the threshold
    pub percentage: Option<f64>,
    /// Current account balance, for balance rules
    pub balance: Option<f64>,
    pub period_id: Option<String>,
}

/// The transaction-creation event handed to the evaluator. The collaborator
/// that persisted the transaction supplies the owning account's current
/// balance alongside it.
#[derive(Debug, Clone)]
pub struct TransactionEvent {
    pub transaction: Transaction,
    pub account_balance: f64,
}

/// Alert state store collaborator.
///
/// The suppression update is conditional: it must atomically replace the
/// stored state only when it still equals `expected`, and report whether it
/// did. That single primitive is what makes alert emission idempotent under
/// concurrent evaluation.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn get_rule(&self, id: i64) -> Result<Option<AlertRule>>;

    /// List enabled rules, optionally restricted to those whose scope
    /// matches a category or account name.
    async fn list_enabled_rules(
        &self,
        category: Option<&str>,
        account: Option<&str>,
    ) -> Result<Vec<AlertRule>>;

    /// Compare-and-set the suppression state of one rule. Returns true when
    /// the swap happened.
    async fn compare_and_set_suppression(
        &self,
        rule_id: i64,
        expected: &Suppression,
        next: &Suppression,
    ) -> Result<bool>;
}

/// Notification delivery collaborator. Best-effort: returns false on
/// failure and never blocks the evaluation path beyond its own bounded
/// timeout.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, kind: AlertKind, payload: &AlertPayload) -> bool;
}

/// Evaluates persisted alert rules against new transactions
pub struct AlertEvaluator<'a> {
    store: &'a dyn AlertStore,
    sink: &'a dyn NotificationSink,
}

impl<'a> AlertEvaluator<'a> {
    pub fn new(store: &'a dyn AlertStore, sink: &'a dyn NotificationSink) -> Self {
        Self { store, sink }
    }

    /// Evaluate every enabled rule against a newly created transaction.
    ///
    /// `history` is the user's full transaction set including the new
    /// transaction; period-limit rules re-run a scoped aggregation pass over
    /// it. `today` anchors the accounting periods.
    ///
    /// Rules are isolated from each other: one rule's failure is logged and
    /// the rest still run. Returns the kinds that were emitted.
    pub async fn evaluate_transaction(
        &self,
        event: &TransactionEvent,
        history: &[Transaction],
        today: NaiveDate,
    ) -> Result<Vec<AlertKind>> {
        let rules = self.store.list_enabled_rules(None, None).await?;
        if rules.is_empty() {
            return Ok(vec![]);
        }

        let mut emitted = Vec::new();
        for rule in rules {
            match self.check_rule(&rule, event, history, today).await {
                Ok(Some(kind)) => emitted.push(kind),
                Ok(None) => {}
                Err(e) => {
                    warn!(rule_id = rule.id, error = %e, "alert rule evaluation failed");
                }
            }
        }

        debug!(
            transaction_id = event.transaction.id,
            emitted = emitted.len(),
            "alert evaluation complete"
        );
        Ok(emitted)
    }

    async fn check_rule(
        &self,
        rule: &AlertRule,
        event: &TransactionEvent,
        history: &[Transaction],
        today: NaiveDate,
    ) -> Result<Option<AlertKind>> {
        rule.validate()?;

        let tx = &event.transaction;
        if !rule.categories.matches(tx.category.as_deref()) {
            return Ok(None);
        }
        if let Some(account) = rule.account.as_deref() {
            if account != tx.account {
                return Ok(None);
            }
        }

        match rule.rule_type {
            RuleType::LargeTransaction => {
                if !tx.is_expense() || tx.amount.abs() < rule.threshold {
                    return Ok(None);
                }
                let payload = self.payload_for(rule, tx);
                self.deliver(AlertKind::LargeTransaction, &payload).await;
                Ok(Some(AlertKind::LargeTransaction))
            }
            RuleType::BudgetLimit => {
                if !tx.is_expense() {
                    return Ok(None);
                }
                self.check_period_limit(
                    rule,
                    tx,
                    history,
                    today,
                    rule.period,
                    true,
                    AlertKind::BudgetWarning,
                    AlertKind::BudgetExceeded,
                )
                .await
            }
            RuleType::MonthlyLimit => {
                if !tx.is_expense() {
                    return Ok(None);
                }
                // Monthly limits always use the calendar month, so the spend
                // window and the suppression period id agree
                self.check_period_limit(
                    rule,
                    tx,
                    history,
                    today,
                    AlertPeriod::Monthly,
                    false,
                    AlertKind::MonthlyLimitWarning,
                    AlertKind::MonthlyLimitExceeded,
                )
                .await
            }
            RuleType::AccountBalance => {
                if event.account_balance > rule.threshold {
                    return Ok(None);
                }
                let mut payload = self.payload_for(rule, tx);
                payload.balance = Some(event.account_balance);
                self.deliver(AlertKind::AccountBalance, &payload).await;
                Ok(Some(AlertKind::AccountBalance))
            }
            // Recurring rules run in the batch path, not per transaction
            RuleType::RecurringDetection => Ok(None),
        }
    }

    /// Regular (non-excluded) expense spend since the period start,
    /// optionally scoped to the rule's category filter. Converted amounts
    /// are preferred, falling back to the original amount when no conversion
    /// was recorded.
    fn period_spend(
        rule: &AlertRule,
        history: &[Transaction],
        period_start: NaiveDate,
        scoped: bool,
    ) -> f64 {
        let start = period_start.format("%Y-%m-%d").to_string();
        history
            .iter()
            .filter(|t| !t.excluded && t.is_expense())
            .filter(|t| !t.date_iso.is_empty() && t.date_part() >= start.as_str())
            .filter(|t| !scoped || rule.categories.matches(t.category.as_deref()))
            .map(|t| {
                if t.converted_amount != 0.0 {
                    t.converted_amount.abs()
                } else {
                    t.amount.abs()
                }
            })
            .sum()
    }

    #[allow(clippy::too_many_arguments)]
    async fn check_period_limit(
        &self,
        rule: &AlertRule,
        tx: &Transaction,
        history: &[Transaction],
        today: NaiveDate,
        period: AlertPeriod,
        scoped: bool,
        warning_kind: AlertKind,
        exceeded_kind: AlertKind,
    ) -> Result<Option<AlertKind>> {
        if rule.threshold == 0.0 {
            return Ok(None);
        }

        let period_start = period.period_start(today);
        let period_id = period.period_id(today);
        let spend = Self::period_spend(rule, history, period_start, scoped);
        let percentage = spend / rule.threshold * 100.0;

        let (level, kind) = if percentage >= EXCEEDED_LEVEL as f64 {
            (EXCEEDED_LEVEL, exceeded_kind)
        } else if percentage >= WARNING_LEVEL as f64 {
            (WARNING_LEVEL, warning_kind)
        } else {
            return Ok(None);
        };

        // Serialize the read-check-write against concurrent evaluations:
        // only the writer whose CAS lands gets to notify. On a lost race the
        // fresh state decides whether this level still needs to fire.
        let mut current = rule.suppression.clone();
        let mut attempts = 0;
        loop {
            if !current.armed_for(level, &period_id) {
                return Ok(None);
            }
            let next = Suppression::new(level, period_id.clone());
            if self
                .store
                .compare_and_set_suppression(rule.id, &current, &next)
                .await?
            {
                break;
            }
            attempts += 1;
            if attempts >= MAX_CAS_ATTEMPTS {
                debug!(rule_id = rule.id, "giving up after repeated CAS races");
                return Ok(None);
            }
            match self.store.get_rule(rule.id).await? {
                Some(fresh) => current = fresh.suppression,
                None => return Ok(None),
            }
        }

        let mut payload = self.payload_for(rule, tx);
        payload.spent = Some(spend);
        payload.percentage = Some(percentage);
        payload.period_id = Some(period_id);
        self.deliver(kind, &payload).await;
        info!(
            rule_id = rule.id,
            kind = kind.as_str(),
            spent = spend,
            threshold = rule.threshold,
            "threshold alert emitted"
        );
        Ok(Some(kind))
    }

    /// Batch path for RECURRING_DETECTION rules: notify for each detected
    /// pattern whose mean amount reaches the rule's threshold.
    pub async fn evaluate_recurring_rules(
        &self,
        patterns: &[RecurringPattern],
    ) -> Result<Vec<AlertKind>> {
        let rules = self.store.list_enabled_rules(None, None).await?;
        let mut emitted = Vec::new();

        for rule in rules {
            if rule.rule_type != RuleType::RecurringDetection {
                continue;
            }
            if let Err(e) = rule.validate() {
                warn!(rule_id = rule.id, error = %e, "skipping invalid recurring rule");
                continue;
            }
            for pattern in patterns {
                if pattern.amount.abs() < rule.threshold {
                    continue;
                }
                if !rule.categories.matches(pattern.category.as_deref()) {
                    continue;
                }
                let payload = AlertPayload {
                    rule_id: rule.id,
                    rule_name: rule.name.clone(),
                    description: Some(pattern.description.clone()),
                    amount: pattern.amount,
                    currency: pattern.currency.clone(),
                    category: pattern.category.clone(),
                    threshold: rule.threshold,
                    ..Default::default()
                };
                self.deliver(AlertKind::RecurringCharge, &payload).await;
                emitted.push(AlertKind::RecurringCharge);
            }
        }
        Ok(emitted)
    }

    fn payload_for(&self, rule: &AlertRule, tx: &Transaction) -> AlertPayload {
        AlertPayload {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            transaction_id: Some(tx.id),
            description: tx.description.clone(),
            amount: tx.amount,
            currency: tx.currency.clone(),
            category: tx.category.clone(),
            account: Some(tx.account.clone()),
            threshold: rule.threshold,
            ..Default::default()
        }
    }

    /// Fire-and-forget delivery: failures are logged and swallowed so they
    /// never affect the transaction-creation response.
    async fn deliver(&self, kind: AlertKind, payload: &AlertPayload) {
        if !self.sink.notify(kind, payload).await {
            warn!(
                rule_id = payload.rule_id,
                kind = kind.as_str(),
                "alert notification delivery failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryFilter, TransactionType::*};
    use crate::recurring::{detect_recurring, RecurringConfig};
    use crate::test_utils::{MemoryAlertStore, RecordingSink, TransactionBuilder};

    fn expense(id: i64, date: &str, category: &str, amount: f64) -> Transaction {
        TransactionBuilder::new(id, date)
            .kind(Expense)
            .category(category)
            .amount(amount)
            .build()
    }

    fn event(tx: Transaction) -> TransactionEvent {
        TransactionEvent {
            transaction: tx,
            account_balance: 1000.0,
        }
    }

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[tokio::test]
    async fn test_large_transaction_fires_immediately() {
        let store = MemoryAlertStore::new();
        store.insert_rule(
            AlertRule::new(1, RuleType::LargeTransaction, 500.0)
                .unwrap()
                .with_name("Big spend"),
        );
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        let tx = expense(1, "2024-05-10T00:00:00.000Z", "Electronics", 750.0);
        let emitted = evaluator
            .evaluate_transaction(&event(tx.clone()), &[tx], may(10))
            .await
            .unwrap();
        assert_eq!(emitted, vec![AlertKind::LargeTransaction]);
        assert_eq!(sink.count_of(AlertKind::LargeTransaction), 1);

        // Below the threshold: nothing fires
        let small = expense(2, "2024-05-11T00:00:00.000Z", "Electronics", 100.0);
        let emitted = evaluator
            .evaluate_transaction(&event(small.clone()), &[small], may(11))
            .await
            .unwrap();
        assert!(emitted.is_empty());
    }

    #[tokio::test]
    async fn test_budget_limit_state_machine() {
        let store = MemoryAlertStore::new();
        store.insert_rule(AlertRule::new(1, RuleType::BudgetLimit, 1000.0).unwrap());
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        // Spend reaches 901: exactly one 90% warning
        let mut history = vec![expense(1, "2024-05-02T00:00:00.000Z", "Food", 901.0)];
        let emitted = evaluator
            .evaluate_transaction(&event(history[0].clone()), &history, may(2))
            .await
            .unwrap();
        assert_eq!(emitted, vec![AlertKind::BudgetWarning]);
        assert_eq!(
            store.suppression_of(1),
            Suppression::new(90, "2024-05")
        );

        // A second expense keeps the total under 100%: nothing fires
        history.push(expense(2, "2024-05-05T00:00:00.000Z", "Food", 49.0));
        let emitted = evaluator
            .evaluate_transaction(&event(history[1].clone()), &history, may(5))
            .await
            .unwrap();
        assert!(emitted.is_empty());
        assert_eq!(sink.count_of(AlertKind::BudgetWarning), 1);

        // Crossing 100% in the same period fires exactly one exceeded alert
        history.push(expense(3, "2024-05-08T00:00:00.000Z", "Food", 100.0));
        let emitted = evaluator
            .evaluate_transaction(&event(history[2].clone()), &history, may(8))
            .await
            .unwrap();
        assert_eq!(emitted, vec![AlertKind::BudgetExceeded]);
        assert_eq!(
            store.suppression_of(1),
            Suppression::new(100, "2024-05")
        );

        // Re-posting within the period: fully suppressed
        history.push(expense(4, "2024-05-09T00:00:00.000Z", "Food", 10.0));
        let emitted = evaluator
            .evaluate_transaction(&event(history[3].clone()), &history, may(9))
            .await
            .unwrap();
        assert!(emitted.is_empty());
        assert_eq!(sink.count_of(AlertKind::BudgetExceeded), 1);

        // A new period re-arms the 90% check even though the stored
        // percentage is still 100
        let june = vec![expense(5, "2024-06-01T00:00:00.000Z", "Food", 950.0)];
        let emitted = evaluator
            .evaluate_transaction(
                &event(june[0].clone()),
                &june,
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(emitted, vec![AlertKind::BudgetWarning]);
        assert_eq!(
            store.suppression_of(1),
            Suppression::new(90, "2024-06")
        );
    }

    #[tokio::test]
    async fn test_budget_limit_scoped_to_category_filter() {
        let store = MemoryAlertStore::new();
        store.insert_rule(
            AlertRule::new(1, RuleType::BudgetLimit, 100.0)
                .unwrap()
                .with_categories(CategoryFilter::OneOf(
                    ["Food".to_string()].into_iter().collect(),
                )),
        );
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        // A large expense in another category neither matches the rule nor
        // counts toward its spend
        let history = vec![
            expense(1, "2024-05-02T00:00:00.000Z", "Electronics", 5000.0),
            expense(2, "2024-05-03T00:00:00.000Z", "Food", 50.0),
        ];
        let emitted = evaluator
            .evaluate_transaction(&event(history[1].clone()), &history, may(3))
            .await
            .unwrap();
        assert!(emitted.is_empty());

        // Food alone crossing the threshold fires
        let history = vec![
            expense(1, "2024-05-02T00:00:00.000Z", "Electronics", 5000.0),
            expense(2, "2024-05-03T00:00:00.000Z", "Food", 50.0),
            expense(3, "2024-05-04T00:00:00.000Z", "Food", 60.0),
        ];
        let emitted = evaluator
            .evaluate_transaction(&event(history[2].clone()), &history, may(4))
            .await
            .unwrap();
        assert_eq!(emitted, vec![AlertKind::BudgetExceeded]);
        let (_, payload) = sink.sent().pop().unwrap();
        assert_eq!(payload.spent, Some(110.0));
    }

    #[tokio::test]
    async fn test_excluded_transactions_never_count_toward_spend() {
        let store = MemoryAlertStore::new();
        store.insert_rule(AlertRule::new(1, RuleType::BudgetLimit, 100.0).unwrap());
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        let excluded = TransactionBuilder::new(1, "2024-05-02T00:00:00.000Z")
            .kind(Expense)
            .category("Rent")
            .amount(2000.0)
            .excluded(true)
            .build();
        let regular = expense(2, "2024-05-03T00:00:00.000Z", "Food", 50.0);
        let history = vec![excluded, regular.clone()];

        let emitted = evaluator
            .evaluate_transaction(&event(regular), &history, may(3))
            .await
            .unwrap();
        assert!(emitted.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_limit_counts_all_categories() {
        let store = MemoryAlertStore::new();
        store.insert_rule(AlertRule::new(1, RuleType::MonthlyLimit, 100.0).unwrap());
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        let history = vec![
            expense(1, "2024-05-02T00:00:00.000Z", "Electronics", 80.0),
            expense(2, "2024-05-03T00:00:00.000Z", "Food", 30.0),
        ];
        let emitted = evaluator
            .evaluate_transaction(&event(history[1].clone()), &history, may(3))
            .await
            .unwrap();
        assert_eq!(emitted, vec![AlertKind::MonthlyLimitExceeded]);
    }

    #[tokio::test]
    async fn test_account_balance_rule() {
        let store = MemoryAlertStore::new();
        store.insert_rule(AlertRule::new(1, RuleType::AccountBalance, 200.0).unwrap());
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        let tx = expense(1, "2024-05-10T00:00:00.000Z", "Food", 50.0);
        let low = TransactionEvent {
            transaction: tx.clone(),
            account_balance: 150.0,
        };
        let emitted = evaluator
            .evaluate_transaction(&low, &[tx.clone()], may(10))
            .await
            .unwrap();
        assert_eq!(emitted, vec![AlertKind::AccountBalance]);
        let (_, payload) = sink.sent().pop().unwrap();
        assert_eq!(payload.balance, Some(150.0));

        let healthy = TransactionEvent {
            transaction: tx.clone(),
            account_balance: 500.0,
        };
        let emitted = evaluator
            .evaluate_transaction(&healthy, &[tx], may(10))
            .await
            .unwrap();
        assert!(emitted.is_empty());
    }

    #[tokio::test]
    async fn test_account_filter_gates_rules() {
        let store = MemoryAlertStore::new();
        store.insert_rule(
            AlertRule::new(1, RuleType::LargeTransaction, 100.0)
                .unwrap()
                .with_account("Savings"),
        );
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        // Transaction on a different account: the rule does not apply
        let tx = expense(1, "2024-05-10T00:00:00.000Z", "Food", 500.0);
        let emitted = evaluator
            .evaluate_transaction(&event(tx.clone()), &[tx], may(10))
            .await
            .unwrap();
        assert!(emitted.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_rule_isolated_from_others() {
        let store = MemoryAlertStore::new();
        // Bypass the constructor to store a rule violating its contract
        let mut bad = AlertRule::new(1, RuleType::LargeTransaction, 0.0).unwrap();
        bad.threshold = -50.0;
        store.insert_rule(bad);
        store.insert_rule(AlertRule::new(2, RuleType::LargeTransaction, 100.0).unwrap());
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        let tx = expense(1, "2024-05-10T00:00:00.000Z", "Food", 500.0);
        let emitted = evaluator
            .evaluate_transaction(&event(tx.clone()), &[tx], may(10))
            .await
            .unwrap();
        // The healthy rule still fires
        assert_eq!(emitted, vec![AlertKind::LargeTransaction]);
    }

    #[tokio::test]
    async fn test_delivery_failure_swallowed() {
        let store = MemoryAlertStore::new();
        store.insert_rule(AlertRule::new(1, RuleType::BudgetLimit, 100.0).unwrap());
        let sink = RecordingSink::failing();
        let evaluator = AlertEvaluator::new(&store, &sink);

        let tx = expense(1, "2024-05-10T00:00:00.000Z", "Food", 150.0);
        let emitted = evaluator
            .evaluate_transaction(&event(tx.clone()), &[tx], may(10))
            .await
            .unwrap();
        // The decision still lands and the state still advances
        assert_eq!(emitted, vec![AlertKind::BudgetExceeded]);
        assert_eq!(
            store.suppression_of(1),
            Suppression::new(100, "2024-05")
        );
    }

    #[tokio::test]
    async fn test_recurring_rules_batch_path() {
        let store = MemoryAlertStore::new();
        store.insert_rule(AlertRule::new(1, RuleType::RecurringDetection, 50.0).unwrap());
        let sink = RecordingSink::new();
        let evaluator = AlertEvaluator::new(&store, &sink);

        let txs = vec![
            TransactionBuilder::new(1, "2024-01-05T00:00:00.000Z")
                .kind(Expense)
                .category("Entertainment")
                .description("Streaming")
                .amount(80.0)
                .build(),
            TransactionBuilder::new(2, "2024-02-04T00:00:00.000Z")
                .kind(Expense)
                .category("Entertainment")
                .description("Streaming")
                .amount(80.0)
                .build(),
        ];
        let patterns = detect_recurring(&txs, &RecurringConfig::default());
        assert_eq!(patterns.len(), 1);

        let emitted = evaluator.evaluate_recurring_rules(&patterns).await.unwrap();
        assert_eq!(emitted, vec![AlertKind::RecurringCharge]);

        // Recurring rules never fire on the synchronous path
        let tx = expense(3, "2024-05-10T00:00:00.000Z", "Entertainment", 80.0);
        let emitted = evaluator
            .evaluate_transaction(&event(tx.clone()), &[tx], may(10))
            .await
            .unwrap();
        assert!(emitted.is_empty());
    }
}
