//! Test utilities: transaction builders and in-memory alert collaborators

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::alerts::{AlertKind, AlertPayload, AlertStore, NotificationSink};
use crate::error::Result;
use crate::models::{AlertRule, Suppression, Transaction, TransactionType};

/// Builder for canonical transactions with sensible test defaults
pub struct TransactionBuilder {
    tx: Transaction,
}

impl TransactionBuilder {
    pub fn new(id: i64, date_iso: &str) -> Self {
        Self {
            tx: Transaction {
                id,
                date_iso: date_iso.to_string(),
                account: "Checking".to_string(),
                category: None,
                subcategory: None,
                amount: 0.0,
                currency: "USD".to_string(),
                converted_amount: 0.0,
                kind: Some(TransactionType::Expense),
                person_company: None,
                description: None,
                excluded: false,
            },
        }
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.tx.kind = Some(kind);
        self
    }

    /// Set both the original and converted amount
    pub fn amount(mut self, amount: f64) -> Self {
        self.tx.amount = amount;
        self.tx.converted_amount = amount;
        self
    }

    /// Set the original and converted amounts separately
    pub fn amounts(mut self, original: f64, converted: f64) -> Self {
        self.tx.amount = original;
        self.tx.converted_amount = converted;
        self
    }

    pub fn account(mut self, account: &str) -> Self {
        self.tx.account = account.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.tx.category = Some(category.to_string());
        self
    }

    pub fn subcategory(mut self, subcategory: &str) -> Self {
        self.tx.subcategory = Some(subcategory.to_string());
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.tx.currency = currency.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.tx.description = Some(description.to_string());
        self
    }

    pub fn person(mut self, person: &str) -> Self {
        self.tx.person_company = Some(person.to_string());
        self
    }

    pub fn excluded(mut self, excluded: bool) -> Self {
        self.tx.excluded = excluded;
        self
    }

    pub fn build(self) -> Transaction {
        self.tx
    }
}

/// In-memory alert rule store with an atomic compare-and-set, usable from
/// concurrent tests.
#[derive(Default)]
pub struct MemoryAlertStore {
    rules: Mutex<HashMap<i64, AlertRule>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rule(&self, rule: AlertRule) {
        self.rules.lock().expect("store lock").insert(rule.id, rule);
    }

    /// Current suppression state of a rule (panics when absent)
    pub fn suppression_of(&self, rule_id: i64) -> Suppression {
        self.rules
            .lock()
            .expect("store lock")
            .get(&rule_id)
            .expect("rule exists")
            .suppression
            .clone()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn get_rule(&self, id: i64) -> Result<Option<AlertRule>> {
        Ok(self.rules.lock().expect("store lock").get(&id).cloned())
    }

    async fn list_enabled_rules(
        &self,
        category: Option<&str>,
        account: Option<&str>,
    ) -> Result<Vec<AlertRule>> {
        let mut rules: Vec<AlertRule> = self
            .rules
            .lock()
            .expect("store lock")
            .values()
            .filter(|r| r.enabled)
            .filter(|r| category.is_none_or(|c| r.categories.matches(Some(c))))
            .filter(|r| {
                account.is_none_or(|a| r.account.as_deref().is_none_or(|scoped| scoped == a))
            })
            .cloned()
            .collect();
        rules.sort_by_key(|r| r.id);
        Ok(rules)
    }

    async fn compare_and_set_suppression(
        &self,
        rule_id: i64,
        expected: &Suppression,
        next: &Suppression,
    ) -> Result<bool> {
        let mut rules = self.rules.lock().expect("store lock");
        match rules.get_mut(&rule_id) {
            Some(rule) if &rule.suppression == expected => {
                rule.suppression = next.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Notification sink that records everything it is asked to deliver.
/// `failing()` builds one that reports delivery failure instead.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(AlertKind, AlertPayload)>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        sink
    }

    pub fn sent(&self) -> Vec<(AlertKind, AlertPayload)> {
        self.sent.lock().expect("sink lock").clone()
    }

    pub fn count_of(&self, kind: AlertKind) -> usize {
        self.sent
            .lock()
            .expect("sink lock")
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, kind: AlertKind, payload: &AlertPayload) -> bool {
        self.sent
            .lock()
            .expect("sink lock")
            .push((kind, payload.clone()));
        !self.fail.load(Ordering::SeqCst)
    }
}
