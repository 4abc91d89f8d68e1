//! Counterparty analysis
//!
//! Rolls transactions up by the recorded person/company: informal loans
//! (money lent and repaid), plain per-person expense totals, and
//! "Debt"-categorized balances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// One transaction as it appears in a counterparty rollup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyEntry {
    pub id: i64,
    pub date_iso: String,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub amount: f64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub currency: String,
}

impl CounterpartyEntry {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            date_iso: tx.date_iso.clone(),
            kind: tx.kind,
            amount: tx.converted_amount,
            category: tx.category.clone(),
            description: tx.description.clone(),
            currency: tx.currency.clone(),
        }
    }
}

/// Money lent to and repaid by one counterparty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonLoan {
    pub person: String,
    /// Money you gave (expenses toward this person)
    pub total_lent: f64,
    /// Money returned (income from this person)
    pub total_repaid: f64,
    /// Still owed to you, floored at zero
    pub outstanding: f64,
    pub is_repaid: bool,
    /// Repaid fraction of what was lent, as a percentage
    pub repayment_rate: f64,
    pub transactions: Vec<CounterpartyEntry>,
    pub last_transaction: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LoanTotals {
    pub total_lent: f64,
    pub total_repaid: f64,
    pub total_outstanding: f64,
    pub active_loans: u64,
    pub repaid_loans: u64,
    pub total_people: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoansReport {
    /// Sorted by outstanding amount descending
    pub loans: Vec<PersonLoan>,
    pub summary: LoanTotals,
}

fn update_last(last: &mut Option<String>, tx: &Transaction) {
    if last.as_deref().is_none_or(|l| tx.date_iso.as_str() > l) {
        *last = Some(tx.date_iso.clone());
    }
}

/// Track money lent to others: expenses toward a counterparty count as lent,
/// income from them as repaid. Transfers and excluded transactions are
/// skipped.
pub fn analyze_loans(transactions: &[Transaction]) -> LoansReport {
    let mut by_person: BTreeMap<String, PersonLoan> = BTreeMap::new();
    // Unclamped balances, used for the repaid flag
    let mut balances: BTreeMap<String, f64> = BTreeMap::new();

    for tx in transactions {
        if tx.excluded || tx.is_transfer() {
            continue;
        }
        let Some(person) = tx.person_company.as_deref() else {
            continue;
        };
        let person = person.trim().to_string();
        let loan = by_person.entry(person.clone()).or_insert_with(|| PersonLoan {
            person: person.clone(),
            ..Default::default()
        });
        let balance = balances.entry(person).or_default();

        let amount = tx.converted_amount;
        match tx.kind {
            Some(TransactionType::Expense) => {
                loan.total_lent += amount;
                *balance += amount;
            }
            Some(TransactionType::Income) => {
                loan.total_repaid += amount;
                *balance -= amount;
            }
            _ => {}
        }
        loan.transactions.push(CounterpartyEntry::from(tx));
        update_last(&mut loan.last_transaction, tx);
    }

    let mut loans: Vec<PersonLoan> = by_person
        .into_values()
        .map(|mut loan| {
            let balance = balances.get(&loan.person).copied().unwrap_or(0.0);
            loan.outstanding = balance.max(0.0);
            loan.is_repaid = balance <= 0.0;
            loan.repayment_rate = if loan.total_lent > 0.0 {
                loan.total_repaid / loan.total_lent * 100.0
            } else {
                0.0
            };
            loan
        })
        .collect();
    loans.sort_by(|a, b| {
        b.outstanding
            .partial_cmp(&a.outstanding)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let summary = LoanTotals {
        total_lent: loans.iter().map(|l| l.total_lent).sum(),
        total_repaid: loans.iter().map(|l| l.total_repaid).sum(),
        total_outstanding: loans.iter().map(|l| l.outstanding).sum(),
        active_loans: loans.iter().filter(|l| l.outstanding > 0.0).count() as u64,
        repaid_loans: loans.iter().filter(|l| l.outstanding <= 0.0).count() as u64,
        total_people: loans.len() as u64,
    };

    LoansReport { loans, summary }
}

/// Expense totals attributed to one counterparty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonExpenses {
    pub person: String,
    pub total_expense: f64,
    pub transaction_count: u64,
    pub categories: BTreeMap<String, f64>,
    pub transactions: Vec<CounterpartyEntry>,
    pub last_transaction: Option<String>,
}

/// Who the money goes to: expense rollup per counterparty, sorted by total
/// descending.
pub fn expenses_by_person(transactions: &[Transaction]) -> Vec<PersonExpenses> {
    let mut by_person: BTreeMap<String, PersonExpenses> = BTreeMap::new();

    for tx in transactions {
        if tx.excluded || !tx.is_expense() {
            continue;
        }
        let Some(person) = tx.person_company.as_deref() else {
            continue;
        };
        let person = person.trim().to_string();
        let entry = by_person.entry(person.clone()).or_insert_with(|| PersonExpenses {
            person,
            ..Default::default()
        });

        let amount = tx.converted_amount;
        entry.total_expense += amount;
        entry.transaction_count += 1;
        let category = tx.category.clone().unwrap_or_else(|| "Uncategorized".to_string());
        *entry.categories.entry(category).or_default() += amount;
        entry.transactions.push(CounterpartyEntry::from(tx));
        update_last(&mut entry.last_transaction, tx);
    }

    let mut result: Vec<PersonExpenses> = by_person.into_values().collect();
    result.sort_by(|a, b| {
        b.total_expense
            .partial_cmp(&a.total_expense)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    result
}

/// Net position with one counterparty over "Debt"-categorized transactions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonDebt {
    pub person: String,
    /// Money returned (income with a debt category)
    pub income_debt: f64,
    /// Money lent (expense with a debt category)
    pub expense_debt: f64,
    /// What they still owe, floored at zero
    pub net_debt: f64,
    pub is_repaid: bool,
    pub transaction_count: u64,
    pub transactions: Vec<CounterpartyEntry>,
    pub last_transaction: Option<String>,
}

/// Roll up transactions whose category name contains "debt"
/// (case-insensitive) per counterparty, sorted by net debt descending.
pub fn debt_by_person(transactions: &[Transaction]) -> Vec<PersonDebt> {
    let mut by_person: BTreeMap<String, PersonDebt> = BTreeMap::new();
    let mut balances: BTreeMap<String, f64> = BTreeMap::new();

    for tx in transactions {
        if tx.excluded {
            continue;
        }
        let (Some(person), Some(category)) = (tx.person_company.as_deref(), tx.category.as_deref())
        else {
            continue;
        };
        if !category.to_lowercase().contains("debt") {
            continue;
        }
        let person = person.trim().to_string();
        let debt = by_person.entry(person.clone()).or_insert_with(|| PersonDebt {
            person: person.clone(),
            ..Default::default()
        });
        let balance = balances.entry(person).or_default();

        let amount = tx.converted_amount;
        match tx.kind {
            Some(TransactionType::Income) => {
                debt.income_debt += amount;
                *balance -= amount;
            }
            Some(TransactionType::Expense) => {
                debt.expense_debt += amount;
                *balance += amount;
            }
            _ => {}
        }
        debt.transaction_count += 1;
        debt.transactions.push(CounterpartyEntry::from(tx));
        update_last(&mut debt.last_transaction, tx);
    }

    let mut debts: Vec<PersonDebt> = by_person
        .into_values()
        .map(|mut debt| {
            let balance = balances.get(&debt.person).copied().unwrap_or(0.0);
            debt.net_debt = balance.max(0.0);
            debt.is_repaid = balance <= 0.0;
            debt
        })
        .collect();
    debts.sort_by(|a, b| {
        b.net_debt
            .partial_cmp(&a.net_debt)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    debts
}
