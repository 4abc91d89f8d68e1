//! Transaction normalization
//!
//! Converts heterogeneous stored/imported records into the canonical
//! [`Transaction`] shape. This is the only place that tolerates malformed
//! input: downstream passes assume clean data and never re-validate.

use serde_json::Value;

use crate::models::{RawRecord, Transaction};

/// Sentinel account name for records that carry none
pub const UNKNOWN_ACCOUNT: &str = "Unknown";

/// Parse a boolean-ish flag as stored by loosely-typed backends.
///
/// Accepts `true`, `1`, `"true"` and `"1"`; everything else (including null,
/// other numbers and other strings) is false.
pub fn truthy_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1) || n.as_f64() == Some(1.0),
        Value::String(s) => s == "true" || s == "1",
        _ => false,
    }
}

/// Coerce a loosely-typed numeric field to f64, defaulting to 0.0.
///
/// Strings may carry thousands separators ("1,234.56").
fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.replace(',', "").trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Treat empty and whitespace-only strings as absent
fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Produce the canonical transaction shape from a raw record. Never fails:
/// missing names default to sentinels, malformed numerics coerce to 0, and
/// an unrecognized type string becomes `kind: None`.
///
/// The exclude flag folds the record's own flag with its category's flag;
/// either being truthy excludes the transaction from regular flow.
pub fn normalize(raw: &RawRecord) -> Transaction {
    let excluded =
        truthy_flag(&raw.exclude_from_reports) || truthy_flag(&raw.category_exclude_from_reports);

    Transaction {
        id: raw.id.unwrap_or(0),
        date_iso: raw.date_iso.clone().unwrap_or_default(),
        account: non_blank(raw.account.as_ref()).unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string()),
        category: non_blank(raw.category.as_ref()),
        subcategory: non_blank(raw.subcategory.as_ref()),
        amount: coerce_amount(&raw.amount),
        currency: non_blank(raw.currency.as_ref()).unwrap_or_default(),
        converted_amount: coerce_amount(&raw.converted_amount),
        kind: raw.kind.as_deref().and_then(|s| s.parse().ok()),
        person_company: non_blank(raw.person_company.as_ref()),
        description: non_blank(raw.description.as_ref()),
        excluded,
    }
}

/// Normalize a batch of raw records
pub fn normalize_all(raw: &[RawRecord]) -> Vec<Transaction> {
    raw.iter().map(normalize).collect()
}
