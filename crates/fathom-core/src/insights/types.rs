//! Core types for the insight generator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of findings the generator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Day-of-week spending habit outlier
    SpendingPattern,
    /// Time-of-month spending outlier
    TimePattern,
    /// Merchant-level summary
    Merchant,
    /// Statistical month-over-month anomaly
    Anomaly,
    /// Actionable recommendation
    Recommendation,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::SpendingPattern => "spending_pattern",
            InsightKind::TimePattern => "time_pattern",
            InsightKind::Merchant => "merchant",
            InsightKind::Anomaly => "anomaly",
            InsightKind::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spending_pattern" => Ok(InsightKind::SpendingPattern),
            "time_pattern" => Ok(InsightKind::TimePattern),
            "merchant" => Ok(InsightKind::Merchant),
            "anomaly" => Ok(InsightKind::Anomaly),
            "recommendation" => Ok(InsightKind::Recommendation),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// How much a finding matters. Findings are ranked high > medium > low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        }
    }

    /// Numeric priority for sorting (higher = more important)
    pub fn priority(&self) -> u8 {
        match self {
            Impact::Low => 1,
            Impact::Medium => 2,
            Impact::High => 3,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Statistical severity of an anomaly finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

/// A human-readable finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub kind: InsightKind,
    /// Short headline, e.g. "Unusually high spending detected"
    pub title: String,
    /// One-paragraph explanation
    pub message: String,
    pub impact: Impact,
    /// Grouping label, e.g. "Spending Patterns"
    pub category: String,
    /// Suggested follow-up, when one exists
    pub action: Option<String>,
    /// Statistical severity, set by the anomaly analyzer
    pub severity: Option<Severity>,
    /// Finding-specific structured payload
    pub data: serde_json::Value,
}

impl Finding {
    pub fn new(
        kind: InsightKind,
        impact: Impact,
        category: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            impact,
            category: category.into(),
            action: None,
            severity: None,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_ordering() {
        assert!(Impact::High.priority() > Impact::Medium.priority());
        assert!(Impact::Medium.priority() > Impact::Low.priority());
    }

    #[test]
    fn test_kind_roundtrip() {
        assert_eq!(InsightKind::Anomaly.as_str(), "anomaly");
        assert_eq!(
            InsightKind::from_str("time_pattern").unwrap(),
            InsightKind::TimePattern
        );
        assert!(InsightKind::from_str("unknown").is_err());
    }

    #[test]
    fn test_finding_builder() {
        let finding = Finding::new(
            InsightKind::Recommendation,
            Impact::High,
            "Recommendations",
            "Test Title",
            "Test message",
        )
        .with_action("Do the thing")
        .with_data(serde_json::json!({"amount": 10.0}));

        assert_eq!(finding.action.as_deref(), Some("Do the thing"));
        assert_eq!(finding.data["amount"], 10.0);
        assert_eq!(finding.severity, None);
    }
}
