//! Core data models for the ledger reconciler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

/// Arithmetic intent derived from a transaction code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
}

impl Operation {
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
        }
    }

    pub fn apply(&self, baseline: f64, value: f64) -> f64 {
        match self {
            Operation::Add => baseline + value,
            Operation::Subtract => baseline - value,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb())
    }
}

//
// ================= Transaction =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub transaction_code: String,
    /// Literal amount from the ledger line, never touched by reconciliation
    pub amount: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        transaction_code: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            transaction_code: transaction_code.into(),
            amount,
            description: description.into(),
            balance: None,
        }
    }
}

//
// ================= Interpretation =================
//

/// Numeric fact recovered from an oracle reply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interpretation {
    Absolute { balance: f64 },
    Delta { operation: Operation, value: f64 },
    Unrecognized,
}

//
// ================= Oracle I/O =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

//
// ================= Outcomes =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionOutcome {
    Reconciled {
        interpretation: Interpretation,
        reply: String,
    },
    UnknownCode,
    UnrecognizedReply {
        reply: String,
    },
    OracleFailed {
        error: String,
        attempts: u32,
    },
}

impl TransactionOutcome {
    pub fn is_reconciled(&self) -> bool {
        matches!(self, TransactionOutcome::Reconciled { .. })
    }
}

//
// ================= Reporting =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeTotal {
    pub transaction_code: String,
    pub total_amount: f64,
}

/// Code-grouped amount totals in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeSummary {
    pub totals: Vec<CodeTotal>,
}

impl CodeSummary {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.totals
            .iter()
            .find(|t| t.transaction_code == code)
            .map(|t| t.total_amount)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.totals.iter().map(|t| t.transaction_code.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    /// Parallel to `transactions`
    pub outcomes: Vec<TransactionOutcome>,
    pub rejected_lines: usize,
    pub summary: CodeSummary,
    pub execution_time_ms: u64,
}

impl ReconciliationReport {
    pub fn reconciled_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_reconciled()).count()
    }
}
