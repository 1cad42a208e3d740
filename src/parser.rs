//! Fixed-width ledger line parser
//!
//! A record looks like `123456   100.00EP  description`:
//! six-digit account id, padding, amount with two decimals, two-letter
//! code at columns 15-16, free-text description after the code.
//! Reading the dump from disk is left to the caller.

use crate::error::ReconcileError;
use crate::models::Transaction;
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const ID_WIDTH: usize = 6;
const CODE_START: usize = 15;
const CODE_END: usize = 17;
const DESCRIPTION_START: usize = CODE_END;

lazy_static! {
    static ref LINE_GRAMMAR: Regex =
        Regex::new(r"^\d{6}\s+\d+\.\d{2}([A-Z]{2}).*$").unwrap();
    static ref AMOUNT_TOKEN: Regex = Regex::new(r"\d+\.\d{2}").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Grammar,
    AmountConversion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRejection {
    /// 1-based
    pub line_number: usize,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedLedger {
    pub transactions: Vec<Transaction>,
    pub rejections: Vec<LineRejection>,
}

impl ParsedLedger {
    pub fn rejected_count(&self) -> usize {
        self.rejections.len()
    }
}

pub struct LineParser;

impl LineParser {
    /// Parse a whole dump, keeping accepted records in input order
    pub fn parse(input: &str) -> ParsedLedger {
        let mut parsed = ParsedLedger::default();

        for (index, line) in input.lines().enumerate() {
            let line_number = index + 1;
            debug!(line_number, line = %line, "Processing line");

            match Self::parse_line(line) {
                Ok(transaction) => {
                    debug!(
                        line_number,
                        id = %transaction.id,
                        code = %transaction.transaction_code,
                        amount = transaction.amount,
                        "Line accepted"
                    );
                    parsed.transactions.push(transaction);
                }
                Err(ReconcileError::LineRejected(_)) => {
                    debug!(line_number, "Line does not match ledger grammar");
                    parsed.rejections.push(LineRejection {
                        line_number,
                        reason: RejectionReason::Grammar,
                    });
                }
                Err(e) => {
                    warn!(line_number, error = %e, "Dropping transaction");
                    parsed.rejections.push(LineRejection {
                        line_number,
                        reason: RejectionReason::AmountConversion,
                    });
                }
            }
        }

        info!(
            parsed = parsed.transactions.len(),
            rejected = parsed.rejections.len(),
            "Ledger parsed"
        );

        parsed
    }

    /// Parse one record; rejection and amount failures come back as errors
    pub fn parse_line(line: &str) -> Result<Transaction> {
        let captures = LINE_GRAMMAR
            .captures(line)
            .ok_or_else(|| ReconcileError::LineRejected(line.to_string()))?;

        let token = AMOUNT_TOKEN
            .find(line)
            .map(|m| m.as_str())
            .ok_or_else(|| ReconcileError::LineRejected(line.to_string()))?;

        let amount = parse_amount(token).ok_or_else(|| {
            ReconcileError::AmountConversionFailed {
                line: line.to_string(),
                token: token.to_string(),
            }
        })?;

        let id = char_range(line, 0, ID_WIDTH);
        let transaction_code = char_range(line, CODE_START, CODE_END);
        let description = line
            .chars()
            .skip(DESCRIPTION_START)
            .collect::<String>()
            .trim()
            .to_string();

        // Grammar anchors the code after the amount; extraction uses fixed columns.
        let grammar_code = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        if grammar_code != transaction_code {
            warn!(
                id = %id,
                grammar_code = %grammar_code,
                fixed_code = %transaction_code,
                "Transaction code column disagrees with line grammar"
            );
        }

        Ok(Transaction::new(id, transaction_code, amount, description))
    }
}

/// ASCII-only, finite amounts
fn parse_amount(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Character (not byte) slice, clamped to the line length
fn char_range(line: &str, start: usize, end: usize) -> String {
    line.chars().skip(start).take(end - start).collect()
}
