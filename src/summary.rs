//! Code-grouped amount summary
//!
//! Sums the parsed `amount` (never the reconciled balance) per transaction
//! code, in the order each code first appears.

use crate::models::{CodeSummary, CodeTotal, Transaction};
use std::collections::HashMap;
use tracing::info;

pub struct SummaryReporter;

impl SummaryReporter {
    pub fn summarize(transactions: &[Transaction]) -> CodeSummary {
        let mut totals: Vec<CodeTotal> = Vec::new();
        let mut index_by_code: HashMap<&str, usize> = HashMap::new();

        for tx in transactions {
            match index_by_code.get(tx.transaction_code.as_str()) {
                Some(&i) => totals[i].total_amount += tx.amount,
                None => {
                    index_by_code.insert(tx.transaction_code.as_str(), totals.len());
                    totals.push(CodeTotal {
                        transaction_code: tx.transaction_code.clone(),
                        total_amount: tx.amount,
                    });
                }
            }
        }

        CodeSummary { totals }
    }

    /// Emit one log event per code group
    pub fn log(summary: &CodeSummary) {
        info!(groups = summary.len(), "Transaction summary");
        for total in &summary.totals {
            info!(
                code = %total.transaction_code,
                total_amount = total.total_amount,
                "Code total"
            );
        }
    }

    /// Console table for the binary
    pub fn render(summary: &CodeSummary) -> String {
        let mut out = String::from("Transaction Summary:\n");
        for total in &summary.totals {
            out.push_str(&format!(
                "Transaction Code: {}, Total Amount: {:.2}\n",
                total.transaction_code, total.total_amount
            ));
        }
        out
    }
}
