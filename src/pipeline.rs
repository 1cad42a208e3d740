//! Reconciliation pipeline
//!
//! PARSE → CLASSIFY → ASK ORACLE → INTERPRET → APPLY → SUMMARIZE
//!
//! Transactions are handled one at a time, in ledger order. A failure on one
//! transaction is recorded in its outcome and never stops the run.

use crate::aggregator::BalanceAggregator;
use crate::classifier::CodeClassifier;
use crate::error::ReconcileError;
use crate::interpreter::ResponseInterpreter;
use crate::models::{Interpretation, ReconciliationReport, Transaction, TransactionOutcome};
use crate::oracle::OracleRequestBuilder;
use crate::parser::LineParser;
use crate::summary::SummaryReporter;
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct Reconciler {
    requests: OracleRequestBuilder,
}

impl Reconciler {
    pub fn new(requests: OracleRequestBuilder) -> Self {
        Self { requests }
    }

    /// Reconcile a full ledger dump
    ///
    /// Always yields a report; per-transaction failures live in `outcomes`.
    pub async fn run(&self, dump: &str) -> ReconciliationReport {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();

        info!(run_id = %run_id, bytes = dump.len(), "Reconciliation run starting");

        let parsed = LineParser::parse(dump);
        let rejected_lines = parsed.rejected_count();
        let mut transactions = parsed.transactions;
        let mut outcomes = Vec::with_capacity(transactions.len());

        for transaction in transactions.iter_mut() {
            outcomes.push(self.reconcile(transaction).await);
        }

        let summary = SummaryReporter::summarize(&transactions);
        SummaryReporter::log(&summary);

        let execution_time_ms = start_time.elapsed().as_millis() as u64;

        let report = ReconciliationReport {
            run_id,
            started_at,
            transactions,
            outcomes,
            rejected_lines,
            summary,
            execution_time_ms,
        };

        info!(
            run_id = %run_id,
            transactions = report.transactions.len(),
            reconciled = report.reconciled_count(),
            rejected_lines,
            execution_time_ms,
            "Reconciliation run complete"
        );

        report
    }

    /// Reconcile one transaction in place
    pub async fn reconcile(&self, transaction: &mut Transaction) -> TransactionOutcome {
        let Some(operation) = CodeClassifier::classify(&transaction.transaction_code) else {
            let err = ReconcileError::UnknownTransactionCode(transaction.transaction_code.clone());
            warn!(id = %transaction.id, error = %err, "Skipping reconciliation");
            return TransactionOutcome::UnknownCode;
        };

        let reply = match self.requests.ask(transaction, operation).await {
            Ok(reply) => reply,
            Err(failure) => {
                return TransactionOutcome::OracleFailed {
                    error: failure.error.to_string(),
                    attempts: failure.attempts,
                }
            }
        };

        debug!(id = %transaction.id, reply = %reply.text, "Oracle reply received");

        let interpretation = ResponseInterpreter::interpret(&reply.text);

        if interpretation == Interpretation::Unrecognized {
            let err = ReconcileError::UnrecognizedOracleResponse {
                id: transaction.id.clone(),
                reply: reply.text.clone(),
            };
            warn!(error = %err, "Could not extract balance");
            return TransactionOutcome::UnrecognizedReply { reply: reply.text };
        }

        match BalanceAggregator::apply(transaction, &interpretation) {
            Ok(_) => TransactionOutcome::Reconciled {
                interpretation,
                reply: reply.text,
            },
            Err(e) => {
                warn!(id = %transaction.id, error = %e, "Balance not applied");
                TransactionOutcome::UnknownCode
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleConfig;
    use crate::models::Operation;
    use crate::oracle::MockOracle;
    use std::sync::Arc;
    use std::time::Duration;

    fn reconciler(oracle: Arc<MockOracle>) -> Reconciler {
        let config = OracleConfig {
            backoff: Duration::from_millis(1),
            ..OracleConfig::default()
        };
        Reconciler::new(OracleRequestBuilder::new(oracle, config))
    }

    #[tokio::test]
    async fn test_reconcile_relative_reply() {
        let oracle = Arc::new(MockOracle::new(
            "Please provide the total balance, and I'll be happy to subtract 10.00 from it.",
        ));
        let reconciler = reconciler(oracle);
        let mut tx = Transaction::new("123456", "DL", 10.00, "fee");

        let outcome = reconciler.reconcile(&mut tx).await;
        assert_eq!(
            outcome,
            TransactionOutcome::Reconciled {
                interpretation: Interpretation::Delta {
                    operation: Operation::Subtract,
                    value: 10.00
                },
                reply: "Please provide the total balance, and I'll be happy to subtract 10.00 from it."
                    .to_string(),
            }
        );
        assert_eq!(tx.balance, Some(-10.00));
    }

    #[tokio::test]
    async fn test_unknown_code_skips_oracle() {
        let oracle = Arc::new(MockOracle::new("The balance is 20.00"));
        let reconciler = reconciler(oracle.clone());
        let mut tx = Transaction::new("123456", "XY", 20.00, "mystery");

        assert_eq!(reconciler.reconcile(&mut tx).await, TransactionOutcome::UnknownCode);
        assert_eq!(tx.balance, None);
        assert!(oracle.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_reply_leaves_transaction() {
        let oracle = Arc::new(MockOracle::new("Sure thing!"));
        let reconciler = reconciler(oracle);
        let mut tx = Transaction::new("123456", "EP", 5.00, "");

        let outcome = reconciler.reconcile(&mut tx).await;
        assert!(matches!(outcome, TransactionOutcome::UnrecognizedReply { .. }));
        assert_eq!(tx.balance, None);
    }

    #[tokio::test]
    async fn test_oracle_failure_is_isolated() {
        let oracle = Arc::new(
            MockOracle::new("The balance is 50.00").with_script(vec![
                Err("down".to_string()),
                Err("down".to_string()),
            ]),
        );
        let reconciler = reconciler(oracle);
        let dump = "123456   100.00EPfirst\n234567    50.00EPsecond\n";

        let report = reconciler.run(dump).await;
        assert!(matches!(
            report.outcomes[0],
            TransactionOutcome::OracleFailed { attempts: 2, .. }
        ));
        assert_eq!(report.transactions[0].balance, None);
        assert_eq!(report.transactions[1].balance, Some(50.00));
        assert_eq!(report.summary.get("EP"), Some(150.00));
    }

    #[tokio::test]
    async fn test_every_run_gets_its_own_id() {
        let oracle = Arc::new(MockOracle::new("The balance is 1.00"));
        let reconciler = reconciler(oracle);
        let dump = "123456     1.00EPone\nnot a record\n";

        let first = reconciler.run(dump).await;
        let second = reconciler.run(dump).await;

        assert_ne!(first.run_id, second.run_id);
        assert!(second.started_at >= first.started_at);
        assert_eq!(first.rejected_lines, 1);
        assert_eq!(first.reconciled_count(), 1);
    }
}
