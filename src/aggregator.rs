//! Balance aggregator
//!
//! The only code path that writes `Transaction::balance`.

use crate::classifier::CodeClassifier;
use crate::error::ReconcileError;
use crate::models::{Interpretation, Transaction};
use crate::Result;
use tracing::info;

pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Balance after applying `interpretation` to `current`
    ///
    /// Absolute statements replace the balance, deltas start from the
    /// current balance (0.0 when unset), unrecognized replies leave it alone.
    pub fn resolve(current: Option<f64>, interpretation: &Interpretation) -> Option<f64> {
        match interpretation {
            Interpretation::Absolute { balance } => Some(*balance),
            Interpretation::Delta { operation, value } => {
                Some(operation.apply(current.unwrap_or(0.0), *value))
            }
            Interpretation::Unrecognized => current,
        }
    }

    /// Apply a fact to a transaction, refusing unknown codes
    pub fn apply(transaction: &mut Transaction, interpretation: &Interpretation) -> Result<Option<f64>> {
        if !CodeClassifier::is_known(&transaction.transaction_code) {
            return Err(ReconcileError::UnknownTransactionCode(
                transaction.transaction_code.clone(),
            ));
        }

        let balance = Self::resolve(transaction.balance, interpretation);

        if balance != transaction.balance {
            info!(
                id = %transaction.id,
                previous = ?transaction.balance,
                balance = ?balance,
                "Transaction balance updated"
            );
        }

        transaction.balance = balance;
        Ok(balance)
    }
}
