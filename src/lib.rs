//! Ledger Reconciler
//!
//! Reconciles fixed-width payment ledger dumps against a natural-language
//! inference oracle:
//! - Parses legacy fixed-width records into typed transactions
//! - Classifies transaction codes into add/subtract intents
//! - Asks the oracle to do the arithmetic, one stateless call per transaction
//! - Scrapes the oracle's free-text reply back into a balance
//! - Summarizes parsed amounts per code
//!
//! PIPELINE:
//! PARSE → CLASSIFY → ASK ORACLE → INTERPRET → APPLY → SUMMARIZE

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod models;
pub mod oracle;
pub mod parser;
pub mod pipeline;
pub mod summary;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use aggregator::BalanceAggregator;
pub use classifier::CodeClassifier;
pub use interpreter::ResponseInterpreter;
pub use oracle::{MockOracle, Oracle, OracleRequestBuilder};
pub use parser::LineParser;
pub use pipeline::Reconciler;
pub use summary::SummaryReporter;
