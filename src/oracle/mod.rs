//! Oracle trait, request builder and test double
//!
//! The oracle is an opaque text-in/text-out service. The request builder
//! renders one deterministic instruction per transaction and wraps every
//! call in a hard timeout plus bounded retry with exponential backoff.

use crate::config::OracleConfig;
use crate::error::ReconcileError;
use crate::models::{OracleRequest, Operation, Transaction};
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

pub mod groq;
pub use groq::GroqClient;

/// Trait for the inference service
#[async_trait]
pub trait Oracle: Send + Sync {
    /// One stateless completion for one instruction
    async fn complete(&self, request: &OracleRequest) -> Result<String>;
}

/// Successful exchange
#[derive(Debug, Clone, PartialEq)]
pub struct OracleReply {
    pub text: String,
    pub attempts: u32,
}

/// Exhausted or non-retryable exchange
#[derive(Debug)]
pub struct OracleFailure {
    pub error: ReconcileError,
    pub attempts: u32,
}

pub struct OracleRequestBuilder {
    oracle: Arc<dyn Oracle>,
    config: OracleConfig,
}

impl OracleRequestBuilder {
    pub fn new(oracle: Arc<dyn Oracle>, config: OracleConfig) -> Self {
        Self { oracle, config }
    }

    pub fn render_prompt(operation: Operation, amount: f64) -> String {
        format!("Please {} {:.2} to the total balance.", operation, amount)
    }

    pub fn build(&self, transaction: &Transaction, operation: Operation) -> OracleRequest {
        OracleRequest {
            prompt: Self::render_prompt(operation, transaction.amount),
            model: self.config.model.clone(),
            temperature: OracleConfig::TEMPERATURE,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Ask the oracle about one transaction
    pub async fn ask(
        &self,
        transaction: &Transaction,
        operation: Operation,
    ) -> std::result::Result<OracleReply, OracleFailure> {
        let request = self.build(transaction, operation);
        let max_attempts = self.config.max_retries + 1;
        let mut backoff = self.config.backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;

            debug!(
                id = %transaction.id,
                attempt,
                prompt = %request.prompt,
                "Sending oracle request"
            );

            let err = match self.call_once(&request).await {
                Ok(text) => {
                    return Ok(OracleReply {
                        text,
                        attempts: attempt,
                    })
                }
                Err(e) => e,
            };

            if !err.is_transient() || attempt >= max_attempts {
                error!(
                    id = %transaction.id,
                    attempts = attempt,
                    error = %err,
                    "Oracle call failed"
                );
                return Err(OracleFailure {
                    error: err,
                    attempts: attempt,
                });
            }

            warn!(
                id = %transaction.id,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %err,
                "Oracle call failed, retrying"
            );

            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
        }
    }

    async fn call_once(&self, request: &OracleRequest) -> Result<String> {
        let timeout = self.config.timeout;

        tokio::time::timeout(timeout, self.oracle.complete(request))
            .await
            .map_err(|_| ReconcileError::OracleTimeout(timeout.as_millis() as u64))?
    }
}

//
// ========== Mock Oracle ==========
//

/// Scripted oracle for development & testing
///
/// Replies are consumed in order; once the script runs out the fallback
/// reply is returned. Every request is recorded.
pub struct MockOracle {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    fallback: String,
    delay: Option<Duration>,
    requests: Mutex<Vec<OracleRequest>>,
}

impl MockOracle {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: fallback.into(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue replies; `Err` entries become `OracleCallFailure`
    pub fn with_script<I>(self, script: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<String, String>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..self
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub async fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn complete(&self, request: &OracleRequest) -> Result<String> {
        self.requests.lock().await.push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.script.lock().await.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(ReconcileError::OracleCallFailure(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn fast_config() -> OracleConfig {
        OracleConfig {
            timeout: Duration::from_millis(200),
            backoff: Duration::from_millis(1),
            ..OracleConfig::default()
        }
    }

    fn tx() -> Transaction {
        Transaction::new("123456", "EP", 100.00, "test")
    }

    #[test]
    fn test_render_prompt() {
        assert_eq!(
            OracleRequestBuilder::render_prompt(Operation::Add, 100.0),
            "Please add 100.00 to the total balance."
        );
        assert_eq!(
            OracleRequestBuilder::render_prompt(Operation::Subtract, 30.5),
            "Please subtract 30.50 to the total balance."
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = OracleRequestBuilder::new(Arc::new(MockOracle::new("")), fast_config());
        let request = builder.build(&tx(), Operation::Add);

        assert_eq!(request, builder.build(&tx(), Operation::Add));
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, 50);
        assert_eq!(request.model, "llama3-70b-8192");
    }

    #[tokio::test]
    async fn test_ask_returns_reply() {
        let oracle = Arc::new(MockOracle::new("The balance is 100.00"));
        let builder = OracleRequestBuilder::new(oracle.clone(), fast_config());

        let reply = assert_ok!(builder.ask(&tx(), Operation::Add).await);
        assert_eq!(reply.text, "The balance is 100.00");
        assert_eq!(reply.attempts, 1);
        assert_eq!(oracle.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn test_ask_retries_transient_failure() {
        let oracle = Arc::new(
            MockOracle::new("The balance is 100.00")
                .with_script(vec![Err("connection reset".to_string())]),
        );
        let builder = OracleRequestBuilder::new(oracle.clone(), fast_config());

        let reply = assert_ok!(builder.ask(&tx(), Operation::Add).await);
        assert_eq!(reply.attempts, 2);
        assert_eq!(oracle.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_ask_gives_up_after_bounded_retries() {
        let oracle = Arc::new(MockOracle::new("unused").with_script(vec![
            Err("down".to_string()),
            Err("still down".to_string()),
            Err("never reached".to_string()),
        ]));
        let builder = OracleRequestBuilder::new(oracle.clone(), fast_config());

        let failure = assert_err!(builder.ask(&tx(), Operation::Add).await);
        assert_eq!(failure.attempts, 2);
        assert!(matches!(failure.error, ReconcileError::OracleCallFailure(_)));
        assert_eq!(oracle.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_ask_times_out() {
        let oracle = Arc::new(MockOracle::new("late").with_delay(Duration::from_millis(500)));
        let config = OracleConfig {
            timeout: Duration::from_millis(20),
            max_retries: 0,
            ..fast_config()
        };
        let builder = OracleRequestBuilder::new(oracle, config);

        let failure = assert_err!(builder.ask(&tx(), Operation::Add).await);
        assert_eq!(failure.attempts, 1);
        assert!(matches!(failure.error, ReconcileError::OracleTimeout(20)));
    }
}
