//! Environment-driven configuration
//!
//! Call `dotenv::dotenv()` before `from_env` to pick up a local `.env`.

use crate::error::ReconcileError;
use crate::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_INPUT_PATH: &str = "OUTPUT.DAT";

/// Settings for a single oracle call
#[derive(Debug, Clone, PartialEq)]
pub struct OracleConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl OracleConfig {
    /// Arithmetic must not depend on sampling
    pub const TEMPERATURE: f32 = 0.0;

    /// Reject settings that would make every call fail
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(ReconcileError::Config(
                "ORACLE_MAX_TOKENS must be positive".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ReconcileError::Config(
                "ORACLE_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 50,
            timeout: Duration::from_secs(30),
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub api_key: String,
    pub base_url: String,
    pub input_path: String,
    pub oracle: OracleConfig,
}

impl ReconcilerConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GROQ_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ReconcileError::Config("GROQ_API_KEY not configured".to_string()));
        }

        let defaults = OracleConfig::default();

        let oracle = OracleConfig {
            model: env::var("ORACLE_MODEL").unwrap_or(defaults.model),
            max_tokens: env_parse("ORACLE_MAX_TOKENS", defaults.max_tokens)?,
            timeout: Duration::from_secs(env_parse(
                "ORACLE_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            max_retries: env_parse("ORACLE_MAX_RETRIES", defaults.max_retries)?,
            backoff: Duration::from_millis(env_parse(
                "ORACLE_BACKOFF_MS",
                defaults.backoff.as_millis() as u64,
            )?),
        };

        oracle.validate()?;

        Ok(Self {
            api_key,
            base_url: env::var("ORACLE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            input_path: env::var("LEDGER_INPUT_PATH")
                .unwrap_or_else(|_| DEFAULT_INPUT_PATH.to_string()),
            oracle,
        })
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ReconcileError::Config(format!("{} has invalid value '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OracleConfig::default();
        assert_eq!(config.model, "llama3-70b-8192");
        assert_eq!(config.max_tokens, 50);
        assert_eq!(config.max_retries, 1);
        assert_eq!(OracleConfig::TEMPERATURE, 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(OracleConfig::default().validate().is_ok());

        let no_tokens = OracleConfig {
            max_tokens: 0,
            ..OracleConfig::default()
        };
        assert!(matches!(no_tokens.validate(), Err(ReconcileError::Config(_))));

        let no_timeout = OracleConfig {
            timeout: Duration::from_secs(0),
            ..OracleConfig::default()
        };
        assert!(matches!(no_timeout.validate(), Err(ReconcileError::Config(_))));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u32>("ORACLE_MAX_TOKENS", " 64 ").unwrap(), 64);
        assert!(matches!(
            parse_value::<u32>("ORACLE_MAX_TOKENS", "lots"),
            Err(ReconcileError::Config(_))
        ));
    }
}
