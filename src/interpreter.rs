//! Oracle reply interpreter
//!
//! Recovers a numeric fact from free-text replies. Only two phrasings are
//! understood, checked in this order:
//!
//! 1. absolute: `... balance is 42.50 ...`
//! 2. relative: `... total balance, and I'll be happy to add 10.00 ...`
//!
//! Everything else is `Unrecognized`. Replies are never guessed at. An
//! absolute match is final: if its number does not convert, the reply is
//! unrecognized and the relative form is not consulted.

use crate::models::{Interpretation, Operation};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref ABSOLUTE_STATEMENT: Regex =
        Regex::new(r"(?i)balance is (\d+(?:\.\d{1,2})?)").unwrap();
    static ref RELATIVE_STATEMENT: Regex = Regex::new(
        r"(?i)total balance,? and I'll be happy to (add|subtract) (\d+(?:\.\d{1,2})?)"
    )
    .unwrap();
}

pub struct ResponseInterpreter;

impl ResponseInterpreter {
    pub fn interpret(reply: &str) -> Interpretation {
        if let Some(token) = Self::absolute_token(reply) {
            return match parse_number(token) {
                Some(balance) => {
                    debug!(balance, "Absolute balance statement matched");
                    Interpretation::Absolute { balance }
                }
                None => {
                    debug!(token, "Absolute balance statement has unconvertible number");
                    Interpretation::Unrecognized
                }
            };
        }

        if let Some((operation, value)) = Self::relative(reply) {
            debug!(%operation, value, "Relative balance statement matched");
            return Interpretation::Delta { operation, value };
        }

        debug!("No balance statement matched");
        Interpretation::Unrecognized
    }

    fn absolute_token(reply: &str) -> Option<&str> {
        ABSOLUTE_STATEMENT
            .captures(reply)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    fn relative(reply: &str) -> Option<(Operation, f64)> {
        let captures = RELATIVE_STATEMENT.captures(reply)?;

        let operation = match captures.get(1)?.as_str().to_lowercase().as_str() {
            "add" => Operation::Add,
            "subtract" => Operation::Subtract,
            _ => return None,
        };
        let value = parse_number(captures.get(2)?.as_str())?;

        Some((operation, value))
    }
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}
