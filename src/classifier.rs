//! Transaction code classifier
//!
//! Maps a two-letter ledger code to the arithmetic the oracle is asked to do:
//! - `EP` (credit) → add
//! - `DL` (debit) → subtract
//! - anything else → unknown, left out of reconciliation

use crate::models::Operation;

/// Static code table
const CODE_TABLE: &[(&str, Operation)] = &[
    ("EP", Operation::Add),
    ("DL", Operation::Subtract),
];

pub struct CodeClassifier;

impl CodeClassifier {
    /// Returns `None` for codes outside the recognized set
    pub fn classify(code: &str) -> Option<Operation> {
        CODE_TABLE
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, op)| *op)
    }

    pub fn is_known(code: &str) -> bool {
        Self::classify(code).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(CodeClassifier::classify("EP"), Some(Operation::Add));
        assert_eq!(CodeClassifier::classify("DL"), Some(Operation::Subtract));
    }

    #[test]
    fn test_unknown_codes() {
        let cases = vec!["XY", "ep", "dl", "", "E", "EPX", "  "];

        for c in cases {
            assert_eq!(CodeClassifier::classify(c), None, "code {:?}", c);
            assert!(!CodeClassifier::is_known(c));
        }
    }
}
