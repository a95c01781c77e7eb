//! Error types for the ledger engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while recording, loading or reporting on the ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Entry carries a negative amount
    #[error("Invalid entry: amount {amount} is negative")]
    NegativeAmount { amount: i64 },

    /// Entry has an empty `from` or `to` identifier
    #[error("Invalid entry: `{field}` identifier is empty")]
    EmptyIdentifier { field: &'static str },

    /// Entry timestamp is NaN or infinite
    #[error("Invalid entry: timestamp {timestamp} is not a finite number")]
    InvalidTimestamp { timestamp: f64 },

    /// Applying the entry would push a running balance out of range
    #[error("Invalid entry: balance of `{participant}` would overflow")]
    BalanceOverflow { participant: String },

    /// Registration of an identifier that already has entries
    #[error("Player `{participant}` is already registered")]
    AlreadyRegistered { participant: String },

    /// Registration of `pot` or `mint`
    #[error("`{participant}` is a reserved identifier")]
    ReservedIdentifier { participant: String },

    /// Writing the ledger file failed; the append was rolled back
    #[error("Failed to persist ledger to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ledger file exists but does not hold a well-formed entry sequence
    #[error("Ledger file {} is corrupt: {reason}", path.display())]
    CorruptLog { path: PathBuf, reason: String },

    /// Generic I/O failure (reading the ledger, writing reports)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV report writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing the entry sequence failed
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl LedgerError {
    /// Returns `true` for errors that must abort startup.
    ///
    /// A corrupt ledger is never treated as empty: saving over it would
    /// destroy the recorded history.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::CorruptLog { .. })
    }

    /// Returns `true` for errors raised by entry validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::NegativeAmount { .. }
                | LedgerError::EmptyIdentifier { .. }
                | LedgerError::InvalidTimestamp { .. }
                | LedgerError::BalanceOverflow { .. }
                | LedgerError::AlreadyRegistered { .. }
                | LedgerError::ReservedIdentifier { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_log_is_fatal() {
        let err = LedgerError::CorruptLog {
            path: PathBuf::from("ledger.json"),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert!(err.is_fatal());
        assert!(!err.is_validation());
        assert!(err.to_string().contains("ledger.json"));
    }

    #[test]
    fn test_validation_errors_are_not_fatal() {
        let err = LedgerError::NegativeAmount { amount: -5 };
        assert!(err.is_validation());
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Invalid entry: amount -5 is negative");
    }

    #[test]
    fn test_registration_errors_are_validation() {
        let err = LedgerError::AlreadyRegistered {
            participant: "alice".to_string(),
        };
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Player `alice` is already registered");
    }
}
