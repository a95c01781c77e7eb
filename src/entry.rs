//! Ledger entry model and reserved identifiers.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// Identifier of the shared pool every participant buys into.
pub const POT: &str = "pot";

/// Identifier of the external, unbounded source of value.
///
/// Entries sent from the mint are the only ones allowed to increase the
/// total value held by everyone else.
pub const MINT: &str = "mint";

/// Bank minted for a newly registered player.
pub const DEFAULT_STARTING_BANK: i64 = 800;

/// Returns `true` if `id` is one of the reserved identifiers.
pub fn is_reserved(id: &str) -> bool {
    id == POT || id == MINT
}

/// One recorded transfer of `amount` from `from` to `to`.
///
/// Serialized with the field names used by the ledger file
/// (`u_from`, `u_to`, `amount`, `t`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerEntry {
    /// Sending identifier.
    #[serde(rename = "u_from")]
    pub from: String,

    /// Receiving identifier.
    #[serde(rename = "u_to")]
    pub to: String,

    /// Units moved. Must be non-negative to be appended.
    pub amount: i64,

    /// Seconds since the UNIX epoch at which the transfer was recorded.
    #[serde(rename = "t")]
    pub timestamp: f64,
}

impl LedgerEntry {
    /// Creates a transfer between two arbitrary identifiers.
    pub fn transfer(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: i64,
        timestamp: f64,
    ) -> Self {
        LedgerEntry {
            from: from.into(),
            to: to.into(),
            amount,
            timestamp,
        }
    }

    /// A participant buying into the pot: `participant -> pot`.
    pub fn buy_in(participant: impl Into<String>, amount: i64, timestamp: f64) -> Self {
        Self::transfer(participant, POT, amount, timestamp)
    }

    /// A participant being paid out of the pot: `pot -> participant`.
    ///
    /// Bank updates at the end of a game are recorded this way.
    pub fn cash_out(participant: impl Into<String>, amount: i64, timestamp: f64) -> Self {
        Self::transfer(POT, participant, amount, timestamp)
    }

    /// New value created for a participant: `mint -> participant`.
    pub fn mint(participant: impl Into<String>, amount: i64, timestamp: f64) -> Self {
        Self::transfer(MINT, participant, amount, timestamp)
    }

    /// Returns `true` if the entry moves value in or out of `participant`.
    pub fn touches(&self, participant: &str) -> bool {
        self.from == participant || self.to == participant
    }

    /// Net effect of this entry on `participant`'s balance.
    ///
    /// A self-transfer touches the participant but nets to zero.
    pub fn delta_for(&self, participant: &str) -> i64 {
        let mut delta = 0;
        if self.to == participant {
            delta += self.amount;
        }
        if self.from == participant {
            delta -= self.amount;
        }
        delta
    }

    /// `balance` of `participant` after this entry, or `None` if it would
    /// leave the range every projection can represent.
    ///
    /// `i64::MIN` is excluded so that a balance can always be negated.
    pub fn apply_to(&self, participant: &str, balance: i64) -> Option<i64> {
        balance
            .checked_add(self.delta_for(participant))
            .filter(|next| *next != i64::MIN)
    }

    /// Checks the entry is well formed.
    ///
    /// Solvency is not checked: the ledger records declared transfers and any
    /// identifier may go negative.
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(LedgerError::EmptyIdentifier { field: "from" });
        }
        if self.to.trim().is_empty() {
            return Err(LedgerError::EmptyIdentifier { field: "to" });
        }
        if self.amount < 0 {
            return Err(LedgerError::NegativeAmount {
                amount: self.amount,
            });
        }
        if !self.timestamp.is_finite() {
            return Err(LedgerError::InvalidTimestamp {
                timestamp: self.timestamp,
            });
        }
        Ok(())
    }
}
