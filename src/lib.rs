//! # Pot Ledger
//!
//! An append-only transfer log for a recurring game with a shared pot,
//! plus pure projections that turn a snapshot of that log into balances,
//! leaderboards and settlement-round histories.
//!
//! ## Design Principles
//!
//! - **Append-only log**: entries are never edited; every append rewrites the
//!   ledger file before it is acknowledged
//! - **Snapshot then compute**: one lock guards the log; views are derived
//!   from an immutable copy taken under a single acquisition
//! - **No cached state**: balances are folded from the full log on demand
//! - **Conservation**: apart from the mint, value only moves between
//!   identifiers, so `balance(pot) == -sum(balance(participants))`
//!
//! ## Example
//!
//! ```no_run
//! use pot_ledger::{projector, LedgerEntry, TransactionLog};
//!
//! let log = TransactionLog::load("ledger.json").unwrap();
//! log.append(LedgerEntry::buy_in("alice", 100, 1_700_000_000.0)).unwrap();
//!
//! let snapshot = log.snapshot();
//! println!("alice: {}", projector::balance(&snapshot, "alice"));
//! ```

pub mod clock;
pub mod entry;
pub mod error;
pub mod identity;
pub mod projector;
pub mod report;
pub mod transaction_log;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entry::{is_reserved, LedgerEntry, DEFAULT_STARTING_BANK, MINT, POT};
pub use error::{LedgerError, Result};
pub use identity::{NameDirectory, NameResolver, RawNames};
pub use projector::{BalancePoint, ParticipantStats, SettlementRow};
pub use transaction_log::{Snapshot, TransactionLog};
