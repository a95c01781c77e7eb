//! Pure projections over a snapshot of the log.
//!
//! Nothing here is cached: every view is a fold over the full entry sequence,
//! in sequence order, so results are always consistent with the snapshot
//! they were computed from. Unknown participants and empty snapshots yield
//! zero or empty results, never errors.
//!
//! The log refuses any entry that would take a running balance out of range
//! (see [`LedgerEntry::apply_to`]), so the folds below cannot overflow when
//! replayed in sequence order.

use crate::entry::{is_reserved, LedgerEntry, MINT, POT};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A participant's balance right after one of their entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancePoint {
    /// Timestamp of the entry that produced this balance.
    pub timestamp: f64,

    /// Cumulative balance after the entry is applied.
    pub balance: i64,
}

/// Everyone's running balance at the close of a settlement round.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRow {
    /// Timestamp of the entry that closed the round.
    pub timestamp: f64,

    /// Position of that entry in the snapshot.
    pub entry_index: usize,

    /// Running balance of every identifier seen so far, reserved ones included.
    pub balances: BTreeMap<String, i64>,
}

/// Summary of one participant's activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantStats {
    /// Current balance.
    pub balance: i64,

    /// Entries touching the participant.
    pub entries: usize,

    /// Total sent into the pot.
    pub bought_in: i64,

    /// Total paid out of the pot to the participant.
    pub cashed_out: i64,

    /// Total received from the mint.
    pub minted: i64,
}

/// Balance of `participant`: inflows minus outflows.
pub fn balance(entries: &[LedgerEntry], participant: &str) -> i64 {
    entries.iter().map(|e| e.delta_for(participant)).sum()
}

/// Every identifier appearing as sender or receiver, reserved ones included.
pub fn participants(entries: &[LedgerEntry]) -> BTreeSet<String> {
    entries
        .iter()
        .flat_map(|e| [e.from.clone(), e.to.clone()])
        .collect()
}

/// Balances of all identifiers in a single pass.
pub fn balances(entries: &[LedgerEntry]) -> BTreeMap<String, i64> {
    let mut out = BTreeMap::new();
    for entry in entries {
        apply_entry(&mut out, entry);
    }
    out
}

/// Running balance of `participant`, one point per entry that touches them.
pub fn balance_series(entries: &[LedgerEntry], participant: &str) -> Vec<BalancePoint> {
    let mut running = 0;
    entries
        .iter()
        .filter(|e| e.touches(participant))
        .map(|e| {
            running += e.delta_for(participant);
            BalancePoint {
                timestamp: e.timestamp,
                balance: running,
            }
        })
        .collect()
}

/// Replays the snapshot and emits one row per completed settlement round.
///
/// A round closes right after any entry that leaves the pot's running
/// balance at or below zero. If the pot never gets there the series is empty.
pub fn settlement_series(entries: &[LedgerEntry]) -> Vec<SettlementRow> {
    let mut running: BTreeMap<String, i64> = BTreeMap::new();
    let mut pot = 0i64;
    let mut rows = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        apply_entry(&mut running, entry);
        pot += entry.delta_for(POT);

        if pot <= 0 {
            rows.push(SettlementRow {
                timestamp: entry.timestamp,
                entry_index: idx,
                balances: running.clone(),
            });
        }
    }

    rows
}

/// All identifiers ranked by balance, highest first.
///
/// Ties keep the order in which identifiers first appear in the snapshot
/// (`from` before `to` within an entry).
pub fn leaderboard(entries: &[LedgerEntry]) -> Vec<(String, i64)> {
    let totals = balances(entries);
    let mut board: Vec<(String, i64)> = first_appearance(entries)
        .into_iter()
        .map(|id| {
            let bal = totals.get(id).copied().unwrap_or(0);
            (id.to_string(), bal)
        })
        .collect();

    // sort_by is stable, so ties stay in appearance order
    board.sort_by(|a, b| b.1.cmp(&a.1));
    board
}

/// Per-participant summary; all zero for an identifier that never appears.
///
/// Flow totals saturate at `i64::MAX`.
pub fn stats(entries: &[LedgerEntry], participant: &str) -> ParticipantStats {
    let mut out = ParticipantStats::default();
    for entry in entries.iter().filter(|e| e.touches(participant)) {
        out.entries += 1;
        out.balance += entry.delta_for(participant);
        if entry.from == participant && entry.to == POT {
            out.bought_in = out.bought_in.saturating_add(entry.amount);
        } else if entry.from == POT && entry.to == participant {
            out.cashed_out = out.cashed_out.saturating_add(entry.amount);
        } else if entry.from == MINT && entry.to == participant {
            out.minted = out.minted.saturating_add(entry.amount);
        }
    }
    out
}

/// Net value the mint has introduced into the system.
pub fn total_minted(entries: &[LedgerEntry]) -> i64 {
    -balance(entries, MINT)
}

/// Non-reserved participants with a negative balance, most indebted first.
///
/// Informational only; the log never refuses a transfer for solvency.
pub fn debtors(entries: &[LedgerEntry]) -> Vec<(String, i64)> {
    let mut out: Vec<(String, i64)> = leaderboard(entries)
        .into_iter()
        .filter(|(id, bal)| *bal < 0 && !is_reserved(id))
        .collect();
    out.reverse();
    out
}

/// Adds the net effect of `entry` to both sides' running balances.
///
/// Each side moves by its whole delta in one step, so a running balance
/// never passes through a value it does not end at.
fn apply_entry(running: &mut BTreeMap<String, i64>, entry: &LedgerEntry) {
    *running.entry(entry.from.clone()).or_insert(0) += entry.delta_for(&entry.from);
    if entry.to != entry.from {
        *running.entry(entry.to.clone()).or_insert(0) += entry.delta_for(&entry.to);
    }
}

/// Distinct identifiers in order of first appearance.
fn first_appearance(entries: &[LedgerEntry]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for entry in entries {
        for id in [entry.from.as_str(), entry.to.as_str()] {
            if seen.insert(id) {
                order.push(id);
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_night() -> Vec<LedgerEntry> {
        vec![
            LedgerEntry::mint("alice", 800, 0.0),
            LedgerEntry::mint("bob", 800, 0.0),
            LedgerEntry::buy_in("alice", 100, 1.0),
            LedgerEntry::buy_in("bob", 100, 2.0),
            LedgerEntry::cash_out("bob", 150, 3.0),
            LedgerEntry::cash_out("alice", 50, 4.0),
        ]
    }

    #[test]
    fn test_empty_snapshot() {
        let empty: Vec<LedgerEntry> = Vec::new();
        assert_eq!(balance(&empty, "anyone"), 0);
        assert!(participants(&empty).is_empty());
        assert!(balances(&empty).is_empty());
        assert!(balance_series(&empty, "anyone").is_empty());
        assert!(settlement_series(&empty).is_empty());
        assert!(leaderboard(&empty).is_empty());
        assert!(debtors(&empty).is_empty());
        assert_eq!(total_minted(&empty), 0);
    }

    #[test]
    fn test_unknown_participant_has_zero_balance() {
        assert_eq!(balance(&game_night(), "dave"), 0);
        assert!(balance_series(&game_night(), "dave").is_empty());
    }

    #[test]
    fn test_balance_is_inflow_minus_outflow() {
        let entries = game_night();
        assert_eq!(balance(&entries, "alice"), 800 - 100 + 50);
        assert_eq!(balance(&entries, "bob"), 800 - 100 + 150);
        assert_eq!(balance(&entries, POT), 0);
        assert_eq!(balance(&entries, MINT), -1600);
    }

    #[test]
    fn test_participants_include_reserved_ids() {
        let ids = participants(&game_night());
        let expected: BTreeSet<String> = ["alice", "bob", "pot", "mint"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_balances_match_individual_folds() {
        let entries = game_night();
        for (id, bal) in balances(&entries) {
            assert_eq!(bal, balance(&entries, &id));
        }
    }

    #[test]
    fn test_balance_series_tracks_running_balance() {
        let series = balance_series(&game_night(), "bob");
        let points: Vec<(f64, i64)> = series.iter().map(|p| (p.timestamp, p.balance)).collect();
        assert_eq!(points, vec![(0.0, 800), (2.0, 700), (3.0, 850)]);
    }

    #[test]
    fn test_balance_series_includes_self_transfer() {
        let entries = vec![
            LedgerEntry::buy_in("alice", 10, 1.0),
            LedgerEntry::transfer("alice", "alice", 5, 2.0),
        ];
        let series = balance_series(&entries, "alice");
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].balance, -10);
    }

    #[test]
    fn test_settlement_emits_row_when_pot_empties() {
        // pot: 100, 50, 0
        let entries = vec![
            LedgerEntry::buy_in("alice", 100, 1.0),
            LedgerEntry::cash_out("bob", 50, 2.0),
            LedgerEntry::cash_out("alice", 50, 3.0),
        ];

        let rows = settlement_series(&entries);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.timestamp, 3.0);
        assert_eq!(row.entry_index, 2);
        assert_eq!(row.balances.get("alice"), Some(&-50));
        assert_eq!(row.balances.get("bob"), Some(&50));
        assert_eq!(row.balances.get(POT), Some(&0));
    }

    #[test]
    fn test_settlement_no_row_while_pot_holds_value() {
        // pot: 100, 50, 100
        let entries = vec![
            LedgerEntry::buy_in("alice", 100, 1.0),
            LedgerEntry::cash_out("bob", 50, 2.0),
            LedgerEntry::buy_in("bob", 50, 3.0),
        ];
        assert!(settlement_series(&entries).is_empty());
    }

    #[test]
    fn test_settlement_multiple_rounds() {
        let entries = vec![
            LedgerEntry::buy_in("alice", 100, 1.0),
            LedgerEntry::buy_in("bob", 100, 2.0),
            LedgerEntry::cash_out("alice", 200, 3.0),
            LedgerEntry::buy_in("alice", 50, 4.0),
            LedgerEntry::buy_in("bob", 50, 5.0),
            LedgerEntry::cash_out("bob", 120, 6.0),
        ];

        let rows = settlement_series(&entries);
        let closed_at: Vec<usize> = rows.iter().map(|r| r.entry_index).collect();
        assert_eq!(closed_at, vec![2, 5]);

        assert_eq!(rows[0].balances["alice"], 100);
        assert_eq!(rows[0].balances["bob"], -100);
        assert_eq!(rows[1].balances["alice"], 50);
        assert_eq!(rows[1].balances["bob"], -30);
        assert_eq!(rows[1].balances[POT], -20);
    }

    #[test]
    fn test_settlement_is_deterministic() {
        let entries = game_night();
        assert_eq!(settlement_series(&entries), settlement_series(&entries));
        assert_eq!(participants(&entries), participants(&entries));
        assert_eq!(balance(&entries, "alice"), balance(&entries, "alice"));
    }

    #[test]
    fn test_leaderboard_sorted_descending() {
        let board = leaderboard(&game_night());
        let ids: Vec<&str> = board.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["bob", "alice", "pot", "mint"]);
        assert_eq!(board[0].1, 850);
    }

    #[test]
    fn test_leaderboard_ties_keep_first_appearance() {
        let entries = vec![
            LedgerEntry::mint("zed", 10, 1.0),
            LedgerEntry::mint("amy", 10, 2.0),
            LedgerEntry::mint("kim", 10, 3.0),
        ];
        let board = leaderboard(&entries);
        let ids: Vec<&str> = board.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["zed", "amy", "kim", "mint"]);
    }

    #[test]
    fn test_conservation_over_every_prefix() {
        let entries = vec![
            LedgerEntry::buy_in("alice", 100, 1.0),
            LedgerEntry::buy_in("bob", 40, 2.0),
            LedgerEntry::transfer("alice", "bob", 15, 3.0),
            LedgerEntry::cash_out("carol", 70, 4.0),
            LedgerEntry::cash_out("bob", 90, 5.0),
        ];

        for n in 0..=entries.len() {
            let prefix = &entries[..n];
            let others: i64 = participants(prefix)
                .iter()
                .filter(|id| !is_reserved(id))
                .map(|id| balance(prefix, id))
                .sum();
            assert_eq!(balance(prefix, POT), -others, "prefix of length {}", n);
        }
    }

    #[test]
    fn test_stats_summarize_flows() {
        let entries = vec![
            LedgerEntry::mint("alice", 800, 0.0),
            LedgerEntry::buy_in("alice", 100, 1.0),
            LedgerEntry::buy_in("alice", 50, 2.0),
            LedgerEntry::cash_out("alice", 120, 3.0),
            LedgerEntry::transfer("alice", "bob", 30, 4.0),
            LedgerEntry::buy_in("bob", 10, 5.0),
        ];

        assert_eq!(
            stats(&entries, "alice"),
            ParticipantStats {
                balance: 800 - 100 - 50 + 120 - 30,
                entries: 5,
                bought_in: 150,
                cashed_out: 120,
                minted: 800,
            }
        );
        assert_eq!(stats(&entries, "dave"), ParticipantStats::default());
    }

    #[test]
    fn test_self_transfer_at_negative_limit_does_not_overflow() {
        let entries = vec![
            LedgerEntry::transfer("alice", "bob", i64::MAX, 1.0),
            LedgerEntry::transfer("alice", "alice", i64::MAX, 2.0),
        ];

        assert_eq!(balances(&entries)["alice"], -i64::MAX);
        assert_eq!(settlement_series(&entries).len(), 2);
        assert_eq!(settlement_series(&entries)[1].balances["alice"], -i64::MAX);
    }

    #[test]
    fn test_total_minted_and_debtors() {
        let entries = vec![
            LedgerEntry::mint("alice", 500, 1.0),
            LedgerEntry::buy_in("bob", 100, 2.0),
            LedgerEntry::buy_in("carol", 300, 3.0),
            LedgerEntry::cash_out("alice", 400, 4.0),
        ];

        assert_eq!(total_minted(&entries), 500);
        assert_eq!(
            debtors(&entries),
            vec![("carol".to_string(), -300), ("bob".to_string(), -100)]
        );
    }
}
