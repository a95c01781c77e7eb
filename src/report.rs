//! CSV rendering of projector views.
//!
//! Every report is computed from one snapshot and written after the log's
//! lock has been released. Identifiers are passed through a
//! [`NameResolver`] for display only.

use crate::entry::{is_reserved, LedgerEntry};
use crate::error::Result;
use crate::identity::NameResolver;
use crate::projector;
use std::io::Write;

/// Writes the leaderboard as `rank,participant,balance`.
///
/// The pot and the mint are left out; ranks count only the rows written.
pub fn write_leaderboard<W: Write, N: NameResolver + ?Sized>(
    entries: &[LedgerEntry],
    names: &N,
    writer: W,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["rank", "participant", "balance"])?;

    let board = projector::leaderboard(entries);
    let ranked = board.iter().filter(|(id, _)| !is_reserved(id));
    for (rank, (id, balance)) in ranked.enumerate() {
        csv_writer.write_record([
            (rank + 1).to_string(),
            names.resolve_name(id),
            balance.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes one participant's balance history as `timestamp,balance`.
pub fn write_history<W: Write>(entries: &[LedgerEntry], participant: &str, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["timestamp", "balance"])?;

    for point in projector::balance_series(entries, participant) {
        csv_writer.write_record([point.timestamp.to_string(), point.balance.to_string()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes a one-row summary as
/// `participant,balance,entries,bought_in,cashed_out,minted`.
pub fn write_stats<W: Write, N: NameResolver + ?Sized>(
    entries: &[LedgerEntry],
    participant: &str,
    names: &N,
    writer: W,
) -> Result<()> {
    let stats = projector::stats(entries, participant);

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "participant",
        "balance",
        "entries",
        "bought_in",
        "cashed_out",
        "minted",
    ])?;
    csv_writer.write_record([
        names.resolve_name(participant),
        stats.balance.to_string(),
        stats.entries.to_string(),
        stats.bought_in.to_string(),
        stats.cashed_out.to_string(),
        stats.minted.to_string(),
    ])?;

    csv_writer.flush()?;
    Ok(())
}

/// Writes one row per settlement round: `round,timestamp,<participant>...`.
///
/// Participant columns cover every non-reserved identifier in the snapshot,
/// in identifier order; anyone not yet seen at a round shows 0.
pub fn write_rounds<W: Write, N: NameResolver + ?Sized>(
    entries: &[LedgerEntry],
    names: &N,
    writer: W,
) -> Result<()> {
    let columns: Vec<String> = projector::participants(entries)
        .into_iter()
        .filter(|id| !is_reserved(id))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["round".to_string(), "timestamp".to_string()];
    header.extend(columns.iter().map(|id| names.resolve_name(id)));
    csv_writer.write_record(&header)?;

    for (round, row) in projector::settlement_series(entries).iter().enumerate() {
        let mut record = vec![(round + 1).to_string(), row.timestamp.to_string()];
        record.extend(
            columns
                .iter()
                .map(|id| row.balances.get(id).copied().unwrap_or(0).to_string()),
        );
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
