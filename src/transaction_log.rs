//! Durable, append-only transaction log.
//!
//! The log owns the ordered entry sequence and its backing file. One mutex
//! guards both appends and snapshots; readers take a [`Snapshot`] under a
//! single lock acquisition and compute everything from that copy.

use crate::entry::{is_reserved, LedgerEntry};
use crate::error::{LedgerError, Result};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An immutable, point-in-time copy of the entry sequence.
///
/// Cheap to clone and safe to hand to other threads; it never observes
/// appends made after it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    entries: Arc<[LedgerEntry]>,
}

impl Snapshot {
    /// Builds a snapshot from an explicit entry sequence.
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Snapshot {
            entries: entries.into(),
        }
    }

    /// The entries in sequence (append) order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}

impl Deref for Snapshot {
    type Target = [LedgerEntry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

/// The ledger's transaction log, persisted as a JSON array at `path`.
///
/// # Invariants
///
/// - Sequence order is append order and is never rewritten
/// - Every stored entry passed [`LedgerEntry::validate`]
/// - Replaying the sequence keeps every running balance within range
/// - The in-memory sequence always matches the last successful write
#[derive(Debug)]
pub struct TransactionLog {
    path: PathBuf,
    entries: Mutex<Vec<LedgerEntry>>,
}

impl TransactionLog {
    /// Loads the log stored at `path`.
    ///
    /// A missing file yields an empty log. A file that cannot be read as a
    /// sequence of valid entries is a fatal [`LedgerError::CorruptLog`].
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match fs::read(&path) {
            Ok(raw) => parse_entries(&path, &raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No ledger at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} entries from {}", entries.len(), path.display());

        Ok(TransactionLog {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Validates `entry`, appends it and rewrites the backing file.
    ///
    /// On a validation error the log is untouched. If the write fails the
    /// entry is removed again so memory and disk never diverge.
    pub fn append(&self, entry: LedgerEntry) -> Result<()> {
        entry.validate()?;

        let mut entries = self.entries.lock();
        self.commit(&mut entries, entry)
    }

    /// Registers a new player by minting their starting `bank`.
    ///
    /// Fails if `participant` is reserved or already appears anywhere in
    /// the log. The check and the append happen under one lock acquisition.
    pub fn register_player(&self, participant: &str, bank: i64, timestamp: f64) -> Result<()> {
        if is_reserved(participant) {
            return Err(LedgerError::ReservedIdentifier {
                participant: participant.to_string(),
            });
        }

        let entry = LedgerEntry::mint(participant, bank, timestamp);
        entry.validate()?;

        let mut entries = self.entries.lock();
        if entries.iter().any(|e| e.touches(participant)) {
            return Err(LedgerError::AlreadyRegistered {
                participant: participant.to_string(),
            });
        }

        info!("Registering {} with a bank of {}", participant, bank);
        self.commit(&mut entries, entry)
    }

    /// Pushes an already validated entry and persists, undoing the push if
    /// the write fails. Caller holds the lock.
    fn commit(&self, entries: &mut Vec<LedgerEntry>, entry: LedgerEntry) -> Result<()> {
        check_range(entries, &entry)?;

        debug!(
            "Appending #{}: {} -> {} ({}) at {}",
            entries.len() + 1,
            entry.from,
            entry.to,
            entry.amount,
            entry.timestamp
        );
        entries.push(entry);

        if let Err(e) = write_entries(&self.path, entries) {
            entries.pop();
            warn!(
                "Append rolled back, ledger stays at {} entries: {}",
                entries.len(),
                e
            );
            return Err(e);
        }

        Ok(())
    }

    /// Copies the current sequence under the lock.
    pub fn snapshot(&self) -> Snapshot {
        let entries = self.entries.lock();
        Snapshot {
            entries: Arc::from(entries.as_slice()),
        }
    }

    /// Number of entries currently recorded.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the current sequence as CSV (`from,to,amount,timestamp`).
    ///
    /// The snapshot is taken first; the lock is not held while writing.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        let snapshot = self.snapshot();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["from", "to", "amount", "timestamp"])?;
        for entry in snapshot.iter() {
            csv_writer.write_record([
                entry.from.clone(),
                entry.to.clone(),
                entry.amount.to_string(),
                entry.timestamp.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Rejects `entry` if it would move either side's balance out of range.
fn check_range(entries: &[LedgerEntry], entry: &LedgerEntry) -> Result<()> {
    for id in [entry.from.as_str(), entry.to.as_str()] {
        let current: i64 = entries.iter().map(|e| e.delta_for(id)).sum();
        if entry.apply_to(id, current).is_none() {
            return Err(LedgerError::BalanceOverflow {
                participant: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Parses and validates the persisted entry sequence.
fn parse_entries(path: &Path, raw: &[u8]) -> Result<Vec<LedgerEntry>> {
    let corrupt = |reason: String| LedgerError::CorruptLog {
        path: path.to_path_buf(),
        reason,
    };

    let entries: Vec<LedgerEntry> =
        serde_json::from_slice(raw).map_err(|e| corrupt(e.to_string()))?;

    {
        let mut running: HashMap<&str, i64> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            entry
                .validate()
                .map_err(|e| corrupt(format!("entry {}: {}", idx, e)))?;

            for id in [entry.from.as_str(), entry.to.as_str()] {
                let current = running.get(id).copied().unwrap_or(0);
                let next = entry.apply_to(id, current).ok_or_else(|| {
                    corrupt(format!("entry {}: balance of `{}` out of range", idx, id))
                })?;
                running.insert(id, next);
            }
        }
    }

    Ok(entries)
}

/// Sibling temp file for `path`: the full file name with `.tmp` appended.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Overwrites `path` with the whole sequence.
///
/// The JSON is written to a sibling temporary file and renamed over the
/// target, so a reader sees either the old or the new file.
fn write_entries(path: &Path, entries: &[LedgerEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;

    let persist_err = |source: io::Error| LedgerError::Persist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persist_err)?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(persist_err)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(persist_err(e));
    }

    Ok(())
}
