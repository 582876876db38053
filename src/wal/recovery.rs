//! WAL Recovery
//!
//! Rebuilds the memtable at startup by replaying the WAL.

use std::path::Path;

use crate::error::{Result, StrataError};
use crate::memtable::MemTable;

use super::entry::Record;
use super::reader::WalReader;

/// Replays a WAL into a fresh memtable
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Records replayed in total
    pub records_replayed: u64,

    /// Set records among them
    pub sets: u64,

    /// Delete records among them
    pub deletes: u64,

    /// Bytes of log consumed
    pub bytes_replayed: u64,
}

impl WalRecovery {
    /// Replay the WAL at `path`.
    ///
    /// A missing file recovers to an empty memtable. Any format error (unknown
    /// tag, truncated record) fails with [`StrataError::WalCorruption`]: the
    /// log cannot be trusted, so startup must not continue.
    pub fn recover(path: &Path) -> Result<(MemTable, RecoveryResult)> {
        let mut memtable = MemTable::new();
        let mut result = RecoveryResult::default();

        if !path.exists() {
            return Ok((memtable, result));
        }

        let mut reader = WalReader::open(path)?;
        loop {
            let offset = reader.position();
            let record = match reader.next_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(StrataError::MalformedEncoding(reason)) => {
                    return Err(StrataError::WalCorruption(format!(
                        "{} at offset {} in {}",
                        reason,
                        offset,
                        path.display()
                    )));
                }
                Err(e) => return Err(e),
            };

            match record {
                Record::Set { .. } => result.sets += 1,
                Record::Delete { .. } => result.deletes += 1,
            }
            result.records_replayed += 1;
            memtable.apply(record);
        }
        result.bytes_replayed = reader.position();

        Ok((memtable, result))
    }
}
