//! WAL Reader
//!
//! Sequential decoding of a WAL file from offset 0.

use std::fs;
use std::path::Path;

use bytes::{Buf, Bytes};

use crate::error::Result;

use super::entry::Record;

/// Reads records from a WAL file in append order
pub struct WalReader {
    /// Undecoded remainder of the log
    data: Bytes,

    /// Offset of `data` within the file
    position: u64,
}

impl WalReader {
    /// Open a WAL file for reading (loads it into memory)
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(Self::from_bytes(Bytes::from(data)))
    }

    /// Read records from an in-memory copy of a log
    pub fn from_bytes(data: Bytes) -> Self {
        Self { data, position: 0 }
    }

    /// Decode the next record; `Ok(None)` at a clean end of log
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let before = self.data.remaining();
        let record = Record::decode(&mut self.data)?;
        self.position += (before - self.data.remaining()) as u64;
        Ok(record)
    }

    /// Byte offset of the next undecoded record
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Iterator for WalReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
