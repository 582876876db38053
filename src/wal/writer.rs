//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::BytesMut;

use crate::error::Result;

use super::entry::{encode_delete, encode_set};

/// Appends records to the WAL file.
///
/// Every append is fsynced before it returns: a mutation is only applied to
/// the memtable once its record is durable.
pub struct WalWriter {
    /// Location of the log (needed to truncate and reopen)
    path: PathBuf,

    /// Append-mode handle
    file: File,

    /// Current length of the log in bytes
    len: u64,

    /// Records appended through this writer since open/clean
    records_written: u64,

    /// Reused encode buffer
    buffer: BytesMut,
}

impl WalWriter {
    /// Open or create a WAL file for appending
    pub fn open(path: &Path) -> Result<Self> {
        let file = Self::open_append(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
            records_written: 0,
            buffer: BytesMut::with_capacity(256),
        })
    }

    /// Durably record a set
    pub fn record_set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.buffer.clear();
        encode_set(&mut self.buffer, key, value)?;
        self.write_buffer()
    }

    /// Durably record a delete
    pub fn record_del(&mut self, key: &[u8]) -> Result<()> {
        self.buffer.clear();
        encode_delete(&mut self.buffer, key)?;
        self.write_buffer()
    }

    /// Truncate the log to zero length and reopen it for appending.
    ///
    /// Only valid once everything in the log is durable elsewhere (i.e. right
    /// after the memtable it describes has been flushed to a segment).
    pub fn clean(&mut self) -> Result<()> {
        let truncated = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        truncated.sync_all()?;
        drop(truncated);

        tracing::debug!(
            path = %self.path.display(),
            records = self.records_written,
            bytes = self.len,
            "WAL truncated"
        );

        self.file = Self::open_append(&self.path)?;
        self.len = 0;
        self.records_written = 0;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Current log length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records appended since open or the last clean
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_buffer(&mut self) -> Result<()> {
        self.file.write_all(&self.buffer)?;
        self.file.sync_all()?;
        self.len += self.buffer.len() as u64;
        self.records_written += 1;
        Ok(())
    }

    fn open_append(path: &Path) -> Result<File> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(file)
    }
}
