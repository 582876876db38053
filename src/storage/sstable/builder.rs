//! Segment Builder
//!
//! Writes sorted pairs to a new segment file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;
use sha2::{Digest, Sha256};

use crate::bloom::BloomFilter;
use crate::error::{Result, StrataError};
use crate::memtable::Pair;
use crate::wal::encode_pair;

use super::{Segment, ENTRY_COUNT_OFFSET, FILTER_BITS, FILTER_HASHES, MAGIC, VERSION};

/// Builder for creating new segments from sorted pairs
pub struct SegmentBuilder {
    /// Output file path
    path: PathBuf,
    /// Buffered writer for performance
    writer: BufWriter<File>,
    /// Number of records written
    entry_count: u32,
    /// Body bytes written so far
    body_len: u64,
    /// Body-relative offset of the most recent record
    last_record_offset: u64,
    /// Most recent key (enforces strictly ascending order)
    last_key: Option<Vec<u8>>,
    /// Filter over every key, patched into the header on finish
    bloom: BloomFilter,
    /// Running SHA-256 over the body
    body_hasher: Sha256,
    /// Reused encode buffer
    buffer: BytesMut,
}

impl SegmentBuilder {
    /// Create a new segment builder
    ///
    /// Writes a placeholder header immediately; call `add()` in strictly
    /// ascending key order, then `finish()` to write the trailer and patch
    /// the header.
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        writer.write_all(&0u32.to_le_bytes())?; // Placeholder for entry count
        writer.write_all(&[0u8; FILTER_BITS])?; // Placeholder for bloom bitset
        writer.write_all(&VERSION.to_le_bytes())?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            entry_count: 0,
            body_len: 0,
            last_record_offset: 0,
            last_key: None,
            bloom: BloomFilter::new(FILTER_BITS, FILTER_HASHES),
            body_hasher: Sha256::new(),
            buffer: BytesMut::with_capacity(256),
        })
    }

    /// Append one pair (live or tombstone)
    pub fn add(&mut self, pair: &Pair) -> Result<()> {
        if let Some(last) = &self.last_key {
            if pair.key.as_slice() <= last.as_slice() {
                return Err(StrataError::Storage(format!(
                    "segment keys must be strictly ascending: {:?} after {:?}",
                    String::from_utf8_lossy(&pair.key),
                    String::from_utf8_lossy(last)
                )));
            }
        }
        if self.entry_count == u32::MAX {
            return Err(StrataError::Storage(
                "segment entry count overflows u32".to_string(),
            ));
        }

        self.buffer.clear();
        encode_pair(&mut self.buffer, pair)?;

        self.writer.write_all(&self.buffer)?;
        self.body_hasher.update(&self.buffer);
        self.bloom.add(&pair.key);

        self.last_record_offset = self.body_len;
        self.body_len += self.buffer.len() as u64;
        self.entry_count += 1;
        self.last_key = Some(pair.key.clone());

        Ok(())
    }

    /// Finish building: write the checksum trailer, patch the header, sync
    pub fn finish(mut self) -> Result<Segment> {
        let mut checksum = [0u8; 32];
        checksum.copy_from_slice(&self.body_hasher.finalize());
        self.writer.write_all(&checksum)?;
        self.writer.flush()?;

        // Seek back and fill in entry count and bloom bitset
        let mut file = self.writer.into_inner().map_err(|e| {
            StrataError::Storage(format!("Failed to flush segment: {}", e))
        })?;
        file.seek(SeekFrom::Start(ENTRY_COUNT_OFFSET))?;
        file.write_all(&self.entry_count.to_le_bytes())?;
        file.write_all(&self.bloom.to_bytes())?;
        file.sync_all()?;

        let file_size = file.metadata()?.len();

        Ok(Segment {
            path: self.path,
            entry_count: self.entry_count,
            max_key_offset: self.last_record_offset,
            max_key: self.last_key,
            checksum,
            file_size,
        })
    }
}
