//! Segment Reader
//!
//! Opens segment files, filters lookups through the embedded bloom filter,
//! and decodes the checksummed body.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use bytes::{Buf, Bytes};
use sha2::{Digest, Sha256};

use crate::bloom::BloomFilter;
use crate::error::{Result, StrataError};
use crate::memtable::{MemTable, Pair};
use crate::wal::Record;

use super::{CHECKSUM_SIZE, FILTER_BITS, FILTER_HASHES, HEADER_SIZE, MAGIC, VERSION};

/// Decoded segment header
#[derive(Debug, Clone)]
pub struct SegmentHeader {
    /// Records in the body
    pub entry_count: u32,
    /// Filter over every key in the body
    pub bloom: BloomFilter,
    /// Format version
    pub version: u16,
}

impl SegmentHeader {
    fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.remaining() < HEADER_SIZE as usize {
            return Err(StrataError::NotASegment(format!(
                "header needs {} bytes, got {}",
                HEADER_SIZE,
                buf.remaining()
            )));
        }

        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if &magic != MAGIC {
            return Err(StrataError::NotASegment(format!(
                "invalid magic: expected {:?}, got {:?}",
                MAGIC, magic
            )));
        }

        let entry_count = buf.get_u32_le();
        let bloom = BloomFilter::from_bytes(&buf[..FILTER_BITS], FILTER_HASHES);
        buf.advance(FILTER_BITS);

        let version = buf.get_u16_le();
        if version != VERSION {
            return Err(StrataError::NotASegment(format!(
                "unsupported segment version: {}",
                version
            )));
        }

        Ok(Self {
            entry_count,
            bloom,
            version,
        })
    }
}

/// Reader for one segment file
///
/// Holds the file handle and the decoded header; the body is only read on
/// lookups that pass the bloom filter and on full parses.
pub struct SegmentReader {
    path: PathBuf,
    file: File,
    header: SegmentHeader,
    file_size: u64,
}

impl SegmentReader {
    /// Open a segment and validate its header
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();

        if file_size < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(StrataError::NotASegment(format!(
                "{} is {} bytes, smaller than header + checksum",
                path.display(),
                file_size
            )));
        }

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;
        let header = SegmentHeader::decode(&header)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            file_size,
        })
    }

    /// Bloom filter check; `false` means the key is definitely absent
    pub fn might_contain(&self, key: &[u8]) -> bool {
        self.header.bloom.test(key)
    }

    /// Point lookup
    ///
    /// Returns:
    /// - `Ok(value)`: live value
    /// - `Err(KeyDeleted)`: tombstone
    /// - `Err(KeyCannotBeInFile)`: bloom filter negative, body not read
    /// - `Err(KeyNotFound)`: bloom false positive
    /// - format / corruption errors for a damaged file
    pub fn search(&self, key: &[u8]) -> Result<Vec<u8>> {
        if !self.might_contain(key) {
            return Err(StrataError::KeyCannotBeInFile);
        }

        let mut scratch = MemTable::new();
        self.parse_into(&mut scratch)?;
        scratch.get(key)
    }

    /// Decode the whole body into `memtable`, applying records in order so
    /// they overwrite whatever the memtable already holds for the same keys.
    ///
    /// Returns the number of records applied.
    pub fn parse_into(&self, memtable: &mut MemTable) -> Result<usize> {
        let mut body = self.read_verified_body()?;

        let expected = self.header.entry_count as usize;
        for applied in 0..expected {
            match Record::decode(&mut body)? {
                Some(record) => memtable.apply(record),
                None => {
                    return Err(StrataError::MalformedEncoding(format!(
                        "{}: header promises {} records, body holds {}",
                        self.path.display(),
                        expected,
                        applied
                    )));
                }
            }
        }
        if body.has_remaining() {
            return Err(StrataError::MalformedEncoding(format!(
                "{}: {} trailing bytes after {} records",
                self.path.display(),
                body.remaining(),
                expected
            )));
        }

        Ok(expected)
    }

    /// Every pair in ascending key order
    pub fn read_all(&self) -> Result<Vec<Pair>> {
        let mut memtable = MemTable::new();
        self.parse_into(&mut memtable)?;
        Ok(memtable.traverse())
    }

    pub fn header(&self) -> &SegmentHeader {
        &self.header
    }

    /// Get entry count
    pub fn entry_count(&self) -> u32 {
        self.header.entry_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Read the body and check it against the trailer
    fn read_verified_body(&self) -> Result<Bytes> {
        let body_len = self.file_size - HEADER_SIZE - CHECKSUM_SIZE;

        let mut file = &self.file;
        file.seek(SeekFrom::Start(HEADER_SIZE))?;

        let mut body = vec![0u8; body_len as usize];
        file.read_exact(&mut body)?;
        let mut stored = [0u8; CHECKSUM_SIZE as usize];
        file.read_exact(&mut stored)?;

        let computed = Sha256::digest(&body);
        if computed.as_slice() != stored.as_slice() {
            return Err(StrataError::CorruptSegment(format!(
                "{}: body checksum mismatch",
                self.path.display()
            )));
        }

        Ok(Bytes::from(body))
    }
}
