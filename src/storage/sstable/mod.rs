//! Segment Module
//!
//! Immutable on-disk sorted table produced by a flush or a compaction.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (39 bytes)                                       │
//! │   Magic: "STKV" (4) | EntryCount: u32 (4)               │
//! │   Bloom bitset: 29 bytes, one byte per bit              │
//! │   Version: u16 (2)                                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Body (variable), EntryCount tagged records in key order │
//! │   ['s'][KeyLen: u16][Key][ValLen: u16][Value]           │
//! │   ['d'][KeyLen: u16][Key]                               │
//! ├─────────────────────────────────────────────────────────┤
//! │ Trailer (32 bytes)                                      │
//! │   SHA-256 of the body bytes                             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//! All integers are little-endian. Format version 1 fixes the bloom filter
//! at 29 bits and 10 hash functions.

mod builder;
mod reader;

use std::path::PathBuf;

pub use builder::SegmentBuilder;
pub use reader::{SegmentHeader, SegmentReader};

use crate::bloom::{BLOOM_BITS, BLOOM_HASHES};

// =============================================================================
// Shared Constants (used by builder and reader)
// =============================================================================

/// Magic bytes identifying a segment file
pub(crate) const MAGIC: &[u8; 4] = b"STKV";

/// Current segment format version
pub(crate) const VERSION: u16 = 1;

/// Bloom filter bits for format version 1
pub(crate) const FILTER_BITS: usize = BLOOM_BITS;

/// Bloom filter hash count for format version 1
pub(crate) const FILTER_HASHES: usize = BLOOM_HASHES;

/// Offset of the entry count within the header
pub(crate) const ENTRY_COUNT_OFFSET: u64 = 4;

/// Header size: Magic (4) + EntryCount (4) + Bloom (29) + Version (2) = 39 bytes
pub(crate) const HEADER_SIZE: u64 = 4 + 4 + FILTER_BITS as u64 + 2;

/// Trailer size: SHA-256 digest
pub(crate) const CHECKSUM_SIZE: u64 = 32;

// =============================================================================
// Segment Metadata
// =============================================================================

/// Metadata describing a freshly written segment
#[derive(Debug, Clone)]
pub struct Segment {
    /// Path to the segment file
    pub path: PathBuf,
    /// Number of records in the body
    pub entry_count: u32,
    /// Body-relative offset of the record holding the largest key
    pub max_key_offset: u64,
    /// Largest key written (None for an empty segment)
    pub max_key: Option<Vec<u8>>,
    /// SHA-256 of the body
    pub checksum: [u8; 32],
    /// File size in bytes
    pub file_size: u64,
}

impl Segment {
    /// Get the number of entries
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }
}
