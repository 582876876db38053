//! Error types for StrataKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StrataError
pub type Result<T> = std::result::Result<T, StrataError>;

/// Unified error type for StrataKV operations
#[derive(Debug, Error)]
pub enum StrataError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lookup Outcomes
    // -------------------------------------------------------------------------
    /// Absent from one memtable or one segment; older generations must still be consulted
    #[error("Key not found in this table")]
    KeyNotFound,

    /// No live value exists: either a tombstone shadows it or nothing was ever written
    #[error("Key does not exist")]
    KeyDeleted,

    /// The segment's bloom filter rules the key out
    #[error("Key cannot be in this segment")]
    KeyCannotBeInFile,

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Segment Format Errors
    // -------------------------------------------------------------------------
    #[error("Not a segment file: {0}")]
    NotASegment(String),

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Segment content is corrupt: {0}")]
    CorruptSegment(String),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    // -------------------------------------------------------------------------
    // Encoding Limits
    // -------------------------------------------------------------------------
    #[error("{field} too large: {len} bytes (max 65535)")]
    EntryTooLarge { field: &'static str, len: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Background Task Errors
    // -------------------------------------------------------------------------
    #[error("Compaction error: {0}")]
    Compaction(String),
}

impl StrataError {
    /// True for errors confined to a single segment file.
    ///
    /// The read path logs these and moves on to the next generation instead
    /// of failing the whole lookup.
    pub fn is_segment_local(&self) -> bool {
        matches!(
            self,
            StrataError::NotASegment(_)
                | StrataError::MalformedEncoding(_)
                | StrataError::CorruptSegment(_)
        )
    }
}
