//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append a record and fsync it before any in-memory mutation
//! - Replay the log into a memtable at startup
//! - Truncate the log once its content has been flushed to a segment
//!
//! ## File Format
//! A bare stream of tagged records, the same encoding as segment bodies
//! (no header, no bloom filter, no checksum):
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ 's' │ KeyLen (2) │ Key │ ValLen (2) │ Value      │
//! ├─────────────────────────────────────────────────┤
//! │ 'd' │ KeyLen (2) │ Key                           │
//! ├─────────────────────────────────────────────────┤
//! │ ...                                             │
//! └─────────────────────────────────────────────────┘
//! ```

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{encode_delete, encode_pair, encode_set, Record, DELETE_TAG, SET_TAG};
pub use writer::WalWriter;
pub use reader::WalReader;
pub use recovery::{WalRecovery, RecoveryResult};
