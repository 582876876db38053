//! Storage Module
//!
//! Persistent storage layer: immutable, checksummed segment files and the
//! ordered list of segment generations.
//!
//! ## Responsibilities
//! - Persist memtables to disk in sorted order
//! - Point lookups filtered through per-segment bloom filters
//! - Newest → oldest search across generations
//! - Pairwise compaction of the oldest generations
//!
//! ## Layout
//! ```text
//! {segment_dir}/
//!   ├── SegmentFile1.sst
//!   ├── SegmentFile2.sst
//!   └── ...               (file name id = generation order)
//! ```

mod sstable;
mod manager;

pub use sstable::{Segment, SegmentBuilder, SegmentHeader, SegmentReader};
pub use manager::{CompactionResult, SegmentManager, SENTINEL_ID};
