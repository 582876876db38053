//! Storage Manager
//!
//! Manages the ordered list of segment generations.
//!
//! ## Responsibilities
//! - Discover existing segments on startup (and delete stray files)
//! - Search segments newest → oldest for reads
//! - Create new segments from memtable flushes
//! - Merge the two oldest segments during compaction

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StrataError};
use crate::memtable::{MemTable, Pair};

use super::{Segment, SegmentBuilder, SegmentReader};

/// Reserved id meaning "no segment"; always the first element of the id list
pub const SENTINEL_ID: u64 = 0;

const SEGMENT_PREFIX: &str = "SegmentFile";
const SEGMENT_SUFFIX: &str = ".sst";
const TMP_SUFFIX: &str = ".tmp";

/// Outcome of merging the two oldest segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionResult {
    /// Id kept; its file now holds the merged content
    pub merged_id: u64,
    /// Id whose file was deleted
    pub removed_id: u64,
    /// Records read from both inputs
    pub entries_in: usize,
    /// Records written to the merged segment
    pub entries_out: usize,
}

/// Manages the segment directory and generation order
///
/// Holds no lock of its own: the engine guards it together with the
/// memtable and the WAL.
#[derive(Debug)]
pub struct SegmentManager {
    /// Directory where segments are stored
    dir: PathBuf,

    /// Live segment ids, oldest first, led by `SENTINEL_ID`
    ids: Vec<u64>,
}

impl SegmentManager {
    /// Open or create storage in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Collect ids from well-formed `SegmentFile<id>.sst` names
    /// 3. Delete every other file found there
    /// 4. Order ids ascending (oldest first)
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let mut found: Vec<u64> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let name = entry.file_name();
            match name.to_str().and_then(parse_segment_id) {
                Some(id) => found.push(id),
                None => {
                    tracing::warn!(path = %path.display(), "Removing malformed file from segment directory");
                    fs::remove_file(&path)?;
                }
            }
        }
        found.sort_unstable();

        let mut ids = Vec::with_capacity(found.len() + 1);
        ids.push(SENTINEL_ID);
        ids.extend(found);

        tracing::debug!(dir = %dir.display(), segments = ids.len() - 1, "Segment directory loaded");

        Ok(Self {
            dir: dir.to_path_buf(),
            ids,
        })
    }

    /// Search segments newest → oldest
    ///
    /// Returns:
    /// - `Ok(value)`: first live value found
    /// - `Err(KeyDeleted)`: a tombstone was hit, or no segment holds the key
    ///
    /// Segments that fail to open or decode are logged and skipped. I/O
    /// errors are propagated.
    pub fn search(&self, key: &[u8]) -> Result<Vec<u8>> {
        for &id in self.live_ids().iter().rev() {
            let path = self.segment_path(id);

            let reader = match SegmentReader::open(&path) {
                Ok(reader) => reader,
                Err(e) if e.is_segment_local() => {
                    tracing::warn!(segment = id, error = %e, "Skipping unreadable segment");
                    continue;
                }
                Err(e) => return Err(e),
            };

            match reader.search(key) {
                Ok(value) => return Ok(value),
                Err(StrataError::KeyDeleted) => return Err(StrataError::KeyDeleted),
                Err(StrataError::KeyCannotBeInFile) | Err(StrataError::KeyNotFound) => {
                    tracing::debug!(segment = id, "Key not in segment");
                    continue;
                }
                Err(e) if e.is_segment_local() => {
                    tracing::warn!(segment = id, error = %e, "Skipping corrupt segment");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(StrataError::KeyDeleted)
    }

    /// Flush a memtable to a new segment with id `max + 1`
    pub fn flush(&mut self, memtable: &MemTable) -> Result<Segment> {
        let id = self.next_id();
        let path = self.segment_path(id);

        let segment = write_segment(&path, memtable.iter())?;
        self.ids.push(id);

        tracing::info!(
            segment = id,
            entries = segment.entry_count,
            bytes = segment.file_size,
            "Memtable flushed"
        );
        Ok(segment)
    }

    /// Merge the two oldest segments into the older one's file.
    ///
    /// Both are parsed oldest-first into one scratch memtable, so the newer
    /// segment's records win. Tombstones are dropped from the output: no
    /// older generation remains for them to shadow. Returns `Ok(None)` when
    /// fewer than two segments exist.
    ///
    /// Any decode or checksum failure aborts the merge and leaves both files
    /// untouched.
    pub fn compact_oldest_pair(&mut self) -> Result<Option<CompactionResult>> {
        if self.segment_count() < 2 {
            return Ok(None);
        }
        let (older_id, newer_id) = (self.ids[1], self.ids[2]);
        let older_path = self.segment_path(older_id);
        let newer_path = self.segment_path(newer_id);

        let mut scratch = MemTable::new();
        let mut entries_in = SegmentReader::open(&older_path)?.parse_into(&mut scratch)?;
        entries_in += SegmentReader::open(&newer_path)?.parse_into(&mut scratch)?;

        let merged = write_segment(&older_path, scratch.iter().filter(|pair| pair.live))?;
        fs::remove_file(&newer_path)?;
        self.ids.remove(2);

        let result = CompactionResult {
            merged_id: older_id,
            removed_id: newer_id,
            entries_in,
            entries_out: merged.entry_count as usize,
        };
        tracing::info!(
            merged = older_id,
            removed = newer_id,
            entries_in = result.entries_in,
            entries_out = result.entries_out,
            "Segments compacted"
        );
        Ok(Some(result))
    }

    /// Every id including the leading sentinel
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// Live segment ids, oldest first
    pub fn live_ids(&self) -> &[u64] {
        &self.ids[1..]
    }

    /// Get the number of live segments
    pub fn segment_count(&self) -> usize {
        self.ids.len() - 1
    }

    /// Id the next flush will use
    pub fn next_id(&self) -> u64 {
        self.ids.iter().max().copied().unwrap_or(SENTINEL_ID) + 1
    }

    /// Get the segment directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate the file path for a segment with given ID
    pub fn segment_path(&self, id: u64) -> PathBuf {
        self.dir.join(segment_file_name(id))
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

/// "SegmentFile42.sst"
fn segment_file_name(id: u64) -> String {
    format!("{}{}{}", SEGMENT_PREFIX, id, SEGMENT_SUFFIX)
}

/// "SegmentFile42.sst" → Some(42); anything else (including id 0) → None
fn parse_segment_id(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(SEGMENT_PREFIX)?.strip_suffix(SEGMENT_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|&id| id != SENTINEL_ID)
}

/// Build a segment beside `path` and rename it into place, so `path` only
/// ever holds a complete segment.
fn write_segment<'a>(path: &Path, pairs: impl Iterator<Item = &'a Pair>) -> Result<Segment> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(TMP_SUFFIX);
    let tmp_path = PathBuf::from(tmp_name);

    let mut builder = SegmentBuilder::new(&tmp_path)?;
    for pair in pairs {
        builder.add(pair)?;
    }
    let mut segment = builder.finish()?;

    fs::rename(&tmp_path, path)?;
    segment.path = path.to_path_buf();
    Ok(segment)
}
