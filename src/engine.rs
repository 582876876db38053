//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and segment generations
//! - Handle concurrent read/write access
//! - Flush the MemTable when it crosses the size limit
//! - Replay the WAL on startup
//! - Drive background compaction

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::compaction::{self, Compactor};
use crate::config::Config;
use crate::error::{Result, StrataError};
use crate::memtable::MemTable;
use crate::storage::{CompactionResult, Segment, SegmentManager};
use crate::wal::{WalRecovery, WalWriter};

/// Everything guarded by the engine lock
pub(crate) struct EngineState {
    /// In-memory table for recent writes
    pub(crate) memtable: MemTable,

    /// Write-ahead log for the current memtable
    pub(crate) wal: WalWriter,

    /// Segment generations, oldest first
    pub(crate) segments: SegmentManager,
}

/// The main storage engine
///
/// ## Concurrency Model: one reader-writer lock
///
/// A single `RwLock` guards the memtable, the WAL handle and the segment
/// list together:
/// - **Writes** (set/del/flush/compaction): exclusive
/// - **Reads** (get): shared; segment files are never modified in place, so
///   concurrent readers can open and decode them freely
///
/// `set` and `del` return only after their WAL record is fsynced.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Memtable + WAL + segment list
    state: Arc<RwLock<EngineState>>,

    /// Background compactor (None when disabled)
    compactor: Option<Compactor>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data, WAL and segment directories (the WAL must not be
    ///    inside the segment directory)
    /// 2. Replay the WAL into a fresh memtable (format errors are fatal)
    /// 3. Discover segments, deleting stray files
    /// 4. Start the compactor
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)?;
        let wal_path = config.wal_path();
        if let Some(parent) = wal_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let segment_dir = config.segment_dir();
        fs::create_dir_all(&segment_dir)?;
        ensure_wal_outside(&wal_path, &segment_dir)?;

        let (memtable, recovery) = WalRecovery::recover(&wal_path)?;
        if recovery.records_replayed > 0 {
            tracing::info!(
                records = recovery.records_replayed,
                sets = recovery.sets,
                deletes = recovery.deletes,
                bytes = recovery.bytes_replayed,
                "WAL replayed"
            );
        }

        let segments = SegmentManager::open(&segment_dir)?;
        let wal = WalWriter::open(&wal_path)?;

        let state = Arc::new(RwLock::new(EngineState {
            memtable,
            wal,
            segments,
        }));

        let compactor = if config.background_compaction {
            Some(Compactor::spawn(
                Arc::clone(&state),
                config.compaction_threshold,
                Duration::from_millis(config.compaction_interval_ms),
            )?)
        } else {
            None
        };

        {
            let state = state.read();
            tracing::info!(
                data_dir = %config.data_dir.display(),
                segments = state.segments.segment_count(),
                memtable_entries = state.memtable.entry_count(),
                "Engine opened"
            );
        }

        Ok(Self {
            config,
            state,
            compactor,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Get the live value for a key
    ///
    /// Search order:
    /// 1. MemTable (most recent writes)
    /// 2. Segments (newest to oldest)
    ///
    /// A key that was deleted and a key that never existed both report
    /// `Err(KeyDeleted)`.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let state = self.state.read();
        Self::lookup(&state, key)
    }

    /// Set a key-value pair
    ///
    /// Steps:
    /// 1. Acquire write lock
    /// 2. Write to WAL and fsync (durability)
    /// 3. Write to MemTable
    /// 4. Flush if the size limit is reached
    ///
    /// Once step 2 succeeds the write is committed and `Ok` is returned even
    /// if the flush fails; the memtable keeps the data and the next write
    /// retries the flush.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let flushed = {
            let mut state = self.state.write();

            state.wal.record_set(key, value)?;
            state.memtable.set(key.to_vec(), value.to_vec());

            self.flush_if_needed(&mut state)
        };

        if flushed {
            self.request_compaction();
        }
        Ok(())
    }

    /// Delete a key, returning the value it held
    ///
    /// Steps:
    /// 1. Acquire write lock
    /// 2. Resolve the current value (fails with `KeyDeleted` if none)
    /// 3. Write tombstone to WAL and fsync
    /// 4. Write tombstone to MemTable
    /// 5. Flush if the size limit is reached (failures handled as in `set`)
    pub fn del(&self, key: &[u8]) -> Result<Vec<u8>> {
        let (prior, flushed) = {
            let mut state = self.state.write();

            let prior = Self::lookup(&state, key)?;

            state.wal.record_del(key)?;
            state.memtable.del(key.to_vec());

            (prior, self.flush_if_needed(&mut state))
        };

        if flushed {
            self.request_compaction();
        }
        Ok(prior)
    }

    /// Flush memtable to disk (public API)
    ///
    /// Forces a flush regardless of memtable size. Returns `None` when the
    /// memtable is empty.
    pub fn flush(&self) -> Result<Option<Segment>> {
        let segment = {
            let mut state = self.state.write();
            if state.memtable.is_empty() {
                return Ok(None);
            }
            Self::flush_locked(&mut state)?
        };

        self.request_compaction();
        Ok(Some(segment))
    }

    /// Compact synchronously until at most one segment remains
    pub fn compact(&self) -> Result<Vec<CompactionResult>> {
        compaction::compact_while(&self.state, 2)
    }

    /// Compact synchronously while the live segment count is at or above
    /// `compaction_threshold`, the same rule the background compactor follows
    pub fn compact_if_needed(&self) -> Result<Vec<CompactionResult>> {
        compaction::compact_while(&self.state, self.config.compaction_threshold)
    }

    /// Close the engine gracefully
    ///
    /// Stops the compactor, flushes any pending data and syncs the WAL.
    /// Dropping an engine without closing it behaves like a crash: the
    /// memtable is rebuilt from the WAL on the next open.
    pub fn close(mut self) -> Result<()> {
        if let Some(mut compactor) = self.compactor.take() {
            compactor.stop();
        }

        let mut state = self.state.write();
        if !state.memtable.is_empty() {
            Self::flush_locked(&mut state)?;
        }
        state.wal.sync()?;

        tracing::info!(segments = state.segments.segment_count(), "Engine closed");
        Ok(())
    }

    // =========================================================================
    // Internals (called with the lock held)
    // =========================================================================

    /// Memtable first, then segments newest → oldest
    fn lookup(state: &EngineState, key: &[u8]) -> Result<Vec<u8>> {
        match state.memtable.get(key) {
            Err(StrataError::KeyNotFound) => state.segments.search(key),
            resolved => resolved,
        }
    }

    /// Flush once the size limit is reached; a failure is logged, not returned
    fn flush_if_needed(&self, state: &mut EngineState) -> bool {
        if !state.memtable.should_flush(self.config.memtable_size_limit) {
            return false;
        }
        match Self::flush_locked(state) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    memtable_bytes = state.memtable.size(),
                    "Flush failed, will retry on next write"
                );
                false
            }
        }
    }

    /// Write the memtable to a new segment, replace it, truncate the WAL.
    ///
    /// The WAL is only cleared once the segment is durably in place.
    fn flush_locked(state: &mut EngineState) -> Result<Segment> {
        let segment = state.segments.flush(&state.memtable)?;
        state.memtable = MemTable::new();
        state.wal.clean()?;
        Ok(segment)
    }

    fn request_compaction(&self) {
        if let Some(compactor) = &self.compactor {
            compactor.request();
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the segment directory path
    pub fn segment_dir(&self) -> PathBuf {
        self.config.segment_dir()
    }

    /// Get the WAL file path
    pub fn wal_path(&self) -> PathBuf {
        self.config.wal_path()
    }

    /// Get the current memtable size
    pub fn memtable_size(&self) -> usize {
        self.state.read().memtable.size()
    }

    /// Get the memtable entry count
    pub fn memtable_entry_count(&self) -> usize {
        self.state.read().memtable.entry_count()
    }

    /// Get the number of live segments
    pub fn segment_count(&self) -> usize {
        self.state.read().segments.segment_count()
    }

    /// Live segment ids, oldest first
    pub fn segment_ids(&self) -> Vec<u64> {
        self.state.read().segments.live_ids().to_vec()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Segment discovery deletes every non-segment file in its directory, so the
/// WAL must sit elsewhere. Both directories are compared after resolving.
fn ensure_wal_outside(wal_path: &Path, segment_dir: &Path) -> Result<()> {
    let Some(wal_dir) = wal_path.parent() else {
        return Ok(());
    };
    let wal_dir = if wal_dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        wal_dir
    };
    if fs::canonicalize(wal_dir)? == fs::canonicalize(segment_dir)? {
        return Err(StrataError::Config(format!(
            "WAL {} must not live in the segment directory {}",
            wal_path.display(),
            segment_dir.display()
        )));
    }
    Ok(())
}
