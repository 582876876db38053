//! Configuration for StrataKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, StrataError};

/// Main configuration for a StrataKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Default internal structure:
    ///   {data_dir}/
    ///     ├── log.wal          (write-ahead log)
    ///     └── segments/        (SegmentFile<id>.sst files)
    pub data_dir: PathBuf,

    /// Explicit WAL location; `None` means `{data_dir}/log.wal`
    pub wal_path: Option<PathBuf>,

    /// Explicit segment directory; `None` means `{data_dir}/segments`
    pub segment_dir: Option<PathBuf>,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Accumulated key+value bytes at which the memtable is flushed
    pub memtable_size_limit: usize,

    // -------------------------------------------------------------------------
    // Compaction Configuration
    // -------------------------------------------------------------------------
    /// Number of live segments at which the two oldest get merged
    pub compaction_threshold: usize,

    /// Compactor timer tick (milliseconds)
    pub compaction_interval_ms: u64,

    /// Run the compactor on a background thread
    pub background_compaction: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./stratakv_data"),
            wal_path: None,
            segment_dir: None,
            memtable_size_limit: 16 * 1024, // 16 KB
            compaction_threshold: 2,
            compaction_interval_ms: 1000,
            background_compaction: true,
        }
    }
}

impl Config {
    const WAL_FILENAME: &'static str = "log.wal";
    const SEGMENT_DIR: &'static str = "segments";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolved WAL file path
    pub fn wal_path(&self) -> PathBuf {
        self.wal_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(Self::WAL_FILENAME))
    }

    /// Resolved segment directory
    pub fn segment_dir(&self) -> PathBuf {
        self.segment_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(Self::SEGMENT_DIR))
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.memtable_size_limit == 0 {
            return Err(StrataError::Config(
                "memtable_size_limit must be greater than zero".to_string(),
            ));
        }
        if self.compaction_threshold < 2 {
            return Err(StrataError::Config(format!(
                "compaction_threshold must be at least 2, got {}",
                self.compaction_threshold
            )));
        }
        if self.compaction_interval_ms == 0 {
            return Err(StrataError::Config(
                "compaction_interval_ms must be greater than zero".to_string(),
            ));
        }
        let wal_path = self.wal_path();
        if wal_path.parent() == Some(self.segment_dir().as_path()) {
            return Err(StrataError::Config(format!(
                "WAL {} must not live in the segment directory",
                wal_path.display()
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Place the WAL somewhere other than the data directory
    pub fn wal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wal_path = Some(path.into());
        self
    }

    /// Place segments somewhere other than the data directory
    pub fn segment_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.segment_dir = Some(path.into());
        self
    }

    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    /// Set the live segment count that triggers compaction
    pub fn compaction_threshold(mut self, count: usize) -> Self {
        self.config.compaction_threshold = count;
        self
    }

    /// Set the compactor tick interval (in milliseconds)
    pub fn compaction_interval_ms(mut self, ms: u64) -> Self {
        self.config.compaction_interval_ms = ms;
        self
    }

    /// Enable or disable the background compactor thread
    pub fn background_compaction(mut self, enabled: bool) -> Self {
        self.config.background_compaction = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
