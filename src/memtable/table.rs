//! MemTable implementation
//!
//! Red-black tree plus a running byte counter.

use std::path::Path;

use crate::error::{Result, StrataError};
use crate::storage::{Segment, SegmentBuilder};
use crate::wal::Record;

use super::tree::{Iter, Pair, RedBlackTree};

/// In-memory table for recent writes
#[derive(Debug, Default)]
pub struct MemTable {
    /// Ordered index of live values and tombstones
    tree: RedBlackTree,

    /// Sum of key + value lengths currently held
    size: usize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            tree: RedBlackTree::new(),
            size: 0,
        }
    }

    /// Insert a live value
    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.insert(Pair::live(key, value));
    }

    /// Insert a tombstone (empty value)
    pub fn del(&mut self, key: Vec<u8>) {
        self.insert(Pair::tombstone(key));
    }

    /// Apply a decoded WAL or segment record
    pub fn apply(&mut self, record: Record) {
        self.insert(record.into_pair());
    }

    /// Insert a pair as-is, keeping the byte counter current
    pub fn insert(&mut self, pair: Pair) {
        let delta = self.tree.insert(pair);
        self.size = self.size.saturating_add_signed(delta);
    }

    /// Look up a key in this memtable only.
    ///
    /// - `Ok(value)`: live value
    /// - `Err(KeyDeleted)`: tombstone
    /// - `Err(KeyNotFound)`: no record here; older generations must be consulted
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        match self.tree.search(key) {
            Some(pair) if pair.live => Ok(pair.value.clone()),
            Some(_) => Err(StrataError::KeyDeleted),
            None => Err(StrataError::KeyNotFound),
        }
    }

    /// Raw pair lookup, tombstones included
    pub fn lookup(&self, key: &[u8]) -> Option<&Pair> {
        self.tree.search(key)
    }

    /// Accumulated key + value bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distinct keys held (tombstones included)
    pub fn entry_count(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Check if the flush threshold has been reached
    pub fn should_flush(&self, size_limit: usize) -> bool {
        self.size >= size_limit
    }

    /// Pairs in ascending key order
    pub fn iter(&self) -> Iter<'_> {
        self.tree.iter()
    }

    /// Owned copy of every pair in ascending key order
    pub fn traverse(&self) -> Vec<Pair> {
        self.tree.traverse()
    }

    /// Write the full sorted content to a new segment file at `path`.
    ///
    /// The memtable is left untouched; the caller discards it afterwards.
    pub fn flush(&self, path: &Path) -> Result<Segment> {
        let mut builder = SegmentBuilder::new(path)?;
        for pair in self.tree.iter() {
            builder.add(pair)?;
        }
        builder.finish()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.tree.clear();
        self.size = 0;
    }
}
