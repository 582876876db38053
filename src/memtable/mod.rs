//! MemTable Module
//!
//! In-memory data structure for recent writes.
//!
//! ## Responsibilities
//! - Fast point reads and writes in memory
//! - Track accumulated key+value bytes for the flush trigger
//! - Ordered iteration for segment creation
//!
//! ## Data Structure Choice
//! A left-leaning red-black tree with owned child links. Concurrency is the
//! engine's job: the memtable sits behind the engine's single RwLock together
//! with the WAL and the segment list, so it needs no lock of its own.

mod table;
mod tree;

pub use table::MemTable;
pub use tree::{max_offset, Iter, Pair, RedBlackTree};
