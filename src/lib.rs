//! # StrataKV
//!
//! An embedded log-structured merge (LSM) key-value storage engine with:
//! - Write-Ahead Logging (WAL), fsynced before every acknowledged write
//! - Crash recovery by WAL replay
//! - Immutable segments with embedded bloom filters and SHA-256 checksums
//! - Background compaction of the oldest segment generations
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Engine (set / get / del)                     │
//! │          one RwLock over memtable + WAL + segments           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │          │  MemTable   │
//!   │  (Append)   │          │ (RB tree)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ flush
//!                                   ▼
//!                           ┌─────────────┐      ┌─────────────┐
//!                           │  Segments   │◄─────│  Compactor  │
//!                           │ (+ bloom)   │      │  (thread)   │
//!                           └─────────────┘      └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod bloom;
pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;
mod compaction;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StrataError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of StrataKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
