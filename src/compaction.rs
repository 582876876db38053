//! Background Compaction
//!
//! A dedicated thread that merges the two oldest segments whenever the live
//! segment count reaches the configured threshold.
//!
//! The thread sleeps on a `crossbeam` select over three channels:
//! - an explicit request, sent by the engine after every flush
//! - a timer tick, as a backstop
//! - shutdown, sent when the engine is closed or dropped
//!
//! Each merge takes the engine's write lock, so compaction never races a
//! flush or a write.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::RwLock;

use crate::engine::EngineState;
use crate::error::{Result, StrataError};
use crate::storage::CompactionResult;

/// Merge oldest pairs until fewer than `threshold` segments remain.
///
/// The write lock is taken per merge, so readers get in between merges.
pub(crate) fn compact_while(
    state: &RwLock<EngineState>,
    threshold: usize,
) -> Result<Vec<CompactionResult>> {
    let mut results = Vec::new();
    loop {
        let mut guard = state.write();
        if guard.segments.segment_count() < threshold {
            break;
        }
        match guard.segments.compact_oldest_pair()? {
            Some(result) => results.push(result),
            None => break,
        }
    }
    Ok(results)
}

/// Handle to the running compactor thread
pub(crate) struct Compactor {
    requests: Sender<()>,
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Compactor {
    /// Start the compactor thread
    pub(crate) fn spawn(
        state: Arc<RwLock<EngineState>>,
        threshold: usize,
        interval: Duration,
    ) -> Result<Self> {
        // Capacity 1: requests arriving while one is pending coalesce
        let (request_tx, request_rx) = bounded(1);
        let (shutdown_tx, shutdown_rx) = bounded(1);

        let handle = thread::Builder::new()
            .name("stratakv-compactor".to_string())
            .spawn(move || run(state, threshold, interval, request_rx, shutdown_rx))
            .map_err(|e| StrataError::Compaction(format!("failed to spawn compactor: {}", e)))?;

        tracing::debug!(threshold, interval_ms = interval.as_millis() as u64, "Compactor started");

        Ok(Self {
            requests: request_tx,
            shutdown: shutdown_tx,
            handle: Some(handle),
        })
    }

    /// Ask for a compaction pass without waiting for it
    pub(crate) fn request(&self) {
        let _ = self.requests.try_send(());
    }

    /// Signal the thread and wait for it to exit
    pub(crate) fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.shutdown.try_send(());
        if handle.join().is_err() {
            tracing::error!("Compactor thread panicked");
        }
    }
}

impl Drop for Compactor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    state: Arc<RwLock<EngineState>>,
    threshold: usize,
    interval: Duration,
    requests: Receiver<()>,
    shutdown: Receiver<()>,
) {
    let ticker = tick(interval);
    let mut failures = FailureStreak::default();

    loop {
        select! {
            recv(shutdown) -> _ => break,
            recv(requests) -> msg => {
                if msg.is_err() {
                    break;
                }
                compaction_pass(&state, threshold, &mut failures);
            }
            recv(ticker) -> _ => compaction_pass(&state, threshold, &mut failures),
        }
    }

    tracing::debug!("Compactor stopped");
}

fn compaction_pass(
    state: &RwLock<EngineState>,
    threshold: usize,
    failures: &mut FailureStreak,
) {
    match compact_while(state, threshold) {
        Ok(results) => {
            if let Some(failed_passes) = failures.succeeded() {
                tracing::info!(failed_passes, "Compaction recovered");
            }
            if !results.is_empty() {
                tracing::debug!(merges = results.len(), "Compaction pass finished");
            }
        }
        Err(e) => {
            if failures.failed() {
                tracing::warn!(error = %e, "Compaction pass failed, retrying each tick");
            } else {
                tracing::trace!(
                    error = %e,
                    failed_passes = failures.len(),
                    "Compaction still failing"
                );
            }
        }
    }
}

/// Consecutive failed passes, so a merge that keeps failing on the same
/// segment is reported once instead of on every tick
#[derive(Debug, Default)]
struct FailureStreak {
    len: u64,
}

impl FailureStreak {
    /// Count a failure; `true` if it starts a new streak
    fn failed(&mut self) -> bool {
        self.len += 1;
        self.len == 1
    }

    /// End the streak; returns its length if there was one
    fn succeeded(&mut self) -> Option<u64> {
        match std::mem::take(&mut self.len) {
            0 => None,
            len => Some(len),
        }
    }

    fn len(&self) -> u64 {
        self.len
    }
}
