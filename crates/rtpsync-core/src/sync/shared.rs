//! A synchronizer whose anchor can be read from other threads.
//!
//! The anchor is published through a sequence stamp: the writer makes the
//! stamp odd, stores both halves and makes it even again. Readers retry
//! until they read both halves between two equal, even stamps, so they
//! never pair half of a new anchor with half of an old one.

use std::sync::{
    atomic::{self, AtomicU32, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use rtpsync_types::traits::time::clock::MonotonicClockSource;

use super::{
    anchor::{Anchor, Frequencies},
    metrics::ClockSyncMetrics,
    ClockSynchronizer, SyncOutcome,
};

#[derive(Debug, Default)]
struct AnchorCell {
    /// Odd while a write is in progress
    stamp: AtomicUsize,
    server: AtomicU32,
    client: AtomicU64,
}

impl AnchorCell {
    /// Publish a new anchor. Must only be called from a single writer
    fn store(&self, anchor: Anchor) {
        let stamp = self.stamp.load(Ordering::Relaxed);
        self.stamp.store(stamp.wrapping_add(1), Ordering::Relaxed);
        atomic::fence(Ordering::Release);
        self.server.store(anchor.server, Ordering::Relaxed);
        self.client.store(anchor.client, Ordering::Relaxed);
        self.stamp.store(stamp.wrapping_add(2), Ordering::Release);
    }

    /// Read a consistent anchor and the number of anchors published before it
    fn load(&self) -> (Anchor, usize) {
        loop {
            let before = self.stamp.load(Ordering::Acquire);
            if before & 1 == 0 {
                let server = self.server.load(Ordering::Relaxed);
                let client = self.client.load(Ordering::Relaxed);
                atomic::fence(Ordering::Acquire);
                if self.stamp.load(Ordering::Relaxed) == before {
                    break (Anchor::new(server, client), before / 2);
                }
            }
            core::hint::spin_loop();
        }
    }
}

/// Single writer half: wraps a [`ClockSynchronizer`] and publishes every
/// anchor it adopts to its [`DriftReader`]s
#[derive(Debug)]
pub struct SharedClockSynchronizer {
    inner: ClockSynchronizer,
    cell: Arc<AnchorCell>,
}

/// Read half, cheap to clone and send to other threads
#[derive(Debug, Clone)]
pub struct DriftReader {
    cell: Arc<AnchorCell>,
    frequencies: Frequencies,
}

impl SharedClockSynchronizer {
    pub fn new(inner: ClockSynchronizer) -> Self {
        let cell = Arc::new(AnchorCell::default());
        cell.store(inner.anchor());
        Self { inner, cell }
    }

    /// Create a new reader of the published anchor
    pub fn reader(&self) -> DriftReader {
        DriftReader {
            cell: self.cell.clone(),
            frequencies: self.inner.frequencies(),
        }
    }

    /// See [`ClockSynchronizer::sync`]
    pub fn sync(&mut self, remote_timestamp: u32, local_tick: u64) -> SyncOutcome {
        let outcome = self.inner.sync(remote_timestamp, local_tick);
        if outcome.is_resync() {
            self.cell.store(self.inner.anchor());
        }
        outcome
    }

    /// See [`ClockSynchronizer::sync_now`]
    pub fn sync_now(
        &mut self,
        remote_timestamp: u32,
        clock: &impl MonotonicClockSource,
    ) -> SyncOutcome {
        self.sync(remote_timestamp, clock.query_counter())
    }

    /// See [`ClockSynchronizer::resync`]
    pub fn resync(&mut self, remote_timestamp: u32, local_tick: u64) {
        self.inner.resync(remote_timestamp, local_tick);
        self.cell.store(self.inner.anchor());
    }

    pub fn duration(&self, remote_timestamp: u32, local_tick: u64) -> f64 {
        self.inner.duration(remote_timestamp, local_tick)
    }

    pub fn metrics(&self) -> ClockSyncMetrics {
        self.inner.metrics()
    }

    pub fn get(&self) -> &ClockSynchronizer {
        &self.inner
    }

    pub fn into_inner(self) -> ClockSynchronizer {
        self.inner
    }
}

impl From<ClockSynchronizer> for SharedClockSynchronizer {
    fn from(inner: ClockSynchronizer) -> Self {
        Self::new(inner)
    }
}

impl DriftReader {
    /// The most recently published anchor
    pub fn anchor(&self) -> Anchor {
        self.cell.load().0
    }

    /// Number of anchors published, including the initial one
    pub fn version(&self) -> usize {
        self.cell.load().1
    }

    /// See [`ClockSynchronizer::duration`]
    pub fn duration(&self, remote_timestamp: u32, local_tick: u64) -> f64 {
        self.frequencies.drift(self.anchor(), remote_timestamp, local_tick)
    }
}
