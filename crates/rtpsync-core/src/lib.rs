#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(test)]
#[macro_use]
extern crate std;

/// Configuration of a synchronizer
pub mod config;

pub mod error;

/// Mapping of a wrapping remote media clock onto a local monotonic counter
pub mod sync;

pub use config::{ClockSyncConfig, GapThreshold, ValidatedConfig};
pub use error::ConfigError;
pub use sync::{
    anchor::Anchor,
    metrics::ClockSyncMetrics,
    ClockSynchronizer, ResyncReason, SyncOutcome,
};

#[cfg(feature = "std")]
pub use sync::shared::{DriftReader, SharedClockSynchronizer};
