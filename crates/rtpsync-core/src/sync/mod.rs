use rtpsync_types::traits::{
    math::wrapping::modular_difference32, time::clock::MonotonicClockSource,
};

use crate::{
    config::{self, ValidatedConfig},
    error::ConfigError,
};

use self::{
    anchor::{Anchor, Frequencies},
    metrics::ClockSyncMetrics,
};

pub mod anchor;

pub mod metrics;

#[cfg(feature = "std")]
pub mod shared;

/// Why an anchor was replaced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResyncReason {
    /// First sample after construction, replacing the bootstrap anchor
    Initial,

    /// The local clock fell behind the remote clock since the anchor,
    /// which cannot happen while the anchor is valid
    NegativeDrift { drift_us: f64 },

    /// The remote timestamp jumped further than the gap threshold
    Gap { delta_ticks: i32 },
}

/// Result of feeding one sample to [`ClockSynchronizer::sync`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// The anchor was kept and the sample is covered by extrapolation
    Kept,
    /// The sample became the new anchor
    Resynced(ResyncReason),
}

impl SyncOutcome {
    pub fn is_resync(&self) -> bool {
        matches!(self, SyncOutcome::Resynced(_))
    }
}

/// Maps a wrapping 32 bit remote media clock onto a local 64 bit monotonic
/// counter by linear extrapolation from an anchor point.
///
/// One instance tracks one stream. Samples are expected to arrive from a
/// single producer, and local ticks must not decrease in real time between
/// calls to [`ClockSynchronizer::sync`]. This is not detected.
#[derive(Debug, Clone)]
pub struct ClockSynchronizer {
    anchor: Anchor,
    /// False until the first sample or explicit resync replaced the bootstrap anchor
    anchored: bool,
    frequencies: Frequencies,
    gap_threshold_ticks: i32,
    last_timestamp: u32,
    metrics: ClockSyncMetrics,
}

impl ClockSynchronizer {
    /// Create a synchronizer, querying the frequency of `clock` once
    pub fn new(
        config: &ValidatedConfig,
        clock: &impl MonotonicClockSource,
    ) -> Result<Self, ConfigError> {
        Self::with_client_frequency(config, clock.query_frequency())
    }

    /// Create a synchronizer for a local clock running at `ticks_per_second`
    pub fn with_client_frequency(
        config: &ValidatedConfig,
        ticks_per_second: u64,
    ) -> Result<Self, ConfigError> {
        let client = config::client_frequency(ticks_per_second)?;
        Ok(Self {
            // bootstrap anchor, replaced by the first real sample
            anchor: Anchor::default(),
            anchored: false,
            frequencies: Frequencies {
                server: config.server_frequency(),
                client,
            },
            // validated to fit
            gap_threshold_ticks: config.gap_threshold_ticks() as i32,
            last_timestamp: 0,
            metrics: ClockSyncMetrics::default(),
        })
    }

    /// Feed a sample and replace the anchor if the local clock fell behind
    /// the remote one or the remote timestamp jumped past the gap threshold.
    /// The timestamp is remembered in either case
    pub fn sync(&mut self, remote_timestamp: u32, local_tick: u64) -> SyncOutcome {
        self.metrics.samples += 1;
        let outcome = match self.resync_reason(remote_timestamp, local_tick) {
            Some(reason) => {
                match reason {
                    ResyncReason::Initial => {
                        self.metrics.initial_anchors += 1;
                        tracing::debug!("anchor at ts {remote_timestamp}, tick {local_tick}");
                    }
                    ResyncReason::NegativeDrift { drift_us } => {
                        self.metrics.negative_drift_resyncs += 1;
                        tracing::debug!(
                            "resync at ts {remote_timestamp}: local clock behind by {:.1}us",
                            -drift_us
                        );
                    }
                    ResyncReason::Gap { delta_ticks } => {
                        self.metrics.gap_resyncs += 1;
                        tracing::debug!(
                            "resync at ts {remote_timestamp}: jumped {delta_ticks} ticks from {}",
                            self.last_timestamp
                        );
                    }
                }
                self.anchor = Anchor::new(remote_timestamp, local_tick);
                self.anchored = true;
                SyncOutcome::Resynced(reason)
            }
            None => {
                tracing::trace!("keep anchor for ts {remote_timestamp}");
                SyncOutcome::Kept
            }
        };
        self.last_timestamp = remote_timestamp;
        outcome
    }

    /// Query the current tick of `clock` and feed it with `remote_timestamp`
    pub fn sync_now(
        &mut self,
        remote_timestamp: u32,
        clock: &impl MonotonicClockSource,
    ) -> SyncOutcome {
        self.sync(remote_timestamp, clock.query_counter())
    }

    /// Unconditionally make this sample the anchor
    pub fn resync(&mut self, remote_timestamp: u32, local_tick: u64) {
        tracing::debug!("manual resync at ts {remote_timestamp}");
        self.metrics.manual_resyncs += 1;
        self.anchor = Anchor::new(remote_timestamp, local_tick);
        self.anchored = true;
        self.last_timestamp = remote_timestamp;
    }

    /// Drift in microseconds between the two timelines since the anchor.
    /// Positive when the local clock runs ahead of what the remote clock
    /// predicts, negative when it is behind.
    ///
    /// The remote difference is a signed 32 bit value, so once 2^31 remote
    /// ticks (about 6.6h of a 90kHz clock) have passed since the anchor it
    /// reads as negative and the result is off by a full wrap. Streams that
    /// long need a periodic [`ClockSynchronizer::resync`]
    pub fn duration(&self, remote_timestamp: u32, local_tick: u64) -> f64 {
        self.frequencies.drift(self.anchor, remote_timestamp, local_tick)
    }

    fn resync_reason(&self, remote_timestamp: u32, local_tick: u64) -> Option<ResyncReason> {
        if !self.anchored {
            return Some(ResyncReason::Initial);
        }
        let drift_us = self.duration(remote_timestamp, local_tick);
        if drift_us < 0.0 {
            return Some(ResyncReason::NegativeDrift { drift_us });
        }
        let delta_ticks = modular_difference32(remote_timestamp, self.last_timestamp);
        (delta_ticks > self.gap_threshold_ticks).then_some(ResyncReason::Gap { delta_ticks })
    }
}

impl ClockSynchronizer {
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Whether a real sample replaced the bootstrap anchor
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn last_timestamp(&self) -> u32 {
        self.last_timestamp
    }

    /// Remote clock ticks per microsecond
    pub fn server_frequency(&self) -> f64 {
        self.frequencies.server
    }

    /// Local clock ticks per microsecond
    pub fn client_frequency(&self) -> f64 {
        self.frequencies.client
    }

    pub fn frequencies(&self) -> Frequencies {
        self.frequencies
    }

    pub fn gap_threshold_ticks(&self) -> u32 {
        self.gap_threshold_ticks as u32
    }

    /// Accumulated metrics
    pub fn metrics(&self) -> ClockSyncMetrics {
        self.metrics.clone()
    }
}

#[cfg(test)]
mod test;
