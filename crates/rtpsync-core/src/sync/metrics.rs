/// Counters accumulated by a synchronizer. A resync count close to the
/// sample count means the gap threshold is too tight for the stream
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClockSyncMetrics {
    pub samples: u64,
    pub initial_anchors: u64,
    pub negative_drift_resyncs: u64,
    pub gap_resyncs: u64,
    pub manual_resyncs: u64,
}

impl ClockSyncMetrics {
    /// Total number of anchor replacements
    pub fn resyncs(&self) -> u64 {
        self.initial_anchors + self.negative_drift_resyncs + self.gap_resyncs + self.manual_resyncs
    }
}
