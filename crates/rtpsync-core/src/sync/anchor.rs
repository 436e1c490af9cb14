use rtpsync_types::traits::math::wrapping::{modular_difference32, signed_difference64};

/// A remote timestamp and a local tick taken at the same instant. Both
/// halves are only ever replaced together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Anchor {
    /// Remote clock value
    pub server: u32,
    /// Local clock value
    pub client: u64,
}

impl Anchor {
    pub fn new(server: u32, client: u64) -> Self {
        Self { server, client }
    }
}

/// Tick rates of both clocks in ticks per microsecond
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequencies {
    pub server: f64,
    pub client: f64,
}

impl Frequencies {
    /// Drift in microseconds between the local and the remote timeline
    /// since `anchor`. Positive when the local clock is ahead of what the
    /// remote clock predicts. Only meaningful within 2^31 remote ticks of
    /// the anchor
    pub fn drift(&self, anchor: Anchor, remote_timestamp: u32, local_tick: u64) -> f64 {
        let ds = modular_difference32(remote_timestamp, anchor.server);
        let dc = signed_difference64(local_tick, anchor.client);
        dc as f64 / self.client - ds as f64 / self.server
    }
}
