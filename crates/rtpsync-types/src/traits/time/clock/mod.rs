use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

/// A local monotonic tick counter with a fixed tick rate, like a performance counter.
pub trait MonotonicClockSource {
    /// Returns the number of ticks per second. Queried once when a consumer
    /// is constructed, a value of 0 is rejected by consumers
    fn query_frequency(&self) -> u64;

    /// Returns the current tick. Successive calls never return a smaller value
    fn query_counter(&self) -> u64;
}

impl<C> MonotonicClockSource for &C
where
    C: MonotonicClockSource + ?Sized,
{
    fn query_frequency(&self) -> u64 {
        (**self).query_frequency()
    }

    fn query_counter(&self) -> u64 {
        (**self).query_counter()
    }
}

/// A clock that only moves when told to. Clones share the same counter,
/// so a test can hand one out and keep advancing another
#[derive(Clone, Debug)]
pub struct ManualClock {
    frequency: u64,
    counter: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(frequency: u64) -> Self {
        Self::starting_at(frequency, 0)
    }

    pub fn starting_at(frequency: u64, tick: u64) -> Self {
        Self {
            frequency,
            counter: Arc::new(AtomicU64::new(tick)),
        }
    }

    /// Move the clock forward by `ticks`
    pub fn advance(&self, ticks: u64) {
        self.counter.fetch_add(ticks, Ordering::Relaxed);
    }

    /// Set the clock to `tick`. Moving it backwards violates the
    /// monotonicity contract and is only useful to test misuse
    pub fn set(&self, tick: u64) {
        self.counter.store(tick, Ordering::Relaxed)
    }
}

impl MonotonicClockSource for ManualClock {
    fn query_frequency(&self) -> u64 {
        self.frequency
    }

    fn query_counter(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(feature = "std")]
mod std_clock {

    use super::MonotonicClockSource;
    use std::time::Instant;

    /// A monotonic clock counting nanoseconds since its creation, available
    /// with the std feature enabled
    #[derive(Clone, Copy, Debug)]
    pub struct StdMonotonicClock {
        origin: Instant,
    }

    impl StdMonotonicClock {
        pub const FREQUENCY: u64 = 1_000_000_000;

        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Default for StdMonotonicClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MonotonicClockSource for StdMonotonicClock {
        fn query_frequency(&self) -> u64 {
            Self::FREQUENCY
        }

        fn query_counter(&self) -> u64 {
            // saturates after ~584 years
            u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
        }
    }
}

#[cfg(feature = "std")]
pub use std_clock::StdMonotonicClock;

#[allow(unused)]
mod test {
    use super::*;

    #[test]
    fn manual_clock_shared() {
        let clock = ManualClock::starting_at(1_000_000, 10);
        let handle = clock.clone();
        handle.advance(90);
        assert_eq!(clock.query_counter(), 100);
        assert_eq!((&clock).query_frequency(), 1_000_000);
    }

    #[cfg(feature = "std")]
    #[test]
    fn std_clock_is_monotonic() {
        let clock = StdMonotonicClock::new();
        let a = clock.query_counter();
        let b = clock.query_counter();
        assert!(b >= a);
        assert_eq!(clock.query_frequency(), 1_000_000_000);
    }
}
