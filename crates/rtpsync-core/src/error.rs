use core::fmt::Display;

use rtpsync_types::time::rate::ClockRate;

use crate::config::GapThreshold;

/// Rejected configuration of a synchronizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The remote clock rate is zero or not a number
    InvalidServerRate(ClockRate),

    /// The local clock source reported a frequency of 0 ticks per second
    InvalidClientFrequency(u64),

    /// The threshold resolves to 0 ticks or is too large to ever trigger
    InvalidGapThreshold(GapThreshold),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidServerRate(rate) => {
                write!(f, "invalid server clock rate: {rate}, must be positive")
            }
            ConfigError::InvalidClientFrequency(freq) => {
                write!(f, "invalid client clock frequency: {freq}Hz, must be positive")
            }
            ConfigError::InvalidGapThreshold(threshold) => write!(
                f,
                "invalid gap threshold: {threshold}, must resolve to between 1 and {} ticks",
                i32::MAX - 1
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[allow(unused)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            ConfigError::InvalidClientFrequency(0).to_string(),
            "invalid client clock frequency: 0Hz, must be positive"
        );
        assert_eq!(
            ConfigError::InvalidServerRate(ClockRate::hz(0)).to_string(),
            "invalid server clock rate: 0.00Hz, must be positive"
        );
        assert!(ConfigError::InvalidGapThreshold(GapThreshold::Micros(1))
            .to_string()
            .starts_with("invalid gap threshold: 1us"));
    }
}
