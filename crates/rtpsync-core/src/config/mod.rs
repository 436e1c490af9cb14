use core::fmt::Display;

use num_traits::float::FloatCore;
use rtpsync_types::time::rate::ClockRate;

use crate::error::ConfigError;

#[cfg(feature = "serde")]
mod ser_de;

/// Gap between two successive remote timestamps above which the anchor is
/// replaced, either as a raw tick count or as a wall clock duration that is
/// converted using the server clock rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapThreshold {
    Ticks(u32),
    Micros(u64),
}

impl GapThreshold {
    /// 200000 * 0.09, about 200ms of a 90kHz clock
    pub const DEFAULT_TICKS: u32 = 18_000;

    /// Resolve to remote clock ticks at `server_frequency` ticks per microsecond
    fn to_ticks(self, server_frequency: f64) -> Option<u32> {
        let ticks = match self {
            GapThreshold::Ticks(ticks) => ticks,
            GapThreshold::Micros(us) => {
                let ticks = FloatCore::round(us as f64 * server_frequency);
                if !ticks.is_finite() || ticks > u32::MAX as f64 {
                    return None;
                }
                ticks as u32
            }
        };
        // a modular difference never exceeds i32::MAX
        if ticks == 0 || ticks >= i32::MAX as u32 {
            None
        } else {
            Some(ticks)
        }
    }
}

impl Default for GapThreshold {
    fn default() -> Self {
        GapThreshold::Ticks(Self::DEFAULT_TICKS)
    }
}

impl Display for GapThreshold {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GapThreshold::Ticks(ticks) => write!(f, "{} ticks", ticks),
            GapThreshold::Micros(us) => write!(f, "{}us", us),
        }
    }
}

/// Construction time options of a [`crate::ClockSynchronizer`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockSyncConfig {
    /// Tick rate of the remote (media) clock
    pub server_clock_rate: ClockRate,

    /// Resync threshold for jumps of the remote timestamp
    pub gap_threshold: GapThreshold,
}

/// A configuration with all units resolved and checked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedConfig {
    server_clock_rate: ClockRate,
    server_frequency: f64,
    gap_threshold_ticks: u32,
}

impl ClockSyncConfig {
    pub fn new(server_clock_rate: ClockRate, gap_threshold: GapThreshold) -> Self {
        Self {
            server_clock_rate,
            gap_threshold,
        }
    }

    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let server_frequency = self
            .server_clock_rate
            .ticks_per_micro()
            .filter(|f| f.is_finite())
            .ok_or(ConfigError::InvalidServerRate(self.server_clock_rate))?;
        let gap_threshold_ticks = self
            .gap_threshold
            .to_ticks(server_frequency)
            .ok_or(ConfigError::InvalidGapThreshold(self.gap_threshold))?;
        Ok(ValidatedConfig {
            server_clock_rate: self.server_clock_rate,
            server_frequency,
            gap_threshold_ticks,
        })
    }
}

impl TryFrom<ClockSyncConfig> for ValidatedConfig {
    type Error = ConfigError;

    fn try_from(value: ClockSyncConfig) -> Result<Self, Self::Error> {
        value.validate()
    }
}

impl ValidatedConfig {
    pub fn server_clock_rate(&self) -> ClockRate {
        self.server_clock_rate
    }

    /// Remote clock ticks per microsecond
    pub fn server_frequency(&self) -> f64 {
        self.server_frequency
    }

    pub fn gap_threshold_ticks(&self) -> u32 {
        self.gap_threshold_ticks
    }
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        Self {
            server_clock_rate: ClockRate::MEDIA_90KHZ,
            server_frequency: 0.09,
            gap_threshold_ticks: GapThreshold::DEFAULT_TICKS,
        }
    }
}

/// Local clock ticks per microsecond for a clock reporting `ticks_per_second`
pub(crate) fn client_frequency(ticks_per_second: u64) -> Result<f64, ConfigError> {
    ClockRate::hz(ticks_per_second)
        .ticks_per_micro()
        .ok_or(ConfigError::InvalidClientFrequency(ticks_per_second))
}

#[allow(unused)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ClockSyncConfig::default().validate().unwrap();
        assert!((cfg.server_frequency() - 0.09).abs() < 1e-12);
        assert_eq!(cfg.gap_threshold_ticks(), 18_000);
        assert_eq!(cfg, ValidatedConfig::default());
    }

    #[test]
    fn wall_clock_threshold() {
        let cfg = ClockSyncConfig::new(ClockRate::MEDIA_90KHZ, GapThreshold::Micros(200_000))
            .validate()
            .unwrap();
        assert_eq!(cfg.gap_threshold_ticks(), 18_000);

        // same duration on an audio clock
        let cfg = ClockSyncConfig::new(ClockRate::hz(48_000), GapThreshold::Micros(200_000))
            .validate()
            .unwrap();
        assert_eq!(cfg.gap_threshold_ticks(), 9_600);
    }

    #[test]
    fn rejects_zero_rate() {
        assert_eq!(
            ClockSyncConfig::new(ClockRate::hz(0), GapThreshold::default()).validate(),
            Err(ConfigError::InvalidServerRate(ClockRate::hz(0)))
        );
        assert_eq!(
            ClockSyncConfig::new(ClockRate::rational(90_000, 0), GapThreshold::default()).validate(),
            Err(ConfigError::InvalidServerRate(ClockRate::rational(90_000, 0)))
        );
    }

    #[test]
    fn rejects_bad_threshold() {
        assert!(matches!(
            ClockSyncConfig::new(ClockRate::MEDIA_90KHZ, GapThreshold::Ticks(0)).validate(),
            Err(ConfigError::InvalidGapThreshold(GapThreshold::Ticks(0)))
        ));
        assert!(matches!(
            ClockSyncConfig::new(ClockRate::MEDIA_90KHZ, GapThreshold::Ticks(u32::MAX)).validate(),
            Err(ConfigError::InvalidGapThreshold(_))
        ));
        // rounds to zero ticks
        assert!(matches!(
            ClockSyncConfig::new(ClockRate::MEDIA_90KHZ, GapThreshold::Micros(1)).validate(),
            Err(ConfigError::InvalidGapThreshold(_))
        ));
        assert!(matches!(
            ClockSyncConfig::new(ClockRate::MEDIA_90KHZ, GapThreshold::Micros(u64::MAX)).validate(),
            Err(ConfigError::InvalidGapThreshold(_))
        ));
    }

    #[test]
    fn rejects_zero_client_frequency() {
        assert_eq!(
            client_frequency(0),
            Err(ConfigError::InvalidClientFrequency(0))
        );
        assert_eq!(client_frequency(1_000_000), Ok(1.0));
    }
}
