use num_traits::float::FloatCore;
use rtpsync_types::{
    time::rate::ClockRate,
    util::num::dec_spec::ser_de::{DecSpecFloat, DecSpecInt},
};
use serde::{Deserialize, Deserializer};

use super::{ClockSyncConfig, GapThreshold};

/// Accepts `{ ticks = 18000 }`, `{ micros = "200K" }` or `{ seconds = "200m" }`
impl<'de> Deserialize<'de> for GapThreshold {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "kebab-case")]
        enum Repr {
            Ticks(DecSpecInt<u32>),
            Micros(DecSpecInt<u64>),
            Seconds(DecSpecFloat<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Ticks(ticks) => Ok(GapThreshold::Ticks(ticks.get())),
            Repr::Micros(us) => Ok(GapThreshold::Micros(us.get())),
            Repr::Seconds(s) => {
                let us = FloatCore::round(s.get() * 1.0e6);
                if us.is_finite() && us >= 0.0 && us <= u64::MAX as f64 {
                    Ok(GapThreshold::Micros(us as u64))
                } else {
                    Err(serde::de::Error::custom("gap duration out of range"))
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for ClockSyncConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(default, deny_unknown_fields)]
        struct Repr {
            server_clock_rate: ClockRate,
            gap_threshold: GapThreshold,
        }

        impl Default for Repr {
            fn default() -> Self {
                let ClockSyncConfig {
                    server_clock_rate,
                    gap_threshold,
                } = ClockSyncConfig::default();
                Self {
                    server_clock_rate,
                    gap_threshold,
                }
            }
        }

        let Repr {
            server_clock_rate,
            gap_threshold,
        } = Repr::deserialize(deserializer)?;
        Ok(ClockSyncConfig::new(server_clock_rate, gap_threshold))
    }
}

#[allow(unused)]
mod test {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn empty_is_default() {
        let cfg: ClockSyncConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ClockSyncConfig::default());
    }

    #[test]
    fn dec_spec_values() {
        let cfg: ClockSyncConfig = serde_json::from_str(
            r#"{ "server_clock_rate": "48K", "gap_threshold": { "seconds": "200m" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.server_clock_rate, ClockRate::hz(48_000));
        assert_eq!(cfg.gap_threshold, GapThreshold::Micros(200_000));
        assert_eq!(cfg.validate().unwrap().gap_threshold_ticks(), 9_600);
    }

    #[test]
    fn ticks() {
        let cfg: ClockSyncConfig =
            serde_json::from_str(r#"{ "gap_threshold": { "ticks": "9K" } }"#).unwrap();
        assert_eq!(cfg.gap_threshold, GapThreshold::Ticks(9_000));
    }

    #[test]
    fn invalid() {
        assert!(serde_json::from_str::<ClockSyncConfig>(r#"{ "rate": 1 }"#).is_err());
        assert!(serde_json::from_str::<ClockSyncConfig>(
            r#"{ "gap_threshold": { "seconds": -1 } }"#
        )
        .is_err());
        // parses, but does not validate
        let cfg: ClockSyncConfig =
            serde_json::from_str(r#"{ "server_clock_rate": 0 }"#).unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidServerRate(_))
        ));
    }
}
