use core::{cmp::Ordering, fmt::Display};

/// Rate of a clock in ticks per second, stored as a rational number so
/// rates like 30000/1001 stay exact
#[derive(Clone, Copy, Debug)]
pub struct ClockRate {
    pub num: u64,
    pub den: u64,
}

impl ClockRate {
    /// Clock rate of RTP video and MPEG-TS timestamps
    pub const MEDIA_90KHZ: ClockRate = ClockRate::hz(90_000);

    const MICROS_PER_SECOND: f64 = 1.0e6;

    pub const fn hz(hz: u64) -> Self {
        Self { num: hz, den: 1 }
    }

    pub const fn rational(num: u64, den: u64) -> Self {
        Self { num, den }
    }

    /// Ticks per second, or None if the denominator is zero
    pub fn to_f64_checked(&self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }

    /// Ticks per microsecond, or None if the rate is not strictly positive
    pub fn ticks_per_micro(&self) -> Option<f64> {
        self.to_f64_checked()
            .filter(|hz| *hz > 0.0)
            .map(|hz| hz / Self::MICROS_PER_SECOND)
    }
}

impl Default for ClockRate {
    fn default() -> Self {
        Self::MEDIA_90KHZ
    }
}

impl From<u64> for ClockRate {
    fn from(hz: u64) -> Self {
        Self::hz(hz)
    }
}

impl From<(u64, u64)> for ClockRate {
    fn from(rat: (u64, u64)) -> Self {
        Self::rational(rat.0, rat.1)
    }
}

impl Display for ClockRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.to_f64_checked() {
            Some(hz) => write!(f, "{:.2}Hz", hz),
            None => write!(f, "{}/{}Hz", self.num, self.den),
        }
    }
}

/// Rates compare by value. Rates with a zero denominator have no value and
/// are only equal to the exact same fraction
impl PartialEq for ClockRate {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_f64_checked(), other.to_f64_checked()) {
            (Some(a), Some(b)) => a == b,
            _ => self.num == other.num && self.den == other.den,
        }
    }
}

impl PartialOrd for ClockRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.den == 0 || other.den == 0 {
            (self == other).then_some(Ordering::Equal)
        } else if self.den == other.den {
            self.num.partial_cmp(&other.num)
        } else {
            self.to_f64_checked()?.partial_cmp(&other.to_f64_checked()?)
        }
    }
}

#[cfg(feature = "serde")]
mod ser_de {
    use super::ClockRate;
    use crate::util::num::dec_spec::ser_de::DecSpecInt;
    use serde::{Deserialize, Deserializer};

    /// Deserializes from a plain number or a decimal spec string such as
    /// `"90K"`, or from a `{ num, den }` table
    impl<'de> Deserialize<'de> for ClockRate {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Repr {
                Hz(DecSpecInt<u64>),
                Rational { num: u64, den: u64 },
            }

            Ok(match Repr::deserialize(deserializer)? {
                Repr::Hz(hz) => ClockRate::hz(hz.get()),
                Repr::Rational { num, den } => ClockRate::rational(num, den),
            })
        }
    }
}

#[allow(unused)]
mod test {
    use super::*;

    #[test]
    fn zero_rate() {
        let rate = ClockRate::from((1234, 0));
        assert!(rate.to_f64_checked().is_none());
        assert!(rate.ticks_per_micro().is_none());
        assert!(ClockRate::hz(0).ticks_per_micro().is_none());
    }

    #[test]
    fn media_clock() {
        let tpu = ClockRate::MEDIA_90KHZ.ticks_per_micro().unwrap();
        assert!((tpu - 0.09).abs() < 1e-12);
    }

    #[test]
    fn cmp_common_den() {
        assert!(ClockRate::from((60000, 1001)) > ClockRate::from((30000, 1001)));
    }

    #[test]
    fn cmp_float() {
        assert!(ClockRate::from((60000, 1001)) < ClockRate::hz(60));
        assert_eq!(ClockRate::from((180_000, 2)), ClockRate::MEDIA_90KHZ);
    }

    #[test]
    fn zero_den_eq() {
        let invalid = ClockRate::rational(90_000, 0);
        assert_eq!(invalid, invalid);
        assert_eq!(invalid.partial_cmp(&invalid), Some(Ordering::Equal));
        assert_ne!(invalid, ClockRate::rational(48_000, 0));
        assert_ne!(invalid, ClockRate::MEDIA_90KHZ);
        assert!(invalid.partial_cmp(&ClockRate::MEDIA_90KHZ).is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize() {
        let rate: ClockRate = serde_json::from_str("\"90K\"").unwrap();
        assert_eq!(rate, ClockRate::MEDIA_90KHZ);
        let rate: ClockRate = serde_json::from_str("48000").unwrap();
        assert_eq!(rate, ClockRate::hz(48_000));
        let rate: ClockRate = serde_json::from_str(r#"{ "num": 30000, "den": 1001 }"#).unwrap();
        assert_eq!(rate.den, 1001);
    }
}
