//! Numbers with an optional SI prefix as suffix, e.g. `90K` or `200m`.

use core::convert::TryFrom;
use core::fmt::Display;
use core::str::FromStr;
use num_traits::float::FloatCore;

#[cfg(feature = "serde")]
pub mod ser_de;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromDecSpecError {
    ParseError(&'static str),
    ConvertNumError,
    ParseNumError,
}

impl Display for FromDecSpecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FromDecSpecError::ParseError(e) => write!(f, "{e}"),
            FromDecSpecError::ConvertNumError => write!(f, "could not convert to target type"),
            FromDecSpecError::ParseNumError => write!(f, "failed to parse number part"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FromDecSpecError {}

/// SI prefix and its power of ten
const PREFIXES: &[(char, i32)] = &[
    ('n', -9),
    ('u', -6),
    ('μ', -6),
    ('m', -3),
    ('K', 3),
    ('k', 3),
    ('M', 6),
    ('G', 9),
];

/// Scale by an exact power of ten, dividing for negative exponents to keep
/// results like `200m == 0.2` exact
fn scale(n: f64, exp: i32) -> f64 {
    let factor = (0..exp.unsigned_abs()).fold(1.0, |acc, _| acc * 10.0);
    if exp < 0 {
        n / factor
    } else {
        n * factor
    }
}

/// Parse a decimal number with an optional SI prefix from nano to giga
pub fn parse_dec_spec(spec: &str) -> Result<f64, FromDecSpecError> {
    let spec = spec.trim();
    let last = spec
        .chars()
        .next_back()
        .ok_or(FromDecSpecError::ParseError("empty"))?;
    let (number, exp) = match PREFIXES.iter().find(|(c, _)| *c == last) {
        Some((c, exp)) => (&spec[..spec.len() - c.len_utf8()], *exp),
        None if last.is_ascii_digit() || last == '.' => (spec, 0),
        None => return Err(FromDecSpecError::ParseError("invalid dec char")),
    };
    f64::from_str(number)
        .map(|n| scale(n, exp))
        .map_err(|_| FromDecSpecError::ParseNumError)
}

pub trait FromDecSpecFloat: Sized {
    fn from_f64(spec: f64) -> Self;

    fn from_dec_spec(spec: &str) -> Result<Self, FromDecSpecError> {
        parse_dec_spec(spec).map(Self::from_f64)
    }
}

pub trait FromDecSpecInt: TryFrom<i128> {
    fn from_dec_spec(spec: &str) -> Result<Self, FromDecSpecError> {
        let value = parse_dec_spec(spec)?;
        if !value.is_finite() || FloatCore::fract(value) != 0.0 {
            return Err(FromDecSpecError::ConvertNumError);
        }
        Self::try_from(value as i128).map_err(|_| FromDecSpecError::ConvertNumError)
    }
}

impl FromDecSpecFloat for f64 {
    fn from_f64(spec: f64) -> Self {
        spec
    }
}

impl FromDecSpecInt for u32 {}
impl FromDecSpecInt for u64 {}

#[allow(unused)]
mod test {

    use super::*;

    #[test]
    fn rates() {
        assert_eq!(u64::from_dec_spec("90K").unwrap(), 90_000);
        assert_eq!(u64::from_dec_spec("48000").unwrap(), 48_000);
        assert_eq!(u64::from_dec_spec("1G").unwrap(), 1_000_000_000);
        // unsigned targets reject negative values
        assert_eq!(u64::from_dec_spec("-2K"), Err(FromDecSpecError::ConvertNumError));
    }

    #[test]
    fn durations() {
        assert_eq!(f64::from_dec_spec("200m").unwrap(), 0.2);
        assert_eq!(f64::from_dec_spec("1500u").unwrap(), 0.0015);
        assert_eq!(f64::from_dec_spec("1500μ").unwrap(), 0.0015);
        assert_eq!(f64::from_dec_spec("2.5").unwrap(), 2.5);
    }

    #[test]
    fn errors() {
        assert_eq!(
            u32::from_dec_spec("not_a_number_K"),
            Err(FromDecSpecError::ParseNumError)
        );
        assert!(matches!(
            u32::from_dec_spec("1.241o"),
            Err(FromDecSpecError::ParseError(_))
        ));
        assert!(matches!(
            u32::from_dec_spec(""),
            Err(FromDecSpecError::ParseError(_))
        ));
        // fractional ticks
        assert_eq!(u32::from_dec_spec("1.5"), Err(FromDecSpecError::ConvertNumError));
        // does not fit
        assert_eq!(u32::from_dec_spec("5G"), Err(FromDecSpecError::ConvertNumError));
    }
}
