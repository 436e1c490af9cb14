use core::fmt::{Debug, Display};
use core::marker::PhantomData;

use serde::de::Visitor;
use serde::{Deserialize, Deserializer};

use super::*;

/// Integer that deserializes from a number or a decimal spec string
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DecSpecInt<N: FromDecSpecInt>(N);

/// Float that deserializes from a number or a decimal spec string
#[derive(Clone, Copy, PartialEq)]
pub struct DecSpecFloat<N: FromDecSpecFloat>(N);

impl<'de, N: FromDecSpecInt> Deserialize<'de> for DecSpecInt<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecSpecIntVisitor<T>(PhantomData<T>);

        impl<'de, T: FromDecSpecInt> Visitor<'de> for DecSpecIntVisitor<T> {
            type Value = T;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("integer or decimal spec string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                T::from_dec_spec(v).map_err(E::custom)
            }

            fn visit_i128<E>(self, v: i128) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                T::try_from(v)
                    .map_err(|_| serde::de::Error::custom("value out of range for target type"))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_i128(v as i128)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_i128(v as i128)
            }
        }
        deserializer
            .deserialize_any(DecSpecIntVisitor(PhantomData))
            .map(DecSpecInt)
    }
}

impl<'de, N: FromDecSpecFloat> Deserialize<'de> for DecSpecFloat<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecSpecFloatVisitor<T>(PhantomData<T>);

        impl<'de, T: FromDecSpecFloat> Visitor<'de> for DecSpecFloatVisitor<T> {
            type Value = T;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("number or decimal spec string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                T::from_dec_spec(v).map_err(E::custom)
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(T::from_f64(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(T::from_f64(v as f64))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(T::from_f64(v as f64))
            }
        }
        deserializer
            .deserialize_any(DecSpecFloatVisitor(PhantomData))
            .map(DecSpecFloat)
    }
}

macro_rules! impl_dec_spec_wrapper {
    ($trait:tt, $wrapper:tt) => {
        impl<N: $trait + Debug> Debug for $wrapper<N> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl<N: $trait + Display> Display for $wrapper<N> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl<N: $trait + Copy> $wrapper<N> {
            pub fn get(&self) -> N {
                self.0
            }
        }
    };
}

impl_dec_spec_wrapper!(FromDecSpecInt, DecSpecInt);
impl_dec_spec_wrapper!(FromDecSpecFloat, DecSpecFloat);

#[allow(unused)]
mod test {
    use super::*;

    #[test]
    fn int_from_string_or_number() {
        let v: DecSpecInt<u32> = serde_json::from_str("\"18K\"").unwrap();
        assert_eq!(v.get(), 18_000);
        let v: DecSpecInt<u32> = serde_json::from_str("18000").unwrap();
        assert_eq!(v.get(), 18_000);
        assert!(serde_json::from_str::<DecSpecInt<u32>>("-1").is_err());
    }

    #[test]
    fn float_from_string_or_number() {
        let v: DecSpecFloat<f64> = serde_json::from_str("\"200m\"").unwrap();
        assert_eq!(v.get(), 0.2);
        let v: DecSpecFloat<f64> = serde_json::from_str("2").unwrap();
        assert_eq!(v.get(), 2.0);
    }
}
