use core::fmt::{Debug, Display};
use num_traits::{Bounded, PrimInt, Signed, Unsigned, WrappingSub};

/// Unsigned counter that wraps around at `2^BITS`, such as an RTP timestamp
/// or a sequence number. Implemented for u8, u16, u32 and u64
pub trait WrappingCounter: Unsigned + PrimInt + Bounded + WrappingSub + Display + Debug {
    /// Signed integer of the same width
    type Signed: Signed + PrimInt + Display + Debug;

    /// Reinterpret the bits of `self` as the signed type of the same width
    fn as_signed(self) -> Self::Signed;

    /// Signed smallest representative of `self - other mod 2^BITS`.
    ///
    /// Counters that just wrapped yield a small positive difference. A step
    /// backwards by more than half the range reads as a large positive one,
    /// a step backwards by less than half the range is negative.
    fn modular_difference(self, other: Self) -> Self::Signed {
        self.wrapping_sub(&other).as_signed()
    }
}

macro_rules! impl_wrapping_counter {
    ($($u:ty => $s:ty),*) => {
        $(
            impl WrappingCounter for $u {
                type Signed = $s;

                fn as_signed(self) -> $s {
                    self as $s
                }
            }
        )*
    };
}

impl_wrapping_counter!(u8 => i8, u16 => i16, u32 => i32, u64 => i64);

/// Signed smallest representative of `a - b mod 2^32`
///
/// ```
/// use rtpsync_types::traits::math::wrapping::modular_difference32;
///
/// assert_eq!(modular_difference32(100, 0xFFFF_FF00), 356);
/// assert_eq!(modular_difference32(0xFFFF_FF00, 100), -356);
/// ```
pub fn modular_difference32(a: u32, b: u32) -> i32 {
    a.modular_difference(b)
}

/// Two's complement difference `a - b` of two 64 bit counters.
///
/// No wrap-around handling beyond reinterpreting the bits: the local
/// counter is not expected to wrap during the lifetime of a process
pub fn signed_difference64(a: u64, b: u64) -> i64 {
    a.modular_difference(b)
}

#[allow(unused)]
mod test {
    use super::*;

    #[test]
    fn forward() {
        assert_eq!(modular_difference32(1000, 10), 990);
        assert_eq!(modular_difference32(10, 10), 0);
    }

    #[test]
    fn backward_small() {
        assert_eq!(modular_difference32(10, 1000), -990);
    }

    #[test]
    fn across_wrap() {
        assert_eq!(modular_difference32(100, u32::MAX), 101);
        assert_eq!(modular_difference32(0, u32::MAX), 1);
        assert_eq!(modular_difference32(u32::MAX, 0), -1);
    }

    #[test]
    fn half_range() {
        // exactly half the range is the most negative representative
        assert_eq!(modular_difference32(0x8000_0000, 0), i32::MIN);
        assert_eq!(modular_difference32(0x7FFF_FFFF, 0), i32::MAX);
        // a backward jump of more than half the range reads as large and positive
        assert_eq!(modular_difference32(0, 0x8000_0001), 0x7FFF_FFFF);
    }

    #[test]
    fn other_widths() {
        assert_eq!(5u16.modular_difference(65530), 11);
        assert_eq!(3u8.modular_difference(250), 9);
        assert_eq!(signed_difference64(5, 10), -5);
        assert_eq!(signed_difference64(u64::MAX, 0), -1);
    }
}
