//! Numeric conventions of the GRIB2 regulations.
//!
//! Signed integers in GRIB2 are not stored in two's complement. Regulation
//! 92.1.5 reserves the most significant bit as a sign flag and stores the
//! magnitude in the remaining bits, so `0x81` in an 8-bit field is `-1` and
//! `0xff` is `-127`. The same rule is used for every width in this crate.
//!
//! A field whose bits are all set is reserved for "missing".

use crate::helpers::read_as;

pub trait GribInt<I> {
    fn as_grib_int(&self) -> I;
}

macro_rules! add_impl_for_ints {
    ($(($ty_src:ty, $ty_dst:ty),)*) => ($(
        impl GribInt<$ty_dst> for $ty_src {
            fn as_grib_int(&self) -> $ty_dst {
                if self.leading_zeros() == 0 {
                    let abs = (self << 1 >> 1) as $ty_dst;
                    -abs
                } else {
                    *self as $ty_dst
                }
            }
        }
    )*);
}

add_impl_for_ints! {
    (u8, i8),
    (u16, i16),
    (u32, i32),
    (u64, i64),
}

/// Interprets the lowest `width` bits of `raw` as a GRIB2 signed integer.
///
/// `width` must be in `1..=32`.
///
/// # Examples
///
/// ```
/// use gribpoint::regulation::grib_int_from_bits;
///
/// assert_eq!(grib_int_from_bits(0b100000001111110010001011, 24), -64651);
/// assert_eq!(grib_int_from_bits(0x7f, 8), 127);
/// ```
pub fn grib_int_from_bits(raw: u32, width: u8) -> i32 {
    debug_assert!((1..=32).contains(&width), "invalid bit width {width}");
    let sign_bit = 1u64 << (width - 1);
    let raw = u64::from(raw) & ((sign_bit << 1) - 1);
    let abs = (raw & (sign_bit - 1)) as i64;
    let value = if raw & sign_bit == 0 { abs } else { -abs };
    value as i32
}

/// Reads a GRIB2 signed integer stored in 1 to 4 big-endian octets.
pub fn grib_int_from_bytes(bytes: &[u8]) -> i32 {
    let len = bytes.len();
    debug_assert!((1..=4).contains(&len), "invalid number of octets {len}");
    // Although there is logic that can be used to generalize, not so many patterns
    // exist that generalization is necessary.
    match len {
        1 => i32::from(read_as!(u8, bytes, 0).as_grib_int()),
        2 => i32::from(read_as!(u16, bytes, 0).as_grib_int()),
        3 => {
            let raw = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
            grib_int_from_bits(raw, 24)
        }
        _ => read_as!(u32, bytes, 0).as_grib_int(),
    }
}

/// Encodes `value` as a `width`-bit GRIB2 signed integer.
///
/// This is the inverse of [`grib_int_from_bits`] for values whose magnitude
/// fits into `width - 1` bits. Note that zero is always encoded as a positive
/// value.
pub fn to_grib_uint(value: i32, width: u8) -> u32 {
    debug_assert!((1..=32).contains(&width), "invalid bit width {width}");
    let sign_bit = 1u64 << (width - 1);
    let abs = u64::from(value.unsigned_abs()) & (sign_bit - 1);
    let raw = if value < 0 { abs | sign_bit } else { abs };
    raw as u32
}

/// Returns `true` if all `width` bits of `raw` are set.
///
/// `width` must be in `1..=64`.
pub fn is_missing_value(raw: u64, width: u8) -> bool {
    debug_assert!((1..=64).contains(&width), "invalid bit width {width}");
    let all_ones = u64::MAX >> (64 - u32::from(width));
    raw == all_ones
}

/// Converts a value in units of 10^-6 degree into degrees.
pub fn scaled_degrees(raw: i32) -> f64 {
    f64::from(raw) / 1_000_000.
}
