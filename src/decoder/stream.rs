use tracing::trace;

use crate::{
    error::{DecodeError, GribError},
    helpers::num_octets,
    reader::PositionedRead,
};

/// Extracts bits `[skip, skip + width)` of `window`, numbering bits from the
/// most significant bit of the first octet.
///
/// `width` must be in `1..=32`, `skip` in `0..8`, and `window` must hold at
/// least `skip + width` bits.
pub(crate) fn extract_bits(window: &[u8], skip: u8, width: u8) -> u32 {
    debug_assert!((1..=32).contains(&width) && skip < 8);
    let total = window.len() * 8;
    debug_assert!(total >= usize::from(skip) + usize::from(width));

    let acc = window.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    let shift = total - usize::from(skip) - usize::from(width);
    let mask = (1u64 << width) - 1;
    ((acc >> shift) & mask) as u32
}

/// Sequential reader of fixed- or variable-width unsigned fields packed
/// MSB-first into a byte buffer.
#[derive(Clone)]
pub struct BitCursor<T> {
    data: T,
    pos: usize,
}

impl<T> BitCursor<T> {
    pub fn new(data: T) -> Self {
        Self { data, pos: 0 }
    }

    pub fn with_offset(self, offset_bits: usize) -> Self {
        Self {
            pos: offset_bits,
            ..self
        }
    }

    /// Returns the number of bits consumed so far.
    pub fn position_bits(&self) -> usize {
        self.pos
    }
}

impl<T: AsRef<[u8]>> BitCursor<T> {
    pub fn remaining_bits(&self) -> usize {
        (self.data.as_ref().len() * 8).saturating_sub(self.pos)
    }

    /// Reads the next `n` bits, `n` in `1..=32`.
    ///
    /// Returns `Ok(None)` at a clean end of data, i.e. when fewer than `n`
    /// bits remain and all of them are octet padding. If a whole octet or
    /// more remains but not enough for the field, the data was cut in the
    /// middle of a value and [`DecodeError::Truncated`] is returned.
    pub fn read_bits(&mut self, n: u8) -> Result<Option<u32>, DecodeError> {
        debug_assert!((1..=32).contains(&n), "invalid bit width {n}");
        let needed = usize::from(n);
        let available = self.remaining_bits();
        if available < needed {
            if available < 8 {
                return Ok(None);
            }
            return Err(DecodeError::Truncated {
                bit_offset: self.pos,
                needed,
                available,
            });
        }

        let start = self.pos / 8;
        let skip = (self.pos % 8) as u8;
        let end = start + num_octets(n + skip);
        let val = extract_bits(&self.data.as_ref()[start..end], skip, n);
        self.pos += needed;
        Ok(Some(val))
    }
}

/// Iterator over consecutive `size`-bit fields of a [`BitCursor`].
///
/// The iterator is fused: it stops for good after a clean end of data or
/// after yielding an error.
#[derive(Clone)]
pub struct NBitwiseIterator<T> {
    cursor: BitCursor<T>,
    size: u8,
    finished: bool,
}

impl<T> NBitwiseIterator<T> {
    pub fn new(data: T, size: u8) -> Self {
        Self::from_cursor(BitCursor::new(data), size)
    }

    pub fn from_cursor(cursor: BitCursor<T>, size: u8) -> Self {
        Self {
            cursor,
            size,
            finished: size == 0,
        }
    }

    pub fn into_cursor(self) -> BitCursor<T> {
        self.cursor
    }
}

impl<T: AsRef<[u8]>> Iterator for NBitwiseIterator<T> {
    type Item = Result<u32, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.cursor.read_bits(self.size) {
            Ok(Some(val)) => Some(Ok(val)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let max = self.cursor.remaining_bits() / usize::from(self.size) + 1;
        (0, Some(max))
    }
}

// Based on the implementation of wgrib2, if nbits equals 0, return a constant
// field where the data value at each grid point is the reference value.
pub struct FixedValueIterator<T> {
    val: T,
    length: usize,
    pos: usize,
}

impl<T> FixedValueIterator<T> {
    pub(crate) fn new(val: T, length: usize) -> Self {
        Self {
            val,
            length,
            pos: 0,
        }
    }
}

impl<T> Iterator for FixedValueIterator<T>
where
    T: Copy,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.length {
            self.pos += 1;
            Some(self.val)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.length - self.pos;
        (size, Some(size))
    }
}

/// Reads the `width`-bit field starting at absolute bit `bit_offset` of
/// `source`, issuing exactly one read of the octets that contain it.
pub(crate) fn read_bits_at<R>(source: &R, bit_offset: u64, width: u8) -> Result<u32, GribError>
where
    R: PositionedRead + ?Sized,
{
    debug_assert!((1..=32).contains(&width), "invalid bit width {width}");
    let offset = bit_offset / 8;
    let skip = (bit_offset % 8) as u8;
    let len = num_octets(width + skip);

    let mut buf = [0u8; 5];
    let window = &mut buf[..len];
    trace!(offset, len, skip, width, "random access read");
    source
        .read_exact_at(window, offset)
        .map_err(|source| GribError::Io {
            offset,
            len,
            source,
        })?;
    Ok(extract_bits(window, skip, width))
}
