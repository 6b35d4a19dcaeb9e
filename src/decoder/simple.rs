use std::iter::Take;

use num::traits::AsPrimitive;
use tracing::warn;

use crate::{
    cache::GridDataSource,
    context::ReadContext,
    decoder::{
        param::{SimplePackingDefinition, SimplePackingParam},
        stream::{BitCursor, FixedValueIterator, NBitwiseIterator, read_bits_at},
    },
    error::*,
    helpers::ensure_len,
    reader::{PositionedRead, SectionReader},
};

/// Conversion of packed integers into physical values, built once per field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFunc {
    ref_val: f64,
    bin_scale: f64,
    dec_scale: f64,
}

impl ScaleFunc {
    pub fn new(param: &SimplePackingParam) -> Self {
        Self {
            ref_val: f64::from(param.ref_val),
            bin_scale: 2_f64.powi(param.exp.into()),
            dec_scale: 10_f64.powi(param.dig.into()),
        }
    }

    /// Returns `(R + raw * 2^E) / 10^D`, computed in double precision.
    pub fn apply<N: AsPrimitive<f64>>(&self, raw: N) -> f32 {
        ((self.ref_val + raw.as_() * self.bin_scale) / self.dec_scale) as f32
    }
}

/// A field packed with Data Representation Template 5.0.
///
/// # Examples
///
/// ```
/// use gribpoint::{BitCursor, SimplePacking, SimplePackingParam};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // 3 values of 12 bits followed by 4 bits of padding.
///     let payload = [0x00, 0x10, 0x02, 0x00, 0x30];
///     let packing = SimplePacking::new(SimplePackingParam::new(100.0, 0, 2, 12), 3);
///
///     let values = packing.decode_all(&mut BitCursor::new(&payload))?;
///     assert_eq!(values, vec![1.01, 1.02, 1.03]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplePacking {
    param: SimplePackingParam,
    num_vals: usize,
}

impl SimplePacking {
    pub fn new(param: SimplePackingParam, num_vals: usize) -> Self {
        Self { param, num_vals }
    }

    /// Reads the template octets that follow the template number in
    /// section 5.
    pub fn from_template(buf: &[u8], num_vals: usize) -> Result<Self, GribError> {
        ensure_len(buf, 10, "data representation template 5.0")?;
        let param = SimplePackingParam::from_buf(buf)?;
        param_nbit_supported(&param)?;
        Ok(Self::new(param, num_vals))
    }

    pub fn param(&self) -> &SimplePackingParam {
        &self.param
    }

    pub fn num_vals(&self) -> usize {
        self.num_vals
    }

    pub fn scale_func(&self) -> ScaleFunc {
        ScaleFunc::new(&self.param)
    }

    pub fn definition(&self) -> SimplePackingDefinition {
        self.param.to_definition()
    }

    /// Returns a lazy iterator over the values stored after the cursor.
    ///
    /// The iterator yields at most `num_vals` values. It ends early when only
    /// padding is left in the data.
    pub fn values<T: AsRef<[u8]>>(
        &self,
        cursor: BitCursor<T>,
    ) -> Result<SimplePackingDecodeIteratorWrapper<Take<NBitwiseIterator<T>>>, DecodeError> {
        param_nbit_supported(&self.param)?;
        let scale = self.scale_func();
        let iter = if self.param.nbit == 0 {
            SimplePackingDecodeIteratorWrapper::FixedValue(FixedValueIterator::new(
                scale.apply(0u32),
                self.num_vals,
            ))
        } else {
            let iter = NBitwiseIterator::from_cursor(cursor, self.param.nbit).take(self.num_vals);
            SimplePackingDecodeIteratorWrapper::SimplePacking(SimplePackingDecodeIterator::new(
                iter, scale,
            ))
        };
        Ok(iter)
    }

    /// Decodes every value of the field.
    ///
    /// At most `num_vals` values are read, so octet padding after the last
    /// value is never taken for data. Fewer values than `num_vals` is an
    /// error.
    pub fn decode_all<T: AsRef<[u8]>>(
        &self,
        cursor: &mut BitCursor<T>,
    ) -> Result<Vec<f32>, GribError> {
        param_nbit_supported(&self.param)?;
        let scale = self.scale_func();
        if self.param.nbit == 0 {
            return Ok(vec![scale.apply(0u32); self.num_vals]);
        }

        // `num_vals` is read from the message and may exceed what the data holds.
        let capacity = cursor.remaining_bits() / usize::from(self.param.nbit);
        let mut values = Vec::with_capacity(self.num_vals.min(capacity));
        while values.len() < self.num_vals {
            match cursor.read_bits(self.param.nbit)? {
                Some(raw) => values.push(scale.apply(raw)),
                None => break,
            }
        }

        if values.len() != self.num_vals {
            warn!(
                expected = self.num_vals,
                actual = values.len(),
                "packed data holds fewer values than declared"
            );
            return Err(DecodeError::LengthMismatch {
                expected: self.num_vals,
                actual: values.len(),
            }
            .into());
        }
        Ok(values)
    }
}

fn param_nbit_supported(param: &SimplePackingParam) -> Result<(), DecodeError> {
    if param.nbit > 32 {
        return Err(DecodeError::NotSupported(
            "number of bits used for each packed value",
            param.nbit.into(),
        ));
    }
    Ok(())
}

pub enum SimplePackingDecodeIteratorWrapper<I> {
    // Based on the implementation of wgrib2, if nbits equals 0, return a constant
    // field where the data value at each grid point is the reference value.
    FixedValue(FixedValueIterator<f32>),
    SimplePacking(SimplePackingDecodeIterator<I>),
}

impl<I> Iterator for SimplePackingDecodeIteratorWrapper<I>
where
    I: Iterator<Item = Result<u32, DecodeError>>,
{
    type Item = Result<f32, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::FixedValue(inner) => inner.next().map(Ok),
            Self::SimplePacking(inner) => inner.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::FixedValue(inner) => inner.size_hint(),
            Self::SimplePacking(inner) => inner.size_hint(),
        }
    }
}

pub struct SimplePackingDecodeIterator<I> {
    iter: I,
    scale: ScaleFunc,
}

impl<I> SimplePackingDecodeIterator<I> {
    pub(crate) fn new(iter: I, scale: ScaleFunc) -> Self {
        Self { iter, scale }
    }
}

impl<I> Iterator for SimplePackingDecodeIterator<I>
where
    I: Iterator<Item = Result<u32, DecodeError>>,
{
    type Item = Result<f32, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let encoded = self.iter.next()?;
        Some(encoded.map(|raw| self.scale.apply(raw)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Random access to the values of a simple packing field stored in the
/// `[field_start, field_end)` octets of a byte source.
///
/// Each lookup reads only the octets that hold the requested value, so the
/// reader can be shared between threads without any locking.
pub struct SimplePackingReader<R> {
    section: SectionReader<R>,
    packing: SimplePacking,
    scale: ScaleFunc,
}

impl<R> SimplePackingReader<R> {
    pub fn new(source: R, field_start: u64, field_end: u64, packing: SimplePacking) -> Self {
        Self {
            section: SectionReader::new(source, field_start, field_end),
            scale: packing.scale_func(),
            packing,
        }
    }

    pub fn packing(&self) -> &SimplePacking {
        &self.packing
    }

    pub fn num_vals(&self) -> usize {
        self.packing.num_vals
    }

    pub fn into_inner(self) -> R {
        self.section.into_inner()
    }
}

impl<R: PositionedRead> GridDataSource for SimplePackingReader<R> {
    fn read_grid_at(&self, ctx: &ReadContext, n: usize) -> Result<f32, GribError> {
        ctx.check()?;
        let len = self.packing.num_vals;
        if n >= len {
            return Err(GribError::OutOfBounds { index: n, len });
        }

        let nbit = self.packing.param.nbit;
        if nbit == 0 {
            return Ok(self.scale.apply(0u32));
        }
        param_nbit_supported(&self.packing.param)?;

        let bit_offset = n as u64 * u64::from(nbit);
        let raw = read_bits_at(&self.section, bit_offset, nbit).map_err(|e| match e {
            GribError::Io {
                offset,
                len,
                source,
            } => GribError::Io {
                offset: self.section.start() + offset,
                len,
                source,
            },
            e => e,
        })?;
        Ok(self.scale.apply(raw))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    struct CountingSource {
        data: Vec<u8>,
        reads: AtomicUsize,
    }

    impl CountingSource {
        fn new(data: Vec<u8>) -> Self {
            Self {
                data,
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl PositionedRead for CountingSource {
        fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.data.read_exact_at(buf, offset)
        }
    }

    fn twelve_bit_packing(num_vals: usize) -> SimplePacking {
        SimplePacking::new(SimplePackingParam::new(100.0, 0, 2, 12), num_vals)
    }

    // 1, 2, 3 packed in 12 bits, then 4 bits of padding.
    const TWELVE_BIT_PAYLOAD: [u8; 5] = [0x00, 0x10, 0x02, 0x00, 0x30];

    #[test]
    fn decode_simple_packing() -> Result<(), Box<dyn std::error::Error>> {
        let buf = vec![0x35, 0x3e, 0x6b, 0xf6, 0x80, 0x1a, 0x00, 0x00, 0x10, 0x00];
        let packing = SimplePacking::from_template(&buf, 2)?;
        let input: Vec<u8> = vec![0x00, 0x06, 0x00, 0x0d];
        let expected: Vec<f32> = vec![7.987_831_6e-7, 9.030_913e-7];

        let actual = packing.decode_all(&mut BitCursor::new(&input))?;

        assert_eq!(actual.len(), expected.len());
        let mut i = 0;
        while i < actual.len() {
            assert!(actual[i] < expected[i] + 0.00000001);
            assert!(actual[i] > expected[i] - 0.00000001);
            i += 1;
        }
        Ok(())
    }

    #[test]
    fn scale_func_applies_binary_and_decimal_factors() {
        let scale = ScaleFunc::new(&SimplePackingParam::new(2731.5, -1, 1, 8));
        assert_eq!(scale.apply(10u32), 273.65);
        assert_eq!(scale.apply(0u8), 273.15);

        let scale = ScaleFunc::new(&SimplePackingParam::new(-1.5, 0, 2, 8));
        assert_eq!(scale.apply(0u32), -0.015);
    }

    #[test]
    fn decode_all_ignores_padding() -> Result<(), Box<dyn std::error::Error>> {
        let mut cursor = BitCursor::new(&TWELVE_BIT_PAYLOAD);
        let actual = twelve_bit_packing(3).decode_all(&mut cursor)?;
        assert_eq!(actual, vec![1.01, 1.02, 1.03]);
        assert_eq!(cursor.position_bits(), 36);
        Ok(())
    }

    #[test]
    fn decode_all_stops_at_declared_count() -> Result<(), Box<dyn std::error::Error>> {
        let actual = twelve_bit_packing(2).decode_all(&mut BitCursor::new(&TWELVE_BIT_PAYLOAD))?;
        assert_eq!(actual, vec![1.01, 1.02]);
        Ok(())
    }

    #[test]
    fn decode_all_reports_missing_values() {
        let err = twelve_bit_packing(4)
            .decode_all(&mut BitCursor::new(&TWELVE_BIT_PAYLOAD))
            .unwrap_err();
        assert!(matches!(
            err,
            GribError::DecodeError(DecodeError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn decode_all_reports_truncated_value() {
        let packing = SimplePacking::new(SimplePackingParam::new(0.0, 0, 0, 16), 3);
        let payload = [0x00, 0x01, 0x00, 0x02, 0x00];
        let err = packing
            .decode_all(&mut BitCursor::new(&payload))
            .unwrap_err();
        assert!(matches!(
            err,
            GribError::DecodeError(DecodeError::Truncated {
                bit_offset: 32,
                needed: 16,
                available: 8,
            })
        ));
    }

    #[test]
    fn decode_all_when_nbit_is_zero() -> Result<(), Box<dyn std::error::Error>> {
        let packing = SimplePacking::new(SimplePackingParam::new(273.15, 0, 0, 0), 5);
        let payload: [u8; 0] = [];
        let mut cursor = BitCursor::new(&payload);
        let actual = packing.decode_all(&mut cursor)?;
        assert_eq!(actual, vec![273.15; 5]);
        assert_eq!(cursor.position_bits(), 0);
        Ok(())
    }

    #[test]
    fn lazy_values_agree_with_decode_all() -> Result<(), Box<dyn std::error::Error>> {
        let packing = twelve_bit_packing(3);
        let lazy = packing
            .values(BitCursor::new(&TWELVE_BIT_PAYLOAD))?
            .collect::<Result<Vec<_>, _>>()?;
        let eager = packing.decode_all(&mut BitCursor::new(&TWELVE_BIT_PAYLOAD))?;
        assert_eq!(lazy, eager);

        // The low nibble of the last octet is padding.
        let payload = [0x12, 0x30];
        let packing = SimplePacking::new(SimplePackingParam::new(0.0, 0, 0, 4), 3);
        let lazy = packing
            .values(BitCursor::new(&payload))?
            .collect::<Result<Vec<_>, _>>()?;
        let eager = packing.decode_all(&mut BitCursor::new(&payload))?;
        assert_eq!(lazy, vec![1.0, 2.0, 3.0]);
        assert_eq!(lazy, eager);

        let packing = SimplePacking::new(SimplePackingParam::new(1.0, 0, 0, 0), 2);
        let lazy = packing
            .values(BitCursor::new(&TWELVE_BIT_PAYLOAD))?
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(lazy, vec![1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn oversized_value_count_is_reported_as_mismatch() {
        let packing = SimplePacking::new(SimplePackingParam::new(0.0, 0, 0, 8), u32::MAX as usize);
        let payload = [1u8, 2, 3];
        let err = packing
            .decode_all(&mut BitCursor::new(&payload))
            .unwrap_err();
        assert!(matches!(
            err,
            GribError::DecodeError(DecodeError::LengthMismatch { expected, actual: 3 })
                if expected == u32::MAX as usize
        ));
    }

    #[test]
    fn too_wide_values_are_rejected() {
        let buf = vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x21, 0x00];
        let err = SimplePacking::from_template(&buf, 1).unwrap_err();
        assert!(matches!(
            err,
            GribError::DecodeError(DecodeError::NotSupported(_, 33))
        ));
    }

    #[test]
    fn short_template_is_rejected() {
        let err = SimplePacking::from_template(&[0; 9], 1).unwrap_err();
        assert!(matches!(err, GribError::InvalidValue(_)));
    }

    #[test]
    fn random_access_agrees_with_sequential_decoding() -> Result<(), Box<dyn std::error::Error>> {
        let payload: Vec<u8> = (0u8..64).map(|b| b.wrapping_mul(37)).collect();
        let ctx = ReadContext::background();
        for nbit in [1u8, 5, 8, 12, 17, 24, 31, 32] {
            let num_vals = payload.len() * 8 / usize::from(nbit);
            let packing = SimplePacking::new(SimplePackingParam::new(-3.5, -2, 1, nbit), num_vals);
            let expected = packing.decode_all(&mut BitCursor::new(&payload))?;

            let mut file = vec![0xff; 7];
            file.extend_from_slice(&payload);
            file.extend_from_slice(&[0xff; 3]);
            let reader = SimplePackingReader::new(file, 7, 7 + payload.len() as u64, packing);
            for (n, value) in expected.iter().enumerate() {
                assert_eq!(reader.read_grid_at(&ctx, n)?, *value, "nbit {nbit}, index {n}");
            }
        }
        Ok(())
    }

    #[test]
    fn random_access_reads_once_per_value() -> Result<(), Box<dyn std::error::Error>> {
        let source = CountingSource::new(TWELVE_BIT_PAYLOAD.to_vec());
        let reader = SimplePackingReader::new(&source, 0, 5, twelve_bit_packing(3));
        let ctx = ReadContext::background();
        assert_eq!(reader.read_grid_at(&ctx, 1)?, 1.02);
        assert_eq!(reader.read_grid_at(&ctx, 2)?, 1.03);
        assert_eq!(source.reads(), 2);
        Ok(())
    }

    #[test]
    fn random_access_rejects_out_of_range_index_without_reading() {
        let source = CountingSource::new(TWELVE_BIT_PAYLOAD.to_vec());
        let reader = SimplePackingReader::new(&source, 0, 5, twelve_bit_packing(3));
        let err = reader
            .read_grid_at(&ReadContext::background(), 3)
            .unwrap_err();
        assert!(matches!(err, GribError::OutOfBounds { index: 3, len: 3 }));
        assert_eq!(source.reads(), 0);
    }

    #[test]
    fn random_access_with_zero_width_does_not_read() -> Result<(), Box<dyn std::error::Error>> {
        let source = CountingSource::new(Vec::new());
        let packing = SimplePacking::new(SimplePackingParam::new(5.0, 0, 1, 0), 10);
        let reader = SimplePackingReader::new(&source, 0, 0, packing);
        assert_eq!(reader.read_grid_at(&ReadContext::background(), 9)?, 0.5);
        assert_eq!(source.reads(), 0);
        Ok(())
    }

    #[test]
    fn cancelled_context_stops_before_reading() {
        let source = CountingSource::new(TWELVE_BIT_PAYLOAD.to_vec());
        let reader = SimplePackingReader::new(&source, 0, 5, twelve_bit_packing(3));
        let (ctx, handle) = ReadContext::cancellable();
        handle.cancel();
        let err = reader.read_grid_at(&ctx, 0).unwrap_err();
        assert!(matches!(err, GribError::Cancelled));
        assert_eq!(source.reads(), 0);
    }

    #[test]
    fn io_error_reports_absolute_offset() {
        let packing = SimplePacking::new(SimplePackingParam::new(0.0, 0, 0, 16), 2);
        let reader = SimplePackingReader::new(vec![0u8; 4], 2, 4, packing);
        let err = reader
            .read_grid_at(&ReadContext::background(), 1)
            .unwrap_err();
        assert!(matches!(err, GribError::Io { offset: 4, len: 2, .. }));
    }
}
