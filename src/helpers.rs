// Callers ensure that `$buf` holds the octets being read.
macro_rules! read_as {
    ($ty:ty, $buf:ident, $start:expr) => {{
        let end = $start + std::mem::size_of::<$ty>();
        <$ty>::from_be_bytes($buf[$start..end].try_into().unwrap())
    }};
}
pub(crate) use read_as;

#[inline]
pub(crate) fn num_octets<N>(num_bits: N) -> usize
where
    usize: From<N>,
{
    usize::from(num_bits).div_ceil(8)
}

pub(crate) fn ensure_len(buf: &[u8], len: usize, what: &str) -> Result<(), crate::GribError> {
    if buf.len() < len {
        return Err(crate::GribError::InvalidValue(format!(
            "{what} requires {len} octets, got {}",
            buf.len()
        )));
    }
    Ok(())
}
