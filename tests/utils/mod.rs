use std::io::{self, Write};

use tempfile::NamedTempFile;

pub(crate) const NI: u32 = 30;
pub(crate) const NJ: u32 = 20;
pub(crate) const NBIT: u8 = 10;
pub(crate) const REF_VAL: f32 = 250.0;
pub(crate) const DIG: u16 = 1;

/// Octets before section 5 in the written file.
pub(crate) const LEADING_OCTETS: usize = 16;
const SECT5_LEN: usize = 21;
const SECT7_HEADER_LEN: usize = 5;

/// Octet range of the packed values in a file written by
/// [`write_message_fragment`].
pub(crate) fn field_range(num_vals: usize) -> (u64, u64) {
    let start = LEADING_OCTETS + SECT5_LEN + SECT7_HEADER_LEN;
    let len = (num_vals * usize::from(NBIT)).div_ceil(8);
    (start as u64, (start + len) as u64)
}

pub(crate) fn raw_value(n: usize) -> u32 {
    ((n * 37) % 1000) as u32
}

pub(crate) fn physical_value(n: usize) -> f32 {
    ((f64::from(REF_VAL) + f64::from(raw_value(n))) / 10_f64.powi(i32::from(DIG))) as f32
}

/// Template 3.30 octets of a 30 x 20 Lambert conformal grid on the WGS 84
/// ellipsoid with 3 km spacing.
pub(crate) fn lambert_template() -> Vec<u8> {
    let mut buf = vec![0u8; 67];
    buf[0] = 5;
    buf[1..16].copy_from_slice(&[0xff; 15]);
    buf[16..20].copy_from_slice(&NI.to_be_bytes());
    buf[20..24].copy_from_slice(&NJ.to_be_bytes());
    buf[24..28].copy_from_slice(&38_000_000u32.to_be_bytes());
    buf[28..32].copy_from_slice(&260_000_000u32.to_be_bytes());
    buf[32] = 0b00111000;
    buf[33..37].copy_from_slice(&38_500_000u32.to_be_bytes());
    buf[37..41].copy_from_slice(&262_500_000u32.to_be_bytes());
    buf[41..45].copy_from_slice(&3_000_000u32.to_be_bytes());
    buf[45..49].copy_from_slice(&3_000_000u32.to_be_bytes());
    buf[50] = 0b01000000;
    buf[51..55].copy_from_slice(&38_500_000u32.to_be_bytes());
    buf[55..59].copy_from_slice(&38_500_000u32.to_be_bytes());
    buf[59..63].copy_from_slice(&(0x8000_0000u32 | 90_000_000).to_be_bytes());
    buf
}

pub(crate) fn sect5_bytes(num_vals: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SECT5_LEN);
    buf.extend_from_slice(&(SECT5_LEN as u32).to_be_bytes());
    buf.push(5);
    buf.extend_from_slice(&(num_vals as u32).to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&REF_VAL.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&DIG.to_be_bytes());
    buf.push(NBIT);
    buf.push(0);
    buf
}

fn pack(values: impl Iterator<Item = u32>, nbit: u8) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc = 0u64;
    let mut acc_bits = 0u32;
    for value in values {
        acc = (acc << nbit) | u64::from(value);
        acc_bits += u32::from(nbit);
        while acc_bits >= 8 {
            acc_bits -= 8;
            out.push((acc >> acc_bits) as u8);
        }
    }
    if acc_bits > 0 {
        out.push((acc << (8 - acc_bits)) as u8);
    }
    out
}

pub(crate) fn packed_values(num_vals: usize) -> Vec<u8> {
    pack((0..num_vals).map(raw_value), NBIT)
}

/// Writes section 5 and section 7 of a message, preceded by
/// [`LEADING_OCTETS`] octets of filler and followed by the end marker.
pub(crate) fn write_message_fragment(num_vals: usize) -> Result<NamedTempFile, io::Error> {
    let payload = packed_values(num_vals);
    let mut out = NamedTempFile::new()?;
    out.write_all(&[0xaa; LEADING_OCTETS])?;
    out.write_all(&sect5_bytes(num_vals))?;
    out.write_all(&((SECT7_HEADER_LEN + payload.len()) as u32).to_be_bytes())?;
    out.write_all(&[7])?;
    out.write_all(&payload)?;
    out.write_all(b"7777")?;
    out.flush()?;
    Ok(out)
}
