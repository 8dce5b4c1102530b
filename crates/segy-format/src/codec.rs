//! IBM System/360 floating point and big-endian integer codec
//!
//! SEG-Y sample format 1 stores amplitudes as 32-bit IBM hexadecimal floats:
//!
//! ```text
//! bit 31      sign
//! bits 30-24  exponent, excess-64, base 16
//! bits 23-0   fraction (value = fraction / 2^24)
//! ```
//!
//! Value = `(-1)^sign * fraction / 2^24 * 16^(exponent - 64)`.
//!
//! All functions are pure and total over their fixed-width inputs.

/// Width in bytes of one encoded sample
pub const SAMPLE_SIZE: usize = 4;

/// Largest IBM magnitude (all exponent and fraction bits set)
pub const IBM_MAX_MAGNITUDE: u32 = 0x7FFF_FFFF;

const SIGN_MASK: u32 = 0x8000_0000;
const FRACTION_MASK: u32 = 0x00FF_FFFF;
const FRACTION_SCALE: f64 = 16_777_216.0; // 2^24

/// Decode a raw IBM float bit pattern.
///
/// The value is computed exactly in `f64` and then rounded to `f32`. IBM
/// magnitudes above `f32::MAX` saturate to infinity and magnitudes below the
/// smallest `f32` subnormal flush to zero, both keeping the sign.
pub fn ibm_to_f32(bits: u32) -> f32 {
    if bits == 0 {
        return 0.0;
    }

    let negative = bits & SIGN_MASK != 0;
    let exponent = ((bits >> 24) & 0x7F) as i32 - 64;
    let fraction = bits & FRACTION_MASK;

    // fraction < 2^24 and the scale is a power of two, so this is exact
    let value = f64::from(fraction) * 2f64.powi(4 * exponent - 24);
    #[allow(clippy::cast_possible_truncation)]
    let value = value as f32;

    if negative { -value } else { value }
}

/// Encode a native float as an IBM float bit pattern.
///
/// The fraction is truncated to 24 bits, so the round trip is only exact to
/// the format's precision (relative error below 2^-20). Infinities saturate
/// to the largest IBM magnitude and NaN encodes as zero.
pub fn f32_to_ibm(value: f32) -> u32 {
    if value == 0.0 || value.is_nan() {
        return 0;
    }

    let sign = if value.is_sign_negative() { SIGN_MASK } else { 0 };
    if value.is_infinite() {
        return sign | IBM_MAX_MAGNITUDE;
    }

    let mut magnitude = f64::from(value.abs());
    let mut exponent: i32 = 64;
    while magnitude < 1.0 {
        magnitude *= 16.0;
        exponent -= 1;
    }
    while magnitude >= 1.0 {
        magnitude /= 16.0;
        exponent += 1;
    }

    let fraction = (magnitude * FRACTION_SCALE) as u32 & FRACTION_MASK;
    sign | ((exponent as u32) << 24) | fraction
}

/// Decode one 4-byte big-endian IBM float
#[inline]
pub fn decode_ibm(bytes: [u8; 4]) -> f32 {
    ibm_to_f32(u32::from_be_bytes(bytes))
}

/// Encode one float as 4 big-endian IBM bytes
#[inline]
pub fn encode_ibm(value: f32) -> [u8; 4] {
    f32_to_ibm(value).to_be_bytes()
}

/// Decode a 2-byte big-endian signed integer
#[inline]
pub const fn decode_i16(bytes: [u8; 2]) -> i16 {
    i16::from_be_bytes(bytes)
}

/// Decode a 4-byte big-endian signed integer
#[inline]
pub const fn decode_i32(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes(bytes)
}

/// Encode a signed integer as 2 big-endian bytes
#[inline]
pub const fn encode_i16(value: i16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Encode a signed integer as 4 big-endian bytes
#[inline]
pub const fn encode_i32(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode a block of IBM samples.
///
/// Trailing bytes that do not form a whole sample are ignored; callers pass
/// blocks sized from the record shape.
pub fn decode_samples(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(SAMPLE_SIZE)
        .map(|chunk| decode_ibm([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Append the IBM encoding of `samples` to `out`
pub fn encode_samples(samples: &[f32], out: &mut Vec<u8>) {
    out.reserve(samples.len() * SAMPLE_SIZE);
    for &sample in samples {
        out.extend_from_slice(&encode_ibm(sample));
    }
}
