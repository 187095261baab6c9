//! IEEE-754 float encoding (encoding#non-varint-numbers).
//!
//! `float` rides the fixed32 wire shape, `double` the fixed64 shape: the raw
//! bit pattern, little-endian, no length prefix. NaN payloads pass through
//! bit-exact.

use crate::bytestream::{ByteReader, ByteWriter};
use crate::fixed;
use crate::Result;

/// Encodes an `f32` as its IEEE-754 bit pattern in 4 little-endian bytes.
#[inline]
pub fn encode_float32(writer: &mut ByteWriter, value: f32) {
    fixed::encode_fixed32(writer, value.to_bits());
}

/// Encodes an `f64` as its IEEE-754 bit pattern in 8 little-endian bytes.
#[inline]
pub fn encode_float64(writer: &mut ByteWriter, value: f64) {
    fixed::encode_fixed64(writer, value.to_bits());
}

/// Decodes 4 little-endian bytes into an `f32`.
#[inline]
pub fn decode_float32(reader: &mut ByteReader<'_>) -> Result<f32> {
    Ok(f32::from_bits(fixed::decode_fixed32(reader)?))
}

/// Decodes 8 little-endian bytes into an `f64`.
#[inline]
pub fn decode_float64(reader: &mut ByteReader<'_>) -> Result<f64> {
    Ok(f64::from_bits(fixed::decode_fixed64(reader)?))
}
