//! Zigzag transform for `zigzag32`/`zigzag64` fields (encoding#signed-ints).
//!
//! Maps signed integers to unsigned so that values of small magnitude encode
//! small: 0 → 0, -1 → 1, 1 → 2, -2 → 3. Fields keep the `varint` wire type;
//! only the annotation (`zigzag32`/`zigzag64`, the generator's spelling of
//! `sint32`/`sint64`) selects this transform over the plain two's-complement
//! reinterpretation in [`varint`](crate::varint).

use crate::bytestream::{ByteReader, ByteWriter};
use crate::varint;
use crate::Result;

/// Encodes an `i64` as a zigzag varint.
#[inline]
pub fn encode(writer: &mut ByteWriter, value: i64) {
    // (n << 1) XOR (n >> 63) — arithmetischer Shift spiegelt das Vorzeichen.
    let encoded = ((value << 1) ^ (value >> 63)) as u64;
    varint::encode_uvarint(writer, encoded);
}

/// Decodes a zigzag varint into an `i64`.
#[inline]
pub fn decode(reader: &mut ByteReader<'_>) -> Result<i64> {
    let encoded = varint::decode_uvarint(reader)?;
    Ok((encoded >> 1) as i64 ^ -((encoded & 1) as i64))
}
