//! Boolean encoding.
//!
//! A bool travels as uvarint 0 or 1; the decoder treats any non-zero varint
//! as true (lenient read, strict write — the wire never carries values other
//! than 0/1 from this encoder).

use crate::bytestream::{ByteReader, ByteWriter};
use crate::varint;
use crate::Result;

/// Encodes a bool as uvarint 0 or 1.
#[inline]
pub fn encode(writer: &mut ByteWriter, value: bool) {
    varint::encode_uvarint(writer, u64::from(value));
}

/// Decodes a bool; false iff the decoded uvarint is zero.
#[inline]
pub fn decode(reader: &mut ByteReader<'_>) -> Result<bool> {
    Ok(varint::decode_uvarint(reader)? != 0)
}
