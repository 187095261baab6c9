//! Length-prefixed byte sequences (encoding#length-types).
//!
//! A `LEN` payload is a uvarint byte count followed by exactly that many
//! octets. The decoder borrows from the input (zero-copy); callers that need
//! ownership copy out themselves.

use crate::bytestream::{ByteReader, ByteWriter};
use crate::varint;
use crate::{Error, Result};

/// Encodes a byte slice as uvarint length followed by the raw bytes.
#[inline]
pub fn encode(writer: &mut ByteWriter, value: &[u8]) {
    varint::encode_uvarint(writer, value.len() as u64);
    writer.put_slice(value);
}

/// Encodes a byte slice whose length prefix is padded with `extra_bytes`
/// additional continuation octets. Inspection tooling only; every conforming
/// decoder accepts the padded prefix.
pub fn encode_long_form(writer: &mut ByteWriter, value: &[u8], extra_bytes: usize) {
    varint::encode_uvarint_long_form(writer, value.len() as u64, extra_bytes);
    writer.put_slice(value);
}

/// Decodes a length-prefixed byte sequence.
///
/// Fails with [`Error::NegativeLength`] when the prefix is negative under
/// signed interpretation (≥ 2^63), and with [`Error::InsufficientBytes`] when
/// the buffer does not contain the claimed payload.
#[inline]
pub fn decode<'a>(reader: &mut ByteReader<'a>) -> Result<&'a [u8]> {
    let length = varint::decode_uvarint(reader)?;
    if (length as i64).is_negative() {
        return Err(Error::NegativeLength(length));
    }
    let length = length as usize;
    let available = reader.remaining();
    reader
        .take(length)
        .ok_or(Error::insufficient(length, available))
}
