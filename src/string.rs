//! Length-prefixed strings.
//!
//! Strings are the UTF-8 byte interpretation of a `LEN` payload. The codec
//! never rejects a payload for UTF-8 reasons; since a Rust `String` cannot
//! carry invalid UTF-8, malformed sequences decode via replacement characters.
//! Byte-preserving round-trips belong in `bytes` fields.

use crate::binary;
use crate::bytestream::{ByteReader, ByteWriter};
use crate::Result;

/// Encodes a string as length-prefixed UTF-8 bytes.
#[inline]
pub fn encode(writer: &mut ByteWriter, value: &str) {
    binary::encode(writer, value.as_bytes());
}

/// Decodes a length-prefixed payload as UTF-8 text.
#[inline]
pub fn decode(reader: &mut ByteReader<'_>) -> Result<String> {
    let bytes = binary::decode(reader)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
