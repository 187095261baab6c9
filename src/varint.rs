//! Variable-length base-128 integer encoding (encoding#varints).
//!
//! Each octet carries 7 data bits and a continuation bit (MSB). The least
//! significant group is written first; the last octet has continuation = 0.
//! Signed integers with wire type `varint` travel as the uvarint of their
//! two's-complement bit pattern — NOT zigzag (that is [`zigzag`](crate::zigzag),
//! used only for `zigzag32`/`zigzag64` annotations, encoding#signed-ints).

use crate::bytestream::{ByteReader, ByteWriter};
use crate::{Error, Result};

/// Encodes a `u64` as an unsigned varint.
#[inline]
pub fn encode_uvarint(writer: &mut ByteWriter, value: u64) {
    if value < 0x80 {
        // Fast-Path: Single-Byte (häufigster Fall — Tags, kleine Längen).
        writer.put_u8(value as u8);
        return;
    }
    let mut v = value;
    while v >= 0x80 {
        writer.put_u8(v as u8 | 0x80);
        v >>= 7;
    }
    writer.put_u8(v as u8);
}

/// Encodes an `i64` as the uvarint of its two's-complement bit pattern.
///
/// Negative values always occupy ten bytes on the wire, matching canonical
/// proto3 behavior for `int32`/`int64`.
#[inline]
pub fn encode(writer: &mut ByteWriter, value: i64) {
    encode_uvarint(writer, value as u64);
}

/// Decodes an unsigned varint.
///
/// Fails with [`Error::VarintOverflow`] when a tenth byte would push data past
/// bit 63, and with [`Error::TruncatedVarint`] when the input ends before a
/// terminating octet.
#[inline]
pub fn decode_uvarint(reader: &mut ByteReader<'_>) -> Result<u64> {
    let Some(byte) = reader.next_byte() else {
        return Err(Error::TruncatedVarint);
    };
    if byte & 0x80 == 0 {
        // Fast-Path: Single-Byte.
        return Ok(u64::from(byte));
    }
    let mut result = u64::from(byte & 0x7F);
    let mut shift = 7u32;
    loop {
        let Some(byte) = reader.next_byte() else {
            return Err(Error::TruncatedVarint);
        };
        // Beim 10. Byte (shift 63) ist nur noch Daten-Bit 0 gültig und kein
        // Continuation-Bit mehr erlaubt.
        if shift == 63 && byte > 1 {
            return Err(Error::VarintOverflow);
        }
        result |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

/// Decodes a signed varint (two's-complement reinterpretation).
#[inline]
pub fn decode(reader: &mut ByteReader<'_>) -> Result<i64> {
    Ok(decode_uvarint(reader)? as i64)
}

/// Decodes an unsigned varint without consuming input.
pub fn peek_uvarint(reader: &ByteReader<'_>) -> Result<u64> {
    let mut copy = *reader;
    decode_uvarint(&mut copy)
}

/// Encodes a `u64` padded with `extra_bytes` additional continuation octets.
///
/// The padding octets carry zero data bits, so any conforming decoder reads
/// the same value; the encoding is merely longer. Used by inspection tooling
/// to reserve length-prefix space.
pub fn encode_uvarint_long_form(writer: &mut ByteWriter, value: u64, extra_bytes: usize) {
    if extra_bytes == 0 {
        encode_uvarint(writer, value);
        return;
    }
    // Alle echten Gruppen mit Continuation-Bit, dann Null-Gruppen als Padding,
    // zuletzt ein terminierendes 0x00.
    let mut v = value;
    loop {
        let low7 = (v & 0x7F) as u8;
        v >>= 7;
        writer.put_u8(low7 | 0x80);
        if v == 0 {
            break;
        }
    }
    for _ in 1..extra_bytes {
        writer.put_u8(0x80);
    }
    writer.put_u8(0x00);
}
