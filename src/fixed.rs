//! Fixed-width integer encoding (encoding#non-varint-numbers).
//!
//! `fixed32`/`fixed64` payloads are exactly 4 or 8 bytes, little-endian, with
//! no length prefix. Signed variants reuse the same bit carriers via casts at
//! the call site.

use crate::bytestream::{ByteReader, ByteWriter};
use crate::{Error, Result};

/// Encodes a `u32` as exactly 4 little-endian bytes.
#[inline]
pub fn encode_fixed32(writer: &mut ByteWriter, value: u32) {
    writer.put_slice(&value.to_le_bytes());
}

/// Encodes a `u64` as exactly 8 little-endian bytes.
#[inline]
pub fn encode_fixed64(writer: &mut ByteWriter, value: u64) {
    writer.put_slice(&value.to_le_bytes());
}

/// Decodes exactly 4 little-endian bytes into a `u32`.
#[inline]
pub fn decode_fixed32(reader: &mut ByteReader<'_>) -> Result<u32> {
    let available = reader.remaining();
    let Some(bytes) = reader.take(4) else {
        return Err(Error::insufficient(4, available));
    };
    Ok(u32::from_le_bytes(bytes.try_into().expect("take(4) liefert 4 Bytes")))
}

/// Decodes exactly 8 little-endian bytes into a `u64`.
#[inline]
pub fn decode_fixed64(reader: &mut ByteReader<'_>) -> Result<u64> {
    let available = reader.remaining();
    let Some(bytes) = reader.take(8) else {
        return Err(Error::insufficient(8, available));
    };
    Ok(u64::from_le_bytes(bytes.try_into().expect("take(8) liefert 8 Bytes")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed32_little_endian_layout() {
        let mut w = ByteWriter::new();
        encode_fixed32(&mut w, 0x12345678);
        assert_eq!(w.as_slice(), &[0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn fixed64_little_endian_layout() {
        let mut w = ByteWriter::new();
        encode_fixed64(&mut w, 0x0102030405060708);
        assert_eq!(w.as_slice(), &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn fixed32_round_trip() {
        for &val in &[0u32, 1, u32::MAX, 0xDEADBEEF] {
            let mut w = ByteWriter::new();
            encode_fixed32(&mut w, val);
            let data = w.detach();
            assert_eq!(data.len(), 4);
            let mut r = ByteReader::new(&data);
            assert_eq!(decode_fixed32(&mut r).unwrap(), val);
        }
    }

    #[test]
    fn fixed64_round_trip() {
        for &val in &[0u64, 1, u64::MAX, 0xCAFEBABE_DEADBEEF] {
            let mut w = ByteWriter::new();
            encode_fixed64(&mut w, val);
            let data = w.detach();
            assert_eq!(data.len(), 8);
            let mut r = ByteReader::new(&data);
            assert_eq!(decode_fixed64(&mut r).unwrap(), val);
        }
    }

    #[test]
    fn fixed32_insufficient_bytes() {
        let mut r = ByteReader::new(&[0x01, 0x02, 0x03]);
        assert_eq!(
            decode_fixed32(&mut r).unwrap_err(),
            Error::insufficient(4, 3)
        );
    }

    #[test]
    fn fixed64_insufficient_bytes() {
        let mut r = ByteReader::new(&[0x01]);
        assert_eq!(
            decode_fixed64(&mut r).unwrap_err(),
            Error::insufficient(8, 1)
        );
    }

    #[test]
    fn signed_values_via_cast() {
        let mut w = ByteWriter::new();
        encode_fixed32(&mut w, -5i32 as u32);
        let data = w.detach();
        let mut r = ByteReader::new(&data);
        assert_eq!(decode_fixed32(&mut r).unwrap() as i32, -5);
    }
}
