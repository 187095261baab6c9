//! Field tags and wire types (encoding#structure).
//!
//! A tag is `uvarint((field_number << 3) | wire_type)`. Field numbers are
//! positive and capped at 2^29-1; wire type numbers occupy the low three
//! bits. The group wire types (3, 4) are recognized in the tag space but
//! never encoded or decoded — encountering one while skipping an unknown
//! field is a hard error.

use crate::bytestream::{ByteReader, ByteWriter};
use crate::varint;
use crate::{Error, Result};

/// Höchste gültige Feldnummer (2^29 - 1, encoding#structure).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// The six wire types of the proto3 binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint payload (int32/int64/uint*/sint*/bool/enum).
    #[default]
    Varint = 0,
    /// 8-byte little-endian payload (fixed64/sfixed64/double).
    I64 = 1,
    /// Length-prefixed payload (string/bytes/messages/packed repeated).
    Len = 2,
    /// Group start. Recognized, never produced or consumed.
    SGroup = 3,
    /// Group end. Recognized, never produced or consumed.
    EGroup = 4,
    /// 4-byte little-endian payload (fixed32/sfixed32/float).
    I32 = 5,
}

impl WireType {
    /// Maps a wire type number 0..=5 to its variant.
    pub fn from_num(num: u8) -> Option<Self> {
        match num {
            0 => Some(Self::Varint),
            1 => Some(Self::I64),
            2 => Some(Self::Len),
            3 => Some(Self::SGroup),
            4 => Some(Self::EGroup),
            5 => Some(Self::I32),
            _ => None,
        }
    }

    /// The wire type number carried in tags.
    #[inline]
    pub fn num(self) -> u8 {
        self as u8
    }

    /// True for the wire types a packed repeated block may contain.
    #[inline]
    pub fn is_packable(self) -> bool {
        matches!(self, Self::Varint | Self::I32 | Self::I64)
    }
}

/// Encodes a field tag. Fails when the field number is 0 or exceeds
/// [`MAX_FIELD_NUMBER`].
pub fn encode(writer: &mut ByteWriter, field_number: u32, wire_type: WireType) -> Result<()> {
    if field_number == 0 || field_number > MAX_FIELD_NUMBER {
        return Err(Error::InvalidFieldNumber(u64::from(field_number)));
    }
    let tag = (u64::from(field_number) << 3) | u64::from(wire_type.num());
    varint::encode_uvarint(writer, tag);
    Ok(())
}

/// Decodes a field tag into (field number, wire type).
///
/// Fails with [`Error::InvalidFieldNumber`] when the decoded number is zero
/// or out of range, and with [`Error::InvalidWireType`] for the unused wire
/// type numbers 6 and 7.
pub fn decode(reader: &mut ByteReader<'_>) -> Result<(u32, WireType)> {
    let tag = varint::decode_uvarint(reader)?;
    let field_number = tag >> 3;
    if field_number == 0 || field_number > u64::from(MAX_FIELD_NUMBER) {
        return Err(Error::InvalidFieldNumber(field_number));
    }
    let wire_num = (tag & 0x7) as u8;
    let wire_type = WireType::from_num(wire_num).ok_or(Error::InvalidWireType(wire_num))?;
    Ok((field_number as u32, wire_type))
}

/// Decodes a field tag without consuming input.
pub fn peek(reader: &ByteReader<'_>) -> Result<(u32, WireType)> {
    let mut copy = *reader;
    decode(&mut copy)
}

/// Skips one value of the given wire type (unknown-field handling).
///
/// VARINT consumes a uvarint, I32/I64 skip the fixed width, LEN skips a
/// length-prefixed payload. Groups are a hard error.
pub fn skip_value(reader: &mut ByteReader<'_>, wire_type: WireType) -> Result<()> {
    match wire_type {
        WireType::Varint => {
            varint::decode_uvarint(reader)?;
            Ok(())
        }
        WireType::I32 => {
            let available = reader.remaining();
            if !reader.skip(4) {
                return Err(Error::insufficient(4, available));
            }
            Ok(())
        }
        WireType::I64 => {
            let available = reader.remaining();
            if !reader.skip(8) {
                return Err(Error::insufficient(8, available));
            }
            Ok(())
        }
        WireType::Len => {
            crate::binary::decode(reader)?;
            Ok(())
        }
        WireType::SGroup | WireType::EGroup => {
            Err(Error::UnsupportedWireType(wire_type.num()))
        }
    }
}
