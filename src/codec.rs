//! Typed codec: marshal and unmarshal of registered record types.
//!
//! `marshal` walks the cached schema in ascending field-number order, omits
//! implicit defaults and emits each field as its pre-computed tag plus a
//! kind-dispatched payload. `unmarshal` peels tags, skips unknown fields and
//! writes decoded values back through the reflection capability.
//!
//! The per-value dispatch in this module is shared with the
//! [`inspector`](crate::inspector): the typed codec exchanges [`Value`]s with
//! the record at the field boundary, the inspector exchanges whole trees —
//! the wire logic is identical.

use crate::binary;
use crate::boolean;
use crate::bytestream::{ByteReader, ByteWriter};
use crate::fixed;
use crate::float;
use crate::inspector;
use crate::reflect::Record;
use crate::schema::{capture_type, capture_type_by_name, Field, Kind};
use crate::string;
use crate::tag::{self, WireType};
use crate::value::{Tree, Value};
use crate::varint;
use crate::zigzag;
use crate::{Error, FastIndexMap, Result};

/// Tiefenschranke für verschachtelte Messages beim Decodieren (entspricht dem
/// üblichen proto3-Rekursionslimit). Schutz gegen Stack-Erschöpfung durch
/// künstlich tief geschachtelte LEN-Payloads.
pub(crate) const MAX_DECODE_DEPTH: usize = 100;

/// Serializes a value of a registered record type.
///
/// Fields equal to the zero value of their kind are omitted; absent optionals
/// are omitted, present ones are encoded even when their inner value is zero.
/// On error no bytes are returned.
pub fn marshal<T: Record>(v: &T) -> Result<Vec<u8>> {
    let typ =
        capture_type::<T>().ok_or_else(|| Error::UnknownType(T::type_name().to_string()))?;
    let mut out = ByteWriter::new();
    for field in &typ.fields {
        let value = v.read_field(field.slot());
        if field.is_pointer {
            if matches!(value, Value::None) {
                continue;
            }
        } else if value.is_zero() {
            continue;
        }
        encode_field(&value, field, &mut out)?;
    }
    Ok(out.detach())
}

/// Deserializes bytes into a value of a registered record type.
///
/// Decoding runs until the input is exhausted; trailing garbage surfaces as
/// the error of whatever primitive it fails to parse as. The target may be
/// left partially populated on error.
pub fn unmarshal<T: Record>(bytes: &[u8], v: &mut T) -> Result<()> {
    let typ =
        capture_type::<T>().ok_or_else(|| Error::UnknownType(T::type_name().to_string()))?;
    let mut reader = ByteReader::new(bytes);
    while !reader.is_empty() {
        let (field_num, wire_read) = tag::decode(&mut reader)?;
        let Some(field) = typ.fields_indexer.get(&field_num) else {
            // Unbekanntes Feld: Payload nach gelesenem Wire Type überspringen.
            tag::skip_value(&mut reader, wire_read)?;
            continue;
        };
        let value = decode_field_value(&mut reader, field, wire_read, 0, false)?;
        v.write_field(field.slot(), value)?;
    }
    Ok(())
}

// ============================================================================
// Encode dispatch
// ============================================================================

/// Encodes one field occurrence: tag plus kind-dispatched payload.
///
/// List and map fields expand to their full wire form here (packed block or
/// tag-per-element / tag-per-entry).
pub(crate) fn encode_field(value: &Value, field: &Field, out: &mut ByteWriter) -> Result<()> {
    match field.kind {
        Kind::List => encode_list(value, field, out),
        Kind::Map => encode_map(value, field, out),
        kind => {
            out.put_slice(&field.tag);
            encode_value(
                value,
                kind,
                field.declared_wire(),
                field.zigzag(),
                &field.type_name,
                out,
            )
        }
    }
}

/// Lists of packed-eligible scalars become one length-prefixed block; lists
/// of LEN elements repeat the field tag per element.
fn encode_list(value: &Value, field: &Field, out: &mut ByteWriter) -> Result<()> {
    let items = value.as_list()?;
    let wire = field.declared_wire();
    if wire.is_packable() {
        out.put_slice(&field.tag);
        let mut block = ByteWriter::new();
        for item in items {
            encode_value(item, field.elem, wire, field.zigzag(), &field.elem_type, &mut block)?;
        }
        binary::encode(out, block.as_slice());
    } else {
        for item in items {
            out.put_slice(&field.tag);
            encode_value(item, field.elem, wire, false, &field.elem_type, out)?;
        }
    }
    Ok(())
}

/// Each map entry is a length-prefixed pseudo-message `key_tag key value_tag
/// value`, preceded by the containing field's tag. Entry order is whatever
/// the map iterates.
fn encode_map(value: &Value, field: &Field, out: &mut ByteWriter) -> Result<()> {
    let map = value.as_map()?;
    for (key, val) in map {
        out.put_slice(&field.tag);
        let mut entry = ByteWriter::new();
        entry.put_slice(&field.key_tag);
        let key_value: Value = key.clone().into();
        encode_value(
            &key_value,
            field.key,
            field.map_key_wire(),
            false,
            &field.key_type,
            &mut entry,
        )?;
        entry.put_slice(&field.value_tag);
        encode_value(
            val,
            field.elem,
            field.map_value_wire(),
            false,
            &field.elem_type,
            &mut entry,
        )?;
        binary::encode(out, entry.as_slice());
    }
    Ok(())
}

/// Encodes one scalar or nested-message payload under the declared wire type.
fn encode_value(
    value: &Value,
    kind: Kind,
    wire: WireType,
    zigzag_transform: bool,
    type_name: &str,
    out: &mut ByteWriter,
) -> Result<()> {
    match kind {
        k if k.is_signed_int() => {
            let v = value.as_i64()?;
            match wire {
                WireType::I32 => fixed::encode_fixed32(out, v as u32),
                WireType::I64 => fixed::encode_fixed64(out, v as u64),
                _ if zigzag_transform => zigzag::encode(out, v),
                _ => varint::encode(out, v),
            }
        }
        k if k.is_unsigned_int() => {
            let v = value.as_u64()?;
            match wire {
                WireType::I32 => fixed::encode_fixed32(out, v as u32),
                WireType::I64 => fixed::encode_fixed64(out, v),
                _ => varint::encode_uvarint(out, v),
            }
        }
        Kind::Float32 => float::encode_float32(out, value.as_f64()? as f32),
        Kind::Float64 => float::encode_float64(out, value.as_f64()?),
        Kind::Bool => boolean::encode(out, value.as_bool()?),
        Kind::String => string::encode(out, value.as_str()?),
        Kind::Bytes => binary::encode(out, value.as_bytes()?),
        Kind::Message => {
            let tree = value.as_message()?;
            let typ = capture_type_by_name(type_name)
                .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
            let mut body = ByteWriter::new();
            inspector::write_message_tree(&typ, tree, &mut body)?;
            binary::encode(out, body.as_slice());
        }
        other => return Err(Error::UnexpectedKind(other.name())),
    }
    Ok(())
}

// ============================================================================
// Decode dispatch
// ============================================================================

/// Decodes one field occurrence into a [`Value`].
///
/// The declared wire type interprets the payload; `wire_read` only selects
/// between the packed and non-packed forms of repeated scalars. `depth`
/// counts nested messages and is capped at [`MAX_DECODE_DEPTH`]; `strict`
/// is the duplicate policy handed down to nested tree reads (false on the
/// typed path, true on the inspect path).
pub(crate) fn decode_field_value(
    reader: &mut ByteReader<'_>,
    field: &Field,
    wire_read: WireType,
    depth: usize,
    strict: bool,
) -> Result<Value> {
    match field.kind {
        Kind::List => decode_list(reader, field, wire_read, depth, strict),
        Kind::Map => decode_map_entry(reader, field, depth, strict),
        kind => decode_value(
            reader,
            kind,
            field.declared_wire(),
            field.zigzag(),
            &field.type_name,
            depth,
            strict,
        ),
    }
}

/// Packed-eligible lists accept both wire forms: a single LEN block holding
/// concatenated payloads, or one scalar per repeated tag.
fn decode_list(
    reader: &mut ByteReader<'_>,
    field: &Field,
    wire_read: WireType,
    depth: usize,
    strict: bool,
) -> Result<Value> {
    let declared = field.declared_wire();
    if declared.is_packable() && wire_read == WireType::Len {
        let block = binary::decode(reader)?;
        let mut sub = ByteReader::new(block);
        let mut items = Vec::new();
        while !sub.is_empty() {
            items.push(decode_value(
                &mut sub,
                field.elem,
                declared,
                field.zigzag(),
                &field.elem_type,
                depth,
                strict,
            )?);
        }
        Ok(Value::List(items))
    } else {
        let item = decode_value(
            reader,
            field.elem,
            declared,
            field.zigzag(),
            &field.elem_type,
            depth,
            strict,
        )?;
        Ok(Value::List(vec![item]))
    }
}

/// Decodes one map entry. Key and value sub-fields are accepted in either
/// order; a missing half falls back to the zero value of its kind. The
/// caller merges entries, so duplicates resolve last-write-wins.
fn decode_map_entry(
    reader: &mut ByteReader<'_>,
    field: &Field,
    depth: usize,
    strict: bool,
) -> Result<Value> {
    let block = binary::decode(reader)?;
    let mut sub = ByteReader::new(block);
    let mut key = zero_of(field.key);
    let mut val = zero_of(field.elem);
    while !sub.is_empty() {
        let (num, wire) = tag::decode(&mut sub)?;
        match num {
            1 => {
                key = decode_value(&mut sub, field.key, wire, false, &field.key_type, depth, strict)?
            }
            2 => {
                val = decode_value(&mut sub, field.elem, wire, false, &field.elem_type, depth, strict)?
            }
            _ => tag::skip_value(&mut sub, wire)?,
        }
    }
    let mut map = FastIndexMap::default();
    map.insert(key.into_map_key()?, val);
    Ok(Value::Map(map))
}

/// Decodes one scalar or nested-message payload under the declared wire type.
fn decode_value(
    reader: &mut ByteReader<'_>,
    kind: Kind,
    wire: WireType,
    zigzag_transform: bool,
    type_name: &str,
    depth: usize,
    strict: bool,
) -> Result<Value> {
    match kind {
        k if k.is_signed_int() => match wire {
            WireType::I32 => Ok(Value::I64(i64::from(fixed::decode_fixed32(reader)? as i32))),
            WireType::I64 => Ok(Value::I64(fixed::decode_fixed64(reader)? as i64)),
            _ if zigzag_transform => Ok(Value::I64(zigzag::decode(reader)?)),
            _ => Ok(Value::I64(varint::decode(reader)?)),
        },
        k if k.is_unsigned_int() => match wire {
            WireType::I32 => Ok(Value::U64(u64::from(fixed::decode_fixed32(reader)?))),
            WireType::I64 => Ok(Value::U64(fixed::decode_fixed64(reader)?)),
            _ => Ok(Value::U64(varint::decode_uvarint(reader)?)),
        },
        Kind::Float32 => Ok(Value::F64(f64::from(float::decode_float32(reader)?))),
        Kind::Float64 => Ok(Value::F64(float::decode_float64(reader)?)),
        Kind::Bool => Ok(Value::Bool(boolean::decode(reader)?)),
        Kind::String => Ok(Value::Str(string::decode(reader)?)),
        Kind::Bytes => Ok(Value::Bytes(binary::decode(reader)?.to_vec())),
        Kind::Message => {
            if depth >= MAX_DECODE_DEPTH {
                return Err(Error::NestingTooDeep);
            }
            let block = binary::decode(reader)?;
            let typ = capture_type_by_name(type_name)
                .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
            Ok(Value::Message(inspector::read_message_tree(
                &typ,
                block,
                depth + 1,
                strict,
            )?))
        }
        other => Err(Error::UnexpectedKind(other.name())),
    }
}

/// The zero value of a kind (decode fallback for absent map halves).
fn zero_of(kind: Kind) -> Value {
    match kind {
        k if k.is_signed_int() => Value::I64(0),
        k if k.is_unsigned_int() => Value::U64(0),
        Kind::Float32 | Kind::Float64 => Value::F64(0.0),
        Kind::Bool => Value::Bool(false),
        Kind::String => Value::Str(String::new()),
        Kind::Bytes => Value::Bytes(Vec::new()),
        Kind::List => Value::List(Vec::new()),
        Kind::Map => Value::Map(FastIndexMap::default()),
        Kind::Message => Value::Message(Tree::default()),
        _ => Value::None,
    }
}
