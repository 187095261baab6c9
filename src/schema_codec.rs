//! Reflection capability of the schema types themselves.
//!
//! [`Tags`], [`ProtobufInfo`], [`Field`], [`Type`] and [`Module`] are plain
//! annotated records like any other: the impls below register them with the
//! same field-tag grammar, so a schema serializes through the ordinary typed
//! codec. That is the whole of schema export/import — no second wire format.
//!
//! Imports are lenient about enum discriminants (an unknown kind or wire-type
//! number degrades to the default instead of failing), mirroring how the wire
//! format treats unknown enum values.

use std::sync::Arc;

use crate::annotation::{ProtobufInfo, Tags};
use crate::reflect::{merge_tree, record_from_tree, record_to_tree, FieldSpec, Record};
use crate::schema::{Field, Kind, Module, Type};
use crate::tag::WireType;
use crate::value::Value;
use crate::{Error, Result};

impl Record for ProtobufInfo {
    fn type_name() -> &'static str {
        "protoflect.ProtobufInfo"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::scalar("wire_type", Kind::Uint8, "varint,1,opt,name=wire_type,proto3"),
            FieldSpec::scalar("zigzag", Kind::Bool, "varint,7,opt,name=zigzag,proto3"),
            FieldSpec::scalar("field_num", Kind::Uint32, "varint,2,opt,name=field_num,proto3"),
            FieldSpec::scalar("label", Kind::String, "bytes,3,opt,name=label,proto3"),
            FieldSpec::scalar("name", Kind::String, "bytes,4,opt,name=name,proto3"),
            FieldSpec::scalar("syntax", Kind::String, "bytes,5,opt,name=syntax,proto3"),
            FieldSpec::scalar("one_of", Kind::Bool, "varint,6,opt,name=one_of,proto3"),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::U64(u64::from(self.wire_type.num())),
            1 => Value::Bool(self.zigzag),
            2 => Value::U64(u64::from(self.field_num)),
            3 => Value::Str(self.label.clone()),
            4 => Value::Str(self.name.clone()),
            5 => Value::Str(self.syntax.clone()),
            6 => Value::Bool(self.one_of),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => self.wire_type = WireType::from_num(value.as_u64()? as u8).unwrap_or_default(),
            1 => self.zigzag = value.as_bool()?,
            2 => self.field_num = value.as_u64()? as u32,
            3 => self.label = value.into_str()?,
            4 => self.name = value.into_str()?,
            5 => self.syntax = value.into_str()?,
            6 => self.one_of = value.as_bool()?,
            _ => {}
        }
        Ok(())
    }
}

impl Record for Tags {
    fn type_name() -> &'static str {
        "protoflect.Tags"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::message(
                "protobuf",
                "protoflect.ProtobufInfo",
                "bytes,1,opt,name=protobuf,proto3",
            )
            .pointer(),
            FieldSpec::scalar("json_name", Kind::String, "bytes,2,opt,name=json_name,proto3"),
            FieldSpec::scalar("map_key", Kind::Uint8, "varint,3,opt,name=map_key,proto3"),
            FieldSpec::scalar("map_value", Kind::Uint8, "varint,4,opt,name=map_value,proto3"),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => match &self.protobuf {
                Some(info) => Value::Message(record_to_tree(info)),
                None => Value::None,
            },
            1 => Value::Str(self.json_name.clone()),
            2 => Value::U64(u64::from(self.map_key.num())),
            3 => Value::U64(u64::from(self.map_value.num())),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => {
                let target = self.protobuf.get_or_insert_with(ProtobufInfo::default);
                merge_tree(target, value.into_message()?)?;
            }
            1 => self.json_name = value.into_str()?,
            2 => self.map_key = WireType::from_num(value.as_u64()? as u8).unwrap_or_default(),
            3 => self.map_value = WireType::from_num(value.as_u64()? as u8).unwrap_or_default(),
            _ => {}
        }
        Ok(())
    }
}

impl Record for Field {
    fn type_name() -> &'static str {
        "protoflect.Field"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::scalar("name", Kind::String, "bytes,1,opt,name=name,proto3"),
            FieldSpec::scalar("kind", Kind::Uint8, "varint,2,opt,name=kind,proto3"),
            FieldSpec::scalar("key", Kind::Uint8, "varint,3,opt,name=key,proto3"),
            FieldSpec::scalar("elem", Kind::Uint8, "varint,4,opt,name=elem,proto3"),
            FieldSpec::scalar("key_type", Kind::String, "bytes,5,opt,name=key_type,proto3"),
            FieldSpec::scalar("elem_type", Kind::String, "bytes,6,opt,name=elem_type,proto3"),
            FieldSpec::list(
                "field_index",
                Kind::Uint32,
                "uint32",
                "varint,7,rep,packed,name=field_index,proto3",
            ),
            FieldSpec::scalar("is_pointer", Kind::Bool, "varint,8,opt,name=is_pointer,proto3"),
            FieldSpec::scalar("type_name", Kind::String, "bytes,9,opt,name=type_name,proto3"),
            FieldSpec::message("tags", "protoflect.Tags", "bytes,10,opt,name=tags,proto3")
                .pointer(),
            FieldSpec::scalar("tag", Kind::Bytes, "bytes,11,opt,name=tag,proto3"),
            FieldSpec::scalar("key_tag", Kind::Bytes, "bytes,12,opt,name=key_tag,proto3"),
            FieldSpec::scalar("value_tag", Kind::Bytes, "bytes,13,opt,name=value_tag,proto3"),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::Str(self.name.clone()),
            1 => Value::U64(self.kind.num()),
            2 => Value::U64(self.key.num()),
            3 => Value::U64(self.elem.num()),
            4 => Value::Str(self.key_type.clone()),
            5 => Value::Str(self.elem_type.clone()),
            6 => Value::List(
                self.field_index
                    .iter()
                    .map(|&i| Value::U64(u64::from(i)))
                    .collect(),
            ),
            7 => Value::Bool(self.is_pointer),
            8 => Value::Str(self.type_name.clone()),
            9 => match &self.tags {
                Some(tags) => Value::Message(record_to_tree(tags)),
                None => Value::None,
            },
            10 => Value::Bytes(self.tag.clone()),
            11 => Value::Bytes(self.key_tag.clone()),
            12 => Value::Bytes(self.value_tag.clone()),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => self.name = value.into_str()?,
            1 => self.kind = Kind::from_num(value.as_u64()?).unwrap_or(Kind::Invalid),
            2 => self.key = Kind::from_num(value.as_u64()?).unwrap_or(Kind::Invalid),
            3 => self.elem = Kind::from_num(value.as_u64()?).unwrap_or(Kind::Invalid),
            4 => self.key_type = value.into_str()?,
            5 => self.elem_type = value.into_str()?,
            6 => {
                for item in value.into_list()? {
                    self.field_index.push(item.as_u64()? as u32);
                }
            }
            7 => self.is_pointer = value.as_bool()?,
            8 => self.type_name = value.into_str()?,
            9 => {
                let target = self.tags.get_or_insert_with(Tags::default);
                merge_tree(target, value.into_message()?)?;
            }
            10 => self.tag = value.into_bytes()?,
            11 => self.key_tag = value.into_bytes()?,
            12 => self.value_tag = value.into_bytes()?,
            _ => {}
        }
        Ok(())
    }
}

impl Record for Type {
    fn type_name() -> &'static str {
        "protoflect.Type"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::scalar("name", Kind::String, "bytes,1,opt,name=name,proto3"),
            FieldSpec::list(
                "fields",
                Kind::Message,
                "protoflect.Field",
                "bytes,2,rep,name=fields,proto3",
            ),
            FieldSpec::map(
                "fields_indexer",
                Kind::Uint32,
                Kind::Message,
                "uint32",
                "protoflect.Field",
                "bytes,3,rep,name=fields_indexer,proto3",
                "varint,1,opt,name=key",
                "bytes,2,opt,name=value",
            ),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::Str(self.name.clone()),
            1 => Value::List(
                self.fields
                    .iter()
                    .map(|f| Value::Message(record_to_tree(&**f)))
                    .collect(),
            ),
            2 => Value::Map(
                self.fields_indexer
                    .iter()
                    .map(|(&num, f)| {
                        (
                            crate::MapKey::U64(u64::from(num)),
                            Value::Message(record_to_tree(&**f)),
                        )
                    })
                    .collect(),
            ),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => self.name = value.into_str()?,
            1 => {
                for item in value.into_list()? {
                    let field: Field = record_from_tree(item.into_message()?)?;
                    self.fields.push(Arc::new(field));
                }
            }
            2 => {
                // Decodierte Indexer-Einträge sind eigenständige Instanzen;
                // `import_type` baut den Indexer danach aus `fields` neu auf,
                // damit die Invariante identischer Instanzen wieder gilt.
                for (key, item) in value.into_map()? {
                    let num = match key {
                        crate::MapKey::U64(num) => num as u32,
                        other => {
                            return Err(Error::kind_mismatch("u64", other.kind_name()));
                        }
                    };
                    let field: Field = record_from_tree(item.into_message()?)?;
                    self.fields_indexer.insert(num, Arc::new(field));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Record for Module {
    fn type_name() -> &'static str {
        "protoflect.Module"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[FieldSpec::map(
            "types",
            Kind::String,
            Kind::Message,
            "string",
            "protoflect.Type",
            "bytes,1,rep,name=types,proto3",
            "bytes,1,opt,name=key",
            "bytes,2,opt,name=value",
        )];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::Map(
                self.types
                    .iter()
                    .map(|(name, t)| {
                        (
                            crate::MapKey::Str(name.clone()),
                            Value::Message(record_to_tree(&**t)),
                        )
                    })
                    .collect(),
            ),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => {
                for (key, item) in value.into_map()? {
                    let name = match key {
                        crate::MapKey::Str(name) => name,
                        other => {
                            return Err(Error::kind_mismatch("string", other.kind_name()));
                        }
                    };
                    let mut t: Type = record_from_tree(item.into_message()?)?;
                    t.rebuild_indexer();
                    self.types.insert(name, Arc::new(t));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
