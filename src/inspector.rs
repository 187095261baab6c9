//! Schema-less inspector and writer.
//!
//! [`read`] decodes a payload against a registered schema without
//! constructing the record type: the result is a name-keyed [`Tree`] of
//! sum-typed values. [`write`] is the inverse and emits bytes bit-compatible
//! with the typed encoder (up to map entry order).
//!
//! Repeated occurrences of one field number merge: lists concatenate,
//! mappings union (later entries overwrite earlier ones on equal keys). Any
//! other duplicate is an error.

use crate::bytestream::{ByteReader, ByteWriter};
use crate::codec;
use crate::schema::{capture_type_by_name, Type};
use crate::tag;
use crate::value::{Tree, Value};
use crate::{Error, Result};

/// Decodes a payload of the named registered type into a field tree.
pub fn read(type_name: &str, bytes: &[u8]) -> Result<Tree> {
    let typ = capture_type_by_name(type_name)
        .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
    read_message_tree(&typ, bytes, 0, true)
}

/// Encodes a field tree as a payload of the named registered type.
///
/// Fields absent from the tree are omitted, not defaulted; values whose kind
/// disagrees with the schema fail with a kind mismatch.
pub fn write(type_name: &str, tree: &Tree) -> Result<Vec<u8>> {
    let typ = capture_type_by_name(type_name)
        .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
    let mut out = ByteWriter::new();
    write_message_tree(&typ, tree, &mut out)?;
    Ok(out.detach())
}

/// Tree-level decode loop, shared with the typed codec's nested-message path.
///
/// `depth` counts message nesting for the recursion cap. `strict` selects the
/// duplicate policy: the inspector rejects non-mergeable repeats, the typed
/// codec overwrites them (last write wins, the canonical scalar behavior —
/// uniform at every nesting depth).
pub(crate) fn read_message_tree(
    typ: &Type,
    bytes: &[u8],
    depth: usize,
    strict: bool,
) -> Result<Tree> {
    let mut reader = ByteReader::new(bytes);
    let mut tree = Tree::default();
    while !reader.is_empty() {
        let (field_num, wire_read) = tag::decode(&mut reader)?;
        let Some(field) = typ.fields_indexer.get(&field_num) else {
            tag::skip_value(&mut reader, wire_read)?;
            continue;
        };
        let value = codec::decode_field_value(&mut reader, field, wire_read, depth, strict)?;
        merge_occurrence(&mut tree, &field.name, value, strict)?;
    }
    Ok(tree)
}

/// Tree-level encode loop, shared with the typed codec's nested-message path.
///
/// Walks the schema in ascending field-number order. Zero values are omitted
/// except for optional-pointer fields, whose presence is meaningful.
pub(crate) fn write_message_tree(typ: &Type, tree: &Tree, out: &mut ByteWriter) -> Result<()> {
    for field in &typ.fields {
        let Some(value) = tree.get(&field.name) else {
            continue;
        };
        if matches!(value, Value::None) {
            continue;
        }
        if !field.is_pointer && value.is_zero() {
            continue;
        }
        codec::encode_field(value, field, out)?;
    }
    Ok(())
}

/// Merges one decoded occurrence into the tree.
///
/// Lists concatenate, mappings union. Any other repeat is an error under the
/// strict (inspect) policy and an overwrite under the typed one.
fn merge_occurrence(tree: &mut Tree, name: &str, value: Value, strict: bool) -> Result<()> {
    let Some(existing) = tree.get_mut(name) else {
        tree.insert(name.to_string(), value);
        return Ok(());
    };
    match (existing, value) {
        (Value::List(a), Value::List(b)) => a.extend(b),
        (Value::Map(a), Value::Map(b)) => a.extend(b),
        (Value::Message(a), Value::Message(b)) => a.extend(b),
        (existing, value) => {
            if strict {
                return Err(Error::DuplicateField(name.to_string()));
            }
            *existing = value;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::FieldSpec;
    use crate::schema::{register_type, Kind};
    use crate::value::MapKey;
    use crate::{FastIndexMap, Record};

    #[derive(Debug, Default)]
    struct Event {
        name: String,
        code: i32,
        sequence: u64,
        weights: Vec<i64>,
        attrs: FastIndexMap<MapKey, Value>,
        origin: Option<Source>,
    }

    #[derive(Debug, Default)]
    struct Source {
        host: String,
        port: u32,
    }

    impl Record for Source {
        fn type_name() -> &'static str {
            "inspector_test.Source"
        }

        fn fields() -> &'static [FieldSpec] {
            const FIELDS: &[FieldSpec] = &[
                FieldSpec::scalar("host", Kind::String, "bytes,1,opt,name=host,proto3"),
                FieldSpec::scalar("port", Kind::Uint32, "varint,2,opt,name=port,proto3"),
            ];
            FIELDS
        }

        fn read_field(&self, slot: usize) -> Value {
            match slot {
                0 => Value::Str(self.host.clone()),
                1 => Value::U64(u64::from(self.port)),
                _ => Value::None,
            }
        }

        fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
            match slot {
                0 => self.host = value.into_str()?,
                1 => self.port = value.as_u64()? as u32,
                _ => {}
            }
            Ok(())
        }
    }

    impl Record for Event {
        fn type_name() -> &'static str {
            "inspector_test.Event"
        }

        fn fields() -> &'static [FieldSpec] {
            const FIELDS: &[FieldSpec] = &[
                FieldSpec::scalar("name", Kind::String, "bytes,1,opt,name=name,proto3"),
                FieldSpec::scalar("code", Kind::Int32, "varint,2,opt,name=code,proto3"),
                FieldSpec::scalar("sequence", Kind::Uint64, "varint,3,opt,name=sequence,proto3"),
                FieldSpec::list("weights", Kind::Int64, "i64", "varint,4,rep,name=weights,proto3"),
                FieldSpec::map(
                    "attrs",
                    Kind::String,
                    Kind::String,
                    "string",
                    "string",
                    "bytes,5,map,name=attrs,proto3",
                    "bytes,1,opt,name=key",
                    "bytes,2,opt,name=value",
                ),
                FieldSpec::message(
                    "origin",
                    "inspector_test.Source",
                    "bytes,6,opt,name=origin,proto3",
                )
                .pointer(),
            ];
            FIELDS
        }

        fn read_field(&self, slot: usize) -> Value {
            match slot {
                0 => Value::Str(self.name.clone()),
                1 => Value::I64(i64::from(self.code)),
                2 => Value::U64(self.sequence),
                3 => Value::List(self.weights.iter().map(|&v| Value::I64(v)).collect()),
                4 => Value::Map(self.attrs.clone()),
                5 => match &self.origin {
                    Some(s) => Value::Message(crate::record_to_tree(s)),
                    None => Value::None,
                },
                _ => Value::None,
            }
        }

        fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
            match slot {
                0 => self.name = value.into_str()?,
                1 => self.code = value.as_i64()? as i32,
                2 => self.sequence = value.as_u64()?,
                3 => {
                    for item in value.into_list()? {
                        self.weights.push(item.as_i64()?);
                    }
                }
                4 => self.attrs.extend(value.into_map()?),
                5 => {
                    let target = self.origin.get_or_insert_with(Source::default);
                    crate::merge_tree(target, value.into_message()?)?;
                }
                _ => {}
            }
            Ok(())
        }
    }

    fn register() {
        register_type::<Source>().unwrap();
        register_type::<Event>().unwrap();
    }

    #[test]
    fn read_yields_sum_typed_tree() {
        register();
        let v = Event {
            name: "boot".into(),
            code: -2,
            sequence: 12345,
            ..Event::default()
        };
        let bytes = crate::marshal(&v).unwrap();
        let tree = read("inspector_test.Event", &bytes).unwrap();

        assert_eq!(tree["name"], Value::Str("boot".into()));
        assert_eq!(tree["code"], Value::I64(-2));
        assert_eq!(tree["sequence"], Value::U64(12345));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn read_unknown_type_name() {
        assert_eq!(
            read("inspector_test.Nope", &[]).unwrap_err(),
            Error::UnknownType("inspector_test.Nope".into())
        );
    }

    #[test]
    fn nested_message_becomes_nested_tree() {
        register();
        let v = Event {
            origin: Some(Source { host: "a".into(), port: 80 }),
            ..Event::default()
        };
        let bytes = crate::marshal(&v).unwrap();
        let tree = read("inspector_test.Event", &bytes).unwrap();

        let origin = tree["origin"].as_message().unwrap();
        assert_eq!(origin["host"], Value::Str("a".into()));
        assert_eq!(origin["port"], Value::U64(80));
    }

    #[test]
    fn non_packed_occurrences_concatenate() {
        register();
        // Drei einzelne VARINT-Vorkommen von Feld 4.
        let bytes = vec![0x20, 0x01, 0x20, 0x02, 0x20, 0x03];
        let tree = read("inspector_test.Event", &bytes).unwrap();
        assert_eq!(
            tree["weights"],
            Value::List(vec![Value::I64(1), Value::I64(2), Value::I64(3)])
        );
    }

    #[test]
    fn map_occurrences_union() {
        register();
        let entry = |k: u8, v: u8| vec![0x2A, 0x06, 0x0A, 0x01, k, 0x12, 0x01, v];
        let mut bytes = entry(b'a', b'1');
        bytes.extend(entry(b'b', b'2'));
        bytes.extend(entry(b'a', b'3')); // überschreibt a→1

        let tree = read("inspector_test.Event", &bytes).unwrap();
        let attrs = tree["attrs"].as_map().unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[&MapKey::Str("a".into())], Value::Str("3".into()));
        assert_eq!(attrs[&MapKey::Str("b".into())], Value::Str("2".into()));
    }

    #[test]
    fn duplicate_scalar_is_an_error() {
        register();
        let bytes = vec![0x18, 0x01, 0x18, 0x02];
        assert_eq!(
            read("inspector_test.Event", &bytes).unwrap_err(),
            Error::DuplicateField("sequence".into())
        );
    }

    #[test]
    fn split_nested_message_occurrences_union() {
        register();
        // Feld 6 zweimal: einmal nur host, einmal nur port.
        let mut bytes = vec![0x32, 0x03, 0x0A, 0x01, b'h'];
        bytes.extend([0x32, 0x02, 0x10, 0x50]);
        let tree = read("inspector_test.Event", &bytes).unwrap();
        let origin = tree["origin"].as_message().unwrap();
        assert_eq!(origin["host"], Value::Str("h".into()));
        assert_eq!(origin["port"], Value::U64(0x50));
    }

    #[test]
    fn write_is_inverse_of_read() {
        register();
        let mut attrs = FastIndexMap::default();
        attrs.insert(MapKey::Str("env".into()), Value::Str("dev".into()));
        let v = Event {
            name: "boot".into(),
            code: 7,
            sequence: 9,
            weights: vec![1, -2, 3],
            attrs,
            origin: Some(Source { host: "x".into(), port: 1 }),
        };
        let bytes = crate::marshal(&v).unwrap();
        let tree = read("inspector_test.Event", &bytes).unwrap();
        let rewritten = write("inspector_test.Event", &tree).unwrap();
        assert_eq!(rewritten, bytes);
    }

    #[test]
    fn write_omits_absent_fields() {
        register();
        let mut tree = Tree::default();
        tree.insert("code".into(), Value::I64(5));
        let bytes = write("inspector_test.Event", &tree).unwrap();
        assert_eq!(bytes, vec![0x10, 0x05]);
    }

    #[test]
    fn write_rejects_mismatched_kinds() {
        register();
        let mut tree = Tree::default();
        tree.insert("code".into(), Value::Str("not a number".into()));
        assert_eq!(
            write("inspector_test.Event", &tree).unwrap_err(),
            Error::kind_mismatch("i64", "string")
        );
    }

    #[test]
    fn write_unknown_tree_entries_are_ignored() {
        register();
        let mut tree = Tree::default();
        tree.insert("no_such_field".into(), Value::I64(1));
        let bytes = write("inspector_test.Event", &tree).unwrap();
        assert!(bytes.is_empty());
    }
}
