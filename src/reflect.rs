//! Reflection capability for record types.
//!
//! The codec never looks inside a host struct; it consumes this small
//! capability instead: list the fields, read the i-th field, write the i-th
//! field. Values cross the boundary as the [`Value`] sum, so an
//! implementation is a pair of mechanical `match` blocks. Implementations may
//! be hand-written or generated from schema; the codec cannot tell.
//!
//! # Write conventions
//!
//! The decoder feeds `write_field` one wire occurrence at a time, so
//! implementations follow the merge rules of the wire format:
//!
//! - scalars, strings, bytes: overwrite,
//! - lists: extend (`Value::List` carries the new elements),
//! - maps: insert each entry, last write wins,
//! - nested messages: merge the tree into the existing value via
//!   [`merge_tree`], creating it first when wrapped in `Option`.

use crate::schema::Kind;
use crate::value::{Tree, Value};
use crate::Result;

/// Static description of one field of a record type.
///
/// `protobuf` / `protobuf_key` / `protobuf_val` carry the textual annotations
/// of the struct-tag grammar; everything else is the structural reflection a
/// host language would derive from the field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name as declared on the record.
    pub name: &'static str,
    /// Semantic kind of the field value.
    pub kind: Kind,
    /// Key kind for map fields.
    pub key: Kind,
    /// Element kind for list fields, value kind for map fields.
    pub elem: Kind,
    /// Type name of the map key, for schema lookups.
    pub key_type: &'static str,
    /// Type name of the list element / map value, for schema lookups.
    pub elem_type: &'static str,
    /// Type name of the field value itself (inner type for `Option`).
    pub type_name: &'static str,
    /// True when the field is wrapped in an optional pointer (`Option`).
    pub is_pointer: bool,
    /// Protobuf annotation; empty means the codec ignores the field.
    pub protobuf: &'static str,
    /// Map-key sub-annotation.
    pub protobuf_key: Option<&'static str>,
    /// Map-value sub-annotation.
    pub protobuf_val: Option<&'static str>,
    /// JSON name annotation, stored verbatim.
    pub json: &'static str,
}

impl FieldSpec {
    /// Leerer Basis-Spec für die const-Konstruktoren.
    pub const EMPTY: Self = Self {
        name: "",
        kind: Kind::Invalid,
        key: Kind::Invalid,
        elem: Kind::Invalid,
        key_type: "",
        elem_type: "",
        type_name: "",
        is_pointer: false,
        protobuf: "",
        protobuf_key: None,
        protobuf_val: None,
        json: "",
    };

    /// A scalar field (integer, float, bool, string, bytes).
    pub const fn scalar(name: &'static str, kind: Kind, protobuf: &'static str) -> Self {
        Self {
            name,
            kind,
            protobuf,
            ..Self::EMPTY
        }
    }

    /// A nested message field of the named record type.
    pub const fn message(
        name: &'static str,
        type_name: &'static str,
        protobuf: &'static str,
    ) -> Self {
        Self {
            name,
            kind: Kind::Message,
            type_name,
            protobuf,
            ..Self::EMPTY
        }
    }

    /// A list field with the given element kind.
    pub const fn list(
        name: &'static str,
        elem: Kind,
        elem_type: &'static str,
        protobuf: &'static str,
    ) -> Self {
        Self {
            name,
            kind: Kind::List,
            elem,
            elem_type,
            protobuf,
            ..Self::EMPTY
        }
    }

    /// A map field with the given key and value kinds.
    pub const fn map(
        name: &'static str,
        key: Kind,
        elem: Kind,
        key_type: &'static str,
        elem_type: &'static str,
        protobuf: &'static str,
        protobuf_key: &'static str,
        protobuf_val: &'static str,
    ) -> Self {
        Self {
            name,
            kind: Kind::Map,
            key,
            elem,
            key_type,
            elem_type,
            protobuf,
            protobuf_key: Some(protobuf_key),
            protobuf_val: Some(protobuf_val),
            ..Self::EMPTY
        }
    }

    /// A field without a protobuf annotation; invisible to the codec.
    pub const fn ignored(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            ..Self::EMPTY
        }
    }

    /// Marks the field as an optional-pointer wrapper (`Option<T>`).
    pub const fn pointer(mut self) -> Self {
        self.is_pointer = true;
        self
    }

    /// Attaches a JSON name annotation.
    pub const fn with_json(mut self, json: &'static str) -> Self {
        self.json = json;
        self
    }
}

/// The reflection capability a record type grants the codec.
pub trait Record: Default {
    /// Stable type name the registry keys on. Must be deterministic and
    /// survive schema serialization — never derived from compiler internals.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// The static field descriptions, in declaration order. `read_field` and
    /// `write_field` slots index into this slice.
    fn fields() -> &'static [FieldSpec]
    where
        Self: Sized;

    /// Reads the field at `slot` as a [`Value`]. Absent optionals yield
    /// [`Value::None`]; nested messages yield their field tree.
    fn read_field(&self, slot: usize) -> Value;

    /// Writes one decoded occurrence into the field at `slot`, following the
    /// module-level merge conventions.
    fn write_field(&mut self, slot: usize, value: Value) -> Result<()>;
}

/// Converts a record into its name-keyed field tree.
///
/// Zero-valued fields are left out, mirroring the encoder's implicit-default
/// omission; present optionals are kept even when their inner value is zero.
pub fn record_to_tree<T: Record>(v: &T) -> Tree {
    let mut tree = Tree::default();
    for (slot, spec) in T::fields().iter().enumerate() {
        if spec.protobuf.is_empty() {
            continue;
        }
        let value = v.read_field(slot);
        if spec.is_pointer {
            if matches!(value, Value::None) {
                continue;
            }
        } else if value.is_zero() {
            continue;
        }
        tree.insert(spec.name.to_string(), value);
    }
    tree
}

/// Merges a name-keyed tree into an existing record.
///
/// Entries whose names match no field are discarded, consistent with
/// unknown-field handling on the wire.
pub fn merge_tree<T: Record>(target: &mut T, mut tree: Tree) -> Result<()> {
    for (slot, spec) in T::fields().iter().enumerate() {
        if let Some(value) = tree.swap_remove(spec.name) {
            target.write_field(slot, value)?;
        }
    }
    Ok(())
}

/// Builds a record from a name-keyed tree.
pub fn record_from_tree<T: Record>(tree: Tree) -> Result<T> {
    let mut out = T::default();
    merge_tree(&mut out, tree)?;
    Ok(out)
}
