//! Reflected schema model and the process-wide type registry.
//!
//! Registration walks a record type's [`FieldSpec`]s, parses the annotations,
//! pre-computes the wire tags and files the resulting [`Type`] under its
//! stable name. The registry is populated eagerly at startup and read-only
//! afterwards; lookups hand out shared `Arc<Type>` references.
//!
//! The five schema types themselves ([`Tags`](crate::Tags),
//! [`ProtobufInfo`](crate::ProtobufInfo), [`Field`], [`Type`], [`Module`])
//! are seeded into the registry on first use, so the schema can describe —
//! and serialize — itself (`export_type` / `export_module`).

use std::sync::{Arc, LazyLock, RwLock};

use crate::annotation::{self, Tags};
use crate::bytestream::ByteWriter;
use crate::reflect::Record;
use crate::tag::{self, WireType};
use crate::{Error, FastHashMap, FastIndexMap, Result};

/// Semantic category of a field value.
///
/// Widths are tracked so the typed codec can restore them on decode; the
/// discriminants are stable because `Kind` is part of the self-described
/// schema wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Kind {
    #[default]
    Invalid = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Uint8 = 5,
    Uint16 = 6,
    Uint32 = 7,
    Uint64 = 8,
    Float32 = 9,
    Float64 = 10,
    Bool = 11,
    String = 12,
    Bytes = 13,
    List = 14,
    Map = 15,
    Message = 16,
}

impl Kind {
    /// Maps a stable discriminant back to its variant.
    pub fn from_num(num: u64) -> Option<Self> {
        match num {
            0 => Some(Self::Invalid),
            1 => Some(Self::Int8),
            2 => Some(Self::Int16),
            3 => Some(Self::Int32),
            4 => Some(Self::Int64),
            5 => Some(Self::Uint8),
            6 => Some(Self::Uint16),
            7 => Some(Self::Uint32),
            8 => Some(Self::Uint64),
            9 => Some(Self::Float32),
            10 => Some(Self::Float64),
            11 => Some(Self::Bool),
            12 => Some(Self::String),
            13 => Some(Self::Bytes),
            14 => Some(Self::List),
            15 => Some(Self::Map),
            16 => Some(Self::Message),
            _ => None,
        }
    }

    /// The stable discriminant carried in serialized schemas.
    #[inline]
    pub fn num(self) -> u64 {
        self as u64
    }

    /// Kind name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Map => "map",
            Self::Message => "message",
        }
    }

    /// True for the signed integer widths.
    #[inline]
    pub fn is_signed_int(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// True for the unsigned integer widths.
    #[inline]
    pub fn is_unsigned_int(self) -> bool {
        matches!(self, Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64)
    }
}

/// One field of a reflected [`Type`], with pre-computed wire tags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Field {
    /// Field name as declared on the record.
    pub name: String,
    /// Semantic kind of the field value.
    pub kind: Kind,
    /// Key kind for map fields.
    pub key: Kind,
    /// Element kind for lists, value kind for maps.
    pub elem: Kind,
    /// Type name of the map key, for schema lookups.
    pub key_type: String,
    /// Type name of the list element / map value.
    pub elem_type: String,
    /// Structural position path into the containing record.
    pub field_index: Vec<u32>,
    /// True when the field is wrapped in an optional pointer.
    pub is_pointer: bool,
    /// Type name of the field value itself (inner type for pointers).
    pub type_name: String,
    /// The parsed annotation set.
    pub tags: Option<Tags>,
    /// Pre-computed tag bytes: `encode_tag(field_num, effective_wire_type)`.
    pub tag: Vec<u8>,
    /// Pre-computed map-entry key tag (`encode_tag(1, map_key)`), maps only.
    pub key_tag: Vec<u8>,
    /// Pre-computed map-entry value tag (`encode_tag(2, map_value)`), maps only.
    pub value_tag: Vec<u8>,
}

impl Field {
    /// Slot into the record's field list (first path element).
    #[inline]
    pub fn slot(&self) -> usize {
        self.field_index.first().copied().unwrap_or(0) as usize
    }

    /// Field number from the annotation, 0 when absent.
    #[inline]
    pub fn field_num(&self) -> u32 {
        self.tags
            .as_ref()
            .and_then(|t| t.protobuf.as_ref())
            .map(|p| p.field_num)
            .unwrap_or(0)
    }

    /// Declared scalar wire type from the annotation.
    #[inline]
    pub fn declared_wire(&self) -> WireType {
        self.tags
            .as_ref()
            .and_then(|t| t.protobuf.as_ref())
            .map(|p| p.wire_type)
            .unwrap_or_default()
    }

    /// True when the annotation requests the zigzag transform.
    #[inline]
    pub fn zigzag(&self) -> bool {
        self.tags
            .as_ref()
            .and_then(|t| t.protobuf.as_ref())
            .map(|p| p.zigzag)
            .unwrap_or(false)
    }

    /// Wire type of map keys.
    #[inline]
    pub fn map_key_wire(&self) -> WireType {
        self.tags.as_ref().map(|t| t.map_key).unwrap_or_default()
    }

    /// Wire type of map values.
    #[inline]
    pub fn map_value_wire(&self) -> WireType {
        self.tags.as_ref().map(|t| t.map_value).unwrap_or_default()
    }
}

/// Reflected description of one record type.
///
/// `fields` is sorted ascending by field number; `fields_indexer` is its
/// inverse over field numbers and refers to the identical `Arc<Field>`
/// instances.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Type {
    /// Stable type name.
    pub name: String,
    /// Fields sorted ascending by field number.
    pub fields: Vec<Arc<Field>>,
    /// Field-number → field lookup, inverse of `fields`.
    pub fields_indexer: FastHashMap<u32, Arc<Field>>,
}

impl Type {
    /// Rebuilds `fields_indexer` from `fields`, restoring the
    /// identical-instances invariant (used after deserializing a schema).
    pub fn rebuild_indexer(&mut self) {
        self.fields_indexer = self
            .fields
            .iter()
            .filter(|f| f.field_num() != 0)
            .map(|f| (f.field_num(), Arc::clone(f)))
            .collect();
    }
}

/// A root type plus every message type reachable through its fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    /// Type name → reflected type.
    pub types: FastIndexMap<String, Arc<Type>>,
}

// ============================================================================
// Registry
// ============================================================================

/// Prozessweite Registry. Wird beim ersten Zugriff mit den fünf
/// Selbstbeschreibungs-Typen vorbesetzt (das Rust-Pendant zum `init()` des
/// Ursprungs); danach nur noch Registrierungsphase + Read-only-Lookups.
static REGISTRY: LazyLock<RwLock<FastHashMap<String, Arc<Type>>>> = LazyLock::new(|| {
    let mut map = FastHashMap::default();
    seed::<annotation::ProtobufInfo>(&mut map);
    seed::<Tags>(&mut map);
    seed::<Field>(&mut map);
    seed::<Type>(&mut map);
    seed::<Module>(&mut map);
    RwLock::new(map)
});

fn seed<T: Record>(map: &mut FastHashMap<String, Arc<Type>>) {
    let t = build_type::<T>(T::type_name()).expect("builtin schema annotations are valid");
    map.insert(T::type_name().to_string(), Arc::new(t));
}

fn build_type<T: Record>(name: &str) -> Result<Type> {
    let mut fields: Vec<Arc<Field>> = Vec::new();
    for (slot, spec) in T::fields().iter().enumerate() {
        let tags =
            annotation::parse_tags(spec.protobuf, spec.protobuf_key, spec.protobuf_val, spec.json)?;
        let Some(info) = tags.protobuf.as_ref() else {
            // Felder ohne Protobuf-Annotation sind für den Codec unsichtbar.
            continue;
        };

        // Effektiver Wire Type: LEN für alle längenpräfixierten Formen,
        // sonst der deklarierte skalare Wire Type.
        let effective = match spec.kind {
            Kind::String | Kind::Bytes | Kind::List | Kind::Map | Kind::Message => WireType::Len,
            _ => info.wire_type,
        };
        let mut tag_writer = ByteWriter::new();
        tag::encode(&mut tag_writer, info.field_num, effective)?;
        let tag_bytes = tag_writer.detach();

        let (key_tag, value_tag) = if spec.kind == Kind::Map {
            let mut key_writer = ByteWriter::new();
            tag::encode(&mut key_writer, 1, tags.map_key)?;
            let mut value_writer = ByteWriter::new();
            tag::encode(&mut value_writer, 2, tags.map_value)?;
            (key_writer.detach(), value_writer.detach())
        } else {
            (Vec::new(), Vec::new())
        };

        fields.push(Arc::new(Field {
            name: spec.name.to_string(),
            kind: spec.kind,
            key: spec.key,
            elem: spec.elem,
            key_type: spec.key_type.to_string(),
            elem_type: spec.elem_type.to_string(),
            field_index: vec![slot as u32],
            is_pointer: spec.is_pointer,
            type_name: spec.type_name.to_string(),
            tags: Some(tags),
            tag: tag_bytes,
            key_tag,
            value_tag,
        }));
    }

    fields.sort_by_key(|f| f.field_num());
    let mut out = Type {
        name: name.to_string(),
        fields,
        fields_indexer: FastHashMap::default(),
    };
    out.rebuild_indexer();
    Ok(out)
}

/// Registers a record type under its canonical name.
///
/// Re-registering a name replaces the prior entry. Fails when a field
/// annotation does not parse.
pub fn register_type<T: Record>() -> Result<Arc<Type>> {
    register_type_as::<T>(T::type_name())
}

/// Registers a record type under a caller-chosen name.
pub fn register_type_as<T: Record>(name: &str) -> Result<Arc<Type>> {
    let t = Arc::new(build_type::<T>(name)?);
    let mut registry = REGISTRY.write().expect("registry lock poisoned");
    if registry.insert(name.to_string(), Arc::clone(&t)).is_some() {
        log::debug!("replacing registered type '{name}'");
    }
    Ok(t)
}

/// Installs every type of a module into the registry.
///
/// This is the receiving half of schema transfer: after `import_module`, the
/// inspector can `read`/`write` payloads of the foreign schema by name.
pub fn register_module(module: &Module) {
    let mut registry = REGISTRY.write().expect("registry lock poisoned");
    for (name, t) in &module.types {
        if registry.insert(name.clone(), Arc::clone(t)).is_some() {
            log::debug!("replacing registered type '{name}'");
        }
    }
}

/// Looks up the registered type of a record.
pub fn capture_type<T: Record>() -> Option<Arc<Type>> {
    capture_type_by_name(T::type_name())
}

/// Looks up a registered type by name.
pub fn capture_type_by_name(name: &str) -> Option<Arc<Type>> {
    REGISTRY
        .read()
        .expect("registry lock poisoned")
        .get(name)
        .cloned()
}

// ============================================================================
// Schema export / import
// ============================================================================

/// Serializes the registered schema of `T` as a proto3-encoded [`Type`].
pub fn export_type<T: Record>() -> Result<Vec<u8>> {
    let t = capture_type::<T>().ok_or_else(|| Error::UnknownType(T::type_name().to_string()))?;
    crate::codec::marshal::<Type>(&t)
}

/// Deserializes a proto3-encoded [`Type`].
pub fn import_type(bytes: &[u8]) -> Result<Type> {
    let mut t = Type::default();
    crate::codec::unmarshal(bytes, &mut t)?;
    t.rebuild_indexer();
    Ok(t)
}

/// Serializes the schema of `T` plus every reachable message type as a
/// proto3-encoded [`Module`].
pub fn export_module<T: Record>() -> Result<Vec<u8>> {
    let module = module_for(T::type_name())?;
    crate::codec::marshal::<Module>(&module)
}

/// Deserializes a proto3-encoded [`Module`].
pub fn import_module(bytes: &[u8]) -> Result<Module> {
    let mut module = Module::default();
    crate::codec::unmarshal(bytes, &mut module)?;
    Ok(module)
}

/// Collects a root type and every message type reachable through fields.
fn module_for(root: &str) -> Result<Module> {
    let mut module = Module::default();
    let mut pending = vec![root.to_string()];
    while let Some(name) = pending.pop() {
        if name.is_empty() || module.types.contains_key(&name) {
            continue;
        }
        let t = capture_type_by_name(&name).ok_or_else(|| Error::UnknownType(name.clone()))?;
        for field in &t.fields {
            if field.kind == Kind::Message {
                pending.push(field.type_name.clone());
            }
            if field.elem == Kind::Message {
                pending.push(field.elem_type.clone());
            }
        }
        module.types.insert(name, t);
    }
    Ok(module)
}
