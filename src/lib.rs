//! protoflect – schema-reflective proto3 wire-format codec
//!
//! Records describe their fields with the protobuf struct-tag grammar
//! (`"varint,2,opt,name=age,proto3"`); the codec serializes values of such
//! records to and from bytes that are bit-compatible with the canonical
//! proto3 binary encoding. A schema-less inspector decodes payloads into
//! name-keyed value trees without constructing the record, and the reflected
//! schema itself round-trips through the same codec (schema export/import).
//!
//! # Beispiel
//!
//! ```
//! use protoflect::{FieldSpec, Kind, Record, Result, Value};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Greeting {
//!     text: String,
//!     count: u64,
//! }
//!
//! impl Record for Greeting {
//!     fn type_name() -> &'static str {
//!         "demo.Greeting"
//!     }
//!
//!     fn fields() -> &'static [FieldSpec] {
//!         const FIELDS: &[FieldSpec] = &[
//!             FieldSpec::scalar("text", Kind::String, "bytes,1,opt,name=text,proto3"),
//!             FieldSpec::scalar("count", Kind::Uint64, "varint,2,opt,name=count,proto3"),
//!         ];
//!         FIELDS
//!     }
//!
//!     fn read_field(&self, slot: usize) -> Value {
//!         match slot {
//!             0 => Value::Str(self.text.clone()),
//!             1 => Value::U64(self.count),
//!             _ => Value::None,
//!         }
//!     }
//!
//!     fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
//!         match slot {
//!             0 => self.text = value.into_str()?,
//!             1 => self.count = value.as_u64()?,
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! protoflect::register_type::<Greeting>().unwrap();
//! let v = Greeting { text: "hi".into(), count: 3 };
//! let bytes = protoflect::marshal(&v).unwrap();
//! assert_eq!(bytes, vec![0x0A, 0x02, b'h', b'i', 0x10, 0x03]);
//!
//! let mut back = Greeting::default();
//! protoflect::unmarshal(&bytes, &mut back).unwrap();
//! assert_eq!(back, v);
//! ```

pub mod annotation;
pub mod binary;
pub mod boolean;
pub mod bytestream;
pub mod codec;
pub mod error;
pub mod fixed;
pub mod float;
pub mod inspector;
pub mod pool;
pub mod reflect;
pub mod schema;
pub mod schema_codec;
pub mod string;
pub mod tag;
pub mod value;
pub mod varint;
pub mod zigzag;

pub use error::{Error, Result};

/// HashMap mit ahash (schneller, nicht DoS-resistent — für interne Datenstrukturen).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API: wire types and annotations
pub use annotation::{ProtobufInfo, Tags};
pub use tag::WireType;

// Public API: values and reflection capability
pub use reflect::{FieldSpec, Record, merge_tree, record_from_tree, record_to_tree};
pub use value::{MapKey, Tree, Value};

// Public API: schema and registry
pub use schema::{
    Field, Kind, Module, Type, capture_type, capture_type_by_name, export_module, export_type,
    import_module, import_type, register_module, register_type, register_type_as,
};

// Public API: codecs
pub use bytestream::{ByteReader, ByteWriter};
pub use codec::{marshal, unmarshal};
pub use inspector::{read, write};
