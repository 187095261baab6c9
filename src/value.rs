//! Sum-typed runtime values.
//!
//! [`Value`] is the currency of the codec: records hand values out through
//! the reflection capability, the typed codec encodes them, and the inspector
//! returns whole trees of them. Integer widths collapse to `i64`/`u64` (the
//! declared [`Kind`](crate::Kind) restores the width), both float widths ride
//! `f64`, and nested messages are name-keyed trees.

use crate::FastIndexMap;
use crate::{Error, Result};

/// Name-keyed field tree of a message.
pub type Tree = FastIndexMap<String, Value>;

/// A runtime value exchanged between records and the codec.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent optional — distinct from every zero value.
    #[default]
    None,
    /// Signed integer of any width.
    I64(i64),
    /// Unsigned integer of any width.
    U64(u64),
    /// Float of either width.
    F64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Str(String),
    /// Raw byte sequence.
    Bytes(Vec<u8>),
    /// Ordered sequence of element values.
    List(Vec<Value>),
    /// Unordered key→value mapping.
    Map(FastIndexMap<MapKey, Value>),
    /// Nested message as a name-keyed tree.
    Message(Tree),
}

/// Hashable subset of [`Value`] usable as a map key.
///
/// proto3 map keys are integral, boolean or string; byte-sequence keys are
/// additionally accepted for schemas that declare them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    I64(i64),
    U64(u64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F64(_) => "f64",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Message(_) => "message",
        }
    }

    /// True when the value equals the implicit default of its kind.
    ///
    /// proto3 omits default values on the wire; this is the encoder's omit
    /// test. `None` (absent optional) counts as zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::None => true,
            Self::I64(v) => *v == 0,
            Self::U64(v) => *v == 0,
            Self::F64(v) => *v == 0.0,
            Self::Bool(v) => !*v,
            Self::Str(v) => v.is_empty(),
            Self::Bytes(v) => v.is_empty(),
            Self::List(v) => v.is_empty(),
            Self::Map(v) => v.is_empty(),
            Self::Message(v) => v.is_empty(),
        }
    }

    /// Reads a signed integer, failing on any other kind.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Self::I64(v) => Ok(*v),
            other => Err(Error::kind_mismatch("i64", other.kind_name())),
        }
    }

    /// Reads an unsigned integer, failing on any other kind.
    pub fn as_u64(&self) -> Result<u64> {
        match self {
            Self::U64(v) => Ok(*v),
            other => Err(Error::kind_mismatch("u64", other.kind_name())),
        }
    }

    /// Reads a float, failing on any other kind.
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Self::F64(v) => Ok(*v),
            other => Err(Error::kind_mismatch("f64", other.kind_name())),
        }
    }

    /// Reads a bool, failing on any other kind.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(*v),
            other => Err(Error::kind_mismatch("bool", other.kind_name())),
        }
    }

    /// Borrows a string, failing on any other kind.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::Str(v) => Ok(v),
            other => Err(Error::kind_mismatch("string", other.kind_name())),
        }
    }

    /// Borrows a byte sequence, failing on any other kind.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Self::Bytes(v) => Ok(v),
            other => Err(Error::kind_mismatch("bytes", other.kind_name())),
        }
    }

    /// Borrows a list, failing on any other kind.
    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Self::List(v) => Ok(v),
            other => Err(Error::kind_mismatch("list", other.kind_name())),
        }
    }

    /// Borrows a map, failing on any other kind.
    pub fn as_map(&self) -> Result<&FastIndexMap<MapKey, Value>> {
        match self {
            Self::Map(v) => Ok(v),
            other => Err(Error::kind_mismatch("map", other.kind_name())),
        }
    }

    /// Borrows a message tree, failing on any other kind.
    pub fn as_message(&self) -> Result<&Tree> {
        match self {
            Self::Message(v) => Ok(v),
            other => Err(Error::kind_mismatch("message", other.kind_name())),
        }
    }

    /// Takes ownership of a string, failing on any other kind.
    pub fn into_str(self) -> Result<String> {
        match self {
            Self::Str(v) => Ok(v),
            other => Err(Error::kind_mismatch("string", other.kind_name())),
        }
    }

    /// Takes ownership of a byte sequence, failing on any other kind.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(v) => Ok(v),
            other => Err(Error::kind_mismatch("bytes", other.kind_name())),
        }
    }

    /// Takes ownership of a list, failing on any other kind.
    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Self::List(v) => Ok(v),
            other => Err(Error::kind_mismatch("list", other.kind_name())),
        }
    }

    /// Takes ownership of a map, failing on any other kind.
    pub fn into_map(self) -> Result<FastIndexMap<MapKey, Value>> {
        match self {
            Self::Map(v) => Ok(v),
            other => Err(Error::kind_mismatch("map", other.kind_name())),
        }
    }

    /// Takes ownership of a message tree, failing on any other kind.
    pub fn into_message(self) -> Result<Tree> {
        match self {
            Self::Message(v) => Ok(v),
            other => Err(Error::kind_mismatch("message", other.kind_name())),
        }
    }

    /// Converts a scalar value into a map key.
    pub fn into_map_key(self) -> Result<MapKey> {
        match self {
            Self::I64(v) => Ok(MapKey::I64(v)),
            Self::U64(v) => Ok(MapKey::U64(v)),
            Self::Bool(v) => Ok(MapKey::Bool(v)),
            Self::Str(v) => Ok(MapKey::Str(v)),
            Self::Bytes(v) => Ok(MapKey::Bytes(v)),
            other => Err(Error::kind_mismatch("map key", other.kind_name())),
        }
    }
}

impl MapKey {
    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::I64(v) => Self::I64(v),
            MapKey::U64(v) => Self::U64(v),
            MapKey::Bool(v) => Self::Bool(v),
            MapKey::Str(v) => Self::Str(v),
            MapKey::Bytes(v) => Self::Bytes(v),
        }
    }
}
