//! Parser for the per-field protobuf annotation grammar.
//!
//! The annotation is the struct-tag convention emitted by the popular native
//! protobuf generators:
//!
//! ```text
//! <wire-type-name>,<field-number>,<label>,name=<proto-name>,<syntax>[,oneof]
//! ```
//!
//! Map fields carry two additional annotations naming the key and value wire
//! types. A field without a parseable annotation is invisible to the codec.

use crate::tag::{MAX_FIELD_NUMBER, WireType};
use crate::{Error, Result};

/// Parsed form of one field's protobuf annotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtobufInfo {
    /// Declared wire type of the scalar payload.
    pub wire_type: WireType,
    /// True for `zigzag32`/`zigzag64` annotations (the generator's spelling
    /// of `sint32`/`sint64`): varint wire shape, zigzag value transform.
    pub zigzag: bool,
    /// Field number, 1..=2^29-1.
    pub field_num: u32,
    /// Label segment, preserved verbatim ("opt"/"req"/"rep"/"packed"/…).
    pub label: String,
    /// Proto field name from the `name=` segment.
    pub name: String,
    /// Syntax segment, preserved verbatim ("proto3").
    pub syntax: String,
    /// True when the annotation carries the trailing `oneof` marker.
    pub one_of: bool,
}

/// The full annotation set of one field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tags {
    /// Parsed protobuf annotation; `None` means the codec ignores the field.
    pub protobuf: Option<ProtobufInfo>,
    /// Stored JSON name annotation (honored, never interpreted).
    pub json_name: String,
    /// Wire type of map keys (map fields only).
    pub map_key: WireType,
    /// Wire type of map values (map fields only).
    pub map_value: WireType,
}

impl Tags {
    /// True when the field participates in the wire format.
    pub fn is_protobuf(&self) -> bool {
        self.protobuf.is_some()
    }
}

/// Maps a wire-type name to its wire type and zigzag flag.
///
/// Unknown names fall back to varint, matching the generator convention of
/// treating enums and friends as varint scalars.
fn wire_type_of_name(name: &str) -> (WireType, bool) {
    match name {
        "varint" => (WireType::Varint, false),
        "zigzag32" | "zigzag64" => (WireType::Varint, true),
        "fixed64" => (WireType::I64, false),
        "bytes" => (WireType::Len, false),
        "start_group" => (WireType::SGroup, false),
        "end_group" => (WireType::EGroup, false),
        "fixed32" => (WireType::I32, false),
        _ => (WireType::Varint, false),
    }
}

/// Parses one protobuf annotation string.
///
/// Returns `Ok(None)` for annotations with fewer than two segments (the field
/// is ignored); a malformed field number is a hard error raised at
/// registration time.
pub fn parse_protobuf(annotation: &str) -> Result<Option<ProtobufInfo>> {
    let segments: Vec<&str> = annotation.split(',').collect();
    if segments.len() < 2 {
        return Ok(None);
    }

    let field_num: u32 = segments[1].parse().map_err(|_| {
        Error::invalid_annotation(format!("field number '{}' is not a number", segments[1]))
    })?;
    if field_num == 0 || field_num > MAX_FIELD_NUMBER {
        return Err(Error::invalid_annotation(format!(
            "field number {field_num} out of range 1..={MAX_FIELD_NUMBER}"
        )));
    }

    let (wire_type, zigzag) = wire_type_of_name(segments[0]);
    let mut out = ProtobufInfo {
        wire_type,
        zigzag,
        field_num,
        ..ProtobufInfo::default()
    };
    if segments.len() > 2 {
        out.label = segments[2].to_string();
    }
    if segments.len() > 3 {
        out.name = segments[3].strip_prefix("name=").unwrap_or(segments[3]).to_string();
    }
    if segments.len() > 4 {
        out.syntax = segments[4].to_string();
    }
    if segments.len() == 6 {
        out.one_of = true;
    }
    Ok(Some(out))
}

/// Builds the [`Tags`] of a field from its annotation strings.
///
/// `map_key`/`map_value` are the separately-carried sub-annotations of map
/// fields; only their wire-type segment is consulted.
pub fn parse_tags(
    protobuf: &str,
    map_key: Option<&str>,
    map_value: Option<&str>,
    json_name: &str,
) -> Result<Tags> {
    let mut out = Tags {
        protobuf: parse_protobuf(protobuf)?,
        json_name: json_name.to_string(),
        ..Tags::default()
    };
    if let Some(annotation) = map_key
        && let Some(info) = parse_protobuf(annotation)?
    {
        out.map_key = info.wire_type;
    }
    if let Some(annotation) = map_value
        && let Some(info) = parse_protobuf(annotation)?
    {
        out.map_value = info.wire_type;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_annotation() {
        let info = parse_protobuf("bytes,2,opt,name=name,proto3")
            .unwrap()
            .unwrap();
        assert_eq!(info.wire_type, WireType::Len);
        assert_eq!(info.field_num, 2);
        assert_eq!(info.label, "opt");
        assert_eq!(info.name, "name");
        assert_eq!(info.syntax, "proto3");
        assert!(!info.one_of);
        assert!(!info.zigzag);
    }

    #[test]
    fn oneof_marker() {
        let info = parse_protobuf("bytes,12,opt,name=main_addr,proto3,oneof")
            .unwrap()
            .unwrap();
        assert!(info.one_of);
    }

    #[test]
    fn all_wire_type_names() {
        let cases = [
            ("varint", WireType::Varint, false),
            ("zigzag32", WireType::Varint, true),
            ("zigzag64", WireType::Varint, true),
            ("fixed64", WireType::I64, false),
            ("bytes", WireType::Len, false),
            ("start_group", WireType::SGroup, false),
            ("end_group", WireType::EGroup, false),
            ("fixed32", WireType::I32, false),
        ];
        for (name, wire_type, zigzag) in cases {
            let info = parse_protobuf(&format!("{name},1,opt,name=f,proto3"))
                .unwrap()
                .unwrap();
            assert_eq!(info.wire_type, wire_type, "{name}");
            assert_eq!(info.zigzag, zigzag, "{name}");
        }
    }

    #[test]
    fn unknown_wire_type_name_falls_back_to_varint() {
        let info = parse_protobuf("group,3,opt,name=f,proto3").unwrap().unwrap();
        assert_eq!(info.wire_type, WireType::Varint);
    }

    #[test]
    fn short_annotation_is_ignored() {
        assert_eq!(parse_protobuf("").unwrap(), None);
        assert_eq!(parse_protobuf("varint").unwrap(), None);
    }

    #[test]
    fn two_segments_suffice() {
        let info = parse_protobuf("varint,7").unwrap().unwrap();
        assert_eq!(info.field_num, 7);
        assert!(info.label.is_empty());
        assert!(info.name.is_empty());
    }

    #[test]
    fn bad_field_number_is_hard_error() {
        assert!(matches!(
            parse_protobuf("varint,x,opt").unwrap_err(),
            Error::InvalidAnnotation(_)
        ));
        assert!(matches!(
            parse_protobuf("varint,0,opt").unwrap_err(),
            Error::InvalidAnnotation(_)
        ));
        assert!(matches!(
            parse_protobuf("varint,-3,opt").unwrap_err(),
            Error::InvalidAnnotation(_)
        ));
    }

    #[test]
    fn name_without_prefix_is_kept_verbatim() {
        let info = parse_protobuf("varint,1,opt,age,proto3").unwrap().unwrap();
        assert_eq!(info.name, "age");
    }

    #[test]
    fn map_sub_annotations() {
        let tags = parse_tags(
            "bytes,10,map,name=labels,proto3",
            Some("bytes,1,opt,name=key"),
            Some("varint,2,opt,name=value"),
            "labels,omitempty",
        )
        .unwrap();
        assert!(tags.is_protobuf());
        assert_eq!(tags.map_key, WireType::Len);
        assert_eq!(tags.map_value, WireType::Varint);
        assert_eq!(tags.json_name, "labels,omitempty");
    }

    #[test]
    fn absent_map_annotations_default_to_varint() {
        let tags = parse_tags("varint,1,opt,name=id,proto3", None, None, "").unwrap();
        assert_eq!(tags.map_key, WireType::Varint);
        assert_eq!(tags.map_value, WireType::Varint);
    }

    #[test]
    fn non_protobuf_field() {
        let tags = parse_tags("", None, None, "internal").unwrap();
        assert!(!tags.is_protobuf());
        assert_eq!(tags.json_name, "internal");
    }
}
