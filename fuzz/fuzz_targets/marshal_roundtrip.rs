#![no_main]
use libfuzzer_sys::fuzz_target;

use protoflect::{FieldSpec, Kind, MapKey, Record, Result, Value};
use std::collections::BTreeMap;
use std::sync::Once;

// Vorwärts-Richtung: aus den Fuzz-Bytes einen strukturierten Datensatz bauen,
// encodieren, decodieren — das Ergebnis muss strukturell identisch sein.
// Deckt die Encoder-Pfade ab (packed, LEN-Listen, Maps, verschachtelte
// Messages, optionale Pointer, zigzag, fixed), die ein Decode-only-Target
// nie erreicht.
fuzz_target!(|data: &[u8]| {
    register();
    let mut driver = Driver { data, pos: 0 };
    let sample = build_sample(&mut driver);

    let bytes = protoflect::marshal(&sample).expect("registered record must marshal");
    let mut back = Sample::default();
    protoflect::unmarshal(&bytes, &mut back).expect("own output must unmarshal");
    assert_eq!(back, sample);
});

static INIT: Once = Once::new();

fn register() {
    INIT.call_once(|| {
        protoflect::register_type::<Inner>().unwrap();
        protoflect::register_type::<Sample>().unwrap();
    });
}

// ============================================================================
// Byte-getriebener Builder
// ============================================================================

struct Driver<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Driver<'_> {
    fn byte(&mut self) -> u8 {
        let b = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        b
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes([self.byte(), self.byte(), self.byte(), self.byte()])
    }

    fn u64(&mut self) -> u64 {
        (u64::from(self.u32()) << 32) | u64::from(self.u32())
    }

    fn len(&mut self, cap: usize) -> usize {
        self.byte() as usize % cap
    }

    fn string(&mut self) -> String {
        let n = self.len(12);
        let mut raw = Vec::with_capacity(n);
        for _ in 0..n {
            raw.push(self.byte());
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn bytes_vec(&mut self, cap: usize) -> Vec<u8> {
        let n = self.len(cap);
        (0..n).map(|_| self.byte()).collect()
    }

    fn f32(&mut self) -> f32 {
        let v = f32::from_bits(self.u32());
        // NaN != NaN würde den Gleichheits-Check sinnlos machen.
        if v.is_nan() { 0.0 } else { v }
    }

    fn f64(&mut self) -> f64 {
        let v = f64::from_bits(self.u64());
        if v.is_nan() { 0.0 } else { v }
    }
}

fn build_inner(d: &mut Driver<'_>) -> Inner {
    Inner {
        label: d.string(),
        count: d.u32() as i32,
    }
}

fn build_sample(d: &mut Driver<'_>) -> Sample {
    Sample {
        id: d.u64(),
        delta: d.u64() as i64,
        width: d.u32() as i32,
        ratio: d.f32(),
        total: d.f64(),
        ok: d.byte() & 1 == 1,
        name: d.string(),
        blob: d.bytes_vec(16),
        points: (0..d.len(8)).map(|_| d.u64() as i64).collect(),
        labels: (0..d.len(4)).map(|_| d.string()).collect(),
        attrs: (0..d.len(4)).map(|_| (d.string(), d.string())).collect(),
        inner: if d.byte() & 1 == 1 {
            Some(build_inner(d))
        } else {
            None
        },
        kids: (0..d.len(3)).map(|_| build_inner(d)).collect(),
    }
}

// ============================================================================
// Fuzz-Records
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct Inner {
    label: String,
    count: i32,
}

impl Record for Inner {
    fn type_name() -> &'static str {
        "fuzz.Inner"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::scalar("label", Kind::String, "bytes,1,opt,name=label,proto3"),
            FieldSpec::scalar("count", Kind::Int32, "varint,2,opt,name=count,proto3"),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::Str(self.label.clone()),
            1 => Value::I64(i64::from(self.count)),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => self.label = value.into_str()?,
            1 => self.count = value.as_i64()? as i32,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
struct Sample {
    id: u64,
    delta: i64,
    width: i32,
    ratio: f32,
    total: f64,
    ok: bool,
    name: String,
    blob: Vec<u8>,
    points: Vec<i64>,
    labels: Vec<String>,
    attrs: BTreeMap<String, String>,
    inner: Option<Inner>,
    kids: Vec<Inner>,
}

impl Record for Sample {
    fn type_name() -> &'static str {
        "fuzz.Sample"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::scalar("id", Kind::Uint64, "varint,1,opt,name=id,proto3"),
            FieldSpec::scalar("delta", Kind::Int64, "zigzag64,2,opt,name=delta,proto3"),
            FieldSpec::scalar("width", Kind::Int32, "fixed32,3,opt,name=width,proto3"),
            FieldSpec::scalar("ratio", Kind::Float32, "fixed32,4,opt,name=ratio,proto3"),
            FieldSpec::scalar("total", Kind::Float64, "fixed64,5,opt,name=total,proto3"),
            FieldSpec::scalar("ok", Kind::Bool, "varint,6,opt,name=ok,proto3"),
            FieldSpec::scalar("name", Kind::String, "bytes,7,opt,name=name,proto3"),
            FieldSpec::scalar("blob", Kind::Bytes, "bytes,8,opt,name=blob,proto3"),
            FieldSpec::list("points", Kind::Int64, "int64", "varint,9,rep,packed,name=points,proto3"),
            FieldSpec::list("labels", Kind::String, "string", "bytes,10,rep,name=labels,proto3"),
            FieldSpec::map(
                "attrs",
                Kind::String,
                Kind::String,
                "string",
                "string",
                "bytes,11,map,name=attrs,proto3",
                "bytes,1,opt,name=key",
                "bytes,2,opt,name=value",
            ),
            FieldSpec::message("inner", "fuzz.Inner", "bytes,12,opt,name=inner,proto3").pointer(),
            FieldSpec::list("kids", Kind::Message, "fuzz.Inner", "bytes,13,rep,name=kids,proto3"),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::U64(self.id),
            1 => Value::I64(self.delta),
            2 => Value::I64(i64::from(self.width)),
            3 => Value::F64(f64::from(self.ratio)),
            4 => Value::F64(self.total),
            5 => Value::Bool(self.ok),
            6 => Value::Str(self.name.clone()),
            7 => Value::Bytes(self.blob.clone()),
            8 => Value::List(self.points.iter().map(|&v| Value::I64(v)).collect()),
            9 => Value::List(self.labels.iter().map(|l| Value::Str(l.clone())).collect()),
            10 => Value::Map(
                self.attrs
                    .iter()
                    .map(|(k, v)| (MapKey::Str(k.clone()), Value::Str(v.clone())))
                    .collect(),
            ),
            11 => match &self.inner {
                Some(inner) => Value::Message(protoflect::record_to_tree(inner)),
                None => Value::None,
            },
            12 => Value::List(
                self.kids
                    .iter()
                    .map(|kid| Value::Message(protoflect::record_to_tree(kid)))
                    .collect(),
            ),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => self.id = value.as_u64()?,
            1 => self.delta = value.as_i64()?,
            2 => self.width = value.as_i64()? as i32,
            3 => self.ratio = value.as_f64()? as f32,
            4 => self.total = value.as_f64()?,
            5 => self.ok = value.as_bool()?,
            6 => self.name = value.into_str()?,
            7 => self.blob = value.into_bytes()?,
            8 => {
                for item in value.into_list()? {
                    self.points.push(item.as_i64()?);
                }
            }
            9 => {
                for item in value.into_list()? {
                    self.labels.push(item.into_str()?);
                }
            }
            10 => {
                for (key, val) in value.into_map()? {
                    let MapKey::Str(key) = key else {
                        return Err(protoflect::Error::kind_mismatch("string", key.kind_name()));
                    };
                    self.attrs.insert(key, val.into_str()?);
                }
            }
            11 => {
                let target = self.inner.get_or_insert_with(Inner::default);
                protoflect::merge_tree(target, value.into_message()?)?;
            }
            12 => {
                for item in value.into_list()? {
                    self.kids.push(protoflect::record_from_tree(item.into_message()?)?);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
