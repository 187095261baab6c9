//! Shared annotated record types for the integration suites.

use std::collections::BTreeMap;

use protoflect::{FieldSpec, Kind, MapKey, Record, Result, Value};

/// Registriert alle Test-Typen. Mehrfachaufruf ersetzt nur die Einträge.
pub fn register_all() {
    protoflect::register_type::<Address>().unwrap();
    protoflect::register_type::<Person>().unwrap();
    protoflect::register_type::<Contact>().unwrap();
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: i32,
}

impl Record for Address {
    fn type_name() -> &'static str {
        "wire_test.Address"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::scalar("street", Kind::String, "bytes,1,opt,name=street,proto3")
                .with_json("street,omitempty"),
            FieldSpec::scalar("city", Kind::String, "bytes,2,opt,name=city,proto3")
                .with_json("city,omitempty"),
            FieldSpec::scalar("zip", Kind::Int32, "varint,3,opt,name=zip,proto3")
                .with_json("zip,omitempty"),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::Str(self.street.clone()),
            1 => Value::Str(self.city.clone()),
            2 => Value::I64(i64::from(self.zip)),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => self.street = value.into_str()?,
            1 => self.city = value.into_str()?,
            2 => self.zip = value.as_i64()? as i32,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub rating: f32,
    pub balance: u64,
    pub data: Vec<u8>,
    pub tags: Vec<String>,
    pub scores: Vec<i64>,
    pub flags: Vec<bool>,
    pub labels: BTreeMap<String, String>,
    pub addresses: Vec<Address>,
    pub main_addr: Option<Address>,
}

impl Record for Person {
    fn type_name() -> &'static str {
        "wire_test.Person"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::scalar("id", Kind::Int64, "varint,1,opt,name=id,proto3"),
            FieldSpec::scalar("name", Kind::String, "bytes,2,opt,name=name,proto3"),
            FieldSpec::scalar("active", Kind::Bool, "varint,3,opt,name=active,proto3"),
            FieldSpec::scalar("rating", Kind::Float32, "fixed32,4,opt,name=rating,proto3"),
            FieldSpec::scalar("balance", Kind::Uint64, "fixed64,5,opt,name=balance,proto3"),
            FieldSpec::scalar("data", Kind::Bytes, "bytes,6,opt,name=data,proto3"),
            FieldSpec::list("tags", Kind::String, "string", "bytes,7,rep,name=tags,proto3"),
            FieldSpec::list("scores", Kind::Int64, "int64", "varint,8,rep,packed,name=scores,proto3"),
            FieldSpec::list("flags", Kind::Bool, "bool", "varint,9,rep,packed,name=flags,proto3"),
            FieldSpec::map(
                "labels",
                Kind::String,
                Kind::String,
                "string",
                "string",
                "bytes,10,map,name=labels,proto3",
                "bytes,1,opt,name=key",
                "bytes,2,opt,name=value",
            ),
            FieldSpec::list(
                "addresses",
                Kind::Message,
                "wire_test.Address",
                "bytes,11,rep,name=addresses,proto3",
            ),
            FieldSpec::message(
                "main_addr",
                "wire_test.Address",
                "bytes,12,opt,name=main_addr,proto3,oneof",
            )
            .pointer(),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::I64(self.id),
            1 => Value::Str(self.name.clone()),
            2 => Value::Bool(self.active),
            3 => Value::F64(f64::from(self.rating)),
            4 => Value::U64(self.balance),
            5 => Value::Bytes(self.data.clone()),
            6 => Value::List(self.tags.iter().map(|t| Value::Str(t.clone())).collect()),
            7 => Value::List(self.scores.iter().map(|&v| Value::I64(v)).collect()),
            8 => Value::List(self.flags.iter().map(|&v| Value::Bool(v)).collect()),
            9 => Value::Map(
                self.labels
                    .iter()
                    .map(|(k, v)| (MapKey::Str(k.clone()), Value::Str(v.clone())))
                    .collect(),
            ),
            10 => Value::List(
                self.addresses
                    .iter()
                    .map(|a| Value::Message(protoflect::record_to_tree(a)))
                    .collect(),
            ),
            11 => match &self.main_addr {
                Some(a) => Value::Message(protoflect::record_to_tree(a)),
                None => Value::None,
            },
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => self.id = value.as_i64()?,
            1 => self.name = value.into_str()?,
            2 => self.active = value.as_bool()?,
            3 => self.rating = value.as_f64()? as f32,
            4 => self.balance = value.as_u64()?,
            5 => self.data = value.into_bytes()?,
            6 => {
                for item in value.into_list()? {
                    self.tags.push(item.into_str()?);
                }
            }
            7 => {
                for item in value.into_list()? {
                    self.scores.push(item.as_i64()?);
                }
            }
            8 => {
                for item in value.into_list()? {
                    self.flags.push(item.as_bool()?);
                }
            }
            9 => {
                for (key, val) in value.into_map()? {
                    let MapKey::Str(key) = key else {
                        return Err(protoflect::Error::kind_mismatch("string", key.kind_name()));
                    };
                    self.labels.insert(key, val.into_str()?);
                }
            }
            10 => {
                for item in value.into_list()? {
                    self.addresses
                        .push(protoflect::record_from_tree(item.into_message()?)?);
                }
            }
            11 => {
                let target = self.main_addr.get_or_insert_with(Address::default);
                protoflect::merge_tree(target, value.into_message()?)?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Record matching the concrete wire scenarios: name #1, age #2, id #3.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Contact {
    pub name: String,
    pub age: i32,
    pub id: u64,
}

impl Record for Contact {
    fn type_name() -> &'static str {
        "wire_test.Contact"
    }

    fn fields() -> &'static [FieldSpec] {
        const FIELDS: &[FieldSpec] = &[
            FieldSpec::scalar("name", Kind::String, "bytes,1,opt,name=name,proto3"),
            FieldSpec::scalar("age", Kind::Int32, "varint,2,opt,name=age,proto3"),
            FieldSpec::scalar("id", Kind::Uint64, "varint,3,opt,name=id,proto3"),
        ];
        FIELDS
    }

    fn read_field(&self, slot: usize) -> Value {
        match slot {
            0 => Value::Str(self.name.clone()),
            1 => Value::I64(i64::from(self.age)),
            2 => Value::U64(self.id),
            _ => Value::None,
        }
    }

    fn write_field(&mut self, slot: usize, value: Value) -> Result<()> {
        match slot {
            0 => self.name = value.into_str()?,
            1 => self.age = value.as_i64()? as i32,
            2 => self.id = value.as_u64()?,
            _ => {}
        }
        Ok(())
    }
}

/// Baut einen voll besetzten Person-Datensatz für Round-Trip-Tests.
pub fn sample_person() -> Person {
    Person {
        id: 42,
        name: "Alice".into(),
        active: true,
        rating: 4.5,
        balance: 100_000,
        data: vec![0xDE, 0xAD, 0xBE, 0xEF],
        tags: vec!["rust".into(), "protobuf".into(), "test".into()],
        scores: vec![100, 200, 300],
        flags: vec![true, false, true],
        labels: BTreeMap::from([
            ("env".to_string(), "dev".to_string()),
            ("role".to_string(), "tester".to_string()),
        ]),
        addresses: vec![
            Address { street: "123 Main St".into(), city: "Springfield".into(), zip: 12345 },
            Address { street: "456 Side St".into(), city: "Shelbyville".into(), zip: 54321 },
        ],
        main_addr: Some(Address {
            street: "789 Central Ave".into(),
            city: "Capital City".into(),
            zip: 99999,
        }),
    }
}
