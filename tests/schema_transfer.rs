//! Schema export/import: the reflected schema travels as an ordinary proto3
//! message and reconstructs a usable registry on the receiving side.

mod common;

use common::{register_all, sample_person, Contact, Person};
use protoflect::{
    capture_type_by_name, export_module, export_type, import_module, import_type,
    register_module, Kind, Module, Value,
};
use std::sync::Arc;

#[test]
fn type_export_import_is_identity() {
    register_all();
    let blob = export_type::<Person>().unwrap();
    let imported = import_type(&blob).unwrap();
    let registered = capture_type_by_name("wire_test.Person").unwrap();
    assert_eq!(&imported, &*registered);
}

#[test]
fn imported_type_keeps_field_order_and_tags() {
    register_all();
    let imported = import_type(&export_type::<Person>().unwrap()).unwrap();
    let nums: Vec<u32> = imported.fields.iter().map(|f| f.field_num()).collect();
    assert_eq!(nums, (1..=12).collect::<Vec<u32>>());

    let name = &imported.fields_indexer[&2];
    assert_eq!(name.name, "name");
    assert_eq!(name.kind, Kind::String);
    assert_eq!(name.tag, vec![0x12]);

    let labels = &imported.fields_indexer[&10];
    assert_eq!(labels.kind, Kind::Map);
    assert_eq!(labels.key_tag, vec![0x0A]);
    assert_eq!(labels.value_tag, vec![0x12]);
}

#[test]
fn module_walks_nested_types() {
    register_all();
    let module = import_module(&export_module::<Person>().unwrap()).unwrap();
    assert_eq!(module.types.len(), 2);
    assert!(module.types.contains_key("wire_test.Person"));
    assert!(module.types.contains_key("wire_test.Address"));
}

#[test]
fn module_of_flat_type_is_single_entry() {
    register_all();
    let module = import_module(&export_module::<Contact>().unwrap()).unwrap();
    assert_eq!(module.types.len(), 1);
}

#[test]
fn foreign_registry_can_inspect_payloads() {
    register_all();
    let blob = export_module::<Person>().unwrap();
    let payload = protoflect::marshal(&sample_person()).unwrap();

    // Empfängerseite: Modul importieren, registrieren, Payload lesen —
    // ohne die Record-Typen selbst zu kennen.
    let module = import_module(&blob).unwrap();
    register_module(&module);
    let tree = protoflect::read("wire_test.Person", &payload).unwrap();

    assert_eq!(tree["id"], Value::I64(42));
    assert_eq!(tree["name"], Value::Str("Alice".into()));
    let main_addr = tree["main_addr"].as_message().unwrap();
    assert_eq!(main_addr["zip"], Value::I64(99999));

    // Und symmetrisch zurückschreiben.
    let rewritten = protoflect::write("wire_test.Person", &tree).unwrap();
    let mut reparsed = Person::default();
    protoflect::unmarshal(&rewritten, &mut reparsed).unwrap();
    assert_eq!(reparsed, sample_person());
}

#[test]
fn imported_indexer_aliases_fields() {
    register_all();
    let imported = import_type(&export_type::<Person>().unwrap()).unwrap();
    assert_eq!(imported.fields_indexer.len(), imported.fields.len());
    for field in &imported.fields {
        assert!(Arc::ptr_eq(&imported.fields_indexer[&field.field_num()], field));
    }
}

#[test]
fn module_round_trips_as_message() {
    register_all();
    let blob = export_module::<Person>().unwrap();
    let module = import_module(&blob).unwrap();

    // Ein importiertes Modul erneut serialisieren und wieder importieren:
    // strukturell identisch (Map-Reihenfolge ist frei, daher Vergleich der
    // Inhalte, nicht der Bytes).
    let blob_2 = protoflect::marshal::<Module>(&module).unwrap();
    let module_2 = import_module(&blob_2).unwrap();
    assert_eq!(module_2.types.len(), module.types.len());
    for (name, t) in &module.types {
        assert_eq!(&**module_2.types.get(name).unwrap(), &**t, "{name}");
    }
}

#[test]
fn schema_blob_is_invisible_to_wrong_importer() {
    register_all();
    // Ein Type-Blob als Modul importiert: Feld 1 (Module.types, map) kollidiert
    // mit Feld 1 von Type (name, string) — der LEN-Payload wird als Map-Entry
    // gelesen und ergibt leere oder fremde Einträge, aber keinen Panic.
    let type_blob = export_type::<Contact>().unwrap();
    let _ = import_module(&type_blob);
}
