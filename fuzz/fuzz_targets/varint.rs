#![no_main]
use libfuzzer_sys::fuzz_target;

use protoflect::{ByteReader, ByteWriter};

// Varint-Decoder gegen beliebige Eingaben; decodierte Werte müssen
// wert-identisch re-encodieren (kanonische Form darf kürzer sein).
fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    if let Ok(value) = protoflect::varint::decode_uvarint(&mut reader) {
        let mut w = ByteWriter::new();
        protoflect::varint::encode_uvarint(&mut w, value);
        let canonical = w.detach();
        let mut r = ByteReader::new(&canonical);
        assert_eq!(protoflect::varint::decode_uvarint(&mut r).unwrap(), value);
        assert!(canonical.len() <= 10);
    }
});
