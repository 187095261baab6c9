#![no_main]
use libfuzzer_sys::fuzz_target;

// Beliebige Bytes gegen das (vorregistrierte) Schema der Selbstbeschreibung
// decodieren: darf fehlschlagen, aber nie panicken.
fuzz_target!(|data: &[u8]| {
    let mut t = protoflect::Type::default();
    let _ = protoflect::unmarshal(data, &mut t);

    let mut f = protoflect::Field::default();
    let _ = protoflect::unmarshal(data, &mut f);
});
