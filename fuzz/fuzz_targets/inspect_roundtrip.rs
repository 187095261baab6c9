#![no_main]
use libfuzzer_sys::fuzz_target;

// Akzeptiert der Inspector einen Payload, muss write(read(b)) eine kanonische
// Form liefern: ab dort ist read→write ein Fixpunkt (explizit codierte
// Null-Werte des Eingangs-Payloads dürfen dabei wegfallen).
fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = protoflect::read("protoflect.Field", data) {
        let canonical = protoflect::write("protoflect.Field", &tree)
            .expect("a tree produced by read must be writable");
        let reread = protoflect::read("protoflect.Field", &canonical)
            .expect("writer output must be readable");
        let rewritten = protoflect::write("protoflect.Field", &reread)
            .expect("a tree produced by read must be writable");
        assert_eq!(rewritten, canonical);
    }
});
