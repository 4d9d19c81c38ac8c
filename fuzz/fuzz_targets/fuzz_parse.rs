#![no_main]

use libfuzzer_sys::fuzz_target;

// Arbitrary text through the parser and, when it parses, back out through
// the writer. Serialized output must parse to the same stream.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(stream) = zenrle::text::parse(text) else {
        return;
    };
    let again = zenrle::text::parse(&stream.to_string()).expect("writer output must parse");
    assert_eq!(again, stream);
});
