#![no_main]

use libfuzzer_sys::fuzz_target;
use structconf::tag;

fuzz_target!(|data: &str| {
    // === Parsing should never panic ===
    let parsed = tag::parse(data);
    let _ = parsed.len();
    let _ = parsed.is_empty();

    // === Every parsed key must be found again ===
    for (key, _) in parsed.iter().filter(|(k, _)| !k.is_empty()) {
        assert!(parsed.contains(key));
        assert_eq!(tag::lookup(data, key), parsed.get(key));
    }

    // === Keys never contain separators ===
    for (key, _) in parsed.iter() {
        assert!(!key.contains(','));
        assert!(!key.contains(':'));
    }
});
