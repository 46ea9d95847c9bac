#![no_main]

use libfuzzer_sys::fuzz_target;
use structconf::duration::parse_duration;

fuzz_target!(|data: &str| {
    // === Parsing should never panic ===
    let Ok(parsed) = parse_duration(data) else {
        return;
    };

    // === Results stay within the signed nanosecond range ===
    assert!(parsed.as_nanos() <= i64::MAX as u128);

    // === Whole nanoseconds reparse to the same value ===
    let reparsed = parse_duration(&format!("{}ns", parsed.as_nanos()));
    assert_eq!(reparsed, Ok(parsed));
});
