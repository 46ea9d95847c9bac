#![no_main]

use libfuzzer_sys::fuzz_target;
use structconf::handler::Dotenv;

fuzz_target!(|data: &[u8]| {
    // === Malformed content is an error, never a panic ===
    let _ = Dotenv::from_reader(data);
});
