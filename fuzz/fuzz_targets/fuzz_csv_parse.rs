#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic — a malformed export yields None, never a crash.
        if let Some(parsed) = kontera::import::parse_csv(s) {
            let outcome = kontera::import::guess_mapping(&parsed.headers);
            let _ = kontera::import::build_transactions(&parsed, &outcome.mapping);
        }
    }
});
