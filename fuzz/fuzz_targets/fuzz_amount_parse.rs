#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = kontera::import::parse_amount(s);
        let _ = kontera::import::normalize_date(s);
    }
});
