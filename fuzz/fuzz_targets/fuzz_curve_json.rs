#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing may fail, but must never panic
    if let Ok(curves) = cvalign::io::json::curves_from_str(text) {
        // Whatever parses must align or fail with an error
        let _ = cvalign::aligner::align(&curves);
    }
});
