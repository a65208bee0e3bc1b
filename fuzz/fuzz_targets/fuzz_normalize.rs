//! Fuzz the response normalizer: any byte soup the endpoint produces must
//! come back as a usable result, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let result = lanoria::normalize::normalize_text(text);
        assert!(!result.description.is_empty());

        // Exercise the object path too when the input parses as JSON.
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
            let result = lanoria::normalize::normalize(&value);
            assert!(!result.description.is_empty());
        }
    }
});
