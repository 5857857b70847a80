#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Err(err) = contour_lang::validate(text) {
            assert!(err.position <= text.chars().count());
            assert!(text.starts_with(&err.excerpt));
        }
    }
});
