#![no_main]
use contour_core::DefinitionError;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let valid = contour_lang::validate(text).is_ok();
    match contour_lang::parse(text) {
        // Rendering must parse back to the same tree
        Ok(expr) => {
            let again = contour_lang::parse(&expr.to_string());
            assert_eq!(again.as_ref(), Ok(&expr));
        }
        Err(DefinitionError::Syntax(_)) => assert!(!valid),
        Err(DefinitionError::Internal { message }) => panic!("internal error: {}", message),
        Err(_) => assert!(valid),
    }
});
