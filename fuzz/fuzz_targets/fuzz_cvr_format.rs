#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(cvr) = revisor::cvr::validate_cvr_format(s) {
            assert_eq!(cvr.as_str().len(), 8);
            assert!(revisor::cvr::validate_cvr_format(cvr.as_str()).is_ok());
        }
    }
});
