#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic; errors are fine.
        if let Ok(rules) = revisor::vat::VatRuleStore::from_json_str(s) {
            let _ = rules.lookup(s);
            let _ = rules.to_json();
        }
    }
});
