#![no_main]

use libfuzzer_sys::fuzz_target;
use revisor::core::Freshness;
use revisor::cvr::CvrCache;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let cache = CvrCache::new(64, Freshness::SameDay);
        if cache.restore(s).is_err() {
            assert!(cache.is_empty());
        }
    }
});
