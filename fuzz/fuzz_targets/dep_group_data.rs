#![no_main]

use ckb_debug_invoker::fixture::script_hash::parse_dep_group_data;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(points) = parse_dep_group_data(data) {
        assert_eq!(data.len(), 4 + points.len() * 36);
    }
});
