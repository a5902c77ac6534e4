#![no_main]

use ckb_debug_invoker::runtime::parse_result;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok((document, result)) = parse_result(text) {
            assert!(document.is_object());
            let _ = result.is_success();
        }
    }
});
