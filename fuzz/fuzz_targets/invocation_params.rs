#![no_main]

use ckb_debug_invoker::runtime::InvocationParams;
use ckb_debug_invoker::Invocation;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut parts = text.splitn(3, '\n');
    let invocation = Invocation {
        fixture_json: "{}".to_string(),
        group_type: parts.next().unwrap_or_default().to_string(),
        script_hash: parts.next().unwrap_or_default().to_string(),
        cycle_limit: parts.next().unwrap_or_default().to_string(),
    };
    if let Ok(params) = InvocationParams::parse(&invocation) {
        assert_eq!(params.script_hash.to_string(), invocation.script_hash.to_lowercase());
        assert!(params.max_cycles.to_string().len() <= invocation.cycle_limit.len());
    }
});
